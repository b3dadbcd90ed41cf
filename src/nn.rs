pub mod act_func;
pub mod dataset;
pub mod error;
pub mod layers;
pub mod lin_reg;
pub mod network;
