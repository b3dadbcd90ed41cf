pub mod math;
pub mod nn;
