/// Activation functions available to the trainable layers.
///
/// The set is closed, so layers dispatch with a plain match instead of a
/// function pointer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActFunc {
    /// Identity, i.e. no activation.
    #[default]
    None,
    Relu,
    Sigmoid,
    Tanh,
}

impl ActFunc {
    /// Applies the activation function to the weighted sum.
    pub fn output(self, x: f64) -> f64 {
        match self {
            ActFunc::None => x,
            ActFunc::Relu => {
                if x <= 0.0 {
                    0.0
                } else {
                    x
                }
            }
            ActFunc::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActFunc::Tanh => x.tanh(),
        }
    }

    /// Derivative of the activation, expressed in terms of the activation
    /// output y = output(x). The layers only keep their outputs around, so
    /// the derivative has to be computable from those.
    pub fn delta(self, y: f64) -> f64 {
        match self {
            ActFunc::None => 1.0,
            ActFunc::Relu => {
                if y <= 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            ActFunc::Sigmoid => y * (1.0 - y),
            ActFunc::Tanh => 1.0 - y * y,
        }
    }
}
