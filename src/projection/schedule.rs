use crate::Entropy;

/// hyperparameter evaluated at the episode counter.
///
/// Power covers the polynomial shapes used for transport regularization
/// strength (episode squared with a ceiling, inverse episode, and so on);
/// Constant is everything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Schedule {
    Constant(Entropy),
    Power {
        scale: Entropy,
        exponent: Entropy,
        cap: Entropy,
    },
}

impl Schedule {
    pub fn at(&self, episode: usize) -> Entropy {
        match self {
            Self::Constant(value) => *value,
            Self::Power {
                scale,
                exponent,
                cap,
            } => (scale * (episode as Entropy).powf(*exponent)).min(*cap),
        }
    }
}
