use crate::Entropy;

/// Failure modes of an update call.
///
/// Input and configuration failures abort the whole update before the
/// published table is touched. Numeric trouble (an underflowed normalizer)
/// is not represented here: the affected state keeps its previous row and
/// the condition is reported through `log::warn!`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("sample {index} names state {state}, policy has {states}")]
    State {
        index: usize,
        state: usize,
        states: usize,
    },
    #[error("sample {index} names action {action}, policy has {actions}")]
    Action {
        index: usize,
        action: usize,
        actions: usize,
    },
    #[error("batch slices disagree in length: {states} states, {actions} actions, {advantages} advantages")]
    Ragged {
        states: usize,
        actions: usize,
        advantages: usize,
    },
    #[error("visitation weights cover {got} states, policy has {want}")]
    Visitation { got: usize, want: usize },
    #[error("visitation weight for state {state} is negative ({weight})")]
    Weight { state: usize, weight: f64 },
    #[error("cannot sample state {state}, policy has {states}")]
    Sample { state: usize, states: usize },
    #[error("{name} must be {bound}, got {value}")]
    Config {
        name: &'static str,
        bound: &'static str,
        value: Entropy,
    },
}

impl Error {
    /// configuration-class shorthand used by projector validation
    pub(crate) fn config(name: &'static str, bound: &'static str, value: Entropy) -> Self {
        Self::Config { name, bound, value }
    }
}
