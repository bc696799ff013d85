pub mod error;
pub mod policy;
pub mod projection;
pub mod transport;

/// mass assigned to an action by a policy PMF
pub type Probability = f64;
/// empirical advantage of an action in a state
pub type Utility = f64;
/// ground cost between two actions
pub type Energy = f64;
/// temperature- and regularization-scale quantities
pub type Entropy = f64;

/// tolerance for treating a row as a unit-mass PMF
pub const TOLERANCE: Probability = 1e-9;
