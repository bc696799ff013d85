mod advantage;
mod kl;
mod schedule;
mod sinkhorn;
mod wasserstein;

pub use advantage::*;
pub use kl::*;
pub use schedule::*;
pub use sinkhorn::*;
pub use wasserstein::*;

use crate::Probability;
use crate::error::Error;
use crate::policy::Table;

/// constrained projection of a policy toward higher advantage.
///
/// implementations read the published table and the freshly aggregated
/// advantage table, and produce a complete replacement table: one PMF row
/// per state, built without touching the old table. visitation weights and
/// the episode counter only matter to the optional temperature-selection
/// modes; the per-state update math never reads them. weights must cover
/// every state; Policy::update validates shapes before projecting.
pub trait Projector {
    fn project(
        &self,
        old: &Table,
        advantages: &Table,
        weights: &[Probability],
        episode: usize,
    ) -> Result<Table, Error>;
}
