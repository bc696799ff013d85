use super::sampler::Sampler;
use super::table::Table;
use crate::error::Error;
use crate::projection::Aggregator;
use crate::projection::Batch;
use crate::projection::Projector;
use crate::Probability;
use crate::Utility;
use std::sync::Arc;

/// a tabular policy together with its update rule.
///
/// initialized uniform over actions. an update aggregates the batch,
/// projects toward higher advantage under the projector's divergence
/// constraint, and publishes the replacement table with a single
/// reference swap; a failed update leaves the published table untouched.
/// samplers hold snapshots, so concurrent draws never observe a
/// half-written table.
pub struct Policy<P> {
    table: Arc<Table>,
    aggregator: Aggregator,
    projector: P,
}

impl<P: Projector> Policy<P> {
    pub fn new(states: usize, actions: usize, projector: P) -> Self {
        Self {
            table: Arc::new(Table::uniform(states, actions)),
            aggregator: Aggregator::new(states, actions),
            projector,
        }
    }

    /// install the additive advantage-adjustment hook applied after
    /// every batch aggregation
    pub fn with_adjustment(
        mut self,
        adjust: impl Fn(usize, usize) -> Utility + Send + Sync + 'static,
    ) -> Self {
        self.aggregator =
            Aggregator::new(self.table.states(), self.table.actions()).with_adjustment(adjust);
        self
    }

    pub fn states(&self) -> usize {
        self.table.states()
    }
    pub fn actions(&self) -> usize {
        self.table.actions()
    }

    /// the published table. callers wanting a stable view across updates
    /// should take a sampler instead.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// snapshot of the published table for concurrent or repeated draws
    pub fn sampler(&self) -> Sampler {
        Sampler::from(Arc::clone(&self.table))
    }

    /// draw one action from the published distribution for this state
    pub fn sample(&self, state: usize, rng: &mut impl rand::Rng) -> Result<usize, Error> {
        self.sampler().sample(state, rng)
    }

    /// one full update cycle: aggregate, project, publish.
    /// input and configuration failures abort before publication.
    pub fn update(
        &mut self,
        batch: &Batch,
        weights: &[Probability],
        episode: usize,
    ) -> Result<(), Error> {
        if weights.len() != self.table.states() {
            return Err(Error::Visitation {
                got: weights.len(),
                want: self.table.states(),
            });
        }
        for (state, &weight) in weights.iter().enumerate() {
            if !(weight >= 0.) {
                return Err(Error::Weight { state, weight });
            }
        }
        let ref advantages = self.aggregator.table(batch)?;
        let next = self
            .projector
            .project(&self.table, advantages, weights, episode)?;
        debug_assert!(next.stochastic());
        log::debug!("{:<32}{:<32}", "publishing policy update", episode);
        self.table = Arc::new(next);
        Ok(())
    }
}
