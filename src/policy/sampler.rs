use super::table::Table;
use crate::error::Error;
use std::sync::Arc;

/// read-only view of a published policy table.
///
/// holds its own reference to the table it was taken from, so a sampler
/// keeps observing a consistent snapshot even while the owning Policy
/// publishes newer tables.
#[derive(Debug, Clone)]
pub struct Sampler(Arc<Table>);

impl Sampler {
    /// draw one action index from the state's PMF
    pub fn sample(&self, state: usize, rng: &mut impl rand::Rng) -> Result<usize, Error> {
        use rand::distr::Distribution;
        use rand::distr::weighted::WeightedIndex;
        if state >= self.0.states() {
            return Err(Error::Sample {
                state,
                states: self.0.states(),
            });
        }
        Ok(WeightedIndex::new(self.0.row(state).iter().copied())
            .expect("at least one action > 0")
            .sample(rng))
    }

    pub fn table(&self) -> &Table {
        &self.0
    }
}

impl From<Arc<Table>> for Sampler {
    fn from(table: Arc<Table>) -> Self {
        Self(table)
    }
}
