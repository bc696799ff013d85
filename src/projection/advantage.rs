use crate::Utility;
use crate::error::Error;
use crate::policy::Table;

/// caller-supplied additive advantage bonus per (state, action) cell,
/// applied after batch averaging. this is the configuration hook that
/// replaces environment-specific bonuses hardwired at the call site.
pub type Adjustment = dyn Fn(usize, usize) -> Utility + Send + Sync;

/// one update cycle's worth of raw samples, as parallel slices.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub states: &'a [usize],
    pub actions: &'a [usize],
    pub advantages: &'a [Utility],
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.states.len()
    }
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// slices must agree in length and every index must land inside the
    /// declared state and action spaces
    pub fn validate(&self, states: usize, actions: usize) -> Result<(), Error> {
        if self.states.len() != self.actions.len() || self.states.len() != self.advantages.len() {
            return Err(Error::Ragged {
                states: self.states.len(),
                actions: self.actions.len(),
                advantages: self.advantages.len(),
            });
        }
        for (index, (&state, &action)) in self.states.iter().zip(self.actions.iter()).enumerate() {
            if state >= states {
                return Err(Error::State {
                    index,
                    state,
                    states,
                });
            }
            if action >= actions {
                return Err(Error::Action {
                    index,
                    action,
                    actions,
                });
            }
        }
        Ok(())
    }
}

/// reduces a batch into the dense S x A mean-advantage table.
///
/// cells with no samples stay at zero; observed cells hold the mean of
/// their samples. the optional Adjustment is added on top, observed or not.
pub struct Aggregator {
    states: usize,
    actions: usize,
    adjust: Option<Box<Adjustment>>,
}

impl Aggregator {
    pub fn new(states: usize, actions: usize) -> Self {
        Self {
            states,
            actions,
            adjust: None,
        }
    }

    pub fn with_adjustment(
        mut self,
        adjust: impl Fn(usize, usize) -> Utility + Send + Sync + 'static,
    ) -> Self {
        self.adjust = Some(Box::new(adjust));
        self
    }

    pub fn table(&self, batch: &Batch) -> Result<Table, Error> {
        batch.validate(self.states, self.actions)?;
        let mut sums = Table::zeros(self.states, self.actions);
        let mut counts = vec![0usize; self.states * self.actions];
        for ((&state, &action), &advantage) in batch
            .states
            .iter()
            .zip(batch.actions.iter())
            .zip(batch.advantages.iter())
        {
            sums.row_mut(state)[action] += advantage;
            counts[state * self.actions + action] += 1;
        }
        for state in 0..self.states {
            for action in 0..self.actions {
                let count = counts[state * self.actions + action];
                if count != 0 {
                    sums.row_mut(state)[action] /= count as Utility;
                }
            }
        }
        if let Some(ref adjust) = self.adjust {
            for state in 0..self.states {
                for action in 0..self.actions {
                    sums.row_mut(state)[action] += adjust(state, action);
                }
            }
        }
        Ok(sums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_per_cell() {
        let aggregator = Aggregator::new(2, 2);
        let batch = Batch {
            states: &[0, 0, 1],
            actions: &[1, 1, 0],
            advantages: &[1., 3., -2.],
        };
        let table = aggregator.table(&batch).unwrap();
        assert_eq!(table.row(0), &[0., 2.]);
        assert_eq!(table.row(1), &[-2., 0.]);
    }

    #[test]
    fn unobserved_cells_stay_zero() {
        let aggregator = Aggregator::new(3, 2);
        let batch = Batch {
            states: &[1],
            actions: &[0],
            advantages: &[5.],
        };
        let table = aggregator.table(&batch).unwrap();
        assert_eq!(table.row(0), &[0., 0.]);
        assert_eq!(table.row(2), &[0., 0.]);
    }

    #[test]
    fn adjustment_is_added_after_averaging() {
        let aggregator = Aggregator::new(2, 2)
            .with_adjustment(|state, action| if state == 0 && action == 1 { 0.1 } else { 0. });
        let batch = Batch {
            states: &[0, 0],
            actions: &[1, 1],
            advantages: &[1., 1.],
        };
        let table = aggregator.table(&batch).unwrap();
        assert!((table.row(0)[1] - 1.1).abs() < 1e-12);
        assert_eq!(table.row(1), &[0., 0.]);
    }

    #[test]
    fn ragged_batch_is_refused() {
        let aggregator = Aggregator::new(2, 2);
        let batch = Batch {
            states: &[0, 1],
            actions: &[0],
            advantages: &[1., 1.],
        };
        assert_eq!(
            aggregator.table(&batch),
            Err(Error::Ragged {
                states: 2,
                actions: 1,
                advantages: 2,
            })
        );
    }

    #[test]
    fn out_of_range_state_is_refused() {
        let aggregator = Aggregator::new(2, 2);
        let batch = Batch {
            states: &[2],
            actions: &[0],
            advantages: &[1.],
        };
        assert_eq!(
            aggregator.table(&batch),
            Err(Error::State {
                index: 0,
                state: 2,
                states: 2,
            })
        );
    }

    #[test]
    fn out_of_range_action_is_refused() {
        let aggregator = Aggregator::new(2, 2);
        let batch = Batch {
            states: &[1],
            actions: &[5],
            advantages: &[1.],
        };
        assert_eq!(
            aggregator.table(&batch),
            Err(Error::Action {
                index: 0,
                action: 5,
                actions: 2,
            })
        );
    }

    #[test]
    fn empty_batch_yields_zero_table() {
        let aggregator = Aggregator::new(2, 2);
        let batch = Batch {
            states: &[],
            actions: &[],
            advantages: &[],
        };
        assert_eq!(aggregator.table(&batch).unwrap(), Table::zeros(2, 2));
    }
}
