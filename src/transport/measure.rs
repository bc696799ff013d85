use crate::Energy;

/// ground cost between two actions of the same finite action space.
///
/// implementations must be symmetric, non-negative, and zero on the
/// diagonal. the transport projectors integrate against this measure when
/// deciding how far probability mass may move; nothing here assumes any
/// structure beyond the contract, so callers are free to encode e.g.
/// spatial adjacency between movement actions.
pub trait Measure: Sync {
    fn distance(&self, i: usize, j: usize) -> Energy;
}

/// the discrete metric. every action is equally far from every other,
/// which makes transport cost a pure don't-move incentive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discrete;

impl Measure for Discrete {
    fn distance(&self, i: usize, j: usize) -> Energy {
        if i == j { 0. } else { 1. }
    }
}

/// dense materialization of any Measure over a fixed action count.
///
/// the projectors call distance() A times per output cell, so an expensive
/// user-supplied measure is worth caching once per construction.
#[derive(Debug, Clone)]
pub struct Cached {
    actions: usize,
    energies: Vec<Energy>,
}

impl Cached {
    pub fn actions(&self) -> usize {
        self.actions
    }
}

impl Measure for Cached {
    fn distance(&self, i: usize, j: usize) -> Energy {
        self.energies[i * self.actions + j]
    }
}

impl<M: Measure> From<(&M, usize)> for Cached {
    fn from((measure, actions): (&M, usize)) -> Self {
        let energies = (0..actions)
            .flat_map(|i| (0..actions).map(move |j| (i, j)))
            .map(|(i, j)| measure.distance(i, j))
            .inspect(|d| debug_assert!(d.is_finite() && *d >= 0., "negative measure"))
            .collect::<Vec<_>>();
        for i in 0..actions {
            debug_assert!(energies[i * actions + i] == 0., "measure on diagonal");
            for j in 0..actions {
                debug_assert!(
                    energies[i * actions + j] == energies[j * actions + i],
                    "asymmetric measure"
                );
            }
        }
        Self { actions, energies }
    }
}
