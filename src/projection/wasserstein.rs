use super::Projector;
use crate::error::Error;
use crate::policy::Table;
use crate::transport::Discrete;
use crate::transport::Measure;
use crate::Entropy;
use crate::Probability;
use crate::Utility;

/// how the movement penalty β is chosen for an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Penalty {
    Fixed(Entropy),
    /// uniform draw of width `spread` centered on `center`, seeded from
    /// the episode counter so repeated projections of one episode agree
    Jittered { center: Entropy, spread: Entropy },
    /// derivative-free scan of the dual objective over `steps` evenly
    /// spaced candidates in [lo, hi]
    Searched {
        lo: Entropy,
        hi: Entropy,
        steps: usize,
    },
}

/// deterministic greedy transport map.
///
/// per state, each source action's entire mass moves to the destination
/// maximizing advantage net of β-scaled movement cost, ties broken by the
/// lowest destination index. a best-response re-partition of existing
/// mass rather than a fractional transport plan, so conservation is exact.
#[derive(Debug, Clone)]
pub struct Wasserstein<M> {
    /// budget term of the Searched dual objective; the greedy map itself
    /// does not consume it
    pub delta: Entropy,
    pub penalty: Penalty,
    pub metric: M,
}

impl Default for Wasserstein<Discrete> {
    fn default() -> Self {
        Self {
            delta: 0.01,
            penalty: Penalty::Fixed(0.8),
            metric: Discrete,
        }
    }
}

impl<M: Measure> Wasserstein<M> {
    fn validate(&self) -> Result<(), Error> {
        if !(self.delta >= 0.) {
            return Err(Error::config("delta", "non-negative", self.delta));
        }
        match self.penalty {
            Penalty::Fixed(beta) if !(beta >= 0. && beta.is_finite()) => {
                Err(Error::config("beta", "finite and non-negative", beta))
            }
            Penalty::Jittered { center, spread }
                if !(spread >= 0. && center - spread / 2. >= 0.) =>
            {
                Err(Error::config(
                    "jitter",
                    "a non-negative range",
                    center - spread / 2.,
                ))
            }
            Penalty::Searched { lo, hi, steps } if !(lo >= 0. && hi > lo && steps >= 2) => {
                Err(Error::config(
                    "search range",
                    "ascending with at least two candidates",
                    hi - lo,
                ))
            }
            _ => Ok(()),
        }
    }

    /// argmax_j advantage[j] − β·d(j, source), ascending scan, first wins
    fn best(&self, advantage: &[Utility], source: usize, beta: Entropy) -> usize {
        let mut best = 0;
        let mut value = advantage[0] - beta * self.metric.distance(0, source);
        for j in 1..advantage.len() {
            let candidate = advantage[j] - beta * self.metric.distance(j, source);
            if candidate > value {
                best = j;
                value = candidate;
            }
        }
        best
    }

    /// dual objective of the optional global search: the budget term plus
    /// visitation-weighted expected advantage net of movement cost under
    /// the greedy map at this β
    fn objective(
        &self,
        old: &Table,
        advantages: &Table,
        weights: &[Probability],
        beta: Entropy,
    ) -> Utility {
        let mut objective = beta * self.delta;
        for state in 0..old.states() {
            let advantage = advantages.row(state);
            for (source, &mass) in old.row(state).iter().enumerate() {
                let j = self.best(advantage, source, beta);
                objective += weights[state]
                    * mass
                    * (advantage[j] - beta * self.metric.distance(j, source));
            }
        }
        objective
    }

    fn resolve(
        &self,
        old: &Table,
        advantages: &Table,
        weights: &[Probability],
        episode: usize,
    ) -> Entropy {
        match self.penalty {
            Penalty::Fixed(beta) => beta,
            Penalty::Jittered { center, spread } => {
                use rand::Rng;
                use rand::SeedableRng;
                use std::hash::DefaultHasher;
                use std::hash::Hash;
                use std::hash::Hasher;
                let ref mut hasher = DefaultHasher::new();
                episode.hash(hasher);
                let ref mut rng = rand::rngs::SmallRng::seed_from_u64(hasher.finish());
                center + spread * (rng.random::<Entropy>() - 0.5)
            }
            Penalty::Searched { lo, hi, steps } => (0..steps)
                .map(|k| lo + (hi - lo) * k as Entropy / (steps - 1) as Entropy)
                .map(|beta| (beta, self.objective(old, advantages, weights, beta)))
                .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
                .map(|(beta, _)| beta)
                .expect("at least two candidates"),
        }
    }
}

impl<M: Measure> Projector for Wasserstein<M> {
    fn project(
        &self,
        old: &Table,
        advantages: &Table,
        weights: &[Probability],
        episode: usize,
    ) -> Result<Table, Error> {
        use rayon::prelude::*;
        self.validate()?;
        let beta = self.resolve(old, advantages, weights, episode);
        log::debug!("{:<32}{:<32}", "transporting under penalty", beta);
        let actions = old.actions();
        let rows = (0..old.states())
            .into_par_iter()
            .map(|state| {
                let advantage = advantages.row(state);
                let mut row = vec![0.; actions];
                for (source, &mass) in old.row(state).iter().enumerate() {
                    row[self.best(advantage, source, beta)] += mass;
                }
                row
            })
            .collect::<Vec<_>>();
        Ok(Table::from((old.states(), actions, rows)))
    }
}
