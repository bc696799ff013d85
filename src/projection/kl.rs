use super::Projector;
use crate::error::Error;
use crate::policy::Table;
use crate::Entropy;
use crate::Probability;
use crate::Utility;

/// how the tilting temperature β is chosen for an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temperature {
    /// pin β to a constant. the default pins β = 1, a deliberate shortcut
    /// that skips solving the dual for the budget-exact temperature.
    Fixed(Entropy),
    /// bisect the dual gradient for the β whose visitation-weighted KL
    /// divergence spends exactly the delta budget.
    Solved,
}

/// exponential tilt of each state's PMF, bounded by a KL budget.
///
/// new[a] ∝ old[a] · exp(advantage[a] / β), the closed-form maximizer of
/// expected advantage subject to KL(new ‖ old) ≤ delta, with β the
/// Lagrange multiplier of the budget. requires a strictly positive base
/// row; the uniform initial policy guarantees one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kl {
    pub delta: Entropy,
    pub temperature: Temperature,
}

impl Default for Kl {
    fn default() -> Self {
        Self {
            delta: 0.01,
            temperature: Temperature::Fixed(1.),
        }
    }
}

impl Kl {
    /// bracket and precision of the Solved bisection
    const LO: Entropy = 1e-3;
    const HI: Entropy = 1e9;
    const BISECTIONS: usize = 64;

    fn validate(&self) -> Result<(), Error> {
        if !(self.delta >= 0.) {
            return Err(Error::config("delta", "non-negative", self.delta));
        }
        match self.temperature {
            Temperature::Fixed(beta) if !(beta > 0.) => {
                Err(Error::config("beta", "positive", beta))
            }
            _ => Ok(()),
        }
    }

    /// stabilized tilt of one state's PMF. the per-row max advantage is
    /// subtracted before exponentiating, so every factor lies in (0, 1]
    /// and a zero base entry can never meet an overflowed exponential.
    /// None when the normalizer degenerates, so the caller can fail closed.
    fn row(old: &[Probability], advantages: &[Utility], beta: Entropy) -> Option<Vec<Probability>> {
        let max = advantages
            .iter()
            .copied()
            .fold(Utility::NEG_INFINITY, Utility::max);
        let tilt = old
            .iter()
            .zip(advantages.iter())
            .map(|(&p, &a)| p * ((a - max) / beta).exp())
            .collect::<Vec<_>>();
        let normalizer = tilt.iter().sum::<Probability>();
        match normalizer.is_finite() && normalizer > 0. {
            true => Some(tilt.into_iter().map(|t| t / normalizer).collect()),
            false => None,
        }
    }

    /// gradient of the dual objective in β: delta − Σ_s w_s · KL_s(β).
    /// nondecreasing in β, since raising the temperature relaxes the tilt.
    fn gradient(
        &self,
        old: &Table,
        advantages: &Table,
        weights: &[Probability],
        beta: Entropy,
    ) -> Entropy {
        let mut gradient = self.delta;
        for state in 0..old.states() {
            let advantage = advantages.row(state);
            let max = advantage
                .iter()
                .copied()
                .fold(Utility::NEG_INFINITY, Utility::max);
            let tilt = old
                .row(state)
                .iter()
                .zip(advantage.iter())
                .map(|(&p, &a)| p * ((a - max) / beta).exp())
                .collect::<Vec<_>>();
            let normalizer = tilt.iter().sum::<Probability>();
            let mean = tilt
                .iter()
                .zip(advantage.iter())
                .map(|(&t, &a)| t * a)
                .sum::<Utility>()
                / normalizer;
            gradient += weights[state] * (max / beta + normalizer.ln() - mean / beta);
        }
        gradient
    }

    /// root of the dual gradient by bracket expansion and bisection.
    /// when the budget never binds the bracket collapses to the most
    /// aggressive temperature considered.
    fn solve(&self, old: &Table, advantages: &Table, weights: &[Probability]) -> Entropy {
        let mut lo = Self::LO;
        let mut hi = Self::LO;
        if self.gradient(old, advantages, weights, lo) >= 0. {
            return lo;
        }
        while self.gradient(old, advantages, weights, hi) < 0. {
            lo = hi;
            hi *= 2.;
            if hi > Self::HI {
                return Self::HI;
            }
        }
        for _ in 0..Self::BISECTIONS {
            let mid = 0.5 * (lo + hi);
            match self.gradient(old, advantages, weights, mid) < 0. {
                true => lo = mid,
                false => hi = mid,
            }
        }
        0.5 * (lo + hi)
    }
}

impl Projector for Kl {
    fn project(
        &self,
        old: &Table,
        advantages: &Table,
        weights: &[Probability],
        _: usize,
    ) -> Result<Table, Error> {
        use rayon::prelude::*;
        self.validate()?;
        let beta = match self.temperature {
            Temperature::Fixed(beta) => beta,
            Temperature::Solved => self.solve(old, advantages, weights),
        };
        log::debug!("{:<32}{:<32}", "tilting under KL budget", beta);
        let rows = (0..old.states())
            .into_par_iter()
            .map(|state| match Self::row(old.row(state), advantages.row(state), beta) {
                Some(row) => row,
                None => {
                    log::warn!("{:<32}{:<32}", "tilt normalizer underflow", state);
                    old.row(state).to_vec()
                }
            })
            .collect::<Vec<_>>();
        Ok(Table::from((old.states(), old.actions(), rows)))
    }
}
