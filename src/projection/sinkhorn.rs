use super::Projector;
use super::Schedule;
use crate::error::Error;
use crate::policy::Table;
use crate::transport::Discrete;
use crate::transport::Measure;
use crate::Entropy;
use crate::Probability;

/// one sweep of an entropic-regularized transport plan between the old
/// and new per-state distributions.
///
/// mass at source action j is redistributed across destinations i in
/// proportion to exp((lambda/beta)·advantage[i] − lambda·distance(i, j)),
/// normalized over i. each output row is a convex combination of softmax
/// rows, so it is a PMF by construction. lambda trades off peaked,
/// transport-like moves against diffuse ones; beta scales how loudly the
/// advantage term speaks and is environment-dependent, so both are
/// schedules chosen by configuration.
#[derive(Debug, Clone)]
pub struct Sinkhorn<M> {
    /// regularization target retained as a tunable alongside lambda and
    /// beta; the single-sweep formula does not consume it
    pub delta: Entropy,
    pub lambda: Schedule,
    pub beta: Schedule,
    pub metric: M,
}

impl Default for Sinkhorn<Discrete> {
    fn default() -> Self {
        Self {
            delta: 0.1,
            lambda: Schedule::Constant(3.),
            beta: Schedule::Constant(1.),
            metric: Discrete,
        }
    }
}

impl<M: Measure> Projector for Sinkhorn<M> {
    fn project(
        &self,
        old: &Table,
        advantages: &Table,
        _: &[Probability],
        episode: usize,
    ) -> Result<Table, Error> {
        use rayon::prelude::*;
        let lambda = self.lambda.at(episode);
        let beta = self.beta.at(episode);
        if !(lambda > 0.) {
            return Err(Error::config("lambda", "positive", lambda));
        }
        if !(beta > 0.) {
            return Err(Error::config("beta", "positive", beta));
        }
        let actions = old.actions();
        let rows = (0..old.states())
            .into_par_iter()
            .map(|state| {
                let source = old.row(state);
                let advantage = advantages.row(state);
                let mut row = vec![0.; actions];
                for j in 0..actions {
                    let scores = (0..actions)
                        .map(|i| {
                            (lambda / beta) * advantage[i] - lambda * self.metric.distance(i, j)
                        })
                        .collect::<Vec<_>>();
                    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    let kernel = scores.iter().map(|s| (s - max).exp()).collect::<Vec<_>>();
                    let normalizer = kernel.iter().sum::<Probability>();
                    if !(normalizer.is_finite() && normalizer > 0.) {
                        log::warn!("{:<32}{:<32}", "transport kernel underflow", state);
                        return source.to_vec();
                    }
                    for i in 0..actions {
                        row[i] += source[j] * kernel[i] / normalizer;
                    }
                }
                row
            })
            .collect::<Vec<_>>();
        Ok(Table::from((old.states(), old.actions(), rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rows_remain_stochastic() {
        let old = Table::from((2, 3, vec![vec![0.7, 0.2, 0.1], vec![0.1, 0.1, 0.8]]));
        let advantages = Table::from((2, 3, vec![vec![0.3, -0.4, 1.], vec![0., 2., -2.]]));
        let new = Sinkhorn::default()
            .project(&old, &advantages, &[0.5, 0.5], 1)
            .unwrap();
        assert!(new.stochastic());
    }

    #[test]
    fn vanishing_lambda_collapses_to_uniform() {
        let ref projector = Sinkhorn {
            lambda: Schedule::Constant(1e-6),
            ..Sinkhorn::default()
        };
        let old = Table::from((1, 3, vec![vec![0.9, 0.05, 0.05]]));
        let advantages = Table::from((1, 3, vec![vec![0.1, 0.9, 0.2]]));
        let new = projector.project(&old, &advantages, &[1.], 1).unwrap();
        for &p in new.row(0) {
            assert!((p - 1. / 3.).abs() < 1e-4, "not near uniform: {p}");
        }
    }

    #[test]
    fn transport_dominant_lambda_recovers_identity() {
        let ref projector = Sinkhorn {
            lambda: Schedule::Constant(50.),
            ..Sinkhorn::default()
        };
        let old = Table::from((1, 3, vec![vec![0.2, 0.3, 0.5]]));
        let advantages = Table::from((1, 3, vec![vec![4., 4., 4.]]));
        let new = projector.project(&old, &advantages, &[1.], 1).unwrap();
        for (n, o) in new.row(0).iter().zip(old.row(0).iter()) {
            assert!(close(*n, *o));
        }
    }

    #[test]
    fn mass_moves_toward_advantage() {
        let old = Table::uniform(1, 3);
        let advantages = Table::from((1, 3, vec![vec![0., 1., 0.]]));
        let new = Sinkhorn::default()
            .project(&old, &advantages, &[1.], 1)
            .unwrap();
        assert!(new.row(0)[1] > 1. / 3.);
        assert!(new.row(0)[0] < 1. / 3.);
    }

    #[test]
    fn nonpositive_lambda_is_refused() {
        let ref projector = Sinkhorn {
            lambda: Schedule::Constant(0.),
            ..Sinkhorn::default()
        };
        let old = Table::uniform(1, 2);
        let advantages = Table::zeros(1, 2);
        assert!(projector.project(&old, &advantages, &[1.], 1).is_err());
    }

    #[test]
    fn nonpositive_beta_is_refused() {
        let ref projector = Sinkhorn {
            beta: Schedule::Constant(-1.),
            ..Sinkhorn::default()
        };
        let old = Table::uniform(1, 2);
        let advantages = Table::zeros(1, 2);
        assert!(projector.project(&old, &advantages, &[1.], 1).is_err());
    }

    #[test]
    fn scheduled_lambda_must_stay_positive() {
        let ref projector = Sinkhorn {
            lambda: Schedule::Power {
                scale: 1.,
                exponent: 2.,
                cap: 5.5,
            },
            ..Sinkhorn::default()
        };
        let old = Table::uniform(1, 2);
        let advantages = Table::zeros(1, 2);
        assert!(projector.project(&old, &advantages, &[1.], 0).is_err());
        assert!(projector.project(&old, &advantages, &[1.], 1).is_ok());
    }
}
