use crate::Probability;
use crate::TOLERANCE;

/// fixed-shape row-major S x A table.
///
/// holds one row per state: a PMF over actions for policies, a mean
/// advantage per action for aggregated batches. the buffer is allocated
/// once at construction and replaced wholesale on update, never resized.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    states: usize,
    actions: usize,
    cells: Vec<Probability>,
}

impl Table {
    /// the uniform policy. this is the only constructor that yields
    /// strictly positive rows, which the KL projector relies on as its
    /// base measure.
    pub fn uniform(states: usize, actions: usize) -> Self {
        assert!(actions > 0, "empty action space");
        Self {
            states,
            actions,
            cells: vec![1. / actions as Probability; states * actions],
        }
    }
    pub fn zeros(states: usize, actions: usize) -> Self {
        Self {
            states,
            actions,
            cells: vec![0.; states * actions],
        }
    }

    pub fn states(&self) -> usize {
        self.states
    }
    pub fn actions(&self) -> usize {
        self.actions
    }

    pub fn row(&self, state: usize) -> &[Probability] {
        &self.cells[state * self.actions..(state + 1) * self.actions]
    }
    pub fn row_mut(&mut self, state: usize) -> &mut [Probability] {
        &mut self.cells[state * self.actions..(state + 1) * self.actions]
    }
    pub fn rows(&self) -> impl Iterator<Item = &[Probability]> {
        self.cells.chunks_exact(self.actions)
    }

    /// every row a PMF: non-negative entries summing to unit mass
    pub fn stochastic(&self) -> bool {
        self.rows().all(|row| {
            row.iter().all(|&p| p >= 0.)
                && (row.iter().sum::<Probability>() - 1.).abs() <= TOLERANCE
        })
    }
}

impl From<(usize, usize, Vec<Vec<Probability>>)> for Table {
    fn from((states, actions, rows): (usize, usize, Vec<Vec<Probability>>)) -> Self {
        let cells = rows.into_iter().flatten().collect::<Vec<_>>();
        assert!(cells.len() == states * actions, "ragged rows");
        Self {
            states,
            actions,
            cells,
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (state, row) in self.rows().enumerate() {
            write!(f, "{:>6}", state)?;
            for p in row {
                write!(f, " {:>8.4}", p)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_stochastic() {
        assert!(Table::uniform(5, 7).stochastic());
    }

    #[test]
    fn uniform_rows_are_flat() {
        let table = Table::uniform(2, 4);
        for row in table.rows() {
            for &p in row {
                assert_eq!(p, 0.25);
            }
        }
    }

    #[test]
    fn zeros_are_not_stochastic() {
        assert!(!Table::zeros(1, 3).stochastic());
    }

    #[test]
    fn rows_are_disjoint_views() {
        let mut table = Table::zeros(2, 2);
        table.row_mut(0)[1] = 1.;
        assert_eq!(table.row(0), &[0., 1.]);
        assert_eq!(table.row(1), &[0., 0.]);
    }

    #[test]
    fn collects_from_rows() {
        let table = Table::from((2, 2, vec![vec![0.25, 0.75], vec![0.5, 0.5]]));
        assert_eq!(table.row(0), &[0.25, 0.75]);
        assert_eq!(table.row(1), &[0.5, 0.5]);
        assert!(table.stochastic());
    }
}
