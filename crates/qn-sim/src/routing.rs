//! Probabilistic routing of completed jobs.

use qn_core::SimRng;

use crate::error::{SimError, SimResult};

/// How far a row sum may drift from 1.0 before validation fails.
const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Routing probabilities for completed jobs.
///
/// Row `i` has `servers + 1` entries: the probability of forwarding a
/// completion at server `i` to each server, with the final column meaning
/// "leave the system".  An empty matrix selects the default tandem rule:
/// server `i` feeds server `i + 1`, and the last server feeds the exit.
///
/// Construction does not validate — the driver validates against the
/// actual server count at every run entry, so a matrix installed before
/// its servers is fine.
#[derive(Clone, Debug, Default)]
pub struct TransitionMatrix {
    rows: Vec<Vec<f64>>,
}

impl TransitionMatrix {
    /// The empty matrix: default tandem routing.
    pub fn empty() -> TransitionMatrix {
        TransitionMatrix::default()
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> TransitionMatrix {
        TransitionMatrix { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Check shape and row sums against the network's server count.
    pub(crate) fn validate(&self, num_servers: usize) -> SimResult<()> {
        if self.rows.is_empty() {
            return Ok(());
        }
        if self.rows.len() != num_servers {
            return Err(SimError::MatrixRowCount {
                expected: num_servers,
                got: self.rows.len(),
            });
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != num_servers + 1 {
                return Err(SimError::MatrixRowLength {
                    row: i,
                    expected: num_servers + 1,
                    got: row.len(),
                });
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(SimError::MatrixRowSum { row: i, sum });
            }
        }
        Ok(())
    }

    /// Destination for a completion at `from`: a server index, or
    /// `num_servers` for the system exit.
    ///
    /// A row carrying an exact 1.0 routes without consuming randomness, so
    /// a deterministic matrix replays the same RNG stream as the tandem
    /// default.  Probabilistic rows consume exactly one uniform draw; if
    /// rounding lets the cumulative walk fall through, the job exits.
    pub(crate) fn route(&self, from: usize, num_servers: usize, rng: &mut SimRng) -> usize {
        if self.rows.is_empty() {
            return from + 1;
        }
        let row = &self.rows[from];
        if let Some(dest) = row.iter().position(|&p| p == 1.0) {
            return dest;
        }
        let u = rng.uniform();
        let mut acc = 0.0;
        for (dest, &p) in row.iter().enumerate() {
            acc += p;
            if u < acc {
                return dest;
            }
        }
        num_servers
    }
}
