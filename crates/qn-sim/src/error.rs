use qn_core::QnError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("transition matrix must have {expected} rows (one per server), got {got}")]
    MatrixRowCount { expected: usize, got: usize },

    #[error("transition matrix row {row} must have {expected} columns (servers + exit), got {got}")]
    MatrixRowLength {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("transition matrix row {row} sums to {sum}, expected 1.0")]
    MatrixRowSum { row: usize, sum: f64 },

    #[error("worker pool error: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Core(#[from] QnError),
}

pub type SimResult<T> = Result<T, SimError>;
