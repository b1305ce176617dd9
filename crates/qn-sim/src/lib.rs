//! `qn-sim` — event-driven network driver and replication orchestrator
//! for `rust_qn`.
//!
//! # One event-loop iteration
//!
//! ```text
//! ttnc = min over servers of TTNC        (time to next completion)
//! ttne = min(ttnc, ttna)                 (ttna: residual external arrival)
//! ① Accumulate  — area_n += state · ttne; advance the clock.
//! ② Advance     — update(ttne) on every server; collect completions
//!                 in server-index order.
//! ③ Route       — each completion draws a destination from its matrix
//!                 row (tandem rule when the matrix is empty):
//!                   exit          → count a completion, state −= 1
//!                   full server   → count a rejection and a completion
//!                   open server   → arrival() on the destination
//! ④ Admit       — if ttna ≤ ttnc the external arrival fires at server 0
//!                 (after the routings: arrivals cannot jump the queue of
//!                 jobs already done) and a fresh ttna is drawn;
//!                 otherwise ttna −= ttne.
//! ```
//!
//! Warmup runs the same loop without accumulating, then zeroes the
//! per-server arrival/rejection counters.  At the end of measurement,
//! `mean_N = area_n / clock` and `mean_T = area_n / completions`.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use qn_core::Distribution;
//! use qn_policy::Server;
//! use qn_sim::{QueueSystem, SimOptions, TransitionMatrix};
//!
//! let arrivals = Distribution::exponential(1.0)?;
//! let service = Distribution::exponential(2.0)?;
//! let mut qs = QueueSystem::new(
//!     vec![Server::fcfs(service, 1, None)?],
//!     arrivals,
//!     TransitionMatrix::empty(),
//! );
//! let (mean_n, mean_t) = qs.sim(&SimOptions { seed: 0, ..Default::default() })?;
//! ```

pub mod error;
pub mod event_log;
pub mod replicate;
pub mod routing;
pub mod system;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SimError, SimResult};
pub use event_log::{EventKind, EventLog};
pub use replicate::{ReplicateOptions, Replications};
pub use routing::TransitionMatrix;
pub use system::{QueueSystem, SimOptions};
