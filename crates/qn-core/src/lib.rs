//! `qn-core` — foundational types for the `rust_qn` queueing-network
//! simulator.
//!
//! This crate is a dependency of every other `qn-*` crate.  It has no
//! `qn-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                |
//! |-----------|---------------------------------------------------------|
//! | [`ids`]   | `ServerId` and its event-log sentinels                  |
//! | [`rng`]   | `SimRng`, `splitmix64`, `derive_seed`, `resolve_seed`   |
//! | [`dist`]  | `Distribution` (Exponential, Uniform, Bounded Pareto)   |
//! | [`error`] | `QnError`, `QnResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.  |

pub mod dist;
pub mod error;
pub mod ids;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use dist::Distribution;
pub use error::{QnError, QnResult};
pub use ids::ServerId;
pub use rng::{derive_seed, resolve_seed, splitmix64, SimRng};
