//! Continuous distributions for inter-arrival and service times.
//!
//! All three variants sample by inverse-CDF on one uniform draw, so every
//! sample consumes exactly one value from the [`SimRng`] stream — a
//! property the driver's determinism tests rely on.

use crate::error::{QnError, QnResult};
use crate::rng::SimRng;

/// A service- or inter-arrival-time distribution.
///
/// Construct through the validating constructors; the variant fields are
/// public for inspection but the Bounded Pareto's normalizing constant is
/// only correct when built via [`Distribution::bounded_pareto`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Distribution {
    /// `Exponential(mu)` with rate `mu`; `E[X] = 1/mu`.
    Exponential { mu: f64 },

    /// Uniform on the interval `[a, b)`.
    Uniform { a: f64, b: f64 },

    /// Bounded Pareto on `[k, p]` with shape `alpha`.
    ///
    /// `c` is the normalizing constant `k^alpha / (1 - (k/p)^alpha)`,
    /// precomputed at construction.
    BoundedPareto { k: f64, p: f64, alpha: f64, c: f64 },
}

impl Distribution {
    /// `Exponential(mu)`.  Requires `mu > 0`.
    pub fn exponential(mu: f64) -> QnResult<Distribution> {
        if mu <= 0.0 {
            return Err(QnError::Config(format!(
                "exponential rate must be positive, got {mu}"
            )));
        }
        Ok(Distribution::Exponential { mu })
    }

    /// `Uniform(a, b)`.  Requires `a < b`.
    pub fn uniform(a: f64, b: f64) -> QnResult<Distribution> {
        if a >= b {
            return Err(QnError::Config(format!(
                "uniform interval must satisfy a < b, got [{a}, {b})"
            )));
        }
        Ok(Distribution::Uniform { a, b })
    }

    /// `BoundedPareto(k, p, alpha)`.  Requires `0 < k < p` and `alpha > 0`.
    pub fn bounded_pareto(k: f64, p: f64, alpha: f64) -> QnResult<Distribution> {
        if k <= 0.0 || k >= p {
            return Err(QnError::Config(format!(
                "bounded Pareto support must satisfy 0 < k < p, got k={k}, p={p}"
            )));
        }
        if alpha <= 0.0 {
            return Err(QnError::Config(format!(
                "bounded Pareto shape must be positive, got {alpha}"
            )));
        }
        let c = k.powf(alpha) / (1.0 - (k / p).powf(alpha));
        Ok(Distribution::BoundedPareto { k, p, alpha, c })
    }

    /// Draw one sample.
    #[inline]
    pub fn sample(&self, rng: &mut SimRng) -> f64 {
        match *self {
            Distribution::Exponential { mu } => -(1.0 - rng.uniform()).ln() / mu,
            Distribution::Uniform { a, b } => (b - a) * rng.uniform() + a,
            Distribution::BoundedPareto { k, alpha, c, .. } => {
                (-rng.uniform() / c + k.powf(-alpha)).powf(-1.0 / alpha)
            }
        }
    }
}
