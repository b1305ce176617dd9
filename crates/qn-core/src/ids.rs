//! Strongly typed, zero-cost server identifier.
//!
//! The inner integer is `pub` to allow direct indexing into the driver's
//! server list via `id.0 as usize`, but callers should prefer the
//! `.index()` helper for clarity.

use std::fmt;

/// Index of a server (station) in a queueing network.
///
/// The event log uses two named sentinels: [`ServerId::EXTERNAL`] as the
/// origin of outside arrivals and [`ServerId::EXIT`] as the destination of
/// jobs leaving the system.  Both share the `INVALID` bit pattern — an
/// event's kind disambiguates them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerId(pub u32);

impl ServerId {
    /// Sentinel meaning "no valid server" — equivalent to `u32::MAX`.
    pub const INVALID: ServerId = ServerId(u32::MAX);

    /// Event-log origin of arrivals from outside the network.
    pub const EXTERNAL: ServerId = ServerId::INVALID;

    /// Event-log destination of jobs departing the system.
    pub const EXIT: ServerId = ServerId::INVALID;

    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for ServerId {
    /// Returns the `INVALID` sentinel so uninitialized ids are visibly invalid.
    #[inline(always)]
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == ServerId::INVALID {
            write!(f, "ServerId(-)")
        } else {
            write!(f, "ServerId({})", self.0)
        }
    }
}

impl From<ServerId> for usize {
    #[inline(always)]
    fn from(id: ServerId) -> usize {
        id.0 as usize
    }
}

impl TryFrom<usize> for ServerId {
    type Error = std::num::TryFromIntError;
    fn try_from(n: usize) -> Result<ServerId, Self::Error> {
        u32::try_from(n).map(ServerId)
    }
}
