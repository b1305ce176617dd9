//! Columnar record of everything that happened during a measurement run.
//!
//! Five parallel arrays keep the log compact and friendly to columnar
//! post-processing (time series, per-server filters) without a row struct
//! allocation per event.  Append-only during a run; the driver clears it
//! at run start.

use std::fmt;

use qn_core::ServerId;

// ── EventKind ─────────────────────────────────────────────────────────────────

/// What happened at an event-log row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// An external job was admitted at server 0 (`from` is
    /// [`ServerId::EXTERNAL`]).
    Arrival,
    /// A job left the system (`to` is [`ServerId::EXIT`]).
    Departure,
    /// A completed job was accepted by another server.
    Route,
    /// A job was turned away by a full buffer — `from` is
    /// [`ServerId::EXTERNAL`] for rejected outside arrivals, or the
    /// originating server for rejected routings.
    Rejection,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Arrival => "arrival",
            EventKind::Departure => "departure",
            EventKind::Route => "route",
            EventKind::Rejection => "rejection",
        };
        f.write_str(name)
    }
}

// ── EventLog ──────────────────────────────────────────────────────────────────

/// Append-only columnar event log.
///
/// All five vectors always have equal length; `states` holds the total
/// network population *after* the event.
#[derive(Default)]
pub struct EventLog {
    pub times: Vec<f64>,
    pub kinds: Vec<EventKind>,
    pub from_servers: Vec<ServerId>,
    pub to_servers: Vec<ServerId>,
    pub states: Vec<i64>,
}

impl EventLog {
    pub fn new() -> EventLog {
        EventLog::default()
    }

    pub(crate) fn push(
        &mut self,
        time: f64,
        kind: EventKind,
        from: ServerId,
        to: ServerId,
        state: i64,
    ) {
        self.times.push(time);
        self.kinds.push(kind);
        self.from_servers.push(from);
        self.to_servers.push(to);
        self.states.push(state);
    }

    pub fn clear(&mut self) {
        self.times.clear();
        self.kinds.clear();
        self.from_servers.clear();
        self.to_servers.clear();
        self.states.clear();
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.times.reserve(additional);
        self.kinds.reserve(additional);
        self.from_servers.reserve(additional);
        self.to_servers.reserve(additional);
        self.states.reserve(additional);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
