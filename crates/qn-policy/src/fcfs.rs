//! First-Come-First-Served, single- and multi-channel.
//!
//! Single channel keeps only a FIFO of arrival timestamps: the head is the
//! job in service, and TTNC carries its remaining service directly.  With
//! `k > 1` channels each busy channel tracks its own remaining service and
//! the served job's arrival stamp, and departures can leave out of arrival
//! order — so response times are read from the completing channel rather
//! than from the FIFO head.

use std::collections::VecDeque;

use qn_core::{Distribution, SimRng};

use crate::server::ServerStats;

// ── Single channel ────────────────────────────────────────────────────────────

/// One arrival timestamp per in-system job, in arrival order.
#[derive(Default)]
pub(crate) struct SingleQueue {
    arrivals: VecDeque<f64>,
}

impl SingleQueue {
    pub(crate) fn clear(&mut self) {
        self.arrivals.clear();
    }
}

pub(crate) fn single_arrival(
    q: &mut SingleQueue,
    stats: &mut ServerStats,
    dist: &Distribution,
    rng: &mut SimRng,
) {
    q.arrivals.push_back(stats.clock);
    if stats.state == 0 {
        stats.ttnc = dist.sample(rng);
    }
    stats.state += 1;
}

pub(crate) fn single_update(
    q: &mut SingleQueue,
    stats: &mut ServerStats,
    dist: &Distribution,
    rng: &mut SimRng,
    dt: f64,
) -> bool {
    stats.ttnc -= dt;
    stats.clock += dt;
    if stats.ttnc <= 0.0 {
        stats.state -= 1;
        stats.ttnc = if stats.state > 0 {
            dist.sample(rng)
        } else {
            f64::INFINITY
        };
        if let Some(arrived) = q.arrivals.pop_front() {
            stats.record_completion(stats.clock - arrived);
        }
        return true;
    }
    false
}

// ── Multi-channel ─────────────────────────────────────────────────────────────

/// A busy channel: the served job's remaining service and arrival stamp.
struct Channel {
    remaining: f64,
    arrival: f64,
}

/// Busy channels (at most `num_channels`) plus a FIFO of arrival stamps for
/// jobs not yet assigned a channel.
pub(crate) struct MultiQueue {
    channels: Vec<Channel>,
    waiting: VecDeque<f64>,
    num_channels: usize,
}

impl MultiQueue {
    pub(crate) fn new(num_channels: usize) -> MultiQueue {
        MultiQueue {
            channels: Vec::with_capacity(num_channels),
            waiting: VecDeque::new(),
            num_channels,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.channels.clear();
        self.waiting.clear();
    }

    fn min_remaining(&self) -> f64 {
        self.channels
            .iter()
            .map(|ch| ch.remaining)
            .fold(f64::INFINITY, f64::min)
    }

    /// Index of the busy channel with the smallest remaining service
    /// (first found on ties).
    fn argmin_remaining(&self) -> usize {
        let mut best = 0;
        for (i, ch) in self.channels.iter().enumerate().skip(1) {
            if ch.remaining < self.channels[best].remaining {
                best = i;
            }
        }
        best
    }
}

pub(crate) fn multi_arrival(
    q: &mut MultiQueue,
    stats: &mut ServerStats,
    dist: &Distribution,
    rng: &mut SimRng,
) {
    if q.channels.len() < q.num_channels {
        q.channels.push(Channel {
            remaining: dist.sample(rng),
            arrival: stats.clock,
        });
        stats.ttnc = q.min_remaining();
    } else {
        q.waiting.push_back(stats.clock);
    }
    stats.state += 1;
}

pub(crate) fn multi_update(
    q: &mut MultiQueue,
    stats: &mut ServerStats,
    dist: &Distribution,
    rng: &mut SimRng,
    dt: f64,
) -> bool {
    stats.ttnc -= dt;
    stats.clock += dt;
    for ch in &mut q.channels {
        ch.remaining -= dt;
    }
    if stats.ttnc <= 0.0 {
        let done = q.channels.swap_remove(q.argmin_remaining());
        stats.state -= 1;
        stats.record_completion(stats.clock - done.arrival);
        if let Some(waited) = q.waiting.pop_front() {
            q.channels.push(Channel {
                remaining: dist.sample(rng),
                arrival: waited,
            });
        }
        stats.ttnc = q.min_remaining();
        return true;
    }
    false
}
