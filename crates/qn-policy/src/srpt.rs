//! Shortest-Remaining-Processing-Time, preemptive-resume, single channel.
//!
//! The running job's (remaining, arrival) pair lives outside the heap —
//! its remaining *is* the server's TTNC.  Preempted jobs wait in a min-heap
//! keyed on remaining service.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use qn_core::{Distribution, SimRng};

use crate::server::ServerStats;

/// A preempted job: remaining service and arrival stamp.
///
/// `f64` has no total order, so `Ord` goes through `total_cmp` — remaining
/// first, arrival as tie-break — which lets the pair live in a
/// `BinaryHeap`.
#[derive(Copy, Clone, Debug, PartialEq)]
struct QueuedJob {
    remaining: f64,
    arrival: f64,
}

impl Eq for QueuedJob {}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.remaining
            .total_cmp(&other.remaining)
            .then(self.arrival.total_cmp(&other.arrival))
    }
}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Preempted jobs plus the running job's arrival stamp.
#[derive(Default)]
pub(crate) struct SrptQueue {
    heap: BinaryHeap<Reverse<QueuedJob>>,
    running_arrival: f64,
}

impl SrptQueue {
    pub(crate) fn clear(&mut self) {
        self.heap.clear();
        self.running_arrival = 0.0;
    }
}

pub(crate) fn arrival(
    q: &mut SrptQueue,
    stats: &mut ServerStats,
    dist: &Distribution,
    rng: &mut SimRng,
) {
    // Park the running job (its remaining is the current TTNC), offer the
    // newcomer, and run whichever now has the least remaining.
    if stats.state > 0 {
        q.heap.push(Reverse(QueuedJob {
            remaining: stats.ttnc,
            arrival: q.running_arrival,
        }));
    }
    q.heap.push(Reverse(QueuedJob {
        remaining: dist.sample(rng),
        arrival: stats.clock,
    }));
    if let Some(Reverse(job)) = q.heap.pop() {
        stats.ttnc = job.remaining;
        q.running_arrival = job.arrival;
    }
    stats.state += 1;
}

pub(crate) fn update(q: &mut SrptQueue, stats: &mut ServerStats, dt: f64) -> bool {
    stats.ttnc -= dt;
    stats.clock += dt;
    if stats.ttnc <= 0.0 {
        stats.state -= 1;
        // Record the response before popping the next job: the departing
        // job's arrival is the currently tracked one.
        stats.record_completion(stats.clock - q.running_arrival);
        if stats.state > 0 {
            if let Some(Reverse(job)) = q.heap.pop() {
                stats.ttnc = job.remaining;
                q.running_arrival = job.arrival;
            }
        } else {
            stats.ttnc = f64::INFINITY;
        }
        return true;
    }
    false
}
