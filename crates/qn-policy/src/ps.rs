//! Processor-Sharing: every present job is served at rate `1/n`.
//!
//! With `n` jobs sharing the processor, the next completion is the job
//! with minimum remaining service, `min_remaining · n` seconds away.

use qn_core::{Distribution, SimRng};

use crate::server::ServerStats;

/// Parallel vectors of remaining service and arrival stamp, one entry per
/// in-system job.  Order is insignificant; ties complete first-found.
#[derive(Default)]
pub(crate) struct PsQueue {
    remaining: Vec<f64>,
    arrivals: Vec<f64>,
}

impl PsQueue {
    pub(crate) fn clear(&mut self) {
        self.remaining.clear();
        self.arrivals.clear();
    }

    fn recalc_ttnc(&self, state: usize) -> f64 {
        let min = self.remaining.iter().copied().fold(f64::INFINITY, f64::min);
        if min.is_finite() {
            min * state as f64
        } else {
            f64::INFINITY
        }
    }

    fn argmin_remaining(&self) -> usize {
        let mut best = 0;
        for (i, &r) in self.remaining.iter().enumerate().skip(1) {
            if r < self.remaining[best] {
                best = i;
            }
        }
        best
    }
}

pub(crate) fn arrival(
    q: &mut PsQueue,
    stats: &mut ServerStats,
    dist: &Distribution,
    rng: &mut SimRng,
) {
    q.remaining.push(dist.sample(rng));
    q.arrivals.push(stats.clock);
    stats.state += 1;
    stats.ttnc = q.recalc_ttnc(stats.state);
}

pub(crate) fn update(q: &mut PsQueue, stats: &mut ServerStats, dt: f64) -> bool {
    stats.ttnc -= dt;
    stats.clock += dt;
    if stats.state == 0 {
        return false;
    }

    let share = dt / stats.state as f64;
    for r in &mut q.remaining {
        *r -= share;
    }

    if stats.ttnc <= 0.0 {
        let idx = q.argmin_remaining();
        let arrived = q.arrivals[idx];
        q.remaining.remove(idx);
        q.arrivals.remove(idx);
        stats.state -= 1;
        stats.record_completion(stats.clock - arrived);
        stats.ttnc = q.recalc_ttnc(stats.state);
        return true;
    }
    false
}
