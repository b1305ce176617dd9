//! Foreground-Background, also known as least-attained-service-first.
//!
//! Service is split equally across the *active set*: the jobs whose
//! attained service is within [`LEVEL_EPS`] of the minimum.  The next
//! event is either a completion inside the active set or a *level
//! crossing* — the moment the active set's attained service catches up
//! with the next-least-attained job and the set expands.  A crossing
//! changes no population count; it only forces a TTNC recomputation.

use qn_core::{Distribution, SimRng};

use crate::server::ServerStats;

/// Tolerance for "same attained service" and for "remaining hit zero".
const LEVEL_EPS: f64 = 1e-12;

struct FbJob {
    remaining: f64,
    attained: f64,
    arrival: f64,
}

/// All in-system jobs with their attained-service levels.
#[derive(Default)]
pub(crate) struct FbQueue {
    jobs: Vec<FbJob>,
}

impl FbQueue {
    pub(crate) fn clear(&mut self) {
        self.jobs.clear();
    }

    fn min_attained(&self) -> f64 {
        self.jobs
            .iter()
            .map(|j| j.attained)
            .fold(f64::INFINITY, f64::min)
    }

    /// TTNC is the lesser of the active set's first completion and the
    /// next level crossing, both scaled by the active-set size (each
    /// active job progresses at rate `1/|A|`).
    fn recalc_ttnc(&self) -> f64 {
        if self.jobs.is_empty() {
            return f64::INFINITY;
        }
        let min_att = self.min_attained();
        let mut num_active = 0usize;
        let mut min_rem_active = f64::INFINITY;
        let mut next_level = f64::INFINITY;
        for j in &self.jobs {
            if j.attained <= min_att + LEVEL_EPS {
                num_active += 1;
                min_rem_active = min_rem_active.min(j.remaining);
            } else {
                next_level = next_level.min(j.attained);
            }
        }
        let to_completion = min_rem_active * num_active as f64;
        let to_crossing = (next_level - min_att) * num_active as f64;
        to_completion.min(to_crossing)
    }
}

pub(crate) fn arrival(
    q: &mut FbQueue,
    stats: &mut ServerStats,
    dist: &Distribution,
    rng: &mut SimRng,
) {
    q.jobs.push(FbJob {
        remaining: dist.sample(rng),
        attained: 0.0,
        arrival: stats.clock,
    });
    stats.state += 1;
    stats.ttnc = q.recalc_ttnc();
}

pub(crate) fn update(q: &mut FbQueue, stats: &mut ServerStats, dt: f64) -> bool {
    stats.ttnc -= dt;
    stats.clock += dt;
    if q.jobs.is_empty() {
        return false;
    }

    // Split the elapsed slice across the active set.
    let min_att = q.jobs.iter().map(|j| j.attained).fold(f64::INFINITY, f64::min);
    let num_active = q
        .jobs
        .iter()
        .filter(|j| j.attained <= min_att + LEVEL_EPS)
        .count();
    let share = dt / num_active as f64;
    for j in &mut q.jobs {
        if j.attained <= min_att + LEVEL_EPS {
            j.remaining -= share;
            j.attained += share;
        }
    }

    if stats.ttnc <= 0.0 {
        if let Some(idx) = q.jobs.iter().position(|j| j.remaining <= LEVEL_EPS) {
            let done = q.jobs.remove(idx);
            stats.state -= 1;
            stats.record_completion(stats.clock - done.arrival);
            stats.ttnc = q.recalc_ttnc();
            return true;
        }
        // Level crossing: the active set expanded, nobody departed.
        stats.ttnc = q.recalc_ttnc();
    }
    false
}
