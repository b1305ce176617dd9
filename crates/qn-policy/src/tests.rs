//! Unit tests for the scheduling policies.
//!
//! Deterministic assertions use a *twin* RNG: the test seeds a second
//! `SimRng` with the same seed as the one fed to the server and draws the
//! service times the server is about to draw, so expectations track the
//! sampled values instead of hard-coding them.  `Uniform(10, 11)` keeps
//! every sample in a narrow known band, which pins down orderings (e.g. a
//! half-served job always has less remaining than a fresh one) without
//! fixing exact values.

use qn_core::{Distribution, SimRng};

use crate::Server;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Service times in (10, 11): tight enough to make orderings deterministic.
fn narrow_dist() -> Distribution {
    Distribution::uniform(10.0, 11.0).unwrap()
}

/// Draw the first `n` samples the server will see for `seed`.
fn probe_samples(dist: &Distribution, seed: u64, n: usize) -> Vec<f64> {
    let mut rng = SimRng::new(seed);
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

fn close(got: f64, want: f64) {
    assert!(
        (got - want).abs() < 1e-9,
        "got {got}, want {want} (diff {})",
        (got - want).abs()
    );
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;

    #[test]
    fn zero_buffer_capacity_rejected() {
        let d = narrow_dist();
        assert!(Server::fcfs(d, 1, Some(0)).is_err());
        assert!(Server::srpt(d, Some(0)).is_err());
        assert!(Server::ps(d, Some(0)).is_err());
        assert!(Server::fb(d, Some(0)).is_err());
    }

    #[test]
    fn zero_channels_rejected() {
        assert!(Server::fcfs(narrow_dist(), 0, None).is_err());
    }

    #[test]
    fn unlimited_and_finite_buffers_accepted() {
        assert!(Server::fcfs(narrow_dist(), 1, None).is_ok());
        assert!(Server::fcfs(narrow_dist(), 4, Some(1)).is_ok());
    }

    #[test]
    fn is_full_tracks_state_against_capacity() {
        let mut rng = SimRng::new(0);
        let mut srv = Server::fcfs(narrow_dist(), 1, Some(2)).unwrap();
        assert!(!srv.is_full());
        srv.arrival(&mut rng);
        assert!(!srv.is_full());
        srv.arrival(&mut rng);
        assert!(srv.is_full());
    }

    #[test]
    fn unlimited_buffer_never_full() {
        let mut rng = SimRng::new(0);
        let mut srv = Server::srpt(narrow_dist(), None).unwrap();
        for _ in 0..100 {
            assert!(!srv.is_full());
            srv.arrival(&mut rng);
        }
    }

    #[test]
    fn kind_names() {
        let d = narrow_dist();
        assert_eq!(Server::fcfs(d, 1, None).unwrap().kind(), "FCFS");
        assert_eq!(Server::fcfs(d, 3, None).unwrap().kind(), "FCFS");
        assert_eq!(Server::srpt(d, None).unwrap().kind(), "SRPT");
        assert_eq!(Server::ps(d, None).unwrap().kind(), "PS");
        assert_eq!(Server::fb(d, None).unwrap().kind(), "FB");
    }
}

// ── Reset and cloning ─────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn reset_restores_idle_state() {
        let mut rng = SimRng::new(3);
        let mut srv = Server::fcfs(narrow_dist(), 1, None).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);
        let t = srv.ttnc();
        srv.update(t, &mut rng);
        srv.num_arrivals = 2;

        srv.reset();
        assert_eq!(srv.state(), 0);
        assert!(srv.ttnc().is_infinite());
        assert_eq!(srv.num_completions(), 0);
        assert_eq!(srv.mean_response(), 0.0);
        assert_eq!(srv.clock(), 0.0);
        assert_eq!(srv.num_arrivals, 0);
        assert_eq!(srv.num_rejected, 0);
    }

    #[test]
    fn reset_clears_queued_jobs() {
        // After a reset the first arrival must behave like the first ever:
        // it samples immediately and TTNC matches a fresh twin draw.
        let dist = narrow_dist();
        let mut rng = SimRng::new(9);
        let mut srv = Server::fcfs(dist, 1, None).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);
        srv.reset();

        // The twin continues the same stream: one sample was consumed.
        let probe = probe_samples(&dist, 9, 2);
        srv.arrival(&mut rng);
        close(srv.ttnc(), probe[1]);
        assert_eq!(srv.state(), 1);
    }

    #[test]
    fn clone_fresh_copies_config_not_state() {
        let mut rng = SimRng::new(4);
        let mut srv = Server::fcfs(narrow_dist(), 2, Some(5)).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);

        let fresh = srv.clone_fresh();
        assert_eq!(fresh.num_channels(), 2);
        assert_eq!(fresh.buffer_capacity(), Some(5));
        assert_eq!(fresh.kind(), "FCFS");
        assert_eq!(fresh.state(), 0);
        assert!(fresh.ttnc().is_infinite());
        assert_eq!(fresh.num_completions(), 0);
        // The original is untouched.
        assert_eq!(srv.state(), 2);
    }
}

// ── Cross-policy invariants ───────────────────────────────────────────────────

#[cfg(test)]
mod invariants {
    use super::*;

    /// Drive a server the way the network driver would — arrivals
    /// interleaved with slices never exceeding TTNC — and check the state
    /// invariants after every step.
    fn stress(mut srv: Server) {
        let mut rng = SimRng::new(17);
        let mut drive = SimRng::new(99);
        for step in 0..2_000 {
            if !srv.is_full() && drive.uniform() < 0.6 {
                srv.arrival(&mut rng);
            }

            let ttnc = srv.ttnc();
            assert_eq!(
                ttnc.is_infinite(),
                srv.state() == 0,
                "step {step}: TTNC must be infinite exactly when idle"
            );
            if let Some(cap) = srv.buffer_capacity() {
                assert!(srv.state() <= cap, "step {step}: buffer overrun");
            }

            if ttnc.is_finite() {
                if drive.uniform() < 0.5 {
                    // Full slice: at most one completion fires.
                    srv.update(ttnc, &mut rng);
                } else {
                    let dt = ttnc * 0.5;
                    let fired = srv.update(dt, &mut rng);
                    if dt < ttnc {
                        assert!(!fired, "step {step}: completed before its TTNC");
                    }
                }
            } else {
                srv.update(drive.uniform(), &mut rng);
            }

            assert!(srv.mean_response() >= 0.0);
            assert!(srv.last_response() >= 0.0);
        }
        assert!(srv.num_completions() > 0, "stress drive never completed a job");
    }

    #[test]
    fn fcfs_single_channel() {
        stress(Server::fcfs(narrow_dist(), 1, None).unwrap());
    }

    #[test]
    fn fcfs_three_channels() {
        stress(Server::fcfs(narrow_dist(), 3, None).unwrap());
    }

    #[test]
    fn fcfs_finite_buffer() {
        stress(Server::fcfs(narrow_dist(), 2, Some(3)).unwrap());
    }

    #[test]
    fn srpt() {
        stress(Server::srpt(narrow_dist(), None).unwrap());
    }

    #[test]
    fn srpt_finite_buffer() {
        stress(Server::srpt(narrow_dist(), Some(2)).unwrap());
    }

    #[test]
    fn ps() {
        stress(Server::ps(narrow_dist(), None).unwrap());
    }

    #[test]
    fn fb() {
        stress(Server::fb(narrow_dist(), None).unwrap());
    }
}

// ── FCFS, single channel ──────────────────────────────────────────────────────

#[cfg(test)]
mod fcfs_single {
    use super::*;

    #[test]
    fn idle_server_has_infinite_ttnc() {
        let srv = Server::fcfs(narrow_dist(), 1, None).unwrap();
        assert!(srv.ttnc().is_infinite());
    }

    #[test]
    fn first_arrival_samples_service() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 1, 1);
        let mut rng = SimRng::new(1);
        let mut srv = Server::fcfs(dist, 1, None).unwrap();
        srv.arrival(&mut rng);
        close(srv.ttnc(), probe[0]);
        assert_eq!(srv.state(), 1);
    }

    #[test]
    fn queued_arrival_does_not_resample() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 1, 1);
        let mut rng = SimRng::new(1);
        let mut srv = Server::fcfs(dist, 1, None).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);
        // TTNC still belongs to the head job.
        close(srv.ttnc(), probe[0]);
        assert_eq!(srv.state(), 2);
    }

    #[test]
    fn jobs_complete_in_arrival_order() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 1, 2);
        let mut rng = SimRng::new(1);
        let mut srv = Server::fcfs(dist, 1, None).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);

        assert!(srv.update(srv.ttnc(), &mut rng));
        assert_eq!(srv.num_completions(), 1);
        close(srv.last_response(), probe[0]);
        // The queued job's service was drawn at the hand-off.
        close(srv.ttnc(), probe[1]);

        assert!(srv.update(srv.ttnc(), &mut rng));
        assert_eq!(srv.num_completions(), 2);
        // Second job also arrived at time 0, so its response is the full
        // elapsed clock.
        close(srv.last_response(), probe[0] + probe[1]);
        assert_eq!(srv.state(), 0);
        assert!(srv.ttnc().is_infinite());
    }

    #[test]
    fn partial_update_reports_no_completion() {
        let mut rng = SimRng::new(1);
        let mut srv = Server::fcfs(narrow_dist(), 1, None).unwrap();
        srv.arrival(&mut rng);
        let before = srv.ttnc();
        assert!(!srv.update(1.0, &mut rng));
        close(srv.ttnc(), before - 1.0);
        close(srv.clock(), 1.0);
        assert_eq!(srv.num_completions(), 0);
    }

    #[test]
    fn running_mean_is_exact_average() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 2, 2);
        let mut rng = SimRng::new(2);
        let mut srv = Server::fcfs(dist, 1, None).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);
        srv.update(srv.ttnc(), &mut rng);
        srv.update(srv.ttnc(), &mut rng);
        // Responses were s0 and s0 + s1.
        close(srv.mean_response(), (probe[0] + (probe[0] + probe[1])) / 2.0);
    }
}

// ── FCFS, multi-channel ───────────────────────────────────────────────────────

#[cfg(test)]
mod fcfs_multi {
    use super::*;

    #[test]
    fn channels_fill_before_queueing() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 5, 2);
        let mut rng = SimRng::new(5);
        let mut srv = Server::fcfs(dist, 2, None).unwrap();

        srv.arrival(&mut rng);
        close(srv.ttnc(), probe[0]);
        srv.arrival(&mut rng);
        close(srv.ttnc(), probe[0].min(probe[1]));
        assert_eq!(srv.state(), 2);

        // Third job waits; no sample is drawn for it yet.
        srv.arrival(&mut rng);
        assert_eq!(srv.state(), 3);
        close(srv.ttnc(), probe[0].min(probe[1]));
    }

    #[test]
    fn min_remaining_channel_completes_first() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 5, 2);
        let mut rng = SimRng::new(5);
        let mut srv = Server::fcfs(dist, 2, None).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);

        let first = probe[0].min(probe[1]);
        let second = probe[0].max(probe[1]);
        assert!(srv.update(srv.ttnc(), &mut rng));
        close(srv.last_response(), first);
        close(srv.ttnc(), second - first);

        assert!(srv.update(srv.ttnc(), &mut rng));
        close(srv.last_response(), second);
        assert_eq!(srv.state(), 0);
        assert!(srv.ttnc().is_infinite());
    }

    #[test]
    fn waiting_job_keeps_its_queue_entry_time() {
        // Three jobs, two channels: the third job's response time spans
        // its wait in the FIFO plus its service.
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 5, 3);
        let mut rng = SimRng::new(5);
        let mut srv = Server::fcfs(dist, 2, None).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);
        srv.arrival(&mut rng); // enqueued at t = 0

        let first = probe[0].min(probe[1]);
        let second = probe[0].max(probe[1]);

        // First completion frees a channel; the waiter starts with a fresh
        // sample (probe[2]) but keeps arrival stamp 0.
        assert!(srv.update(srv.ttnc(), &mut rng));
        assert_eq!(srv.state(), 2);
        close(srv.ttnc(), (second - first).min(probe[2]));

        // The longer original job still finishes before the waiter:
        // second - first < 1 < 10 < probe[2].
        assert!(srv.update(srv.ttnc(), &mut rng));
        close(srv.last_response(), second);

        // Finally the waiter, whose response counts from its arrival at 0.
        assert!(srv.update(srv.ttnc(), &mut rng));
        close(srv.last_response(), first + probe[2]);
        assert_eq!(srv.state(), 0);
    }
}

// ── SRPT ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod srpt {
    use super::*;

    #[test]
    fn arrival_keeps_least_remaining_running() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 7, 2);
        let mut rng = SimRng::new(7);
        let mut srv = Server::srpt(dist, None).unwrap();

        srv.arrival(&mut rng);
        close(srv.ttnc(), probe[0]);
        // A fresh arrival competes on remaining service.
        srv.arrival(&mut rng);
        close(srv.ttnc(), probe[0].min(probe[1]));
        assert_eq!(srv.state(), 2);
    }

    #[test]
    fn half_served_job_is_not_preempted_by_larger_arrival() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 7, 2);
        let mut rng = SimRng::new(7);
        let mut srv = Server::srpt(dist, None).unwrap();

        srv.arrival(&mut rng);
        assert!(!srv.update(2.0, &mut rng));
        // remaining of the running job is in (8, 9); the newcomer is in
        // (10, 11), so the running job keeps the channel.
        srv.arrival(&mut rng);
        close(srv.ttnc(), probe[0] - 2.0);
    }

    #[test]
    fn response_uses_departing_jobs_arrival() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 7, 2);
        let mut rng = SimRng::new(7);
        let mut srv = Server::srpt(dist, None).unwrap();

        srv.arrival(&mut rng); // job A at t = 0
        srv.update(2.0, &mut rng);
        srv.arrival(&mut rng); // job B at t = 2

        // A finishes first (see above); its response must span from t = 0,
        // not from B's arrival.
        assert!(srv.update(srv.ttnc(), &mut rng));
        close(srv.last_response(), probe[0]);
        close(srv.ttnc(), probe[1]);

        // B runs to completion next.
        assert!(srv.update(srv.ttnc(), &mut rng));
        close(srv.last_response(), probe[0] - 2.0 + probe[1]);
        assert_eq!(srv.state(), 0);
        assert!(srv.ttnc().is_infinite());
    }
}

// ── PS ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ps {
    use super::*;

    #[test]
    fn ttnc_scales_with_population() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 8, 2);
        let mut rng = SimRng::new(8);
        let mut srv = Server::ps(dist, None).unwrap();

        srv.arrival(&mut rng);
        close(srv.ttnc(), probe[0]);
        srv.arrival(&mut rng);
        // Two jobs at rate 1/2 each: the smaller one finishes after
        // min · 2 seconds.
        close(srv.ttnc(), probe[0].min(probe[1]) * 2.0);
    }

    #[test]
    fn shared_rate_stretches_both_responses() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 8, 2);
        let mut rng = SimRng::new(8);
        let mut srv = Server::ps(dist, None).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);

        let small = probe[0].min(probe[1]);
        let large = probe[0].max(probe[1]);

        assert!(srv.update(srv.ttnc(), &mut rng));
        close(srv.last_response(), 2.0 * small);
        // Survivor now runs alone with large − small left.
        close(srv.ttnc(), large - small);

        assert!(srv.update(srv.ttnc(), &mut rng));
        close(srv.last_response(), small + large);
        assert_eq!(srv.state(), 0);
        assert!(srv.ttnc().is_infinite());
    }

    #[test]
    fn partial_update_drains_all_jobs_equally() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 8, 2);
        let mut rng = SimRng::new(8);
        let mut srv = Server::ps(dist, None).unwrap();
        srv.arrival(&mut rng);
        srv.arrival(&mut rng);

        assert!(!srv.update(4.0, &mut rng));
        // Each job received 2 seconds of service; the smaller job's
        // completion is (min − 2) · 2 away.
        close(srv.ttnc(), (probe[0].min(probe[1]) - 2.0) * 2.0);
    }
}

// ── FB ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod fb {
    use super::*;

    #[test]
    fn lone_job_runs_at_full_rate() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 6, 1);
        let mut rng = SimRng::new(6);
        let mut srv = Server::fb(dist, None).unwrap();

        srv.arrival(&mut rng);
        close(srv.ttnc(), probe[0]);
        assert!(srv.update(srv.ttnc(), &mut rng));
        close(srv.last_response(), probe[0]);
        assert_eq!(srv.state(), 0);
        assert!(srv.ttnc().is_infinite());
    }

    #[test]
    fn newcomer_monopolizes_until_level_crossing() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 6, 2);
        let mut rng = SimRng::new(6);
        let mut srv = Server::fb(dist, None).unwrap();

        srv.arrival(&mut rng); // job A
        let head_start = 0.9 * probe[0];
        assert!(!srv.update(head_start, &mut rng));

        // Job B arrives with zero attained service: it alone is active.
        // Its own completion is probe[1] (> 10) away, but it reaches A's
        // attained level after head_start (< 9.9) — the crossing wins.
        srv.arrival(&mut rng);
        close(srv.ttnc(), head_start);

        // The crossing is not a completion.
        assert!(!srv.update(srv.ttnc(), &mut rng));
        assert_eq!(srv.state(), 2);
        assert_eq!(srv.num_completions(), 0);

        // Both jobs are now level and share the processor.
        let rem_a = probe[0] - head_start;
        let rem_b = probe[1] - head_start;
        close(srv.ttnc(), rem_a.min(rem_b) * 2.0);
    }

    #[test]
    fn completion_prefers_min_remaining_in_active_set() {
        let dist = narrow_dist();
        let probe = probe_samples(&dist, 6, 2);
        let mut rng = SimRng::new(6);
        let mut srv = Server::fb(dist, None).unwrap();

        srv.arrival(&mut rng);
        let head_start = 0.9 * probe[0];
        srv.update(head_start, &mut rng);
        srv.arrival(&mut rng);
        srv.update(srv.ttnc(), &mut rng); // crossing

        // One of the two level jobs drains to zero and departs.
        assert!(srv.update(srv.ttnc(), &mut rng));
        assert_eq!(srv.num_completions(), 1);
        assert_eq!(srv.state(), 1);
        assert!(srv.ttnc().is_finite());
    }
}
