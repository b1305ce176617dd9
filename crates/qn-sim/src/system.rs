//! The `QueueSystem` driver: warmup/measurement event loop and statistics.
//!
//! The execution is event-driven: each server reports the time until its
//! next completion (TTNC) under the no-arrivals assumption, and the driver
//! jumps the global clock straight to the nearest event — the minimum of
//! all TTNCs and the residual time to the next external arrival — rather
//! than stepping in fixed increments.

use log::debug;
use qn_core::{resolve_seed, Distribution, QnError, ServerId, SimRng};
use qn_policy::Server;

use crate::error::SimResult;
use crate::event_log::{EventKind, EventLog};
use crate::routing::TransitionMatrix;

// ── SimOptions ────────────────────────────────────────────────────────────────

/// Knobs for one simulation run.
#[derive(Copy, Clone, Debug)]
pub struct SimOptions {
    /// Stop after this many jobs have left the system (departures plus
    /// rejected routings).
    pub num_events: u64,
    /// Non-negative values seed the run deterministically; negative values
    /// draw a fresh seed from the operating system.
    pub seed: i64,
    /// Exits to process before measurement starts.  Warmup events update
    /// server state but are excluded from every statistic.
    pub warmup: u64,
    /// Record each departing job's response time in
    /// `QueueSystem::response_times`.
    pub track_response_times: bool,
    /// Record every measurement-phase event in `QueueSystem::event_log`.
    pub track_events: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        SimOptions {
            num_events: 1_000_000,
            seed: -1,
            warmup: 0,
            track_response_times: false,
            track_events: false,
        }
    }
}

// ── QueueSystem ───────────────────────────────────────────────────────────────

/// An open queueing network: an ordered server list, the external
/// inter-arrival distribution, and the routing matrix.
///
/// A `QueueSystem` owns its servers for its lifetime; every run resets
/// them first, so one instance can be re-used (and reconfigured) across
/// runs.
pub struct QueueSystem {
    /// Stations in index order.  External arrivals enter at index 0.
    pub servers: Vec<Server>,
    /// Inter-arrival time distribution of the external source.
    pub arrival_dist: Distribution,
    pub(crate) transition: TransitionMatrix,

    /// Mean response time of the most recent `sim` run.
    pub mean_response: f64,
    /// Per-job response times of the most recent run, when tracked.
    pub response_times: Vec<f64>,
    /// Event log of the most recent run, when tracked.
    pub event_log: EventLog,
}

impl QueueSystem {
    pub fn new(
        servers: Vec<Server>,
        arrival_dist: Distribution,
        transition: TransitionMatrix,
    ) -> QueueSystem {
        QueueSystem {
            servers,
            arrival_dist,
            transition,
            mean_response: 0.0,
            response_times: Vec::new(),
            event_log: EventLog::new(),
        }
    }

    /// Append a station at the end of the routing order.
    pub fn add_server(&mut self, server: Server) {
        self.servers.push(server);
    }

    /// Replace the routing matrix.  Validated at the next run entry.
    pub fn update_transition_matrix(&mut self, matrix: TransitionMatrix) {
        self.transition = matrix;
    }

    pub fn transition_matrix(&self) -> &TransitionMatrix {
        &self.transition
    }

    pub(crate) fn check_runnable(&self) -> SimResult<()> {
        if self.servers.is_empty() {
            return Err(QnError::Config("a queueing network needs at least one server".into()).into());
        }
        self.transition.validate(self.servers.len())
    }

    /// Run one simulation and return `(mean_N, mean_T)`: the time-average
    /// number of jobs in the system and the mean response time over the
    /// measurement window.
    ///
    /// Also stores mean T on the instance and fills
    /// [`QueueSystem::response_times`] / [`QueueSystem::event_log`] when
    /// the corresponding options are set (both are cleared at run start
    /// regardless).
    pub fn sim(&mut self, opts: &SimOptions) -> SimResult<(f64, f64)> {
        self.check_runnable()?;
        let seed = resolve_seed(opts.seed);
        debug!(
            target: "Sim",
            "running {} events (warmup {}) over {} servers, seed {seed}",
            opts.num_events, opts.warmup, self.servers.len()
        );

        self.response_times.clear();
        if opts.track_response_times {
            self.response_times.reserve(opts.num_events as usize);
        }
        self.event_log.clear();
        if opts.track_events {
            // Each exit is preceded by roughly one arrival.
            self.event_log.reserve(2 * opts.num_events as usize);
        }

        let (mean_n, mean_t) = run(
            &mut self.servers,
            &self.arrival_dist,
            &self.transition,
            opts.num_events,
            seed,
            opts.warmup,
            opts.track_response_times.then_some(&mut self.response_times),
            opts.track_events.then_some(&mut self.event_log),
        );
        self.mean_response = mean_t;
        Ok((mean_n, mean_t))
    }
}

// ── Event loop ────────────────────────────────────────────────────────────────

fn min_ttnc(servers: &[Server]) -> f64 {
    servers.iter().map(Server::ttnc).fold(f64::INFINITY, f64::min)
}

/// One full simulation on `servers`: reset, warmup, measurement.
///
/// Shared by `QueueSystem::sim` and the replication workers (which pass no
/// trackers).  Returns `(mean_N, mean_T)`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run(
    servers: &mut [Server],
    arrival_dist: &Distribution,
    transition: &TransitionMatrix,
    num_events: u64,
    seed: u64,
    warmup: u64,
    mut response_times: Option<&mut Vec<f64>>,
    mut event_log: Option<&mut EventLog>,
) -> (f64, f64) {
    let mut rng = SimRng::new(seed);
    let num_servers = servers.len();

    for s in servers.iter_mut() {
        s.reset();
    }

    let mut num_completions: u64 = 0;
    let mut ttna = arrival_dist.sample(&mut rng);
    let mut state: i64 = 0;
    let mut completed: Vec<usize> = Vec::with_capacity(num_servers);

    // ── Warmup phase (no accumulation) ────────────────────────────────────
    //
    // Structurally the measurement loop below, minus statistics and
    // tracking.  Every exit — departure or rejected routing — counts
    // toward the warmup quota.
    if warmup > 0 {
        let mut warmup_done: u64 = 0;
        while warmup_done < warmup {
            let ttnc = min_ttnc(servers);
            let ttne = ttnc.min(ttna);

            completed.clear();
            for (i, s) in servers.iter_mut().enumerate() {
                if s.update(ttne, &mut rng) {
                    completed.push(i);
                }
            }

            for &idx in &completed {
                let dest = transition.route(idx, num_servers, &mut rng);
                if dest >= num_servers {
                    warmup_done += 1;
                    state -= 1;
                } else {
                    servers[dest].num_arrivals += 1;
                    if servers[dest].is_full() {
                        servers[dest].num_rejected += 1;
                        warmup_done += 1;
                        state -= 1;
                    } else {
                        servers[dest].arrival(&mut rng);
                    }
                }
            }

            if ttna <= ttnc {
                servers[0].num_arrivals += 1;
                if servers[0].is_full() {
                    servers[0].num_rejected += 1;
                } else {
                    state += 1;
                    servers[0].arrival(&mut rng);
                }
                ttna = arrival_dist.sample(&mut rng);
            } else {
                ttna -= ttne;
            }
        }

        // Measurement must not inherit warmup-phase rejection artefacts.
        for s in servers.iter_mut() {
            s.num_rejected = 0;
            s.num_arrivals = 0;
        }
    }

    // ── Measurement phase ─────────────────────────────────────────────────
    let mut area_n: f64 = 0.0;
    let mut clock: f64 = 0.0;

    while num_completions < num_events {
        let ttnc = min_ttnc(servers);
        let ttne = ttnc.min(ttna);

        clock += ttne;
        area_n += state as f64 * ttne;

        // Advance every server by the elapsed slice; collect completions
        // in server-index order.
        completed.clear();
        for (i, s) in servers.iter_mut().enumerate() {
            if s.update(ttne, &mut rng) {
                completed.push(i);
            }
        }

        // Route completed jobs before the coincident arrival (if any) is
        // admitted: arrivals cannot jump ahead of jobs already done.
        for &idx in &completed {
            let dest = transition.route(idx, num_servers, &mut rng);
            if dest >= num_servers {
                num_completions += 1;
                state -= 1;
                if let Some(rt) = response_times.as_deref_mut() {
                    rt.push(servers[idx].last_response());
                }
                if let Some(log) = event_log.as_deref_mut() {
                    log.push(
                        clock,
                        EventKind::Departure,
                        ServerId(idx as u32),
                        ServerId::EXIT,
                        state,
                    );
                }
            } else {
                servers[dest].num_arrivals += 1;
                if servers[dest].is_full() {
                    servers[dest].num_rejected += 1;
                    num_completions += 1;
                    state -= 1;
                    if let Some(log) = event_log.as_deref_mut() {
                        log.push(
                            clock,
                            EventKind::Rejection,
                            ServerId(idx as u32),
                            ServerId(dest as u32),
                            state,
                        );
                    }
                } else {
                    servers[dest].arrival(&mut rng);
                    if let Some(log) = event_log.as_deref_mut() {
                        log.push(
                            clock,
                            EventKind::Route,
                            ServerId(idx as u32),
                            ServerId(dest as u32),
                            state,
                        );
                    }
                }
            }
        }

        if ttna <= ttnc {
            servers[0].num_arrivals += 1;
            if servers[0].is_full() {
                servers[0].num_rejected += 1;
                if let Some(log) = event_log.as_deref_mut() {
                    log.push(
                        clock,
                        EventKind::Rejection,
                        ServerId::EXTERNAL,
                        ServerId(0),
                        state,
                    );
                }
            } else {
                state += 1;
                servers[0].arrival(&mut rng);
                if let Some(log) = event_log.as_deref_mut() {
                    log.push(clock, EventKind::Arrival, ServerId::EXTERNAL, ServerId(0), state);
                }
            }
            ttna = arrival_dist.sample(&mut rng);
        } else {
            ttna -= ttne;
        }
    }

    let mean_n = area_n / clock;
    let mean_t = area_n / num_completions.max(1) as f64;
    (mean_n, mean_t)
}
