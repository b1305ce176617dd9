//! Multi-run replication across a worker pool.
//!
//! Replication `i` is always seeded with `derive_seed(base, i)`, so the
//! raw result vectors depend only on the base seed and the run
//! parameters — never on the worker count or on how the pool schedules
//! the chunks.  The index range is pre-partitioned into contiguous chunks
//! (sizes differing by at most one) and each chunk writes into its own
//! disjoint slice of the output, so workers share nothing mutable.

use log::info;
use qn_core::{derive_seed, resolve_seed, QnError};
use qn_policy::Server;
use rayon::prelude::*;

use crate::error::{SimError, SimResult};
use crate::system::{run, QueueSystem};

// ── Options and results ───────────────────────────────────────────────────────

/// Knobs for a replication batch.
#[derive(Copy, Clone, Debug)]
pub struct ReplicateOptions {
    /// Number of independent runs.  Must be at least 1.
    pub n_replications: usize,
    /// Exits per run (see [`SimOptions::num_events`][crate::SimOptions]).
    pub num_events: u64,
    /// Base seed; negative draws one from the operating system.  Each
    /// replication derives its own seed from this and its index.
    pub seed: i64,
    /// Warmup exits per run.
    pub warmup: u64,
    /// Worker threads.  `0` uses the platform's available parallelism.
    /// Always capped at `n_replications`.
    pub num_threads: usize,
}

impl Default for ReplicateOptions {
    fn default() -> Self {
        ReplicateOptions {
            n_replications: 30,
            num_events: 1_000_000,
            seed: -1,
            warmup: 0,
            num_threads: 0,
        }
    }
}

/// Raw per-replication metrics, indexed by replication number.
///
/// Post-processing (confidence intervals, histograms) is the caller's
/// concern.
#[derive(Clone, Debug, Default)]
pub struct Replications {
    pub raw_n: Vec<f64>,
    pub raw_t: Vec<f64>,
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// One worker's share: a starting replication index and the output slots
/// for its contiguous chunk.
pub(crate) struct ChunkTask<'a> {
    pub(crate) start: usize,
    pub(crate) out_n: &'a mut [f64],
    pub(crate) out_t: &'a mut [f64],
}

impl QueueSystem {
    /// Run `n_replications` independent simulations and collect their raw
    /// `(mean_N, mean_T)` pairs.
    ///
    /// Each worker clones the server list once and re-uses the clones for
    /// every replication in its chunk (every run resets them first).
    /// Results are deterministic in `(seed, n_replications, num_events,
    /// warmup)` regardless of `num_threads`.
    pub fn replicate(&self, opts: &ReplicateOptions) -> SimResult<Replications> {
        self.check_runnable()?;
        if opts.n_replications == 0 {
            return Err(QnError::Config("n_replications must be at least 1".into()).into());
        }

        let base_seed = resolve_seed(opts.seed);
        let workers = resolve_workers(opts.num_threads, opts.n_replications);
        info!(
            target: "Replicate",
            "{} replications of {} events across {} workers",
            opts.n_replications, opts.num_events, workers
        );

        let mut raw_n = vec![0.0; opts.n_replications];
        let mut raw_t = vec![0.0; opts.n_replications];
        {
            let tasks = chunk_tasks(&mut raw_n, &mut raw_t, workers);
            let servers = &self.servers;
            let arrival_dist = &self.arrival_dist;
            let transition = &self.transition;

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| SimError::WorkerPool(e.to_string()))?;

            pool.install(|| {
                tasks.into_par_iter().for_each(|task| {
                    let mut local: Vec<Server> =
                        servers.iter().map(Server::clone_fresh).collect();
                    let ChunkTask { start, out_n, out_t } = task;
                    for (offset, (slot_n, slot_t)) in
                        out_n.iter_mut().zip(out_t.iter_mut()).enumerate()
                    {
                        let rep_seed = derive_seed(base_seed, (start + offset) as u64);
                        let (mean_n, mean_t) = run(
                            &mut local,
                            arrival_dist,
                            transition,
                            opts.num_events,
                            rep_seed,
                            opts.warmup,
                            None,
                            None,
                        );
                        *slot_n = mean_n;
                        *slot_t = mean_t;
                    }
                });
            });
        }

        Ok(Replications { raw_n, raw_t })
    }
}

/// Resolve the worker count: `0` means available parallelism; always at
/// least 1 and never more than the number of replications.
pub(crate) fn resolve_workers(requested: usize, n_replications: usize) -> usize {
    let count = if requested > 0 {
        requested
    } else {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    };
    count.max(1).min(n_replications)
}

/// Partition the output vectors into `workers` contiguous chunks whose
/// sizes differ by at most one; the first `len % workers` chunks take the
/// extra element.
pub(crate) fn chunk_tasks<'a>(
    raw_n: &'a mut [f64],
    raw_t: &'a mut [f64],
    workers: usize,
) -> Vec<ChunkTask<'a>> {
    let total = raw_n.len();
    let chunk = total / workers;
    let remainder = total % workers;

    let mut tasks = Vec::with_capacity(workers);
    let mut rest_n = raw_n;
    let mut rest_t = raw_t;
    let mut start = 0;
    for w in 0..workers {
        let len = chunk + usize::from(w < remainder);
        let (out_n, tail_n) = std::mem::take(&mut rest_n).split_at_mut(len);
        let (out_t, tail_t) = std::mem::take(&mut rest_t).split_at_mut(len);
        rest_n = tail_n;
        rest_t = tail_t;
        tasks.push(ChunkTask { start, out_n, out_t });
        start += len;
    }
    tasks
}
