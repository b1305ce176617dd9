//! The `Server` state machine and its policy dispatch.

use qn_core::{Distribution, QnError, QnResult, SimRng};

use crate::{fb, fcfs, ps, srpt};

// ── ServerStats ───────────────────────────────────────────────────────────────

/// Runtime statistics shared by every discipline.
///
/// The policy modules mutate this directly: the split between `ServerStats`
/// and the per-discipline queue state lets each policy function borrow both
/// halves of a [`Server`] at once.
#[derive(Clone, Debug)]
pub struct ServerStats {
    /// Local simulated seconds since the last reset.
    pub clock: f64,
    /// Time to next completion assuming no further arrivals;
    /// `f64::INFINITY` while no work is in progress.
    pub ttnc: f64,
    /// Running arithmetic mean of observed response times.
    pub mean_response: f64,
    /// Response time of the most recent completion.
    pub last_response: f64,
    /// Completions processed since the last reset.
    pub num_completions: u64,
    /// Jobs currently in the system (queued + in service).
    pub state: usize,
}

impl ServerStats {
    fn idle() -> Self {
        ServerStats {
            clock: 0.0,
            ttnc: f64::INFINITY,
            mean_response: 0.0,
            last_response: 0.0,
            num_completions: 0,
            state: 0,
        }
    }

    /// Fold one response time `t` into the running mean.
    ///
    /// `T ← T·(n−1)/n + t/n` keeps the exact arithmetic mean without
    /// storing the response-time sequence.
    pub(crate) fn record_completion(&mut self, t: f64) {
        self.num_completions += 1;
        let n = self.num_completions as f64;
        self.mean_response = self.mean_response * (n - 1.0) / n + t / n;
        self.last_response = t;
    }
}

// ── Policy ────────────────────────────────────────────────────────────────────

/// Per-discipline job storage.  The variant decides which module's
/// `arrival`/`update` rules run.
pub(crate) enum Policy {
    Fcfs(fcfs::SingleQueue),
    FcfsMulti(fcfs::MultiQueue),
    Srpt(srpt::SrptQueue),
    Ps(ps::PsQueue),
    Fb(fb::FbQueue),
}

// ── Server ────────────────────────────────────────────────────────────────────

/// One service station of a queueing network.
///
/// Construct through [`Server::fcfs`], [`Server::srpt`], [`Server::ps`],
/// or [`Server::fb`].  The driver resets every server at run start, feeds
/// arrivals, and advances local time with [`Server::update`], which
/// reports whether a completion fired in the elapsed slice.
pub struct Server {
    size_dist: Distribution,
    num_channels: usize,
    buffer_capacity: Option<usize>,
    stats: ServerStats,
    policy: Policy,

    /// Jobs offered to this server (admitted or not) since the last reset.
    /// The driver increments this and zeroes it when warmup ends.
    pub num_arrivals: u64,
    /// Jobs turned away by a full buffer since the last reset.
    pub num_rejected: u64,
}

impl Server {
    fn build(
        size_dist: Distribution,
        num_channels: usize,
        buffer_capacity: Option<usize>,
        policy: Policy,
    ) -> Server {
        Server {
            size_dist,
            num_channels,
            buffer_capacity,
            stats: ServerStats::idle(),
            policy,
            num_arrivals: 0,
            num_rejected: 0,
        }
    }

    fn check_capacity(buffer_capacity: Option<usize>) -> QnResult<()> {
        if buffer_capacity == Some(0) {
            return Err(QnError::Config(
                "buffer capacity must be at least 1, or None for unlimited".into(),
            ));
        }
        Ok(())
    }

    // ── Constructors ──────────────────────────────────────────────────────

    /// First-Come-First-Served with `num_channels ≥ 1` parallel channels.
    pub fn fcfs(
        size_dist: Distribution,
        num_channels: usize,
        buffer_capacity: Option<usize>,
    ) -> QnResult<Server> {
        if num_channels == 0 {
            return Err(QnError::Config("FCFS needs at least one channel".into()));
        }
        Self::check_capacity(buffer_capacity)?;
        let policy = if num_channels == 1 {
            Policy::Fcfs(fcfs::SingleQueue::default())
        } else {
            Policy::FcfsMulti(fcfs::MultiQueue::new(num_channels))
        };
        Ok(Self::build(size_dist, num_channels, buffer_capacity, policy))
    }

    /// Shortest-Remaining-Processing-Time (preemptive-resume, single channel).
    pub fn srpt(size_dist: Distribution, buffer_capacity: Option<usize>) -> QnResult<Server> {
        Self::check_capacity(buffer_capacity)?;
        let policy = Policy::Srpt(srpt::SrptQueue::default());
        Ok(Self::build(size_dist, 1, buffer_capacity, policy))
    }

    /// Processor-Sharing: every present job is served at rate `1/n`.
    pub fn ps(size_dist: Distribution, buffer_capacity: Option<usize>) -> QnResult<Server> {
        Self::check_capacity(buffer_capacity)?;
        let policy = Policy::Ps(ps::PsQueue::default());
        Ok(Self::build(size_dist, 1, buffer_capacity, policy))
    }

    /// Foreground-Background (least-attained-service-first).
    pub fn fb(size_dist: Distribution, buffer_capacity: Option<usize>) -> QnResult<Server> {
        Self::check_capacity(buffer_capacity)?;
        let policy = Policy::Fb(fb::FbQueue::default());
        Ok(Self::build(size_dist, 1, buffer_capacity, policy))
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Jobs currently at this station (queued + in service).
    #[inline]
    pub fn state(&self) -> usize {
        self.stats.state
    }

    /// Time until this server's next completion, `INFINITY` when idle.
    #[inline]
    pub fn ttnc(&self) -> f64 {
        self.stats.ttnc
    }

    /// Local simulated time since the last reset.
    #[inline]
    pub fn clock(&self) -> f64 {
        self.stats.clock
    }

    /// Running mean response time over completions since the last reset.
    #[inline]
    pub fn mean_response(&self) -> f64 {
        self.stats.mean_response
    }

    /// Response time of the most recent completion.
    #[inline]
    pub fn last_response(&self) -> f64 {
        self.stats.last_response
    }

    /// Completions since the last reset.
    #[inline]
    pub fn num_completions(&self) -> u64 {
        self.stats.num_completions
    }

    /// Parallel service channels (1 except for multi-channel FCFS).
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Buffer capacity; `None` means unlimited.
    #[inline]
    pub fn buffer_capacity(&self) -> Option<usize> {
        self.buffer_capacity
    }

    /// The service-time distribution.
    #[inline]
    pub fn size_dist(&self) -> &Distribution {
        &self.size_dist
    }

    /// Short discipline name, for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self.policy {
            Policy::Fcfs(_) | Policy::FcfsMulti(_) => "FCFS",
            Policy::Srpt(_) => "SRPT",
            Policy::Ps(_) => "PS",
            Policy::Fb(_) => "FB",
        }
    }

    /// `true` iff the buffer is finite and at capacity.
    #[inline]
    pub fn is_full(&self) -> bool {
        matches!(self.buffer_capacity, Some(cap) if self.stats.state >= cap)
    }

    // ── Operations ────────────────────────────────────────────────────────

    /// Zero the clock and statistics and drop all per-discipline job state.
    pub fn reset(&mut self) {
        self.stats = ServerStats::idle();
        self.num_arrivals = 0;
        self.num_rejected = 0;
        match &mut self.policy {
            Policy::Fcfs(q) => q.clear(),
            Policy::FcfsMulti(q) => q.clear(),
            Policy::Srpt(q) => q.clear(),
            Policy::Ps(q) => q.clear(),
            Policy::Fb(q) => q.clear(),
        }
    }

    /// Admit one job at the current local clock.
    ///
    /// The caller must have checked [`Server::is_full`]; a full server
    /// never sees `arrival`.  May draw one service-time sample.
    pub fn arrival(&mut self, rng: &mut SimRng) {
        debug_assert!(!self.is_full(), "arrival on a full server");
        match &mut self.policy {
            Policy::Fcfs(q) => fcfs::single_arrival(q, &mut self.stats, &self.size_dist, rng),
            Policy::FcfsMulti(q) => fcfs::multi_arrival(q, &mut self.stats, &self.size_dist, rng),
            Policy::Srpt(q) => srpt::arrival(q, &mut self.stats, &self.size_dist, rng),
            Policy::Ps(q) => ps::arrival(q, &mut self.stats, &self.size_dist, rng),
            Policy::Fb(q) => fb::arrival(q, &mut self.stats, &self.size_dist, rng),
        }
    }

    /// Advance local time by `dt` and report whether a completion fired.
    ///
    /// The driver guarantees `dt ≤ ttnc` up to floating-point rounding, so
    /// at most one completion is processed per call.
    pub fn update(&mut self, dt: f64, rng: &mut SimRng) -> bool {
        match &mut self.policy {
            Policy::Fcfs(q) => fcfs::single_update(q, &mut self.stats, &self.size_dist, rng, dt),
            Policy::FcfsMulti(q) => fcfs::multi_update(q, &mut self.stats, &self.size_dist, rng, dt),
            Policy::Srpt(q) => srpt::update(q, &mut self.stats, dt),
            Policy::Ps(q) => ps::update(q, &mut self.stats, dt),
            Policy::Fb(q) => fb::update(q, &mut self.stats, dt),
        }
    }

    /// A new server with the same configuration and empty runtime state.
    ///
    /// Used by the replication orchestrator: each worker clones the server
    /// list once, and clones share nothing mutable.
    pub fn clone_fresh(&self) -> Server {
        let policy = match &self.policy {
            Policy::Fcfs(_) => Policy::Fcfs(fcfs::SingleQueue::default()),
            Policy::FcfsMulti(_) => Policy::FcfsMulti(fcfs::MultiQueue::new(self.num_channels)),
            Policy::Srpt(_) => Policy::Srpt(srpt::SrptQueue::default()),
            Policy::Ps(_) => Policy::Ps(ps::PsQueue::default()),
            Policy::Fb(_) => Policy::Fb(fb::FbQueue::default()),
        };
        Self::build(self.size_dist, self.num_channels, self.buffer_capacity, policy)
    }
}
