//! Run loop.
//!
//! The scheduler owns the run state and environment and drives a
//! program through its phases:
//! - normal drain: dispatch everything in queue order, ignoring time
//! - procrastination: migrate deferred work onto the queue
//! - procrastinate drain: dispatch only entries that are due
//!
//! After every drain pass it checks the deadline and expires idle
//! deterministic variables.

use crate::config::RuntimeConfig;
use crate::dispatcher::{DispatchOutcome, Dispatcher, Phase};
use crate::env::Environment;
use crate::event::Event;
use crate::procrastination::{self, ProcrastinationOutcome};
use crate::output::{Notice, OutputLine};
use crate::state::RunState;
use maybelater_core::{Bindings, Timestamp};

/// Odds of dawdling when the head of the queue is not yet due
pub const DAWDLE_ODDS: f64 = 0.2;

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Accepting program nodes
    Loading,
    /// Draining the event queue
    Draining(Phase),
    /// Migrating deferred work
    Procrastinating,
    /// Run finished
    Done,
}

/// Drives one run
pub struct Scheduler {
    config: RuntimeConfig,
    state: RunState,
    env: Environment,
    status: SchedulerState,
    dispatched: usize,
}

impl Scheduler {
    /// Create a scheduler in the loading state
    #[must_use]
    pub fn new(config: RuntimeConfig, env: Environment) -> Self {
        Self {
            config,
            state: RunState::new(),
            env,
            status: SchedulerState::Loading,
            dispatched: 0,
        }
    }

    /// Run configuration
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run state
    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Mutable run state
    pub fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    /// Environment
    #[must_use]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Mutable environment
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Current phase of the run
    #[must_use]
    pub fn status(&self) -> SchedulerState {
        self.status
    }

    /// Events dispatched so far
    #[must_use]
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Current time
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.env.now()
    }

    /// Dispatch one event
    pub fn dispatch(&mut self, event: Event, phase: Phase) -> DispatchOutcome {
        let kind = event.kind();
        let outcome = Dispatcher::new(&mut self.state, &mut self.env, &self.config).dispatch(event, phase);
        self.dispatched += 1;
        tracing::trace!(kind, ?phase, ?outcome, "dispatched");
        outcome
    }

    /// One drain pass; returns the number of events dispatched
    ///
    /// In the normal phase every queued entry is dispatched in order,
    /// including entries enqueued during the pass. In the procrastinate
    /// phase the pass stops at the first entry that is not yet due, and
    /// each dispatch is preceded by a short throttle sleep.
    pub fn drain(&mut self, phase: Phase) -> usize {
        let mut count = 0;
        loop {
            let Some(key) = self.state.queue.peek_min().map(|(key, _)| *key) else {
                break;
            };
            if phase == Phase::Procrastinate && key.scheduled_time > self.env.now() {
                if self.env.rng.chance(DAWDLE_ODDS) {
                    let secs = self.env.rng.uniform(0.1, 0.5);
                    self.env.sleep_secs(secs);
                }
                break;
            }
            let Some(entry) = self.state.queue.pop_min() else {
                break;
            };
            if phase == Phase::Procrastinate {
                let secs = self.env.rng.uniform(0.1, 0.3);
                self.env.sleep_secs(secs);
            }
            self.dispatch(entry.event, phase);
            count += 1;
        }
        tracing::debug!(?phase, count, pending = self.state.queue.len(), "drain pass");
        count
    }

    /// Escalate to panic mode once the deadline is near
    ///
    /// When `now` is past `deadline - panic_window`, panic mode turns on
    /// and every queued entry collapses to `now + collapse_offset`. Runs
    /// on every call inside the window, so later entries collapse too.
    /// Returns whether anything happened.
    pub fn check_deadline(&mut self) -> bool {
        let Some(deadline) = self.state.deadline() else {
            return false;
        };
        let now = self.env.now();
        if now <= deadline.sub(&self.config.panic_window()) {
            return false;
        }
        if self.state.enter_panic() {
            tracing::warn!(%deadline, %now, "deadline approaching, panic mode on");
        }
        let at = now.add(&self.config.collapse_offset());
        let collapsed = self.state.queue.collapse(at);
        if collapsed > 0 {
            tracing::debug!(collapsed, "collapsed queue");
        }
        true
    }

    /// Delete deterministic variables idle past the expiry threshold
    ///
    /// Suppressed in panic mode. Returns the expired names.
    pub fn expire_idle(&mut self) -> Vec<String> {
        let now = self.env.now();
        let panic = self.state.in_panic();
        self.state
            .stores
            .deterministic
            .expire_unused(now, self.config.idle_expiry(), panic)
    }

    /// Run to completion
    pub fn run(&mut self) -> ProcrastinationOutcome {
        self.status = SchedulerState::Draining(Phase::Normal);
        tracing::info!(queued = self.state.queue.len(), "run started");
        while !self.state.queue.is_empty() {
            self.drain(Phase::Normal);
            self.check_deadline();
            self.expire_idle();
        }

        let mut outcome = ProcrastinationOutcome::default();
        if !self.state.procrastination.is_empty() {
            self.status = SchedulerState::Procrastinating;
            outcome = procrastination::run_phase(&mut self.state, &mut self.env, &self.config);

            self.env.clock.sleep(self.config.procrastination_grace());
            self.env
                .emit(OutputLine::Notice(Notice::FinallyProcrastinating));

            self.status = SchedulerState::Draining(Phase::Procrastinate);
            while !self.state.queue.is_empty() {
                let count = self.drain(Phase::Procrastinate);
                self.check_deadline();
                self.expire_idle();
                if count == 0 {
                    self.wait_for_head();
                }
            }
        }

        self.status = SchedulerState::Done;
        tracing::info!(
            dispatched = self.dispatched,
            abandoned = outcome.abandoned,
            panic = self.state.in_panic(),
            "run finished"
        );
        outcome
    }

    /// Sleep toward the head entry, at most one poll interval
    ///
    /// A zero poll interval sleeps straight to the head.
    fn wait_for_head(&mut self) {
        let Some(key) = self.state.queue.peek_min().map(|(key, _)| *key) else {
            return;
        };
        let until_due = key.scheduled_time.duration_since(&self.env.now());
        let poll = self.config.idle_poll();
        let wait = if poll.is_zero() { until_due } else { until_due.min(poll) };
        if !wait.is_zero() {
            self.env.clock.sleep(wait);
        }
    }

    /// Best-effort snapshot of every variable
    pub fn resolve_all(&mut self) -> Bindings {
        let now = self.env.now();
        self.state.stores.resolve_all(now, &mut *self.env.rng)
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("status", &self.status)
            .field("queued", &self.state.queue.len())
            .field("deferred", &self.state.procrastination.len())
            .field("panic", &self.state.in_panic())
            .field("dispatched", &self.dispatched)
            .finish()
    }
}
