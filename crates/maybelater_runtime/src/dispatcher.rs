//! Event dispatch.
//!
//! Applies one event to the run state. Nothing here fails the run:
//! evaluation errors and lost coin flips are reported as
//! [`DispatchOutcome::Skipped`] and otherwise ignored.

use crate::config::RuntimeConfig;
use crate::env::Environment;
use crate::event::Event;
use crate::output::OutputLine;
use crate::state::RunState;
use maybelater_core::{Bindings, Duration, Value};
use maybelater_lang::{EvalError, Node};
use maybelater_store::probabilistic::EXISTENCE_ODDS;

/// Odds that a failing conditional fires anyway in panic mode
pub const PANIC_FIRE_ODDS: f64 = 0.8;

/// Loop variable value visible to a top-level conditional with no `i`
pub const DEFAULT_LOOP_INDEX: i64 = 1;

/// Which drain is dispatching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Main pass, in queue order regardless of time
    Normal,
    /// Draining migrated work, honoring scheduled times
    Procrastinate,
}

/// Why an event had no effect
#[derive(Debug, Clone, PartialEq)]
pub enum SoftFailure {
    /// A `maybe` write lost its coin flip
    LostCoinFlip,
    /// A conditional evaluated falsy and did not force-fire
    ConditionFalse,
    /// An expression failed to evaluate
    Eval(EvalError),
}

/// Result of dispatching one event
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The event took effect
    Applied,
    /// A conditional fired and enqueued this many events
    Enqueued(usize),
    /// The event was dropped
    Skipped(SoftFailure),
}

/// Applies events to a run
pub struct Dispatcher<'a> {
    state: &'a mut RunState,
    env: &'a mut Environment,
    config: &'a RuntimeConfig,
}

impl<'a> Dispatcher<'a> {
    /// Borrow the pieces of a run
    pub fn new(state: &'a mut RunState, env: &'a mut Environment, config: &'a RuntimeConfig) -> Self {
        Self { state, env, config }
    }

    /// Apply one event
    pub fn dispatch(&mut self, event: Event, phase: Phase) -> DispatchOutcome {
        let now = self.env.now();
        match event {
            Event::SetVar { name, value } => {
                self.state.stores.deterministic.write(&name, value, now);
                DispatchOutcome::Applied
            }
            Event::SetMaybeVar { name, value } => {
                if self.env.rng.chance(EXISTENCE_ODDS) {
                    self.state.stores.probabilistic.write(&name, value);
                    DispatchOutcome::Applied
                } else {
                    tracing::debug!(%name, "maybe write did not happen");
                    DispatchOutcome::Skipped(SoftFailure::LostCoinFlip)
                }
            }
            Event::SetParadoxVar { name, value } => {
                let secs = self.env.rng.int_inclusive(1, 3).max(0) as u64;
                let resolves_at = now.add(&Duration::from_secs(secs));
                self.state.stores.paradox.write(&name, value, resolves_at);
                DispatchOutcome::Applied
            }
            Event::SetTemporalVar {
                name,
                value,
                seconds_ago,
            } => {
                self.state
                    .stores
                    .temporal
                    .write(&name, value, seconds_ago as f64, now);
                DispatchOutcome::Applied
            }
            Event::LoopIteration { var, value, block } => {
                self.state
                    .stores
                    .deterministic
                    .bind(&var, Value::Int(value));
                for node in block.iter() {
                    self.run_in_loop(node, &var, value, phase);
                }
                DispatchOutcome::Applied
            }
            Event::Conditional { condition, block } => self.conditional(&condition, &block),
            Event::PrintStatement { expr } => self.print(&expr),
        }
    }

    fn conditional(&mut self, condition: &str, block: &[Node]) -> DispatchOutcome {
        let index = self
            .state
            .stores
            .deterministic
            .get("i")
            .cloned()
            .unwrap_or(Value::Int(DEFAULT_LOOP_INDEX));
        let mut bindings = Bindings::new();
        bindings.insert("i".to_string(), index);

        let truthy = match self.env.evaluator.evaluate(condition, &bindings) {
            Ok(value) => value.is_truthy(),
            Err(e) => {
                tracing::debug!(%condition, error = %e, "conditional failed to evaluate");
                return DispatchOutcome::Skipped(SoftFailure::Eval(e));
            }
        };
        let panic = self.state.in_panic();
        if !(truthy || (panic && self.env.rng.chance(PANIC_FIRE_ODDS))) {
            return DispatchOutcome::Skipped(SoftFailure::ConditionFalse);
        }

        let delay = self.config.conditional_delay(panic);
        let now = self.env.now();
        let mut enqueued = 0;
        for node in block {
            for event in Event::expand(node) {
                self.state.queue.push(event, delay, 0, now);
                enqueued += 1;
            }
        }
        tracing::trace!(%condition, enqueued, forced = !truthy, "conditional fired");
        DispatchOutcome::Enqueued(enqueued)
    }

    fn print(&mut self, expr: &str) -> DispatchOutcome {
        let text = if expr.starts_with(['"', '\'']) {
            let mut inner = expr[1..].chars();
            inner.next_back();
            inner.as_str().to_string()
        } else if let Some(value) = self.state.stores.deterministic.get(expr) {
            let text = value.to_string();
            self.state.stores.deterministic.touch(expr, self.env.now());
            text
        } else {
            match self
                .env
                .evaluator
                .evaluate(expr, self.state.stores.deterministic.bindings())
            {
                Ok(value) => value.to_string(),
                Err(e) => {
                    tracing::debug!(%expr, error = %e, "print failed to evaluate");
                    return DispatchOutcome::Skipped(SoftFailure::Eval(e));
                }
            }
        };
        self.env.emit(OutputLine::Print(text));
        DispatchOutcome::Applied
    }

    /// Run one body statement of a loop iteration, inline
    ///
    /// Conditionals here see only the loop variable; their actions run
    /// immediately instead of being enqueued.
    fn run_in_loop(&mut self, node: &Node, var: &str, value: i64, phase: Phase) {
        let Node::SomedayCond { condition, block } = node else {
            self.run_inline(node, phase);
            return;
        };
        let mut bindings = Bindings::new();
        bindings.insert(var.to_string(), Value::Int(value));
        match self.env.evaluator.evaluate(condition, &bindings) {
            Ok(result) if result.is_truthy() => {
                for action in block {
                    self.run_inline(action, phase);
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%condition, error = %e, "loop conditional failed to evaluate");
            }
        }
    }

    fn run_inline(&mut self, node: &Node, phase: Phase) {
        for event in Event::expand(node) {
            let outcome = self.dispatch(event, phase);
            tracing::trace!(?outcome, "inline dispatch");
        }
    }
}
