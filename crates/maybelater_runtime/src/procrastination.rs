//! Deferred work.
//!
//! Statements inside `procrastinate` blocks wait in a FIFO until the
//! main event queue has drained. The procrastination phase then moves
//! them onto the event queue one by one, with growing random delays and
//! occasional distractions, until a wall-clock timeout abandons the rest.

use crate::config::RuntimeConfig;
use crate::env::Environment;
use crate::event::Event;
use crate::output::{Notice, OutputLine};
use crate::state::RunState;
use maybelater_core::Duration;
use maybelater_lang::Node;
use std::collections::VecDeque;

/// Priority of every migrated event
pub const MIGRATED_PRIORITY: i64 = 100;

/// Extra delay per loop iteration of a migrated loop, in seconds
pub const ITERATION_SPACING_SECS: f64 = 0.1;

/// Odds of a distraction after each migrated statement
pub const DISTRACTION_ODDS: f64 = 0.3;

/// FIFO of deferred statements
#[derive(Debug, Clone, Default)]
pub struct ProcrastinationQueue {
    entries: VecDeque<Node>,
}

impl ProcrastinationQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append statements in order
    pub fn extend(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.entries.extend(nodes);
    }

    /// Take the oldest statement
    pub fn pop_front(&mut self) -> Option<Node> {
        self.entries.pop_front()
    }

    /// Drop every remaining statement, returning how many there were
    pub fn abandon(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Statements in queue order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.entries.iter()
    }

    /// Number of deferred statements
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is deferred
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the procrastination phase did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcrastinationOutcome {
    /// Statements moved onto the event queue
    pub migrated: usize,
    /// Statements dropped when the timeout hit
    pub abandoned: usize,
}

/// Migrate deferred statements onto the event queue
///
/// Each statement gets a delay of `uniform(0.1, 1.0) * (1 + remaining / 10)`
/// where `remaining` counts what is still deferred after it. Loops expand
/// with iteration `k` (from 0) delayed a further `k * 0.1` seconds.
/// Whatever is left when the timeout passes is abandoned.
pub fn run_phase(
    state: &mut RunState,
    env: &mut Environment,
    config: &RuntimeConfig,
) -> ProcrastinationOutcome {
    env.emit(OutputLine::Notice(Notice::BeginningProcrastination));
    tracing::info!(deferred = state.procrastination.len(), "procrastination phase started");

    let started = env.now();
    let timeout = config.procrastination_timeout();
    let mut outcome = ProcrastinationOutcome::default();

    while env.now().duration_since(&started) < timeout {
        let Some(node) = state.procrastination.pop_front() else {
            break;
        };
        let remaining = state.procrastination.len() as f64;
        let delay_secs = env.rng.uniform(0.1, 1.0) * (1.0 + remaining / 10.0);
        let now = env.now();

        let events = Event::expand(&node);
        if events.is_empty() {
            tracing::debug!(kind = node.kind(), "deferred statement has no events");
        }
        let is_loop = matches!(node, Node::EventuallyLoop { .. });
        for (index, event) in events.into_iter().enumerate() {
            let offset = if is_loop {
                index as f64 * ITERATION_SPACING_SECS
            } else {
                0.0
            };
            let delay = Duration::from_secs_f64(delay_secs + offset);
            state.queue.push(event, delay, MIGRATED_PRIORITY, now);
        }
        outcome.migrated += 1;

        if env.rng.chance(DISTRACTION_ODDS) {
            let seconds = env.rng.uniform(0.5, 1.5);
            env.emit(OutputLine::Notice(Notice::Distracted { seconds }));
            env.sleep_secs(seconds);
        }
    }

    outcome.abandoned = state.procrastination.abandon();
    if outcome.abandoned > 0 {
        env.emit(OutputLine::Notice(Notice::TimeRanOut));
        tracing::warn!(
            abandoned = outcome.abandoned,
            migrated = outcome.migrated,
            "procrastination timed out"
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BufferedOutput;
    use maybelater_sim::{Clock, ManualClock, ScriptedRandom};

    fn env(rng: ScriptedRandom, output: &BufferedOutput) -> (Environment, ManualClock) {
        let clock = ManualClock::default();
        let env = Environment::default()
            .with_clock(clock.clone())
            .with_rng(rng)
            .with_output(output.clone());
        (env, clock)
    }

    #[test]
    fn test_migrates_in_order_with_priority() {
        let output = BufferedOutput::new();
        let (mut env, clock) = env(ScriptedRandom::constant(0.5), &output);
        let mut state = RunState::new();
        state
            .procrastination
            .extend([Node::print("\"a\""), Node::print("\"b\"")]);

        let outcome = run_phase(&mut state, &mut env, &RuntimeConfig::default());
        assert_eq!(outcome, ProcrastinationOutcome { migrated: 2, abandoned: 0 });
        assert_eq!(state.queue.len(), 2);
        assert!(state.queue.iter().all(|(k, _)| k.priority == MIGRATED_PRIORITY));
        assert!(state.queue.iter().all(|(k, _)| k.scheduled_time > clock.now()));
        assert_eq!(output.notices(), vec![Notice::BeginningProcrastination]);
    }

    #[test]
    fn test_delay_scales_with_remaining() {
        let output = BufferedOutput::new();
        // Delay rolls of 0.0 give the 0.1s floor, distraction rolls lose
        let (mut env, clock) = env(
            ScriptedRandom::constant(0.99).with_rolls([0.0, 0.99, 0.0]),
            &output,
        );
        let start = clock.now();
        let mut state = RunState::new();
        state
            .procrastination
            .extend([Node::print("\"a\""), Node::print("\"b\"")]);

        run_phase(&mut state, &mut env, &RuntimeConfig::default());
        let times: Vec<f64> = state
            .queue
            .iter()
            .map(|(k, _)| k.scheduled_time.duration_since(&start).as_secs_f64())
            .collect();
        // "b" had nothing left behind it; "a" had one: 0.1 * 1.1
        assert!((times[0] - 0.1).abs() < 1e-6);
        assert!((times[1] - 0.11).abs() < 1e-6);
    }

    #[test]
    fn test_loop_iterations_spaced() {
        let output = BufferedOutput::new();
        let (mut env, clock) = env(ScriptedRandom::constant(0.99).with_rolls([0.0]), &output);
        let start = clock.now();
        let mut state = RunState::new();
        state.procrastination.extend([Node::EventuallyLoop {
            var: "i".to_string(),
            start: 1,
            end: 3,
            block: vec![Node::print("i")],
        }]);

        run_phase(&mut state, &mut env, &RuntimeConfig::default());
        let times: Vec<f64> = state
            .queue
            .iter()
            .map(|(k, _)| k.scheduled_time.duration_since(&start).as_secs_f64())
            .collect();
        assert_eq!(times.len(), 3);
        for (k, t) in times.iter().enumerate() {
            assert!((t - (0.1 + k as f64 * 0.1)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_distraction_sleeps_and_notifies() {
        let output = BufferedOutput::new();
        // delay roll, distraction roll (hit), distraction length 0.5 -> 1.0s
        let (mut env, clock) = env(
            ScriptedRandom::constant(0.99).with_rolls([0.5, 0.0, 0.5]),
            &output,
        );
        let start = clock.now();
        let mut state = RunState::new();
        state.procrastination.extend([Node::print("\"a\"")]);

        run_phase(&mut state, &mut env, &RuntimeConfig::default());
        assert_eq!(
            output.notices(),
            vec![
                Notice::BeginningProcrastination,
                Notice::Distracted { seconds: 1.0 }
            ]
        );
        assert_eq!(clock.now().duration_since(&start), Duration::from_secs(1));
    }

    #[test]
    fn test_timeout_abandons_rest() {
        let output = BufferedOutput::new();
        // Every statement triggers a 0.5s distraction
        let (mut env, _clock) = env(ScriptedRandom::always(), &output);
        let mut state = RunState::new();
        state
            .procrastination
            .extend((0..20).map(|i| Node::print(format!("\"{}\"", i))));
        let config = RuntimeConfig {
            procrastination_timeout_secs: 0.2,
            ..RuntimeConfig::default()
        };

        let outcome = run_phase(&mut state, &mut env, &config);
        assert_eq!(outcome.migrated, 1);
        assert_eq!(outcome.abandoned, 19);
        assert!(state.procrastination.is_empty());
        assert_eq!(output.notices().last(), Some(&Notice::TimeRanOut));
    }
}
