//! Interpreter front door.
//!
//! Loads a program onto the scheduler and runs it to completion.

use crate::config::RuntimeConfig;
use crate::env::Environment;
use crate::event::Event;
use crate::scheduler::{Scheduler, SchedulerState};
use maybelater_core::{Bindings, CoreError, CoreResult, Duration, Timestamp};
use maybelater_lang::{Node, parse_program};

/// Odds that a top-level `someday` is scheduled at all
pub const SOMEDAY_LOAD_ODDS: f64 = 0.7;

/// Priority of loop iterations scheduled at load
pub const LOOP_PRIORITY: i64 = 1;

/// What loading a program did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Events put on the queue
    pub scheduled: usize,
    /// Statements deferred to the procrastination phase
    pub deferred: usize,
    /// Top-level conditionals that were never scheduled
    pub skipped_conditionals: usize,
    /// Absolute deadline after loading
    pub deadline: Option<Timestamp>,
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Events dispatched
    pub dispatched: usize,
    /// Deferred statements abandoned at the procrastination timeout
    pub abandoned: usize,
    /// Whether the run ended in panic mode
    pub panicked: bool,
    /// Merged view of every variable at the end of the run
    pub final_state: Bindings,
}

/// A single MAYBELATER run
///
/// ```ignore
/// let mut interpreter = Interpreter::new(RuntimeConfig::default(), Environment::default());
/// interpreter.load_source("meh x = 5; PRINT(x);")?;
/// let report = interpreter.run()?;
/// ```
#[derive(Debug)]
pub struct Interpreter {
    scheduler: Scheduler,
}

impl Interpreter {
    /// Create an interpreter
    #[must_use]
    pub fn new(config: RuntimeConfig, env: Environment) -> Self {
        Self {
            scheduler: Scheduler::new(config, env),
        }
    }

    /// Parse source text and load it
    ///
    /// # Errors
    ///
    /// Returns error if the source does not parse or the run has started
    pub fn load_source(&mut self, source: &str) -> CoreResult<LoadSummary> {
        let program = parse_program(source)?;
        self.load_program(&program)
    }

    /// Schedule a parsed program
    ///
    /// May be called several times before [`run`](Self::run); programs
    /// accumulate.
    ///
    /// # Errors
    ///
    /// Returns error if the run has already started
    pub fn load_program(&mut self, program: &[Node]) -> CoreResult<LoadSummary> {
        if self.scheduler.status() != SchedulerState::Loading {
            return Err(CoreError::Validation {
                field: "program".to_string(),
                reason: "cannot load once the run has started".to_string(),
            });
        }

        let mut summary = LoadSummary::default();
        for node in program {
            self.load_node(node, &mut summary);
        }
        summary.deadline = self.scheduler.state().deadline();

        tracing::info!(
            scheduled = summary.scheduled,
            deferred = summary.deferred,
            skipped_conditionals = summary.skipped_conditionals,
            deadline = ?summary.deadline,
            "program loaded"
        );
        Ok(summary)
    }

    fn load_node(&mut self, node: &Node, summary: &mut LoadSummary) {
        let now = self.scheduler.now();
        match node {
            Node::Deadline { seconds } => {
                let at = now.add(&Duration::from_secs(*seconds));
                self.scheduler.state_mut().set_deadline(at);
            }
            Node::ProcrastinateBlock { block } => {
                self.scheduler
                    .state_mut()
                    .procrastination
                    .extend(block.iter().cloned());
                summary.deferred += block.len();
            }
            Node::EventuallyLoop { .. } => {
                for event in Event::expand(node) {
                    self.scheduler
                        .state_mut()
                        .queue
                        .push(event, Duration::zero(), LOOP_PRIORITY, now);
                    summary.scheduled += 1;
                }
            }
            Node::SomedayCond { .. } => {
                let panic = self.scheduler.state().in_panic();
                if !(panic || self.scheduler.env_mut().rng.chance(SOMEDAY_LOAD_ODDS)) {
                    tracing::debug!("someday conditional never scheduled");
                    summary.skipped_conditionals += 1;
                    return;
                }
                let delay = self.scheduler.config().conditional_delay(false);
                for event in Event::expand(node) {
                    self.scheduler.state_mut().queue.push(event, delay, 0, now);
                    summary.scheduled += 1;
                }
            }
            _ => {
                for event in Event::expand(node) {
                    self.scheduler
                        .state_mut()
                        .queue
                        .push(event, Duration::zero(), 0, now);
                    summary.scheduled += 1;
                }
            }
        }
    }

    /// Run the loaded program to completion
    ///
    /// # Errors
    ///
    /// Returns error if the interpreter has already run
    pub fn run(&mut self) -> CoreResult<RunReport> {
        if self.scheduler.status() != SchedulerState::Loading {
            return Err(CoreError::Validation {
                field: "run".to_string(),
                reason: "interpreter has already run".to_string(),
            });
        }
        let outcome = self.scheduler.run();
        Ok(RunReport {
            dispatched: self.scheduler.dispatched(),
            abandoned: outcome.abandoned,
            panicked: self.scheduler.state().in_panic(),
            final_state: self.scheduler.resolve_all(),
        })
    }

    /// Best-effort merged view of every variable
    pub fn resolve_all(&mut self) -> Bindings {
        self.scheduler.resolve_all()
    }

    /// Underlying scheduler
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}
