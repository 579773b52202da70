//! MAYBELATER Runtime
//!
//! Statements are not executed in program order. They become events on a
//! time/priority-ordered queue, are dispatched against four variable
//! stores, and run under a deadline that can tip the whole run into
//! panic mode. Deferred `procrastinate` work is drained last, under a
//! wall-clock timeout.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod env;
pub mod event;
pub mod output;
pub mod procrastination;
pub mod queue;
pub mod scheduler;
pub mod state;

pub use config::RuntimeConfig;
pub use dispatcher::{DispatchOutcome, Dispatcher, Phase, SoftFailure};
pub use engine::{Interpreter, LoadSummary, RunReport};
pub use env::Environment;
pub use event::Event;
pub use output::{BufferedOutput, Notice, OutputLine, OutputSink, StdoutSink};
pub use procrastination::{ProcrastinationOutcome, ProcrastinationQueue};
pub use queue::{EntryKey, EventQueue, QueueEntry};
pub use scheduler::{Scheduler, SchedulerState};
pub use state::RunState;
