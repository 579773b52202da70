//! Injected collaborators of a run.

use crate::output::{OutputLine, OutputSink, StdoutSink};
use maybelater_core::{Duration, Timestamp};
use maybelater_lang::{Evaluator, SandboxEvaluator};
use maybelater_sim::{Clock, RandomSource, SeededRandom, SimSeed, SystemClock};

/// Clock, randomness, expression evaluator and output sink of one run
pub struct Environment {
    /// Time and sleeping
    pub clock: Box<dyn Clock>,
    /// Every probabilistic decision
    pub rng: Box<dyn RandomSource>,
    /// Conditional and `PRINT` expressions
    pub evaluator: Box<dyn Evaluator>,
    /// Program output
    pub output: Box<dyn OutputSink>,
}

impl Environment {
    /// Production environment: system clock, seeded randomness, stdout
    #[must_use]
    pub fn seeded(seed: SimSeed) -> Self {
        Self {
            clock: Box::new(SystemClock),
            rng: Box::new(SeededRandom::new(seed)),
            evaluator: Box::new(SandboxEvaluator::new()),
            output: Box::new(StdoutSink),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the random source
    #[must_use]
    pub fn with_rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Replace the evaluator
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    /// Replace the output sink
    #[must_use]
    pub fn with_output(mut self, output: impl OutputSink + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Current time
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Sleep for `secs` seconds
    pub fn sleep_secs(&self, secs: f64) {
        self.clock.sleep(Duration::from_secs_f64(secs));
    }

    /// Emit one output line
    pub fn emit(&mut self, line: OutputLine) {
        self.output.emit(line);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::seeded(SimSeed::default())
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}
