//! Mutable state of one run.

use crate::procrastination::ProcrastinationQueue;
use crate::queue::EventQueue;
use maybelater_core::Timestamp;
use maybelater_store::VariableStores;

/// Queues, stores, deadline and panic flag
///
/// Panic mode only ever turns on. The deadline is fixed during program
/// load; the scheduler does not change it once running.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Pending events
    pub queue: EventQueue,
    /// Deferred statements
    pub procrastination: ProcrastinationQueue,
    /// Variable stores
    pub stores: VariableStores,
    deadline: Option<Timestamp>,
    panic: bool,
}

impl RunState {
    /// Create empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute deadline, if any
    #[must_use]
    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Set the deadline; the last call wins
    pub(crate) fn set_deadline(&mut self, at: Timestamp) {
        self.deadline = Some(at);
    }

    /// Whether panic mode is on
    #[must_use]
    pub fn in_panic(&self) -> bool {
        self.panic
    }

    /// Turn panic mode on; returns true if it was off
    pub fn enter_panic(&mut self) -> bool {
        !std::mem::replace(&mut self.panic, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_is_monotonic() {
        let mut state = RunState::new();
        assert!(!state.in_panic());
        assert!(state.enter_panic());
        assert!(!state.enter_panic());
        assert!(state.in_panic());
    }

    #[test]
    fn test_last_deadline_wins() {
        let mut state = RunState::new();
        state.set_deadline(Timestamp::new(10, 0));
        state.set_deadline(Timestamp::new(20, 0));
        assert_eq!(state.deadline(), Some(Timestamp::new(20, 0)));
    }
}
