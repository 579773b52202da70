//! Program output.
//!
//! `PRINT` results and phase notices go through an [`OutputSink`] so a
//! run can write to stdout or be captured for inspection.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Runtime notices interleaved with program output
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Procrastination phase started
    BeginningProcrastination,
    /// A distraction pause while migrating deferred work
    Distracted {
        /// Pause length
        seconds: f64,
    },
    /// Deferred events are about to be drained
    FinallyProcrastinating,
    /// Some deferred statements were abandoned
    TimeRanOut,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeginningProcrastination => write!(f, "beginning procrastination tasks"),
            Self::Distracted { seconds } => write!(f, "got distracted for {:.1}s...", seconds),
            Self::FinallyProcrastinating => write!(f, "finally getting to procrastination tasks"),
            Self::TimeRanOut => write!(f, "time ran out for procrastination tasks"),
        }
    }
}

/// One emitted line
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    /// Output of a `PRINT` statement
    Print(String),
    /// Runtime notice
    Notice(Notice),
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Print(text) => f.write_str(text),
            Self::Notice(notice) => notice.fmt(f),
        }
    }
}

/// Destination for program output
pub trait OutputSink {
    /// Emit one line
    fn emit(&mut self, line: OutputLine);
}

/// Writes each line to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, line: OutputLine) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = writeln!(handle, "{}", line) {
            tracing::debug!(error = %e, "stdout write failed");
        }
    }
}

/// In-memory sink shared between clones
///
/// Hand one clone to the runtime and keep another to read the output.
#[derive(Debug, Clone, Default)]
pub struct BufferedOutput {
    lines: Arc<Mutex<Vec<OutputLine>>>,
}

impl BufferedOutput {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every emitted line, in order
    #[must_use]
    pub fn lines(&self) -> Vec<OutputLine> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Only the `PRINT` output
    #[must_use]
    pub fn printed(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                OutputLine::Print(text) => Some(text),
                OutputLine::Notice(_) => None,
            })
            .collect()
    }

    /// Only the notices
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                OutputLine::Notice(notice) => Some(notice),
                OutputLine::Print(_) => None,
            })
            .collect()
    }
}

impl OutputSink for BufferedOutput {
    fn emit(&mut self, line: OutputLine) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text() {
        assert_eq!(
            Notice::BeginningProcrastination.to_string(),
            "beginning procrastination tasks"
        );
        assert_eq!(
            Notice::Distracted { seconds: 1.26 }.to_string(),
            "got distracted for 1.3s..."
        );
        assert_eq!(
            Notice::TimeRanOut.to_string(),
            "time ran out for procrastination tasks"
        );
    }

    #[test]
    fn test_buffer_shared_between_clones() {
        let buffer = BufferedOutput::new();
        let mut sink = buffer.clone();
        sink.emit(OutputLine::Print("hi".to_string()));
        sink.emit(OutputLine::Notice(Notice::FinallyProcrastinating));

        assert_eq!(buffer.printed(), vec!["hi".to_string()]);
        assert_eq!(buffer.notices(), vec![Notice::FinallyProcrastinating]);
        assert_eq!(buffer.lines().len(), 2);
    }
}
