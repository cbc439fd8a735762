use std::{cell::RefCell, fmt, rc::Rc};

use crate::SourceLocation;

/// Receives test failures raised by a mock.
///
/// Called for engine defects (right before the test is aborted) and for
/// verification mismatches. For mismatches the reporter decides whether the
/// test stops at once ([`PanicReporter`]) or keeps collecting failures
/// ([`RecordingReporter`]).
pub trait FailureReporter {
    fn report_failure(&self, message: &str, location: &SourceLocation);
}

/// Fails the test immediately by panicking with the located message.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicReporter;

impl FailureReporter for PanicReporter {
    fn report_failure(&self, message: &str, location: &SourceLocation) {
        panic!("{location}: {message}");
    }
}

/// A failure captured by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    message: String,
    location: SourceLocation,
}

impl Failure {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Collects failures instead of aborting.
///
/// Clones share the same buffer, so a test can hand one clone to the mock
/// and inspect the other. Call [`assert_clean`](Self::assert_clean) at the
/// end of the test to fail it with every collected message at once.
///
/// # Example
///
/// ```rust
/// use understudy::{RecordingReporter, FailureReporter, SourceLocation};
///
/// let reporter = RecordingReporter::new();
/// let handle = reporter.clone();
/// handle.report_failure("Expected one call, but got none", &SourceLocation::new("t.rs", 3));
///
/// assert_eq!(reporter.len(), 1);
/// assert_eq!(reporter.failures()[0].message(), "Expected one call, but got none");
/// ```
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    failures: Rc<RefCell<Vec<Failure>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the failures collected so far, oldest first.
    pub fn failures(&self) -> Vec<Failure> {
        self.failures.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.failures.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.borrow().is_empty()
    }

    /// Removes and returns the collected failures.
    pub fn take(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.failures.borrow_mut())
    }

    /// Panics with every collected failure, if there is any.
    #[track_caller]
    pub fn assert_clean(&self) {
        let failures = self.failures.borrow();
        if failures.is_empty() {
            return;
        }
        let listing = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        panic!("{} mock failure(s):\n{listing}", failures.len());
    }
}

impl FailureReporter for RecordingReporter {
    fn report_failure(&self, message: &str, location: &SourceLocation) {
        self.failures.borrow_mut().push(Failure {
            message: message.to_owned(),
            location: location.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here(line: u32) -> SourceLocation {
        SourceLocation::new("tests/reporter.rs", line)
    }

    #[test]
    fn recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.report_failure("first", &here(1));
        reporter.report_failure("second", &here(2));

        let failures = reporter.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].message(), "first");
        assert_eq!(failures[1].location().line(), 2);
        assert_eq!(failures[1].to_string(), "tests/reporter.rs:2: second");
    }

    #[test]
    fn clones_share_failures() {
        let reporter = RecordingReporter::new();
        let clone = reporter.clone();
        clone.report_failure("shared", &here(3));
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn take_drains_buffer() {
        let reporter = RecordingReporter::new();
        reporter.report_failure("once", &here(4));
        assert_eq!(reporter.take().len(), 1);
        assert!(reporter.is_empty());
        reporter.assert_clean();
    }

    #[test]
    #[should_panic(expected = "2 mock failure(s)")]
    fn assert_clean_lists_failures() {
        let reporter = RecordingReporter::new();
        reporter.report_failure("a", &here(5));
        reporter.report_failure("b", &here(6));
        reporter.assert_clean();
    }

    #[test]
    #[should_panic(expected = "tests/reporter.rs:7: boom")]
    fn panic_reporter_panics_with_location() {
        PanicReporter.report_failure("boom", &here(7));
    }
}
