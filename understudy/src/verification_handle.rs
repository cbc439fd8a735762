use std::fmt;

use crate::{InvocationRecord, MockController, SourceLocation, matcher::Matcher};

/// Assertion surface handed to a verification front-end.
///
/// Obtained from [`MockController::verification_handle`] and bound to the
/// count matcher and the call site of one assertion. The front-end then
/// names the calls to count with [`verify`](Self::verify).
///
/// # Example
///
/// ```rust
/// use understudy::{CallMatcher, InvocationRecord, MockController, SourceLocation, Stub, matcher::predicate};
///
/// let ctl = MockController::new();
/// ctl.register(Stub::<(), u32>::new("next").then_return(1));
/// let _: u32 = ctl.call("next", (), None);
///
/// let once = predicate("exactly one call", |calls: &[InvocationRecord]| calls.len() == 1);
/// ctl.verification_handle(once, SourceLocation::caller())
///     .verify(CallMatcher::by_method("next"));
/// ```
pub struct VerificationHandle<'a> {
    controller: &'a MockController,
    count: Box<dyn Matcher<[InvocationRecord]>>,
    location: SourceLocation,
}

impl<'a> VerificationHandle<'a> {
    pub(crate) fn new(
        controller: &'a MockController,
        count: Box<dyn Matcher<[InvocationRecord]>>,
        location: SourceLocation,
    ) -> Self {
        Self {
            controller,
            count,
            location,
        }
    }

    /// Location failures of this handle are attributed to.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Checks the recorded calls selected by `call_filter` against the
    /// handle's count matcher.
    pub fn verify<C>(&self, call_filter: C)
    where
        C: Matcher<InvocationRecord>,
    {
        self.controller
            .verify(&call_filter, self.count.as_ref(), &self.location);
    }
}

impl fmt::Debug for VerificationHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationHandle")
            .field("mock_id", &self.controller.id())
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CallMatcher, MockConfig, RecordingReporter, Stub,
        matcher::{Description, predicate},
    };

    fn times(n: usize) -> crate::matcher::Predicate<[InvocationRecord]> {
        predicate(format!("{n} call(s)"), move |calls: &[InvocationRecord]| {
            calls.len() == n
        })
        .with_mismatch(|calls: &[InvocationRecord], d: &mut Description| {
            d.append_text("got ").append_value(&calls.len());
        })
    }

    #[test]
    fn failures_are_attributed_to_handle_location() {
        let reporter = RecordingReporter::new();
        let ctl = MockController::with_config(MockConfig::default(), reporter.clone());
        ctl.register(Stub::<(), u32>::new("next").then_return(1));
        let _: u32 = ctl.call("next", (), None);

        let location = SourceLocation::new("tests/counter.rs", 21);
        let handle = ctl.verification_handle(times(2), location.clone());
        handle.verify(CallMatcher::by_method("next"));

        let failures = reporter.take();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].location(), &location);
        assert_eq!(failures[0].message(), "[mock] Expected 2 call(s), but got 1");

        handle.verify(CallMatcher::by_method("other"));
        assert_eq!(reporter.take()[0].message(), "[mock] Expected 2 call(s), but got 0");
    }

    #[test]
    fn satisfied_handle_reports_nothing() {
        let reporter = RecordingReporter::new();
        let ctl = MockController::with_config(MockConfig::default(), reporter.clone());
        let handle = ctl.verification_handle(times(0), SourceLocation::caller());
        handle.verify(CallMatcher::any());
        assert!(reporter.is_empty());
        assert!(handle.location().file().ends_with("verification_handle.rs"));
    }
}
