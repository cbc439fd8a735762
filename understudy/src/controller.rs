use std::{cell::RefCell, convert::Infallible, fmt, rc::Rc};

use crate::{
    CallLedger, Error, FailureReporter, InvocationRecord, MethodId, MockConfig, MockId,
    PanicReporter, Result, SourceLocation, Stub, StubRegistry, StubbingHandle,
    VerificationHandle,
    matcher::Matcher,
    output::Reply,
    resolution, verification,
};

/// Per-instance owner of the stubs and the call history of one mock.
///
/// Interception points (hand-written or generated) forward every call of
/// the mocked member to [`call`](Self::call), [`call_fallible`](Self::call_fallible),
/// [`getter`](Self::getter) or [`setter`](Self::setter). Each call is recorded
/// first, then answered by the newest matching stub, by the original
/// implementation, or treated as a defect when neither exists.
///
/// # Example
///
/// ```rust
/// use understudy::{
///     CallMatcher, InvocationRecord, MockController, SourceLocation, Stub, matcher::predicate,
/// };
///
/// struct CalculatorMock {
///     ctl: MockController,
/// }
///
/// impl CalculatorMock {
///     fn add(&self, a: i32, b: i32) -> i32 {
///         self.ctl.call("add", (a, b), None)
///     }
/// }
///
/// let mock = CalculatorMock { ctl: MockController::new() };
/// mock.ctl.register(
///     Stub::<(i32, i32), i32>::new("add")
///         .with_matcher(predicate("(2, 3)", |p: &(i32, i32)| *p == (2, 3)))
///         .then_return(5),
/// );
///
/// assert_eq!(mock.add(2, 3), 5);
///
/// let once = predicate("one call", |calls: &[InvocationRecord]| calls.len() == 1);
/// mock.ctl.verify(&CallMatcher::by_method("add"), &once, &SourceLocation::caller());
/// ```
///
/// # Threading
///
/// A controller is meant for one test at a time and does no locking; it is
/// neither `Send` nor `Sync`. Give every parallel test its own mock.
pub struct MockController {
    id: MockId,
    config: MockConfig,
    registry: RefCell<StubRegistry>,
    ledger: RefCell<CallLedger>,
    reporter: Rc<dyn FailureReporter>,
}

impl MockController {
    /// Creates a controller with default configuration that reports
    /// failures by panicking.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default(), PanicReporter)
    }

    /// Creates a controller with explicit configuration and failure reporter.
    pub fn with_config<R>(config: MockConfig, reporter: R) -> Self
    where
        R: FailureReporter + 'static,
    {
        let ledger = CallLedger::with_capacity(config.ledger_capacity());
        Self {
            id: MockId::new(),
            config,
            registry: RefCell::new(StubRegistry::new()),
            ledger: RefCell::new(ledger),
            reporter: Rc::new(reporter),
        }
    }

    #[inline]
    pub fn id(&self) -> MockId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    // ==================== Interception ====================

    /// Intercepts a property read.
    #[track_caller]
    pub fn getter<T>(&self, property: &str, original: Option<&dyn Fn() -> T>) -> T
    where
        T: Clone + 'static,
    {
        let fallback = original.map(|f| move |(): ()| Ok::<T, Infallible>(f()));
        let fallback = fallback
            .as_ref()
            .map(|f| f as &dyn Fn(()) -> std::result::Result<T, Infallible>);
        self.resolve(MethodId::getter(property), (), fallback)
            .unwrap_or_else(|never| match never {})
    }

    /// Intercepts a property write. The written value is the call parameter.
    #[track_caller]
    pub fn setter<T>(&self, property: &str, value: T, original: Option<&dyn Fn(T)>)
    where
        T: Clone + fmt::Debug + 'static,
    {
        let fallback = original.map(|f| move |value: T| Ok::<(), Infallible>(f(value)));
        let fallback = fallback
            .as_ref()
            .map(|f| f as &dyn Fn(T) -> std::result::Result<(), Infallible>);
        self.resolve(MethodId::setter(property), value, fallback)
            .unwrap_or_else(|never| match never {})
    }

    /// Intercepts a call to a member that cannot fail.
    ///
    /// Stubs for such members are declared with the default `Infallible`
    /// error type, so an error output for them cannot exist.
    #[track_caller]
    pub fn call<IN, OUT>(
        &self,
        method: impl Into<MethodId>,
        parameters: IN,
        original: Option<&dyn Fn(IN) -> OUT>,
    ) -> OUT
    where
        IN: Clone + fmt::Debug + 'static,
        OUT: Clone + 'static,
    {
        let fallback = original.map(|f| move |parameters: IN| Ok::<OUT, Infallible>(f(parameters)));
        let fallback = fallback
            .as_ref()
            .map(|f| f as &dyn Fn(IN) -> std::result::Result<OUT, Infallible>);
        self.resolve(method, parameters, fallback)
            .unwrap_or_else(|never| match never {})
    }

    /// Intercepts a call to a member returning `Result<OUT, ERR>`.
    ///
    /// Errors declared by stubs and errors of the original implementation
    /// are returned as `Err`.
    #[track_caller]
    pub fn call_fallible<IN, OUT, ERR>(
        &self,
        method: impl Into<MethodId>,
        parameters: IN,
        original: Option<&dyn Fn(IN) -> std::result::Result<OUT, ERR>>,
    ) -> std::result::Result<OUT, ERR>
    where
        IN: Clone + fmt::Debug + 'static,
        OUT: Clone + 'static,
        ERR: Clone + 'static,
    {
        self.resolve(method, parameters, original)
    }

    /// Records the call and answers it.
    ///
    /// # Panics
    ///
    /// Engine defects ([`Error::IncompleteStub`], [`Error::UnstubbedCall`],
    /// [`Error::StubTypeMismatch`]) are reported to the failure reporter,
    /// attributed to the caller, and then abort the test with a panic. Use
    /// [`try_resolve`](Self::try_resolve) to receive them as values instead.
    #[track_caller]
    pub fn resolve<IN, OUT, ERR>(
        &self,
        method: impl Into<MethodId>,
        parameters: IN,
        original: Option<&dyn Fn(IN) -> std::result::Result<OUT, ERR>>,
    ) -> std::result::Result<OUT, ERR>
    where
        IN: Clone + fmt::Debug + 'static,
        OUT: Clone + 'static,
        ERR: Clone + 'static,
    {
        let location = SourceLocation::caller();
        match self.try_resolve(method, parameters, original) {
            Ok(result) => result,
            Err(err) => self.abort(&err, &location),
        }
    }

    /// Records the call and answers it, returning engine defects as `Err`.
    ///
    /// The outer `Result` carries defects of the test setup; the inner one
    /// is the intercepted member's own result.
    pub fn try_resolve<IN, OUT, ERR>(
        &self,
        method: impl Into<MethodId>,
        parameters: IN,
        original: Option<&dyn Fn(IN) -> std::result::Result<OUT, ERR>>,
    ) -> Result<std::result::Result<OUT, ERR>>
    where
        IN: Clone + fmt::Debug + 'static,
        OUT: Clone + 'static,
        ERR: Clone + 'static,
    {
        let method = method.into();
        self.record(&method, parameters.clone());

        let reply = resolution::select_reply::<IN, OUT, ERR>(
            &mut self.registry.borrow_mut(),
            &method,
            &parameters,
        )?;

        match reply {
            Some(Reply::Ready(result)) => {
                tracing::debug!(
                    mock = %self.config.name(),
                    mock_id = %self.id,
                    method = %method,
                    ok = result.is_ok(),
                    "stub matched"
                );
                return Ok(result);
            }
            Some(Reply::Answer(answer)) => {
                tracing::debug!(
                    mock = %self.config.name(),
                    mock_id = %self.id,
                    method = %method,
                    "stub answered"
                );
                return Ok(answer(&parameters));
            }
            Some(Reply::CallReal) | None => {}
        }

        match original {
            Some(original) => {
                tracing::debug!(
                    mock = %self.config.name(),
                    mock_id = %self.id,
                    method = %method,
                    "calling original implementation"
                );
                Ok(original(parameters))
            }
            None => Err(Error::UnstubbedCall {
                method,
                parameters: format!("{parameters:?}"),
            }),
        }
    }

    fn record<IN>(&self, method: &MethodId, parameters: IN)
    where
        IN: fmt::Debug + 'static,
    {
        let mut ledger = self.ledger.borrow_mut();
        let record = ledger.record(method.clone(), parameters);
        tracing::trace!(
            mock = %self.config.name(),
            mock_id = %self.id,
            method = %method,
            sequence = record.sequence(),
            parameters = record.rendered_parameters(),
            "call recorded"
        );
    }

    /// Reports a defect and aborts the current test.
    fn abort(&self, err: &Error, location: &SourceLocation) -> ! {
        let message = self.failure_message(&err.to_string());
        tracing::error!(
            mock = %self.config.name(),
            mock_id = %self.id,
            location = %location,
            error = %err,
            "mock defect, aborting test"
        );
        self.reporter.report_failure(&message, location);
        panic!("{message}");
    }

    fn failure_message(&self, message: &str) -> String {
        format!("[{}] {message}", self.config.name())
    }

    // ==================== Stubbing ====================

    /// Adds a stub in front of the stubs of its method.
    pub fn register<IN, OUT, ERR>(&self, stub: Stub<IN, OUT, ERR>)
    where
        IN: 'static,
        OUT: 'static,
        ERR: 'static,
    {
        tracing::debug!(
            mock = %self.config.name(),
            mock_id = %self.id,
            method = %stub.method(),
            matchers = %stub.describe_matchers(),
            outputs = stub.outputs_remaining(),
            "stub registered"
        );
        self.registry.borrow_mut().register(stub);
    }

    /// Handle the stubbing front-end registers stubs through.
    pub fn stubbing_handle(&self) -> StubbingHandle<'_> {
        StubbingHandle::new(self)
    }

    /// Number of stubs registered for `method`.
    pub fn stub_count(&self, method: impl Into<MethodId>) -> usize {
        self.registry.borrow().count(&method.into())
    }

    // ==================== Verification ====================

    /// Checks the recorded calls selected by `call_filter` against `count`.
    ///
    /// A mismatch is reported to the failure reporter at `location` with a
    /// message rendered by `count`; it is not returned. Whether the test
    /// stops there is up to the reporter.
    pub fn verify<C, M>(&self, call_filter: &C, count: &M, location: &SourceLocation)
    where
        C: Matcher<InvocationRecord> + ?Sized,
        M: Matcher<[InvocationRecord]> + ?Sized,
    {
        // Snapshot first: matchers may inspect the mock while rendering.
        let records = self.invocations();
        let Some(mismatch) = verification::mismatch_message(&records, call_filter, count) else {
            return;
        };
        let err = Error::VerificationMismatch(mismatch);
        tracing::warn!(
            mock = %self.config.name(),
            mock_id = %self.id,
            location = %location,
            error = %err,
            "verification failed"
        );
        self.reporter
            .report_failure(&self.failure_message(&err.to_string()), location);
    }

    /// Handle the verification front-end checks calls through, bound to a
    /// count matcher and the call site of the assertion.
    pub fn verification_handle<M>(&self, count: M, location: SourceLocation) -> VerificationHandle<'_>
    where
        M: Matcher<[InvocationRecord]> + 'static,
    {
        VerificationHandle::new(self, Box::new(count), location)
    }

    /// Snapshot of the recorded calls, in call order.
    pub fn invocations(&self) -> Vec<InvocationRecord> {
        self.ledger.borrow().all().to_vec()
    }

    /// Number of recorded calls.
    pub fn invocation_count(&self) -> usize {
        self.ledger.borrow().len()
    }

    /// Exports the call history as JSON, see [`CallLedger::to_json`].
    ///
    /// # Errors
    ///
    /// Returns any serialization error produced by `serde_json`.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn ledger_to_json(&self) -> serde_json::Result<String> {
        self.ledger.borrow().to_json()
    }

    // ==================== Lifecycle ====================

    /// Drops all stubs and all recorded calls, and restarts call sequence
    /// numbers at zero.
    pub fn reset(&self) {
        self.clear_stubs();
        self.ledger.borrow_mut().reset();
        tracing::debug!(
            mock = %self.config.name(),
            mock_id = %self.id,
            "mock reset"
        );
    }

    /// Drops all stubs. Recorded calls are kept.
    pub fn clear_stubs(&self) {
        self.registry.borrow_mut().clear();
        tracing::debug!(
            mock = %self.config.name(),
            mock_id = %self.id,
            "stubs cleared"
        );
    }

    /// Drops all recorded calls. Stubs are kept.
    pub fn clear_invocations(&self) {
        self.ledger.borrow_mut().clear();
        tracing::debug!(
            mock = %self.config.name(),
            mock_id = %self.id,
            "invocations cleared"
        );
    }
}

impl Default for MockController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockController")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CallMatcher, Output, RecordingReporter,
        matcher::{Description, Predicate, predicate},
    };

    type Params = (i32, i32);

    fn controller() -> (MockController, RecordingReporter) {
        let reporter = RecordingReporter::new();
        let ctl = MockController::with_config(
            MockConfig::default().with_name("calculator"),
            reporter.clone(),
        );
        (ctl, reporter)
    }

    fn exactly(expected: Params) -> Predicate<Params> {
        predicate(format!("{expected:?}"), move |p: &Params| *p == expected)
    }

    fn times(n: usize) -> Predicate<[InvocationRecord]> {
        predicate(format!("{n} call(s)"), move |calls: &[InvocationRecord]| {
            calls.len() == n
        })
        .with_mismatch(|calls: &[InvocationRecord], d: &mut Description| {
            d.append_text("got ").append_value(&calls.len());
        })
    }

    /// Interception point of `fn add(&self, a: i32, b: i32) -> i32`.
    fn call_add(ctl: &MockController, a: i32, b: i32) -> i32 {
        ctl.call("add", (a, b), None)
    }

    /// Same call, with defects returned instead of aborting.
    fn try_add(ctl: &MockController, a: i32, b: i32) -> Result<i32> {
        ctl.try_resolve::<Params, i32, Infallible>("add", (a, b), None)
            .map(|r| r.unwrap_or_else(|never| match never {}))
    }

    #[test]
    fn stubbed_call_returns_declared_value() {
        let (ctl, reporter) = controller();
        ctl.register(Stub::<Params, i32>::new("add").with_matcher(exactly((2, 3))).then_return(5));

        assert_eq!(call_add(&ctl, 2, 3), 5);
        assert_eq!(call_add(&ctl, 2, 3), 5);
        assert!(reporter.is_empty());
    }

    #[test]
    fn unmatched_call_without_original_is_unstubbed() {
        let (ctl, _) = controller();
        ctl.register(Stub::<Params, i32>::new("add").with_matcher(exactly((2, 3))).then_return(5));

        let err = try_add(&ctl, 1, 1).unwrap_err();
        assert_eq!(
            err,
            Error::UnstubbedCall {
                method: "add".into(),
                parameters: "(1, 1)".into(),
            }
        );
    }

    #[test]
    fn original_is_transparent() {
        let (ctl, _) = controller();
        let real: &dyn Fn(Params) -> i32 = &|(a, b)| a * b;
        let value: i32 = ctl.call("mul", (3, 4), Some(real));
        assert_eq!(value, 12);

        let failing: &dyn Fn(Params) -> std::result::Result<i32, String> =
            &|_| Err("overflow".into());
        let result = ctl.call_fallible("mul", (i32::MAX, 2), Some(failing));
        assert_eq!(result, Err("overflow".to_string()));
    }

    #[test]
    fn call_real_implementation_falls_through() {
        let (ctl, _) = controller();
        ctl.register(Stub::<Params, i32>::new("add").then_call_real_implementation());

        let real: &dyn Fn(Params) -> i32 = &|(a, b)| a + b + 100;
        let value: i32 = ctl.call("add", (1, 2), Some(real));
        assert_eq!(value, 103);
        assert!(matches!(try_add(&ctl, 1, 2), Err(Error::UnstubbedCall { .. })));
    }

    #[test]
    fn declared_error_is_returned_as_data() {
        let (ctl, reporter) = controller();
        ctl.register(
            Stub::<Params, i32, String>::new("div")
                .with_matcher(exactly((1, 0)))
                .then_error("division by zero".into()),
        );

        let result: std::result::Result<i32, String> = ctl.call_fallible("div", (1, 0), None);
        assert_eq!(result, Err("division by zero".to_string()));
        assert!(reporter.is_empty());
    }

    #[test]
    fn every_call_is_recorded_before_outcome() {
        let (ctl, _) = controller();
        ctl.register(Stub::<Params, i32>::new("add").with_matcher(exactly((2, 3))).then_return(5));
        ctl.register(Stub::<Params, i32>::new("add").with_matcher(exactly((9, 9))));

        assert_eq!(try_add(&ctl, 2, 3).unwrap(), 5);
        assert!(try_add(&ctl, 1, 1).is_err());
        assert!(try_add(&ctl, 9, 9).is_err());

        let calls = ctl.invocations();
        assert_eq!(calls.len(), 3);
        let params: Vec<_> = calls.iter().filter_map(|r| r.parameters::<Params>()).collect();
        assert_eq!(params, [&(2, 3), &(1, 1), &(9, 9)]);
        let sequences: Vec<_> = calls.iter().map(InvocationRecord::sequence).collect();
        assert_eq!(sequences, [0, 1, 2]);
    }

    #[test]
    fn answer_receives_parameters() {
        let (ctl, _) = controller();
        ctl.register(Stub::<Params, i32>::new("add").then(Output::answer(|(a, b)| Ok(a + b))));
        assert_eq!(call_add(&ctl, 20, 22), 42);
    }

    #[test]
    fn accessors_use_synthesized_names() {
        let (ctl, _) = controller();
        ctl.register(Stub::<(), String>::new(MethodId::getter("name")).then_return("stub".into()));

        assert_eq!(ctl.getter::<String>("name", None), "stub");
        let real: &dyn Fn() -> String = &|| "real".to_string();
        assert_eq!(ctl.getter("other", Some(real)), "real");

        let written = RefCell::new(Vec::new());
        let real_setter: &dyn Fn(u8) = &|value| written.borrow_mut().push(value);
        ctl.setter("volume", 7u8, Some(real_setter));
        assert_eq!(*written.borrow(), [7]);

        let methods: Vec<_> = ctl
            .invocations()
            .iter()
            .map(|r| r.method().to_string())
            .collect();
        assert_eq!(methods, ["get:name", "get:other", "set:volume"]);
    }

    #[test]
    fn stubbed_setter_skips_original() {
        let (ctl, _) = controller();
        ctl.register(Stub::<u8, ()>::new(MethodId::setter("volume")).then_return(()));

        let called = RefCell::new(false);
        let real_setter: &dyn Fn(u8) = &|_| *called.borrow_mut() = true;
        ctl.setter("volume", 3u8, Some(real_setter));
        assert!(!*called.borrow());
    }

    #[test]
    fn verification_mismatch_is_reported_not_thrown() {
        let (ctl, reporter) = controller();
        ctl.register(Stub::<Params, i32>::new("add").then_return(0));
        call_add(&ctl, 1, 1);

        let location = SourceLocation::new("tests/calc.rs", 40);
        ctl.verify(&CallMatcher::by_method("add"), &times(2), &location);
        ctl.verify(&CallMatcher::by_method("add"), &times(3), &location);

        let failures = reporter.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(
            failures[0].message(),
            "[calculator] Expected 2 call(s), but got 1"
        );
        assert_eq!(failures[1].location(), &location);
    }

    #[test]
    fn passing_verification_reports_nothing() {
        let (ctl, reporter) = controller();
        ctl.register(Stub::<Params, i32>::new("add").then_return(0));
        call_add(&ctl, 1, 1);
        ctl.verify(&CallMatcher::by_method("add"), &times(1), &SourceLocation::caller());
        assert!(reporter.is_empty());
    }

    #[test]
    fn clear_invocations_keeps_stubs() {
        let (ctl, _) = controller();
        ctl.register(Stub::<Params, i32>::new("add").then_return(1));
        call_add(&ctl, 0, 0);
        ctl.clear_invocations();

        assert_eq!(ctl.invocation_count(), 0);
        assert_eq!(ctl.stub_count("add"), 1);
        assert_eq!(call_add(&ctl, 0, 0), 1);
        assert_eq!(ctl.invocations()[0].sequence(), 1);
    }

    #[test]
    fn clear_stubs_keeps_invocations() {
        let (ctl, _) = controller();
        ctl.register(Stub::<Params, i32>::new("add").then_return(1));
        call_add(&ctl, 0, 0);
        ctl.clear_stubs();

        assert_eq!(ctl.invocation_count(), 1);
        assert_eq!(ctl.stub_count("add"), 0);
    }

    #[test]
    fn reset_clears_both() {
        let (ctl, _) = controller();
        ctl.register(Stub::<Params, i32>::new("add").then_return(1));
        call_add(&ctl, 0, 0);
        ctl.reset();

        assert_eq!(ctl.invocation_count(), 0);
        assert_eq!(ctl.stub_count("add"), 0);
        assert!(try_add(&ctl, 0, 0).is_err());
        assert_eq!(ctl.invocations()[0].sequence(), 0);
    }

    #[test]
    fn defect_is_reported_before_abort() {
        let (ctl, reporter) = controller();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            call_add(&ctl, 1, 1)
        }));

        assert!(outcome.is_err());
        let failures = reporter.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message().starts_with("[calculator] No stub for method `add`"));
        assert!(failures[0].location().file().ends_with("controller.rs"));
        assert_eq!(ctl.invocation_count(), 1);
    }

    #[test]
    #[should_panic(expected = "wasn't finished")]
    fn incomplete_stub_aborts() {
        let (ctl, _) = controller();
        ctl.register(Stub::<Params, i32>::new("add"));
        call_add(&ctl, 1, 1);
    }

    #[test]
    #[should_panic(expected = "No stub for method `add` using parameters (1, 1)")]
    fn unstubbed_call_aborts_with_default_reporter() {
        let ctl = MockController::new();
        call_add(&ctl, 1, 1);
    }

    #[test]
    #[should_panic(expected = "was declared as")]
    fn mismatched_stub_types_abort() {
        let (ctl, _) = controller();
        ctl.register(Stub::<(i64, i64), i64>::new("add").then_return(5));
        call_add(&ctl, 1, 1);
    }

    #[test]
    fn controllers_do_not_share_state() {
        let (a, _) = controller();
        let (b, _) = controller();
        a.register(Stub::<Params, i32>::new("add").then_return(1));
        call_add(&a, 0, 0);

        assert_ne!(a.id(), b.id());
        assert_eq!(b.invocation_count(), 0);
        assert_eq!(b.stub_count("add"), 0);
    }

    #[test]
    fn uses_configured_name() {
        let (ctl, _) = controller();
        assert_eq!(ctl.config().name(), "calculator");
        assert!(format!("{ctl:?}").contains("calculator"));
    }
}
