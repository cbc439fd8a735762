use std::{convert::Infallible, fmt, rc::Rc};

type AnswerFn<IN, OUT, ERR> = Rc<dyn Fn(&IN) -> Result<OUT, ERR>>;

/// What a stub yields when it matches a call.
///
/// `ERR` is the error type of the intercepted member. Members that cannot
/// fail use the default `Infallible`, which makes an `Error` output for them
/// impossible to construct.
pub enum Output<IN, OUT, ERR = Infallible> {
    /// Return this value.
    ReturnValue(OUT),
    /// Fail with this error through the member's own `Result`.
    Error(ERR),
    /// Run the original implementation as if no stub had matched.
    CallRealImplementation,
    /// Compute the result from the call parameters.
    Answer(AnswerFn<IN, OUT, ERR>),
}

impl<IN, OUT, ERR> Output<IN, OUT, ERR> {
    pub fn answer<F>(f: F) -> Self
    where
        F: Fn(&IN) -> Result<OUT, ERR> + 'static,
    {
        Output::Answer(Rc::new(f))
    }

    /// Turns a dequeued output into the reply it produces.
    pub(crate) fn into_reply(self) -> Reply<IN, OUT, ERR> {
        match self {
            Output::ReturnValue(value) => Reply::Ready(Ok(value)),
            Output::Error(err) => Reply::Ready(Err(err)),
            Output::CallRealImplementation => Reply::CallReal,
            Output::Answer(f) => Reply::Answer(f),
        }
    }

    /// Produces the reply of an output that stays queued.
    pub(crate) fn to_reply(&self) -> Reply<IN, OUT, ERR>
    where
        OUT: Clone,
        ERR: Clone,
    {
        match self {
            Output::ReturnValue(value) => Reply::Ready(Ok(value.clone())),
            Output::Error(err) => Reply::Ready(Err(err.clone())),
            Output::CallRealImplementation => Reply::CallReal,
            Output::Answer(f) => Reply::Answer(f.clone()),
        }
    }
}

impl<IN, OUT: fmt::Debug, ERR: fmt::Debug> fmt::Debug for Output<IN, OUT, ERR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::ReturnValue(value) => f.debug_tuple("ReturnValue").field(value).finish(),
            Output::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Output::CallRealImplementation => f.write_str("CallRealImplementation"),
            Output::Answer(_) => f.write_str("Answer(..)"),
        }
    }
}

/// Outcome of applying an output, detached from the stub that held it.
///
/// Answers are returned unevaluated so the caller can run them after
/// releasing its borrow of the registry.
pub(crate) enum Reply<IN, OUT, ERR> {
    Ready(Result<OUT, ERR>),
    Answer(AnswerFn<IN, OUT, ERR>),
    CallReal,
}
