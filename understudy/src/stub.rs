use std::{collections::VecDeque, convert::Infallible, fmt};

use crate::{
    MethodId, Output,
    matcher::{Description, Matcher},
    output::Reply,
};

/// A matcher-gated override of one member's behavior.
///
/// A stub matches a call when **every** parameter matcher accepts the call
/// parameters; a stub without matchers matches every call to its method.
/// Outputs are consumed front to back, one per matching call, until a single
/// output remains. That last output is then reused for every further
/// matching call, so `then_return(v)` alone answers any number of calls.
///
/// # Example
///
/// ```rust
/// use understudy::{Stub, matcher::predicate};
///
/// let stub = Stub::<(i32, i32), i32>::new("add")
///     .with_matcher(predicate("(2, 3)", |p: &(i32, i32)| *p == (2, 3)))
///     .then_return(5);
/// assert!(stub.matches(&(2, 3)));
/// assert!(!stub.matches(&(1, 1)));
/// ```
pub struct Stub<IN, OUT, ERR = Infallible> {
    method: MethodId,
    parameter_matchers: Vec<Box<dyn Matcher<IN>>>,
    outputs: VecDeque<Output<IN, OUT, ERR>>,
}

impl<IN, OUT, ERR> Stub<IN, OUT, ERR> {
    pub fn new(method: impl Into<MethodId>) -> Self {
        Self {
            method: method.into(),
            parameter_matchers: Vec::new(),
            outputs: VecDeque::new(),
        }
    }

    /// Adds a parameter matcher. All matchers must accept a call.
    pub fn with_matcher<M>(mut self, matcher: M) -> Self
    where
        M: Matcher<IN> + 'static,
    {
        self.parameter_matchers.push(Box::new(matcher));
        self
    }

    /// Queues an output behind the ones already declared.
    pub fn then(mut self, output: Output<IN, OUT, ERR>) -> Self {
        self.outputs.push_back(output);
        self
    }

    pub fn then_return(self, value: OUT) -> Self {
        self.then(Output::ReturnValue(value))
    }

    pub fn then_error(self, err: ERR) -> Self {
        self.then(Output::Error(err))
    }

    pub fn then_call_real_implementation(self) -> Self {
        self.then(Output::CallRealImplementation)
    }

    pub fn then_answer<F>(self, f: F) -> Self
    where
        F: Fn(&IN) -> Result<OUT, ERR> + 'static,
    {
        self.then(Output::answer(f))
    }

    #[inline]
    pub fn method(&self) -> &MethodId {
        &self.method
    }

    /// Returns true if every parameter matcher accepts `parameters`.
    pub fn matches(&self, parameters: &IN) -> bool {
        self.parameter_matchers.iter().all(|m| m.matches(parameters))
    }

    /// Number of outputs still queued.
    #[inline]
    pub fn outputs_remaining(&self) -> usize {
        self.outputs.len()
    }

    /// Describes the parameter matchers, joined with `and`.
    pub fn describe_matchers(&self) -> String {
        if self.parameter_matchers.is_empty() {
            return "any parameters".to_owned();
        }
        let mut description = Description::new();
        for (i, matcher) in self.parameter_matchers.iter().enumerate() {
            if i > 0 {
                description.append_text(" and ");
            }
            matcher.describe_to(&mut description);
        }
        description.into_string()
    }

    /// Consumes the next output.
    ///
    /// Pops the front output while more than one is queued; the last one is
    /// answered without removing it. Returns `None` when nothing was declared.
    pub(crate) fn next_reply(&mut self) -> Option<Reply<IN, OUT, ERR>>
    where
        OUT: Clone,
        ERR: Clone,
    {
        if self.outputs.len() > 1 {
            self.outputs.pop_front().map(Output::into_reply)
        } else {
            self.outputs.front().map(Output::to_reply)
        }
    }
}

impl<IN, OUT, ERR> fmt::Debug for Stub<IN, OUT, ERR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stub")
            .field("method", &self.method)
            .field("parameter_matchers", &self.parameter_matchers.len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}
