use std::{any::Any, fmt, rc::Rc};

use crate::MethodId;

/// A record of one intercepted call.
///
/// Produced for every call before its outcome is known, whether the call
/// was stubbed, fell through to the original implementation, or aborted as
/// a defect. Records are immutable and cheap to clone: the parameter value
/// is shared.
///
/// Parameters are stored type-erased. Use [`parameters`](Self::parameters)
/// to get them back as the type the interception point passed in, or
/// [`rendered_parameters`](Self::rendered_parameters) for their `Debug` text.
#[derive(Clone)]
pub struct InvocationRecord {
    pub(crate) method: MethodId,
    pub(crate) parameters: Rc<dyn Any>,
    pub(crate) rendered: Rc<str>,
    pub(crate) sequence: u64,
}

impl InvocationRecord {
    pub(crate) fn new<IN>(method: MethodId, parameters: IN, sequence: u64) -> Self
    where
        IN: fmt::Debug + 'static,
    {
        let rendered = Rc::from(format!("{parameters:?}"));
        Self {
            method,
            parameters: Rc::new(parameters),
            rendered,
            sequence,
        }
    }

    /// Returns the intercepted member.
    #[inline]
    pub fn method(&self) -> &MethodId {
        &self.method
    }

    /// Returns the position of this call in its mock's history.
    ///
    /// Strictly increasing across calls of the same mock, also when two
    /// calls carry indistinguishable parameters.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the parameters if they were recorded as an `IN`.
    pub fn parameters<IN: 'static>(&self) -> Option<&IN> {
        self.parameters.downcast_ref::<IN>()
    }

    /// Returns the `Debug` rendering of the parameters.
    #[inline]
    pub fn rendered_parameters(&self) -> &str {
        &self.rendered
    }

    /// Returns true if this call went to `method`.
    #[inline]
    pub(crate) fn method_eq(&self, method: &MethodId) -> bool {
        self.method == *method
    }
}

impl fmt::Debug for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationRecord")
            .field("method", &self.method)
            .field("parameters", &self.rendered)
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl fmt::Display for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}{}", self.sequence, self.method, self.rendered)
    }
}
