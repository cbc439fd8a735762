use std::fmt;

use crate::{Error, MethodId, Result, StubRegistry, output::Reply};

/// Finds the stub answering a call and consumes its next output.
///
/// Stubs of `method` are scanned newest first and the first one whose
/// matchers all accept `parameters` wins; older stubs are shadowed.
/// Returns `Ok(None)` if no stub matched.
///
/// # Errors
///
/// - [`Error::IncompleteStub`] if the winning stub declared no output.
/// - [`Error::StubTypeMismatch`] if a stub of `method` was declared with
///   other types than `IN`, `OUT`, `ERR`.
pub(crate) fn select_reply<IN, OUT, ERR>(
    registry: &mut StubRegistry,
    method: &MethodId,
    parameters: &IN,
) -> Result<Option<Reply<IN, OUT, ERR>>>
where
    IN: fmt::Debug + 'static,
    OUT: Clone + 'static,
    ERR: Clone + 'static,
{
    let stubs = registry.lookup_mut::<IN, OUT, ERR>(method)?;
    let Some(stub) = stubs.into_iter().find(|stub| stub.matches(parameters)) else {
        return Ok(None);
    };
    match stub.next_reply() {
        Some(reply) => Ok(Some(reply)),
        None => Err(Error::IncompleteStub {
            method: method.clone(),
            parameters: format!("{parameters:?}"),
        }),
    }
}
