use crate::MethodId;

/// The single error type for engine defects and verification failures.
///
/// Errors declared by a stub (`Output::Error`) are *not* represented here:
/// they travel through the intercepted member's own `Result<OUT, ERR>` like
/// any real failure would. Variants of this enum describe a broken test
/// setup ([`is_fatal`](Self::is_fatal)) or a failed verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(
        "Stubbing of method `{method}` using parameters {parameters} wasn't finished (no output was declared)."
    )]
    IncompleteStub {
        method: MethodId,
        parameters: String,
    },

    #[error(
        "No stub for method `{method}` using parameters {parameters} and no original implementation was provided."
    )]
    UnstubbedCall {
        method: MethodId,
        parameters: String,
    },

    #[error("Stub for method `{method}` was declared as `{declared}` but the method is called as `{called}`.")]
    StubTypeMismatch {
        method: MethodId,
        declared: String,
        called: String,
    },

    #[error("{0}")]
    VerificationMismatch(String),
}

impl Error {
    /// Returns true for defects that abort the current test.
    ///
    /// Verification mismatches are reported and the test keeps running.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::VerificationMismatch(_))
    }

    /// The method the defect was raised for, if any.
    pub fn method(&self) -> Option<&MethodId> {
        match self {
            Error::IncompleteStub { method, .. }
            | Error::UnstubbedCall { method, .. }
            | Error::StubTypeMismatch { method, .. } => Some(method),
            Error::VerificationMismatch(_) => None,
        }
    }
}
