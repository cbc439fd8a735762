use std::{fmt, hash};
use uuid::Uuid;

/// Unique identity of one [`MockController`](crate::MockController).
///
/// Attached to every log event the controller emits, so the output of
/// several mocks in one test can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, hash::Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MockId(u128);

impl MockId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().as_u128())
    }

    pub fn value(&self) -> u128 {
        self.0
    }
}

impl From<u128> for MockId {
    fn from(value: u128) -> Self {
        MockId(value)
    }
}

impl From<MockId> for u128 {
    fn from(value: MockId) -> Self {
        value.0
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_u128(self.0))
    }
}

impl Default for MockId {
    fn default() -> Self {
        MockId::new()
    }
}
