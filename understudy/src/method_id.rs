use std::{hash::Hash, sync::Arc};

/// Identifier of one intercepted member: a method, a property getter or a
/// property setter.
///
/// `MethodId` is the key of the stub registry and the name stored in every
/// [`InvocationRecord`](crate::InvocationRecord). It must be stable for the
/// lifetime of a mock, so interception points usually build it from a
/// `&'static str`.
///
/// Property accessors get a synthesized name so a getter and a setter of the
/// same property never share stubs:
///
/// ```rust
/// use understudy::MethodId;
///
/// assert_eq!(MethodId::getter("volume").as_str(), "get:volume");
/// assert_eq!(MethodId::setter("volume").as_str(), "set:volume");
/// assert_eq!(MethodId::from("play").as_str(), "play");
/// ```
#[derive(Debug, Clone, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodId(Arc<str>);

impl MethodId {
    pub const GETTER_PREFIX: &'static str = "get:";
    pub const SETTER_PREFIX: &'static str = "set:";

    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    /// Name of the getter of `property`.
    pub fn getter(property: &str) -> Self {
        Self(Arc::from(format!("{}{property}", Self::GETTER_PREFIX)))
    }

    /// Name of the setter of `property`.
    pub fn setter(property: &str) -> Self {
        Self(Arc::from(format!("{}{property}", Self::SETTER_PREFIX)))
    }

    /// Returns the string representation of this method ID.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this ID names a property getter.
    pub fn is_getter(&self) -> bool {
        self.0.starts_with(Self::GETTER_PREFIX)
    }

    /// Returns true if this ID names a property setter.
    pub fn is_setter(&self) -> bool {
        self.0.starts_with(Self::SETTER_PREFIX)
    }
}

impl PartialEq for MethodId {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for MethodId {}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Hash for MethodId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl From<&str> for MethodId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MethodId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&MethodId> for MethodId {
    fn from(id: &MethodId) -> Self {
        id.clone()
    }
}
