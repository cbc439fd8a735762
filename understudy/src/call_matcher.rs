//! Call filters for verification.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::{
    InvocationRecord, MethodId,
    matcher::{Description, Matcher},
};

type MatchFn = Rc<dyn Fn(&InvocationRecord) -> bool>;

/// A matcher selecting recorded calls for verification.
///
/// `CallMatcher` can match calls by:
/// - Method (exact name)
/// - Parameters (any `Matcher` over the parameter type)
/// - Custom predicate over the whole record
///
/// # Example
///
/// ```rust
/// use understudy::{CallMatcher, matcher::predicate};
///
/// // All calls to `add`
/// let adds = CallMatcher::by_method("add");
///
/// // Calls to `add` whose first operand is 2
/// let adds_of_two = CallMatcher::call("add", predicate("(2, _)", |p: &(i32, i32)| p.0 == 2));
///
/// // Anything after the fifth call
/// let late = CallMatcher::by_record("late calls", |r| r.sequence() >= 5);
/// ```
#[derive(Clone)]
pub struct CallMatcher {
    matcher: MatchFn,
    description: Cow<'static, str>,
}

impl fmt::Debug for CallMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl CallMatcher {
    /// Match every recorded call.
    pub fn any() -> Self {
        Self {
            matcher: Rc::new(|_| true),
            description: Cow::Borrowed("any call"),
        }
    }

    /// Match calls to `method`.
    pub fn by_method(method: impl Into<MethodId>) -> Self {
        let method = method.into();
        Self {
            description: Cow::Owned(format!("calls to `{method}`")),
            matcher: Rc::new(move |record| record.method_eq(&method)),
        }
    }

    /// Match calls whose parameters were recorded as an `IN` accepted by
    /// `matcher`. Calls recorded with another parameter type never match.
    pub fn by_parameters<IN, M>(matcher: M) -> Self
    where
        IN: 'static,
        M: Matcher<IN> + 'static,
    {
        let mut description = Description::new();
        description.append_text("with parameters ");
        matcher.describe_to(&mut description);
        Self {
            description: Cow::Owned(description.into_string()),
            matcher: Rc::new(move |record| {
                record
                    .parameters::<IN>()
                    .is_some_and(|parameters| matcher.matches(parameters))
            }),
        }
    }

    /// Match calls using a custom predicate on the record.
    pub fn by_record<F>(description: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&InvocationRecord) -> bool + 'static,
    {
        Self {
            matcher: Rc::new(predicate),
            description: description.into(),
        }
    }

    /// Match calls to `method` whose parameters `matcher` accepts.
    pub fn call<IN, M>(method: impl Into<MethodId>, matcher: M) -> Self
    where
        IN: 'static,
        M: Matcher<IN> + 'static,
    {
        Self::by_method(method).and(Self::by_parameters(matcher))
    }

    /// Match calls accepted by both `self` and `other`.
    pub fn and(self, other: CallMatcher) -> Self {
        let (left, right) = (self.matcher, other.matcher);
        Self {
            description: Cow::Owned(format!("{} {}", self.description, other.description)),
            matcher: Rc::new(move |record| left(record) && right(record)),
        }
    }
}

impl Matcher<InvocationRecord> for CallMatcher {
    fn matches(&self, record: &InvocationRecord) -> bool {
        (self.matcher)(record)
    }

    fn describe_to(&self, description: &mut Description) {
        description.append_text(&self.description);
    }
}

impl From<&str> for CallMatcher {
    fn from(method: &str) -> Self {
        CallMatcher::by_method(method)
    }
}

impl From<MethodId> for CallMatcher {
    fn from(method: MethodId) -> Self {
        CallMatcher::by_method(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::predicate;

    fn record(method: &str, parameters: (i32, i32), sequence: u64) -> InvocationRecord {
        InvocationRecord::new(MethodId::new(method), parameters, sequence)
    }

    #[test]
    fn method_matcher_matches_by_name() {
        let matcher = CallMatcher::by_method("add");
        assert!(matcher.matches(&record("add", (1, 2), 0)));
        assert!(!matcher.matches(&record("sub", (1, 2), 1)));
    }

    #[test]
    fn parameter_matcher_checks_type_and_value() {
        let matcher = CallMatcher::by_parameters(predicate("(2, 3)", |p: &(i32, i32)| *p == (2, 3)));
        assert!(matcher.matches(&record("add", (2, 3), 0)));
        assert!(!matcher.matches(&record("add", (3, 2), 1)));

        let other_type = InvocationRecord::new(MethodId::new("add"), (2i64, 3i64), 2);
        assert!(!matcher.matches(&other_type));
    }

    #[test]
    fn call_combines_method_and_parameters() {
        let matcher = CallMatcher::call("add", predicate("(2, _)", |p: &(i32, i32)| p.0 == 2));
        assert!(matcher.matches(&record("add", (2, 9), 0)));
        assert!(!matcher.matches(&record("sub", (2, 9), 1)));
        assert!(!matcher.matches(&record("add", (1, 9), 2)));

        let mut description = Description::new();
        matcher.describe_to(&mut description);
        assert_eq!(description.as_str(), "calls to `add` with parameters (2, _)");
    }

    #[test]
    fn record_matcher_uses_predicate() {
        let matcher = CallMatcher::by_record("late calls", |r| r.sequence() >= 5);
        assert!(matcher.matches(&record("add", (0, 0), 5)));
        assert!(!matcher.matches(&record("add", (0, 0), 4)));
    }

    #[test]
    fn conversions_create_method_matchers() {
        let from_str: CallMatcher = "add".into();
        let from_id: CallMatcher = MethodId::getter("total").into();
        assert!(from_str.matches(&record("add", (0, 0), 0)));
        assert!(from_id.matches(&InvocationRecord::new(MethodId::getter("total"), (), 1)));
        assert!(CallMatcher::any().matches(&record("anything", (0, 0), 2)));
    }
}
