//! The matcher capability shared by stubbing and verification.
//!
//! Stubs gate on `Matcher<IN>` over the call parameters; verification filters
//! the ledger with a `Matcher<InvocationRecord>` and checks the result with a
//! `Matcher<[InvocationRecord]>`. This crate only defines the contract, plus
//! [`Predicate`] as a closure adapter. Concrete matcher sets (equality,
//! wildcards, call counts) belong to the front-end that drives the engine.

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::rc::Rc;

/// Decides whether a value satisfies a condition, and explains itself.
///
/// Only [`matches`](Self::matches) is required. The two describe hooks feed
/// verification failure messages, which read
/// `Expected <describe_to>, but <describe_mismatch>`, so a matcher fully
/// controls its own failure text.
pub trait Matcher<T: ?Sized> {
    fn matches(&self, value: &T) -> bool;

    /// Appends what a matching value looks like.
    fn describe_to(&self, description: &mut Description) {
        description.append_text("a matching value");
    }

    /// Appends why `value` failed to match.
    fn describe_mismatch(&self, value: &T, description: &mut Description) {
        let _ = value;
        description.append_text("it did not match");
    }
}

impl<T: ?Sized, M: Matcher<T> + ?Sized> Matcher<T> for &M {
    fn matches(&self, value: &T) -> bool {
        (**self).matches(value)
    }

    fn describe_to(&self, description: &mut Description) {
        (**self).describe_to(description)
    }

    fn describe_mismatch(&self, value: &T, description: &mut Description) {
        (**self).describe_mismatch(value, description)
    }
}

impl<T: ?Sized, M: Matcher<T> + ?Sized> Matcher<T> for Box<M> {
    fn matches(&self, value: &T) -> bool {
        (**self).matches(value)
    }

    fn describe_to(&self, description: &mut Description) {
        (**self).describe_to(description)
    }

    fn describe_mismatch(&self, value: &T, description: &mut Description) {
        (**self).describe_mismatch(value, description)
    }
}

impl<T: ?Sized, M: Matcher<T> + ?Sized> Matcher<T> for Rc<M> {
    fn matches(&self, value: &T) -> bool {
        (**self).matches(value)
    }

    fn describe_to(&self, description: &mut Description) {
        (**self).describe_to(description)
    }

    fn describe_mismatch(&self, value: &T, description: &mut Description) {
        (**self).describe_mismatch(value, description)
    }
}

/// Append-only text buffer matchers describe themselves into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    text: String,
}

impl Description {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    /// Appends the `Debug` rendering of `value`.
    pub fn append_value(&mut self, value: &dyn fmt::Debug) -> &mut Self {
        // Writing into a String cannot fail.
        let _ = write!(self.text, "{value:?}");
        self
    }

    /// Lets `matcher` append its expected-shape description.
    pub fn append_description_of<T, M>(&mut self, matcher: &M) -> &mut Self
    where
        T: ?Sized,
        M: Matcher<T> + ?Sized,
    {
        matcher.describe_to(self);
        self
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

type PredicateFn<T> = Rc<dyn Fn(&T) -> bool>;
type MismatchFn<T> = Rc<dyn Fn(&T, &mut Description)>;

/// A matcher backed by a closure and a fixed description.
///
/// # Example
///
/// ```rust
/// use understudy::matcher::{Matcher, predicate};
///
/// let even = predicate("an even number", |n: &i32| n % 2 == 0);
/// assert!(even.matches(&4));
/// assert!(!even.matches(&3));
/// ```
pub struct Predicate<T: ?Sized> {
    description: Cow<'static, str>,
    predicate: PredicateFn<T>,
    mismatch: Option<MismatchFn<T>>,
}

/// Builds a [`Predicate`] described as `description`.
pub fn predicate<T, F>(description: impl Into<Cow<'static, str>>, f: F) -> Predicate<T>
where
    T: ?Sized,
    F: Fn(&T) -> bool + 'static,
{
    Predicate {
        description: description.into(),
        predicate: Rc::new(f),
        mismatch: None,
    }
}

impl<T: ?Sized> Predicate<T> {
    /// Replaces the default mismatch text with a custom renderer.
    pub fn with_mismatch<F>(mut self, f: F) -> Self
    where
        F: Fn(&T, &mut Description) + 'static,
    {
        self.mismatch = Some(Rc::new(f));
        self
    }
}

impl<T: ?Sized> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            predicate: self.predicate.clone(),
            mismatch: self.mismatch.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized> Matcher<T> for Predicate<T> {
    fn matches(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    fn describe_to(&self, description: &mut Description) {
        description.append_text(&self.description);
    }

    fn describe_mismatch(&self, value: &T, description: &mut Description) {
        match &self.mismatch {
            Some(render) => render(value, description),
            None => {
                description.append_text("it did not match ");
                description.append_text(&self.description);
            }
        }
    }
}
