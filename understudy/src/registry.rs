use std::{
    any::{Any, type_name},
    collections::HashMap,
    fmt,
};

use crate::{Error, MethodId, Result, Stub};

/// Type-erased stub plus the signature it was declared with.
struct StubEntry {
    stub: Box<dyn Any>,
    signature: String,
}

impl StubEntry {
    fn new<IN: 'static, OUT: 'static, ERR: 'static>(stub: Stub<IN, OUT, ERR>) -> Self {
        Self {
            stub: Box::new(stub),
            signature: signature::<IN, OUT, ERR>(),
        }
    }

    fn mismatch<IN: 'static, OUT: 'static, ERR: 'static>(&self, method: &MethodId) -> Error {
        Error::StubTypeMismatch {
            method: method.clone(),
            declared: self.signature.clone(),
            called: signature::<IN, OUT, ERR>(),
        }
    }
}

/// Human-readable member signature used in type mismatch reports.
pub(crate) fn signature<IN, OUT, ERR>() -> String {
    format!(
        "fn({}) -> Result<{}, {}>",
        type_name::<IN>(),
        type_name::<OUT>(),
        type_name::<ERR>()
    )
}

/// Stubs of one mock, keyed by method, newest first.
///
/// Pure storage: the registry never evaluates matchers. Stubs of different
/// methods have different parameter and result types, so they are stored
/// type-erased and recovered with a checked downcast on lookup; a stub
/// looked up with types other than the ones it was declared with yields
/// [`Error::StubTypeMismatch`].
#[derive(Default)]
pub struct StubRegistry {
    stubs: HashMap<MethodId, Vec<StubEntry>>,
}

impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `stub` in front of the stubs already registered for its method.
    pub fn register<IN, OUT, ERR>(&mut self, stub: Stub<IN, OUT, ERR>)
    where
        IN: 'static,
        OUT: 'static,
        ERR: 'static,
    {
        self.stubs
            .entry(stub.method().clone())
            .or_default()
            .insert(0, StubEntry::new(stub));
    }

    /// Returns the stubs of `method`, most recently registered first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StubTypeMismatch`] if a stub of `method` was declared
    /// with other parameter or result types.
    pub fn lookup<IN, OUT, ERR>(&self, method: &MethodId) -> Result<Vec<&Stub<IN, OUT, ERR>>>
    where
        IN: 'static,
        OUT: 'static,
        ERR: 'static,
    {
        let Some(entries) = self.stubs.get(method) else {
            return Ok(Vec::new());
        };
        entries
            .iter()
            .map(|entry| {
                entry
                    .stub
                    .downcast_ref::<Stub<IN, OUT, ERR>>()
                    .ok_or_else(|| entry.mismatch::<IN, OUT, ERR>(method))
            })
            .collect()
    }

    /// Mutable variant of [`lookup`](Self::lookup), used to consume outputs.
    pub(crate) fn lookup_mut<IN, OUT, ERR>(
        &mut self,
        method: &MethodId,
    ) -> Result<Vec<&mut Stub<IN, OUT, ERR>>>
    where
        IN: 'static,
        OUT: 'static,
        ERR: 'static,
    {
        let Some(entries) = self.stubs.get_mut(method) else {
            return Ok(Vec::new());
        };
        let mut stubs = Vec::with_capacity(entries.len());
        for entry in entries.iter_mut() {
            if !entry.stub.is::<Stub<IN, OUT, ERR>>() {
                return Err(entry.mismatch::<IN, OUT, ERR>(method));
            }
            if let Some(stub) = entry.stub.downcast_mut::<Stub<IN, OUT, ERR>>() {
                stubs.push(stub);
            }
        }
        Ok(stubs)
    }

    /// Number of stubs registered for `method`.
    pub fn count(&self, method: &MethodId) -> usize {
        self.stubs.get(method).map_or(0, Vec::len)
    }

    /// Methods that have at least one stub.
    pub fn methods(&self) -> impl Iterator<Item = &MethodId> {
        self.stubs.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.values().all(Vec::is_empty)
    }

    /// Removes every stub of every method.
    pub fn clear(&mut self) {
        self.stubs.clear();
    }
}

impl fmt::Debug for StubRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (method, entries) in &self.stubs {
            map.entry(&method.as_str(), &entries.len());
        }
        map.finish()
    }
}
