use std::fmt;

use crate::{InvocationRecord, MethodId};

/// Ordered, append-only history of the calls made to one mock.
///
/// The ledger owns the sequence counter. [`clear`](Self::clear) drops the
/// records but keeps counting, so a sequence number is never handed out
/// twice between two [`reset`](Self::reset)s.
pub struct CallLedger {
    records: Vec<InvocationRecord>,
    next_sequence: u64,
}

impl CallLedger {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    /// Appends a call and returns the record that was stored.
    pub fn record<IN>(&mut self, method: MethodId, parameters: IN) -> &InvocationRecord
    where
        IN: fmt::Debug + 'static,
    {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.records
            .push(InvocationRecord::new(method, parameters, sequence));
        &self.records[self.records.len() - 1]
    }

    /// Returns every record in call order.
    #[inline]
    pub fn all(&self) -> &[InvocationRecord] {
        &self.records
    }

    /// Returns the records of calls to `method`, in call order.
    pub fn for_method<'a>(
        &'a self,
        method: &'a MethodId,
    ) -> impl Iterator<Item = &'a InvocationRecord> + 'a {
        self.records.iter().filter(move |r| r.method_eq(method))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sequence number the next recorded call will get.
    #[inline]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Drops all records. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Drops all records and restarts sequence numbers at zero.
    pub fn reset(&mut self) {
        self.records.clear();
        self.next_sequence = 0;
    }
}

impl Default for CallLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallLedger")
            .field("records", &self.records.len())
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}

#[cfg(feature = "serde")]
mod export {
    use serde::Serialize;

    use super::CallLedger;
    use crate::InvocationRecord;

    #[derive(Serialize)]
    struct RecordExport<'a> {
        method: &'a str,
        parameters: &'a str,
        sequence: u64,
    }

    impl<'a> From<&'a InvocationRecord> for RecordExport<'a> {
        fn from(record: &'a InvocationRecord) -> Self {
            Self {
                method: record.method().as_str(),
                parameters: record.rendered_parameters(),
                sequence: record.sequence(),
            }
        }
    }

    impl CallLedger {
        /// Serializes the ledger as a JSON array of
        /// `{method, parameters, sequence}` objects, parameters in their
        /// `Debug` rendering.
        ///
        /// # Errors
        ///
        /// Returns any serialization error produced by `serde_json`.
        pub fn to_json(&self) -> serde_json::Result<String> {
            let exports: Vec<RecordExport<'_>> = self.all().iter().map(Into::into).collect();
            serde_json::to_string_pretty(&exports)
        }
    }
}
