#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Understudy
//!
//! The runtime engine behind hand-written or generated test doubles.
//!
//! Understudy owns everything a mock needs at run time: the stubs declared
//! for each intercepted member, the ledger of calls made to it, the rules
//! that pick the answer to a call, and the verification of recorded calls.
//! A stubbing DSL, a verification DSL and a code generator can sit on top;
//! the engine itself only deals in method identifiers, typed parameters and
//! matchers.
//!
//! ## Quick Start
//!
//! ```rust
//! use understudy::{CallMatcher, InvocationRecord, MockController, SourceLocation, Stub, matcher::predicate};
//!
//! trait Calculator {
//!     fn add(&self, a: i32, b: i32) -> i32;
//! }
//!
//! // Interception layer, usually generated.
//! struct MockCalculator {
//!     controller: MockController,
//! }
//!
//! impl Calculator for MockCalculator {
//!     fn add(&self, a: i32, b: i32) -> i32 {
//!         self.controller.call("add", (a, b), None)
//!     }
//! }
//!
//! let mock = MockCalculator { controller: MockController::new() };
//! mock.controller.register(
//!     Stub::<(i32, i32), i32>::new("add")
//!         .with_matcher(predicate("(2, 3)", |p: &(i32, i32)| *p == (2, 3)))
//!         .then_return(5),
//! );
//!
//! assert_eq!(mock.add(2, 3), 5);
//! assert_eq!(mock.add(2, 3), 5);
//!
//! let twice = predicate("2 calls", |calls: &[InvocationRecord]| calls.len() == 2);
//! mock.controller.verify(&CallMatcher::by_method("add"), &twice, &SourceLocation::caller());
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MockController`] | Per-instance owner of stubs and call history |
//! | [`Stub`] | Method, parameter matchers and queued outputs |
//! | [`Output`] | One declared response: value, error, answer or call-through |
//! | [`StubRegistry`] | Stubs per method, newest first |
//! | [`CallLedger`] | Append-only record of intercepted calls |
//! | [`InvocationRecord`] | One recorded call with its parameters and sequence number |
//! | [`CallMatcher`] | Selects recorded calls for verification |
//! | [`FailureReporter`] | Receives failures with their source location |
//! | [`MethodId`] | Name of an intercepted method or property accessor |
//!
//! ## Resolution
//!
//! Every intercepted call is recorded before it is answered. The newest
//! stub of the method whose matchers all accept the parameters wins, and
//! its outputs are consumed in order with the last one repeating. A call no
//! stub answers falls through to the original implementation when one is
//! given; otherwise it is a defect that is reported and aborts the test.
//!
//! ## Features
//!
//! - **`serde`** - JSON export of the call ledger (`MockController::ledger_to_json()`)
//!   and serialization of [`MockConfig`], [`MethodId`] and [`MockId`]

mod call_matcher;
mod config;
mod controller;
mod error;
mod invocation;
mod ledger;
mod method_id;
mod mock_id;
mod output;
mod registry;
mod reporter;
mod resolution;
mod source_location;
mod stub;
mod stubbing_handle;
mod verification;
mod verification_handle;

pub mod matcher;

pub use call_matcher::CallMatcher;
pub use config::MockConfig;
pub use controller::MockController;
pub use error::Error;
pub use invocation::InvocationRecord;
pub use ledger::CallLedger;
pub use method_id::MethodId;
pub use mock_id::MockId;
pub use output::Output;
pub use registry::StubRegistry;
pub use reporter::{Failure, FailureReporter, PanicReporter, RecordingReporter};
pub use source_location::SourceLocation;
pub use stub::Stub;
pub use stubbing_handle::StubbingHandle;
pub use verification_handle::VerificationHandle;

/// Convenience alias for `Result<T, understudy::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
