//! Transaction orchestration core.
//!
//! One shared [`TokenContext`] holds the signing identity and the nonce
//! counter; [`BatchDispatcher`] fans batches out over it. Pipeline order per
//! item is validate → estimate → allocate → submit, so a call that cannot
//! succeed never consumes a sequence slot.

pub mod context;
pub mod dispatcher;
pub mod estimator;
pub mod submitter;

pub use context::TokenContext;
pub use dispatcher::BatchDispatcher;
pub use submitter::Submission;
