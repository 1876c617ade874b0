//! Common types and collaborator contracts for StepDiff
//!
//! Everything the comparison engine shares with its callers lives here:
//! the step/run domain model, the error taxonomy, and the async traits
//! behind which persistence and attachment storage are hidden.

pub mod error;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use source::{AttachmentStore, RunSource, StepSource};
pub use types::{
    AncestorKind, AncestorRef, Attachment, ExecutionRequest, MetaInfo, RunStatus, StepKind,
    StepRecord, StepStatus, TestRun,
};
