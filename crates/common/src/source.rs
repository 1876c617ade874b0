//! Contracts for the external collaborators of the comparison engine
//!
//! Step and run persistence, run selection, and attachment storage are out
//! of scope for the engine; it consumes them only through these traits.

use std::collections::HashMap;

use crate::error::Result;
use crate::types::{Attachment, ExecutionRequest, StepRecord, TestRun};

/// Supplies recorded steps for a single test run
#[async_trait::async_trait]
pub trait StepSource: Send + Sync {
    /// Steps for one run, already flattened depth-first with ancestor
    /// chains and metaInfo populated, ordered by creation time.
    async fn ordered_steps(&self, test_run_id: &str) -> Result<Vec<StepRecord>>;
}

/// Supplies execution requests and their candidate test runs
#[async_trait::async_trait]
pub trait RunSource: Send + Sync {
    async fn execution_request(&self, execution_request_id: &str) -> Result<ExecutionRequest>;

    /// Candidate runs of one execution request, in persisted order.
    async fn runs_for_request(&self, execution_request_id: &str) -> Result<Vec<TestRun>>;

    async fn run(&self, test_run_id: &str) -> Result<TestRun>;
}

/// Batched lookup of step screenshots / previews
#[async_trait::async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Attachment content keyed by step id. Ids without stored content are
    /// simply absent from the returned map.
    async fn attachments(&self, step_ids: &[String]) -> Result<HashMap<String, Attachment>>;
}
