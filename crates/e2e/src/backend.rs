//! In-memory backend implementing all collaborator contracts
//!
//! Built up-front by tests, then handed to the service behind `Arc`s. The
//! attachment store can be switched into a failing mode to exercise the
//! decorator's failure isolation.

use std::collections::HashMap;

use stepdiff_common::{
    Attachment, AttachmentStore, Error, ExecutionRequest, Result, RunSource, StepRecord,
    StepSource, TestRun,
};

#[derive(Default)]
pub struct InMemoryBackend {
    requests: HashMap<String, ExecutionRequest>,
    runs_by_request: HashMap<String, Vec<TestRun>>,
    steps_by_run: HashMap<String, Vec<StepRecord>>,
    attachments: HashMap<String, Attachment>,
    fail_attachments: bool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_request(&mut self, request: ExecutionRequest) -> &mut Self {
        self.requests.insert(request.id.clone(), request);
        self
    }

    pub fn add_run(
        &mut self,
        execution_request_id: &str,
        run: TestRun,
        steps: Vec<StepRecord>,
    ) -> &mut Self {
        self.steps_by_run.insert(run.id.clone(), steps);
        self.runs_by_request
            .entry(execution_request_id.to_string())
            .or_default()
            .push(run);
        self
    }

    pub fn add_attachment(&mut self, step_id: &str, attachment: Attachment) -> &mut Self {
        self.attachments.insert(step_id.to_string(), attachment);
        self
    }

    /// Make every attachment lookup fail, simulating a store outage.
    pub fn fail_attachments(&mut self) -> &mut Self {
        self.fail_attachments = true;
        self
    }
}

#[async_trait::async_trait]
impl StepSource for InMemoryBackend {
    async fn ordered_steps(&self, test_run_id: &str) -> Result<Vec<StepRecord>> {
        Ok(self.steps_by_run.get(test_run_id).cloned().unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl RunSource for InMemoryBackend {
    async fn execution_request(&self, execution_request_id: &str) -> Result<ExecutionRequest> {
        self.requests
            .get(execution_request_id)
            .cloned()
            .ok_or_else(|| Error::not_found("execution request", execution_request_id))
    }

    async fn runs_for_request(&self, execution_request_id: &str) -> Result<Vec<TestRun>> {
        Ok(self
            .runs_by_request
            .get(execution_request_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn run(&self, test_run_id: &str) -> Result<TestRun> {
        self.runs_by_request
            .values()
            .flatten()
            .find(|run| run.id == test_run_id)
            .cloned()
            .ok_or_else(|| Error::not_found("test run", test_run_id))
    }
}

#[async_trait::async_trait]
impl AttachmentStore for InMemoryBackend {
    async fn attachments(&self, step_ids: &[String]) -> Result<HashMap<String, Attachment>> {
        if self.fail_attachments {
            return Err(Error::Backend("attachment store unavailable".to_string()));
        }
        Ok(step_ids
            .iter()
            .filter_map(|id| self.attachments.get(id).map(|a| (id.clone(), a.clone())))
            .collect())
    }
}
