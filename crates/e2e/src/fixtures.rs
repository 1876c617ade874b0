//! Fluent fixtures for runs and step records
//!
//! Definition ids are derived from step names so that same-named steps in
//! different runs share a stable identity, the way a real step source
//! assigns them across reruns. Content hashes use sha256 over the rendered
//! step, which keeps fixtures deterministic.

use sha2::{Digest, Sha256};
use stepdiff_common::{
    AncestorKind, AncestorRef, ExecutionRequest, MetaInfo, StepKind, StepRecord, StepStatus,
    TestRun,
};

fn definition_id(name: &str) -> String {
    format!("def-{}", name.to_lowercase().replace(' ', "-"))
}

fn content_hash(name: &str, sequence: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hex::encode(hasher.finalize())
}

/// Ancestor segment for a compound step definition
pub fn compound_ref(name: &str) -> AncestorRef {
    AncestorRef {
        id: format!("anc-{}", definition_id(name)),
        name: name.to_string(),
        kind: AncestorKind::Compound,
        depth: 0,
        meta: Some(MetaInfo {
            definition_id: definition_id(name),
            hash: content_hash(name, 0),
            sequence: 0,
            compound: true,
        }),
    }
}

/// Builder for one step record
pub struct StepBuilder {
    id: String,
    name: String,
    kind: StepKind,
    status: StepStatus,
    ancestors: Vec<AncestorRef>,
    sequence: u64,
    has_preview: bool,
    with_meta: bool,
}

/// Start building a step; the id doubles as the attachment key.
pub fn step(id: &str, name: &str) -> StepBuilder {
    StepBuilder {
        id: id.to_string(),
        name: name.to_string(),
        kind: StepKind::Action,
        status: StepStatus::Passed,
        ancestors: Vec::new(),
        sequence: 0,
        has_preview: false,
        with_meta: true,
    }
}

impl StepBuilder {
    pub fn kind(mut self, kind: StepKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn status(mut self, status: StepStatus) -> Self {
        self.status = status;
        self
    }

    pub fn under(mut self, ancestor: AncestorRef) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    pub fn under_compound(self, name: &str) -> Self {
        self.under(compound_ref(name))
    }

    pub fn sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_preview(mut self) -> Self {
        self.has_preview = true;
        self
    }

    /// Drop the metaInfo block entirely, forcing name-only matching.
    pub fn without_meta(mut self) -> Self {
        self.with_meta = false;
        self
    }

    pub fn build(mut self) -> StepRecord {
        for (depth, ancestor) in self.ancestors.iter_mut().enumerate() {
            ancestor.depth = depth as u32;
        }
        let meta = self.with_meta.then(|| MetaInfo {
            definition_id: definition_id(&self.name),
            hash: content_hash(&self.name, self.sequence),
            sequence: self.sequence,
            compound: self.kind == StepKind::Compound,
        });
        StepRecord {
            id: self.id,
            name: self.name,
            kind: self.kind,
            status: self.status,
            meta,
            ancestors: self.ancestors,
            has_preview: self.has_preview,
        }
    }
}

pub fn run(id: &str, name: &str, test_case_id: Option<&str>) -> TestRun {
    TestRun {
        id: id.to_string(),
        name: name.to_string(),
        test_case_id: test_case_id.map(str::to_string),
        status: Default::default(),
        started_at: None,
    }
}

pub fn request(id: &str, name: &str, test_plan_id: Option<&str>) -> ExecutionRequest {
    ExecutionRequest {
        id: id.to_string(),
        name: name.to_string(),
        test_plan_id: test_plan_id.map(str::to_string),
    }
}
