//! Comparison service
//!
//! The exposed surface of the engine: ad hoc item comparison, automatic
//! execution-request comparison, and the nested diff view. Assembly is pure
//! packaging; all alignment logic lives in [`crate::aligner`] and
//! [`crate::tree`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stepdiff_common::{AttachmentStore, Result, RunSource, StepSource, TestRun};
use tracing::info;

use crate::aligner::{align, ColumnInput};
use crate::config::EngineConfig;
use crate::decorate::decorate_tree;
use crate::matrix::{ColumnHeader, CompareRow};
use crate::resolver::resolve_columns;
use crate::tree::{build_tree, DiffTreeNode};

/// Shape of an ad hoc comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareType {
    Steps,
    Tree,
}

impl Default for CompareType {
    fn default() -> Self {
        Self::Steps
    }
}

/// One explicitly chosen comparison item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareItem {
    pub execution_request_id: String,
    pub test_run_id: String,
}

/// Ad hoc comparison request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRequest {
    pub items: Vec<CompareItem>,
    #[serde(default)]
    pub compare_type: CompareType,
}

/// Non-comparable runs of one column, passed through unaligned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRuns {
    pub column_key: String,
    pub runs: Vec<TestRun>,
}

/// Flat comparison response: headers plus the aligned row grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResponse {
    pub column_headers: Vec<ColumnHeader>,
    pub rows: Vec<CompareRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<DiffTreeNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_comparable: Vec<ColumnRuns>,
}

/// Nested comparison response for drill-down views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeResponse {
    pub column_headers: Vec<ColumnHeader>,
    pub root: DiffTreeNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_comparable: Vec<ColumnRuns>,
}

/// One-shot comparison pipeline over the external collaborators
///
/// Every call allocates and owns its own matrix and tree; no state crosses
/// requests.
pub struct CompareService {
    runs: Arc<dyn RunSource>,
    steps: Arc<dyn StepSource>,
    attachments: Arc<dyn AttachmentStore>,
    config: EngineConfig,
}

impl CompareService {
    pub fn new(
        runs: Arc<dyn RunSource>,
        steps: Arc<dyn StepSource>,
        attachments: Arc<dyn AttachmentStore>,
    ) -> Self {
        Self {
            runs,
            steps,
            attachments,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config.normalized();
        self
    }

    /// Compare explicitly chosen items, one column per item.
    pub async fn compare_steps(&self, request: CompareRequest) -> Result<ComparisonResponse> {
        let mut headers = Vec::with_capacity(request.items.len());
        let mut columns = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let run = self.runs.run(&item.test_run_id).await?;
            let steps = self.steps.ordered_steps(&run.id).await?;
            headers.push(ColumnHeader {
                column_key: item.execution_request_id.clone(),
                display_name: run.name,
            });
            columns.push(ColumnInput {
                column_key: item.execution_request_id.clone(),
                steps,
            });
        }

        let matrix = align(columns);
        info!(
            items = request.items.len(),
            rows = matrix.rows.len(),
            "compared explicit items"
        );
        let tree = match request.compare_type {
            CompareType::Tree => Some(build_tree(&matrix)),
            CompareType::Steps => None,
        };
        Ok(ComparisonResponse {
            column_headers: headers,
            rows: matrix.rows,
            tree,
            non_comparable: Vec::new(),
        })
    }

    /// Auto-resolve one representative run per execution request, then align.
    pub async fn compare_execution_requests(
        &self,
        execution_request_ids: &[String],
    ) -> Result<ComparisonResponse> {
        let (headers, columns, non_comparable) =
            self.resolved_inputs(execution_request_ids).await?;
        let matrix = align(columns);
        info!(
            requests = execution_request_ids.len(),
            rows = matrix.rows.len(),
            "compared execution requests"
        );
        Ok(ComparisonResponse {
            column_headers: headers,
            rows: matrix.rows,
            tree: None,
            non_comparable,
        })
    }

    /// Full nested diff view, optionally decorated with attachments.
    pub async fn comparison_tree(
        &self,
        execution_request_ids: &[String],
        include_attachments: bool,
    ) -> Result<TreeResponse> {
        let (headers, columns, non_comparable) =
            self.resolved_inputs(execution_request_ids).await?;
        let matrix = align(columns);
        let mut root = build_tree(&matrix);
        if include_attachments {
            decorate_tree(&mut root, self.attachments.as_ref(), &self.config).await;
        }
        info!(
            requests = execution_request_ids.len(),
            rows = matrix.rows.len(),
            decorated = include_attachments,
            "built comparison tree"
        );
        Ok(TreeResponse {
            column_headers: headers,
            root,
            non_comparable,
        })
    }

    async fn resolved_inputs(
        &self,
        execution_request_ids: &[String],
    ) -> Result<(Vec<ColumnHeader>, Vec<ColumnInput>, Vec<ColumnRuns>)> {
        let resolved = resolve_columns(self.runs.as_ref(), execution_request_ids).await?;
        let mut headers = Vec::with_capacity(resolved.len());
        let mut columns = Vec::with_capacity(resolved.len());
        let mut non_comparable = Vec::new();
        for column in resolved {
            let steps = match &column.run {
                Some(run) => self.steps.ordered_steps(&run.id).await?,
                None => Vec::new(),
            };
            headers.push(ColumnHeader {
                column_key: column.column_key.clone(),
                display_name: column.display_name,
            });
            columns.push(ColumnInput {
                column_key: column.column_key.clone(),
                steps,
            });
            if !column.non_comparable.is_empty() {
                non_comparable.push(ColumnRuns {
                    column_key: column.column_key,
                    runs: column.non_comparable,
                });
            }
        }
        Ok((headers, columns, non_comparable))
    }
}
