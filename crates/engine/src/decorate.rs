//! Screenshot Decorator
//!
//! Strictly separate post-pass over a finished diff tree: collects the step
//! ids of populated leaf cells, fetches their attachments in bounded
//! concurrent batches, and merges the results back by step id. A failed
//! batch is logged and skipped; it never aborts the rest of the tree.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use stepdiff_common::{Attachment, AttachmentStore};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::tree::DiffTreeNode;

fn collect_step_ids(node: &DiffTreeNode, out: &mut Vec<String>) {
    for row in &node.rows {
        for cell in &row.cells {
            if let Some(step) = &cell.step {
                out.push(step.id.clone());
            }
        }
    }
    for child in &node.children {
        collect_step_ids(child, out);
    }
}

fn apply(node: &mut DiffTreeNode, fetched: &HashMap<String, Attachment>) {
    for row in &mut node.rows {
        for cell in &mut row.cells {
            if let Some(step) = &cell.step {
                if let Some(attachment) = fetched.get(&step.id) {
                    cell.attachment = Some(attachment.clone());
                }
            }
        }
    }
    for child in &mut node.children {
        apply(child, fetched);
    }
}

/// Enrich tree leaves with attachment content, cell by cell.
///
/// Fetches are independent of alignment; a missing or failed fetch leaves
/// that cell's attachment slot empty.
pub async fn decorate_tree(
    root: &mut DiffTreeNode,
    store: &dyn AttachmentStore,
    config: &EngineConfig,
) {
    let mut step_ids = Vec::new();
    collect_step_ids(root, &mut step_ids);
    if step_ids.is_empty() {
        return;
    }

    let batch_size = config.attachment_batch_size.max(1);
    let batches: Vec<Vec<String>> = step_ids
        .chunks(batch_size)
        .map(|chunk| chunk.to_vec())
        .collect();

    let mut fetched: HashMap<String, Attachment> = HashMap::new();
    let mut results = stream::iter(batches)
        .map(|batch| async move {
            let result = store.attachments(&batch).await;
            (batch, result)
        })
        .buffer_unordered(config.max_concurrent_fetches.max(1));

    while let Some((batch, result)) = results.next().await {
        match result {
            Ok(map) => fetched.extend(map),
            Err(err) => {
                warn!(
                    batch_size = batch.len(),
                    error = %err,
                    "attachment fetch failed, leaving cells undecorated"
                );
            }
        }
    }

    debug!(
        requested = step_ids.len(),
        fetched = fetched.len(),
        "decorated comparison tree"
    );
    apply(root, &fetched);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::{align, ColumnInput};
    use crate::tree::build_tree;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stepdiff_common::{Error, MetaInfo, Result, StepKind, StepRecord, StepStatus};

    struct FakeStore {
        calls: AtomicUsize,
        known: Vec<String>,
    }

    #[async_trait::async_trait]
    impl AttachmentStore for FakeStore {
        async fn attachments(&self, step_ids: &[String]) -> Result<HashMap<String, Attachment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(step_ids
                .iter()
                .filter(|id| self.known.contains(id))
                .map(|id| (id.clone(), Attachment::from_bytes("image/png", b"shot")))
                .collect())
        }
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl AttachmentStore for BrokenStore {
        async fn attachments(&self, _step_ids: &[String]) -> Result<HashMap<String, Attachment>> {
            Err(Error::Backend("attachment store down".to_string()))
        }
    }

    fn step(id: &str, name: &str) -> StepRecord {
        StepRecord {
            id: id.to_string(),
            name: name.to_string(),
            kind: StepKind::Action,
            status: StepStatus::Passed,
            meta: Some(MetaInfo {
                definition_id: format!("def-{name}"),
                hash: format!("hash-{name}"),
                sequence: 0,
                compound: false,
            }),
            ancestors: vec![],
            has_preview: true,
        }
    }

    fn sample_tree() -> crate::tree::DiffTreeNode {
        let matrix = align(vec![
            ColumnInput {
                column_key: "a".to_string(),
                steps: vec![step("s1", "open"), step("s2", "close")],
            },
            ColumnInput {
                column_key: "b".to_string(),
                steps: vec![step("s3", "open")],
            },
        ]);
        build_tree(&matrix)
    }

    fn populated_attachments(node: &crate::tree::DiffTreeNode) -> Vec<(String, bool)> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            for row in &n.rows {
                for cell in &row.cells {
                    if let Some(step) = &cell.step {
                        out.push((step.id.clone(), cell.attachment.is_some()));
                    }
                }
            }
            stack.extend(n.children.iter());
        }
        out.sort();
        out
    }

    #[tokio::test]
    async fn decorates_cells_with_known_attachments() {
        let mut tree = sample_tree();
        let store = FakeStore {
            calls: AtomicUsize::new(0),
            known: vec!["s1".to_string(), "s3".to_string()],
        };
        decorate_tree(&mut tree, &store, &EngineConfig::default()).await;

        assert_eq!(
            populated_attachments(&tree),
            vec![
                ("s1".to_string(), true),
                ("s2".to_string(), false),
                ("s3".to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn fetch_failure_is_swallowed() {
        let mut tree = sample_tree();
        decorate_tree(&mut tree, &BrokenStore, &EngineConfig::default()).await;

        assert!(populated_attachments(&tree)
            .iter()
            .all(|(_, decorated)| !decorated));
    }

    #[tokio::test]
    async fn respects_batch_size() {
        let mut tree = sample_tree();
        let store = FakeStore {
            calls: AtomicUsize::new(0),
            known: vec![],
        };
        let config = EngineConfig {
            max_concurrent_fetches: 2,
            attachment_batch_size: 1,
        };
        decorate_tree(&mut tree, &store, &config).await;

        // Three populated cells, batch size one.
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }
}
