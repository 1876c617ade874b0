//! Core types for StepDiff

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator used when rendering an ancestor chain as a path string
pub const PATH_SEPARATOR: &str = " / ";

/// Kind of a recorded test step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Action,
    Compound,
    Technical,
    Unknown,
}

impl Default for StepKind {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Outcome of a recorded test step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
    Skipped,
    Broken,
    Unknown,
}

impl Default for StepStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Outcome of a whole test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Passed,
    Failed,
    InProgress,
    Unknown,
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Stable identity block attached to steps and ancestors
///
/// `definition_id` survives reruns of the same scenario and is the basis for
/// merge decisions; `hash` fingerprints the recorded content of one
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub definition_id: String,
    pub hash: String,
    #[serde(default)]
    pub sequence: u64,
    #[serde(default)]
    pub compound: bool,
}

impl MetaInfo {
    /// A metaInfo block with an empty definition id cannot participate in
    /// merge decisions; callers degrade to name-only equality.
    pub fn is_usable(&self) -> bool {
        !self.definition_id.is_empty()
    }
}

/// Kind of an ancestor path segment
///
/// `Root` marks the synthetic top-level bucket that groups all steps of a
/// run; it never appears in rendered path strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AncestorKind {
    Root,
    Compound,
    Step,
}

/// One segment of a step's ancestor chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorRef {
    pub id: String,
    pub name: String,
    pub kind: AncestorKind,
    pub depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaInfo>,
}

impl AncestorRef {
    /// Identity used when folding tree siblings: the stable definition id
    /// when present, the raw ancestor id otherwise.
    pub fn merge_id(&self) -> &str {
        match &self.meta {
            Some(meta) if meta.is_usable() => &meta.definition_id,
            _ => &self.id,
        }
    }
}

/// One recorded test step with its full ancestor chain
///
/// The ancestor chain is ordered outermost-first: the synthetic root bucket
/// (if the source records one) sits at index 0 and the nearest enclosing
/// ancestor is last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: StepKind,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaInfo>,
    #[serde(default)]
    pub ancestors: Vec<AncestorRef>,
    #[serde(default)]
    pub has_preview: bool,
}

impl StepRecord {
    /// Merge hash for alignment and tree grouping: the definition id of the
    /// nearest compound ancestor, or the step's own definition id when no
    /// compound ancestor exists. `None` when metaInfo is missing or unusable
    /// all the way up, which degrades matching to name-only equality.
    pub fn merge_hash(&self) -> Option<&str> {
        for ancestor in self.ancestors.iter().rev() {
            if ancestor.kind == AncestorKind::Root {
                continue;
            }
            let compound = ancestor.kind == AncestorKind::Compound
                || ancestor.meta.as_ref().map_or(false, |m| m.compound);
            if !compound {
                continue;
            }
            if let Some(meta) = &ancestor.meta {
                if meta.is_usable() {
                    return Some(&meta.definition_id);
                }
            }
        }
        match &self.meta {
            Some(meta) if meta.is_usable() => Some(&meta.definition_id),
            _ => None,
        }
    }

    /// Ancestor names from the outermost relevant ancestor down to the
    /// nearest one, excluding the synthetic root bucket.
    pub fn path_string(&self) -> String {
        self.ancestors
            .iter()
            .filter(|a| a.kind != AncestorKind::Root)
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }
}

/// Execution request metadata as seen by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_plan_id: Option<String>,
}

/// One candidate test run inside an execution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRun {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_case_id: Option<String>,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

/// Binary attachment content, transported base64-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub content_type: String,
    pub content: String,
}

impl Attachment {
    pub fn from_bytes(content_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            content_type: content_type.into(),
            content: BASE64.encode(bytes),
        }
    }

    pub fn decode(&self) -> Option<Vec<u8>> {
        BASE64.decode(&self.content).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(definition_id: &str, compound: bool) -> MetaInfo {
        MetaInfo {
            definition_id: definition_id.to_string(),
            hash: format!("hash-{definition_id}"),
            sequence: 0,
            compound,
        }
    }

    fn ancestor(name: &str, kind: AncestorKind, depth: u32, meta: Option<MetaInfo>) -> AncestorRef {
        AncestorRef {
            id: format!("anc-{name}"),
            name: name.to_string(),
            kind,
            depth,
            meta,
        }
    }

    #[test]
    fn merge_hash_prefers_nearest_compound_ancestor() {
        let step = StepRecord {
            id: "s1".to_string(),
            name: "click".to_string(),
            kind: StepKind::Action,
            status: StepStatus::Passed,
            meta: Some(meta("def-click", false)),
            ancestors: vec![
                ancestor("Run", AncestorKind::Root, 0, None),
                ancestor("Login", AncestorKind::Compound, 1, Some(meta("def-login", true))),
                ancestor("Enter credentials", AncestorKind::Compound, 2, Some(meta("def-creds", true))),
            ],
            has_preview: false,
        };
        assert_eq!(step.merge_hash(), Some("def-creds"));
    }

    #[test]
    fn merge_hash_falls_back_to_own_definition_id() {
        let step = StepRecord {
            id: "s2".to_string(),
            name: "open".to_string(),
            kind: StepKind::Action,
            status: StepStatus::Passed,
            meta: Some(meta("def-open", false)),
            ancestors: vec![ancestor("Run", AncestorKind::Root, 0, None)],
            has_preview: false,
        };
        assert_eq!(step.merge_hash(), Some("def-open"));
    }

    #[test]
    fn merge_hash_is_none_without_usable_meta() {
        let step = StepRecord {
            id: "s3".to_string(),
            name: "open".to_string(),
            kind: StepKind::Action,
            status: StepStatus::Passed,
            meta: None,
            ancestors: vec![],
            has_preview: false,
        };
        assert_eq!(step.merge_hash(), None);
    }

    #[test]
    fn path_string_skips_root_bucket() {
        let step = StepRecord {
            id: "s4".to_string(),
            name: "click".to_string(),
            kind: StepKind::Action,
            status: StepStatus::Passed,
            meta: None,
            ancestors: vec![
                ancestor("Run", AncestorKind::Root, 0, None),
                ancestor("Login", AncestorKind::Compound, 1, None),
                ancestor("Enter credentials", AncestorKind::Compound, 2, None),
            ],
            has_preview: false,
        };
        assert_eq!(step.path_string(), "Login / Enter credentials");
    }

    #[test]
    fn attachment_round_trips_base64() {
        let attachment = Attachment::from_bytes("image/png", b"\x89PNG");
        assert_eq!(attachment.decode().as_deref(), Some(b"\x89PNG".as_slice()));
    }
}
