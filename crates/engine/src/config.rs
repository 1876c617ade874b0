//! Engine configuration

use serde::{Deserialize, Serialize};

fn default_max_concurrent_fetches() -> usize {
    8
}

fn default_attachment_batch_size() -> usize {
    32
}

/// Tuning knobs for the comparison engine
///
/// Only the attachment decorator does I/O, so the knobs are about fetch
/// batching and the bound on in-flight batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_attachment_batch_size")]
    pub attachment_batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            attachment_batch_size: default_attachment_batch_size(),
        }
    }
}

impl EngineConfig {
    /// Clamp degenerate values so stream combinators never see a zero bound.
    pub fn normalized(mut self) -> Self {
        self.max_concurrent_fetches = self.max_concurrent_fetches.max(1);
        self.attachment_batch_size = self.attachment_batch_size.max(1);
        self
    }
}
