//! StepDiff comparison engine
//!
//! Compares the step sequences of two or more test-execution batches and
//! renders the result as a fixed-width comparison matrix and a nested diff
//! tree. The pipeline is a single-pass, one-shot transformation per request:
//!
//! ```text
//! resolve columns -> align sequences -> group into tree -> decorate -> assemble
//! ```
//!
//! Column resolution, alignment, and tree building are pure synchronous CPU
//! work owned by one invocation; only attachment fetches run concurrently.

pub mod aligner;
pub mod config;
pub mod decorate;
pub mod matrix;
pub mod resolver;
pub mod service;
pub mod tree;

pub use aligner::{align, ColumnInput};
pub use config::EngineConfig;
pub use decorate::decorate_tree;
pub use matrix::{ColumnHeader, CompareCell, CompareRow, ComparisonMatrix};
pub use resolver::{resolve_columns, ResolvedColumn};
pub use service::{
    CompareItem, CompareRequest, CompareService, CompareType, ComparisonResponse, ColumnRuns,
    TreeResponse,
};
pub use tree::{build_tree, DiffTreeNode, NodeKind, SubStepRow};
