//! Comparison matrix model
//!
//! The Sequence Aligner emits an ordered list of rows where every row holds
//! exactly one cell per column. A column with no step at a given position
//! gets a placeholder cell, never an omission, so the matrix width is
//! invariant across all rows.

use serde::{Deserialize, Serialize};
use stepdiff_common::{Attachment, StepRecord};

/// Column key plus display name, used only for response rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHeader {
    pub column_key: String,
    pub display_name: String,
}

/// One cell of the comparison matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareCell {
    pub column_key: String,
    pub row: usize,
    pub column: usize,
    /// True when this cell's step was matched against at least one other
    /// column in the same row.
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<StepRecord>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl CompareCell {
    pub fn empty(column_key: &str, row: usize, column: usize) -> Self {
        Self {
            column_key: column_key.to_string(),
            row,
            column,
            matched: false,
            step: None,
            path: String::new(),
            merge_hash: None,
            attachment: None,
        }
    }

    pub fn populated(column_key: &str, row: usize, column: usize, step: StepRecord) -> Self {
        let path = step.path_string();
        let merge_hash = step.merge_hash().map(str::to_string);
        Self {
            column_key: column_key.to_string(),
            row,
            column,
            matched: false,
            step: Some(step),
            path,
            merge_hash,
            attachment: None,
        }
    }

    pub fn is_populated(&self) -> bool {
        self.step.is_some()
    }
}

/// One row of the matrix: exactly one cell per column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRow {
    pub cells: Vec<CompareCell>,
}

impl CompareRow {
    pub fn first_populated(&self) -> Option<&CompareCell> {
        self.cells.iter().find(|c| c.is_populated())
    }

    pub fn populated_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_populated()).count()
    }
}

/// The aligned, fixed-width table produced by the Sequence Aligner
///
/// Row order is the order in which the aligner emitted rows; it is never
/// re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonMatrix {
    /// Column keys in caller order
    pub columns: Vec<String>,
    pub rows: Vec<CompareRow>,
}

impl ComparisonMatrix {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
