use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two axes of an assay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Col,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Col => write!(f, "column"),
        }
    }
}

/// Dimension disagreements between matrices and metadata tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("{rows}x{cols} matrix needs {expected} values, got {found}")]
    ValueCount {
        rows: usize,
        cols: usize,
        expected: usize,
        found: usize,
    },

    #[error("{rows}x{cols} matrix has more cells than fit in memory")]
    TooLarge { rows: usize, cols: usize },

    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("record {record} has fields [{found}], expected [{expected}]")]
    FieldSet {
        record: usize,
        expected: String,
        found: String,
    },

    #[error("{what} has length {found}, but the {axis} axis has length {expected}")]
    AxisLength {
        axis: Axis,
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("field '{field}' has {found} values for {expected} records")]
    ColumnLength {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("assay '{name}' is {found:?}, but assay '{reference}' is {expected:?}")]
    AssayShape {
        name: String,
        reference: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("expected an array of records: {reason}")]
    NotRecords { reason: String },
}

/// A position outside an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{axis} index {index} out of range for length {len}")]
pub struct IndexError {
    pub axis: Axis,
    pub index: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssayError {
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),
}

pub type Result<T> = std::result::Result<T, AssayError>;

/// Check every position against `len` before any work is done.
pub(crate) fn check_indices(axis: Axis, indices: &[usize], len: usize) -> Result<()> {
    match indices.iter().find(|&&i| i >= len) {
        Some(&index) => Err(IndexError { axis, index, len }.into()),
        None => Ok(()),
    }
}
