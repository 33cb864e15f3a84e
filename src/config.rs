use serde::Deserialize;

/// How much of a container [`crate::Container::summary`] prints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Rows of each assay shown before eliding.
    pub max_rows: usize,
    /// Columns of each assay shown before eliding.
    pub max_cols: usize,
    /// Decimal places for floating point cells.
    pub precision: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            max_rows: 10,
            max_cols: 6,
            precision: 4,
        }
    }
}
