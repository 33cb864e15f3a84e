use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{check_indices, Axis, Result, ShapeError};

// ---------------------------------------------------------------------------
// Matrix – one assay, rows = features, columns = samples
// ---------------------------------------------------------------------------

/// A dense numeric assay matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix {
    data: Array2<f64>,
}

impl Matrix {
    /// Build a `rows` x `cols` matrix from row-major `values`.
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or(ShapeError::TooLarge { rows, cols })?;
        let found = values.len();
        let value_count = ShapeError::ValueCount {
            rows,
            cols,
            expected,
            found,
        };
        if expected != found {
            return Err(value_count.into());
        }
        let data = Array2::from_shape_vec((rows, cols), values).map_err(|_| value_count)?;
        Ok(Matrix { data })
    }

    /// Build a matrix from equally long rows. An empty slice gives a 0x0 matrix.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(ShapeError::RaggedRows {
                row,
                expected: cols,
                found: r.len(),
            }
            .into());
        }
        Self::new(rows.len(), cols, rows.concat())
    }

    /// # Panics
    ///
    /// If `rows * cols` overflows, as [`Array2::zeros`] does.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: Array2::zeros((rows, cols)),
        }
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    pub fn row(&self, row: usize) -> Option<ArrayView1<'_, f64>> {
        (row < self.nrows()).then(|| self.data.row(row))
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.rows().into_iter().map(|r| r.to_vec()).collect()
    }

    /// Rows at `indices`, in the given order. Repeats are allowed.
    pub fn slice_rows(&self, indices: &[usize]) -> Result<Self> {
        check_indices(Axis::Row, indices, self.nrows())?;
        Ok(self.take_unchecked(Axis::Row, indices))
    }

    /// Columns at `indices`, in the given order. Repeats are allowed.
    pub fn slice_cols(&self, indices: &[usize]) -> Result<Self> {
        check_indices(Axis::Col, indices, self.ncols())?;
        Ok(self.take_unchecked(Axis::Col, indices))
    }

    /// `select` panics on an out-of-range index; callers must have validated.
    pub(crate) fn take_unchecked(&self, axis: Axis, indices: &[usize]) -> Self {
        let (rows, cols) = self.shape();
        let nd_axis = match axis {
            Axis::Row if indices.is_empty() => return Matrix::zeros(0, cols),
            Axis::Col if indices.is_empty() => return Matrix::zeros(rows, 0),
            Axis::Row => ndarray::Axis(0),
            Axis::Col => ndarray::Axis(1),
        };
        Matrix {
            data: self.data.select(nd_axis, indices),
        }
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(data: Array2<f64>) -> Self {
        Matrix { data }
    }
}
