use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::DisplayOptions;
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::matrix::Matrix;
use crate::data::model::{MetadataValue, Record};
use crate::data::table::Table;
use crate::error::{check_indices, AssayError, Axis, Result, ShapeError};

// ---------------------------------------------------------------------------
// Container – assays bound to row and column metadata
// ---------------------------------------------------------------------------

/// Named assay matrices sharing one shape, plus the metadata tables for both
/// axes.
///
/// Every matrix is `nrows x ncols`, the row table has `nrows` records and the
/// column table has `ncols` records. The only way to obtain a `Container` is
/// through [`Container::new`] (or deserialization, which goes through it), and
/// every transformation returns a new value, so the matrices and tables can
/// never drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContainerParts")]
pub struct Container {
    assays: BTreeMap<String, Matrix>,
    row_meta: Table,
    col_meta: Table,
}

#[derive(Deserialize)]
struct ContainerParts {
    assays: BTreeMap<String, Matrix>,
    row_meta: Table,
    col_meta: Table,
}

impl TryFrom<ContainerParts> for Container {
    type Error = AssayError;

    fn try_from(parts: ContainerParts) -> Result<Self> {
        Container::new(parts.assays, parts.row_meta, parts.col_meta)
    }
}

impl Container {
    /// Bind `assays` to their metadata, checking that all shapes agree.
    ///
    /// With no assays, the dimensions come from the tables alone.
    pub fn new(
        assays: BTreeMap<String, Matrix>,
        row_meta: Table,
        col_meta: Table,
    ) -> Result<Self> {
        let mut shapes = assays.iter().map(|(name, m)| (name, m.shape()));
        if let Some((reference, expected)) = shapes.next() {
            if let Some((name, found)) = shapes.find(|(_, shape)| *shape != expected) {
                return Err(ShapeError::AssayShape {
                    name: name.clone(),
                    reference: reference.clone(),
                    expected,
                    found,
                }
                .into());
            }
            check_axis_len(Axis::Row, "row metadata", expected.0, row_meta.len())?;
            check_axis_len(Axis::Col, "column metadata", expected.1, col_meta.len())?;
        }

        debug!(
            "container built: {} assay(s), {} rows x {} columns",
            assays.len(),
            row_meta.len(),
            col_meta.len()
        );
        Ok(Container {
            assays,
            row_meta,
            col_meta,
        })
    }

    pub fn nrows(&self) -> usize {
        self.row_meta.len()
    }

    pub fn ncols(&self) -> usize {
        self.col_meta.len()
    }

    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    pub fn len(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.nrows(),
            Axis::Col => self.ncols(),
        }
    }

    pub fn assay(&self, name: &str) -> Option<&Matrix> {
        self.assays.get(name)
    }

    /// Assay names in sorted order.
    pub fn assay_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.assays.keys().map(String::as_str)
    }

    pub fn assays(&self) -> &BTreeMap<String, Matrix> {
        &self.assays
    }

    pub fn row_metadata(&self) -> &Table {
        &self.row_meta
    }

    pub fn col_metadata(&self) -> &Table {
        &self.col_meta
    }

    pub fn metadata(&self, axis: Axis) -> &Table {
        match axis {
            Axis::Row => &self.row_meta,
            Axis::Col => &self.col_meta,
        }
    }

    // -- Subsetting --

    /// Keep the rows at `indices`, in that order, across every assay and the
    /// row metadata. Nothing is built unless every index is in range.
    pub fn subset_rows(&self, indices: &[usize]) -> Result<Self> {
        check_indices(Axis::Row, indices, self.nrows())?;
        Ok(self.take_unchecked(Axis::Row, indices))
    }

    /// Column counterpart of [`Container::subset_rows`].
    pub fn subset_cols(&self, indices: &[usize]) -> Result<Self> {
        check_indices(Axis::Col, indices, self.ncols())?;
        Ok(self.take_unchecked(Axis::Col, indices))
    }

    /// Subset both axes at once; both index lists are checked first.
    pub fn subset(&self, rows: &[usize], cols: &[usize]) -> Result<Self> {
        check_indices(Axis::Row, rows, self.nrows())?;
        check_indices(Axis::Col, cols, self.ncols())?;
        Ok(self
            .take_unchecked(Axis::Row, rows)
            .take_unchecked(Axis::Col, cols))
    }

    fn take_unchecked(&self, axis: Axis, indices: &[usize]) -> Self {
        let assays = self
            .assays
            .iter()
            .map(|(name, m)| (name.clone(), m.take_unchecked(axis, indices)))
            .collect();
        let (row_meta, col_meta) = match axis {
            Axis::Row => (self.row_meta.take_unchecked(indices), self.col_meta.clone()),
            Axis::Col => (self.row_meta.clone(), self.col_meta.take_unchecked(indices)),
        };
        trace!(
            "{axis} subset: {}x{} -> {}x{}",
            self.nrows(),
            self.ncols(),
            row_meta.len(),
            col_meta.len()
        );
        Container {
            assays,
            row_meta,
            col_meta,
        }
    }

    // -- Filtering --

    /// Keep the rows whose metadata record satisfies `predicate`, in their
    /// original order. No match gives a container with zero rows.
    pub fn filter_rows<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&Record) -> bool,
    {
        let kept = self.row_meta.select(predicate);
        self.keep(Axis::Row, kept.indices())
    }

    /// Column counterpart of [`Container::filter_rows`].
    pub fn filter_cols<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&Record) -> bool,
    {
        let kept = self.col_meta.select(predicate);
        self.keep(Axis::Col, kept.indices())
    }

    /// Keep the rows passing a value-set filter.
    pub fn filter_rows_by(&self, filters: &FilterState) -> Self {
        self.keep(Axis::Row, &filtered_indices(&self.row_meta, filters))
    }

    /// Keep the columns passing a value-set filter.
    pub fn filter_cols_by(&self, filters: &FilterState) -> Self {
        self.keep(Axis::Col, &filtered_indices(&self.col_meta, filters))
    }

    /// `kept` comes from a selection over this container's own metadata.
    fn keep(&self, axis: Axis, kept: &[usize]) -> Self {
        if kept.is_empty() && self.len(axis) > 0 {
            warn!("filter removed all {} {axis}s", self.len(axis));
        }
        debug!("{axis} filter kept {} of {}", kept.len(), self.len(axis));
        self.take_unchecked(axis, kept)
    }

    // -- Metadata and assay edits --

    /// Add a metadata field along `axis`. The assays are untouched.
    pub fn add_metadata_column(
        &self,
        axis: Axis,
        name: &str,
        values: Vec<MetadataValue>,
    ) -> Result<Self> {
        let what = format!("values for '{name}'");
        check_axis_len(axis, &what, self.len(axis), values.len())?;
        let table = self.metadata(axis);
        if table.has_field(name) {
            warn!("replacing existing {axis} metadata field '{name}'");
        }
        let table = table.with_column(name, values)?;

        let mut out = self.clone();
        match axis {
            Axis::Row => out.row_meta = table,
            Axis::Col => out.col_meta = table,
        }
        Ok(out)
    }

    /// Add an assay, or replace the one with the same name.
    pub fn with_assay(&self, name: &str, matrix: Matrix) -> Result<Self> {
        let what = format!("assay '{name}'");
        check_axis_len(Axis::Row, &what, self.nrows(), matrix.nrows())?;
        check_axis_len(Axis::Col, &what, self.ncols(), matrix.ncols())?;

        let mut out = self.clone();
        if out.assays.insert(name.to_string(), matrix).is_some() {
            debug!("replaced assay '{name}'");
        }
        Ok(out)
    }

    /// Drop an assay. An unknown name leaves the container as it is.
    pub fn without_assay(&self, name: &str) -> Self {
        let mut out = self.clone();
        out.assays.remove(name);
        out
    }

    // -- Display --

    /// Human-readable overview: dimensions, metadata fields and the top-left
    /// corner of every assay.
    pub fn summary(&self, opts: &DisplayOptions) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_summary(&mut out, opts);
        out
    }

    fn write_summary(&self, out: &mut impl fmt::Write, opts: &DisplayOptions) -> fmt::Result {
        writeln!(
            out,
            "Container: {} rows x {} columns, {} assay(s)",
            self.nrows(),
            self.ncols(),
            self.assays.len()
        )?;
        writeln!(out, "row fields: [{}]", self.row_meta.fields().join(", "))?;
        writeln!(out, "column fields: [{}]", self.col_meta.fields().join(", "))?;

        for (name, m) in &self.assays {
            writeln!(out, "assay '{name}':")?;
            for row in m.view().rows().into_iter().take(opts.max_rows) {
                let mut line = String::new();
                for v in row.iter().take(opts.max_cols) {
                    write!(line, " {v:>10.prec$}", prec = opts.precision)?;
                }
                if m.ncols() > opts.max_cols {
                    line.push_str(" ...");
                }
                writeln!(out, "{line}")?;
            }
            if m.nrows() > opts.max_rows {
                writeln!(out, " ... {} more row(s)", m.nrows() - opts.max_rows)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_summary(f, &DisplayOptions::default())
    }
}

fn check_axis_len(axis: Axis, what: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ShapeError::AxisLength {
            axis,
            what: what.to_string(),
            expected,
            found,
        }
        .into());
    }
    Ok(())
}
