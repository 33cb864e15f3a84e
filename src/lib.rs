//! Assay matrices bound to row and column metadata.
//!
//! A [`Container`] holds any number of equally shaped numeric matrices
//! together with one metadata [`Table`] per axis. Construction checks that
//! all shapes agree, and every subset or filter is applied to the matrices and
//! the matching table in one step, returning a new container.
//!
//! ```
//! use std::collections::BTreeMap;
//! use rusty_assay::{Container, Matrix, Table};
//! use serde_json::json;
//!
//! let counts = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])?;
//! let genes = Table::from_json(&json!([{ "id": "g1" }, { "id": "g2" }, { "id": "g3" }]))?;
//! let samples = Table::from_json(&json!([{ "s": "a" }, { "s": "b" }]))?;
//!
//! let c = Container::new(BTreeMap::from([("counts".into(), counts)]), genes, samples)?;
//! let sub = c.subset_rows(&[2, 0])?;
//! assert_eq!(sub.assay("counts").unwrap().to_rows(), vec![vec![5.0, 6.0], vec![1.0, 2.0]]);
//! # Ok::<(), rusty_assay::AssayError>(())
//! ```

pub mod config;
pub mod container;
pub mod data;
pub mod error;

pub use config::DisplayOptions;
pub use container::Container;
pub use data::filter::{filtered_indices, init_filter_state, FilterState};
pub use data::matrix::Matrix;
pub use data::model::{FieldKind, MetadataValue, Record};
pub use data::table::{Selection, Table};
pub use error::{AssayError, Axis, IndexError, Result, ShapeError};
