/// Data layer: metadata values, tables, filters and assay matrices.
///
/// Architecture:
/// ```text
///   records ──▶ ┌────────┐   select / take    ┌───────────┐
///               │ table  │ ─────────────────▶ │ Selection │  kept positions
///               └────────┘                    └───────────┘
///                   │ filter: value sets → positions
///                   ▼
///               ┌────────┐   slice_rows / slice_cols
///   values ───▶ │ matrix │ ─────────────────────────▶ same positions
///               └────────┘
/// ```
pub mod filter;
pub mod matrix;
pub mod model;
pub mod table;
