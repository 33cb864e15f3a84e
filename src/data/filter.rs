use std::collections::{BTreeMap, BTreeSet};

use super::model::MetadataValue;
use super::table::Table;

// ---------------------------------------------------------------------------
// Value-set filters: which values are selected per field
// ---------------------------------------------------------------------------

/// Per-field selection state: maps field name → set of selected values.
/// A field absent from the map is unconstrained.
pub type FilterState = BTreeMap<String, BTreeSet<MetadataValue>>;

/// A [`FilterState`] with every value of every field selected (keeps everything).
pub fn init_filter_state(table: &Table) -> FilterState {
    table
        .fields()
        .iter()
        .map(|field| (field.clone(), table.unique_values(field)))
        .collect()
}

/// Return positions of records that pass all active filters.
///
/// A record passes a field filter when:
/// * The field is not present in `filters` → passes (no constraint)
/// * The filter set for that field is empty → nothing selected → fails
/// * The record's value for that field is in the selected set → passes
/// * The table has no such field → passes only if `Null` is selected
pub fn filtered_indices(table: &Table, filters: &FilterState) -> Vec<usize> {
    table
        .select(|rec| {
            filters.iter().all(|(field, selected)| {
                if selected.is_empty() {
                    return false;
                }
                match rec.get(field) {
                    Some(val) => selected.contains(val),
                    None => selected.contains(&MetadataValue::Null),
                }
            })
        })
        .indices()
        .to_vec()
}
