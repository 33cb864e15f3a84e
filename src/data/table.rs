use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::model::{FieldKind, MetadataValue, Record};
use crate::error::{check_indices, Axis, Result, ShapeError};

// ---------------------------------------------------------------------------
// Table – ordered records sharing one field set
// ---------------------------------------------------------------------------

/// Metadata describing one axis of an assay.
///
/// Records are positional: record `i` describes row (or column) `i` of every
/// matrix the table is paired with. All records carry exactly the fields
/// listed in `fields`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "TableParts")]
pub struct Table {
    /// Sorted field names.
    fields: Vec<String>,
    records: Vec<Record>,
}

#[derive(Deserialize)]
struct TableParts {
    fields: Vec<String>,
    records: Vec<Record>,
}

impl TryFrom<TableParts> for Table {
    type Error = crate::error::AssayError;

    fn try_from(parts: TableParts) -> Result<Self> {
        Table::from_parts(parts.fields, parts.records)
    }
}

impl Table {
    /// Build a table, checking every record against the field set of the
    /// first one.
    pub fn new(records: Vec<Record>) -> Result<Self> {
        let fields = records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        Self::from_parts(fields, records)
    }

    /// `n` records without any fields.
    pub fn with_len(n: usize) -> Self {
        Table {
            fields: Vec::new(),
            records: vec![Record::new(); n],
        }
    }

    /// Build a table from an in-memory records-oriented JSON array:
    ///
    /// ```json
    /// [ { "id": "g1", "len": 1200 }, { "id": "g2", "len": 800 } ]
    /// ```
    pub fn from_json(root: &JsonValue) -> Result<Self> {
        let items = root.as_array().ok_or_else(|| ShapeError::NotRecords {
            reason: "top-level value is not an array".to_string(),
        })?;

        let records = items
            .iter()
            .enumerate()
            .map(|(i, item)| -> Result<Record> {
                let obj = item.as_object().ok_or_else(|| ShapeError::NotRecords {
                    reason: format!("element {i} is not an object"),
                })?;
                Ok(obj
                    .iter()
                    .map(|(k, v)| (k.clone(), MetadataValue::from(v)))
                    .collect())
            })
            .collect::<Result<Vec<Record>>>()?;

        Self::new(records)
    }

    fn from_parts(mut fields: Vec<String>, records: Vec<Record>) -> Result<Self> {
        fields.sort();
        fields.dedup();
        for (i, rec) in records.iter().enumerate() {
            if !rec.keys().eq(fields.iter()) {
                return Err(ShapeError::FieldSet {
                    record: i,
                    expected: fields.join(", "),
                    found: rec.keys().cloned().collect::<Vec<_>>().join(", "),
                }
                .into());
            }
        }
        Ok(Table { fields, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Field names in sorted order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.binary_search_by(|f| f.as_str().cmp(name)).is_ok()
    }

    pub fn record(&self, i: usize) -> Option<&Record> {
        self.records.get(i)
    }

    pub fn records(&self) -> impl ExactSizeIterator<Item = &Record> + '_ {
        self.records.iter()
    }

    /// Values of one field in record order, or `None` for an unknown field.
    pub fn column<'a>(
        &'a self,
        name: &'a str,
    ) -> Option<impl Iterator<Item = &'a MetadataValue> + 'a> {
        if !self.has_field(name) {
            return None;
        }
        Some(self.records.iter().filter_map(move |r| r.get(name)))
    }

    /// Sorted distinct values of a field (empty for an unknown field).
    pub fn unique_values(&self, name: &str) -> BTreeSet<MetadataValue> {
        self.column(name)
            .map(|col| col.cloned().collect())
            .unwrap_or_default()
    }

    /// Kind shared by all non-null values of a field.
    ///
    /// `None` when the field is unknown or mixes kinds; an all-null (or
    /// empty) field reports [`FieldKind::Null`].
    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        let mut kinds = self
            .column(name)?
            .filter(|v| !v.is_null())
            .map(MetadataValue::kind);
        match kinds.next() {
            None => Some(FieldKind::Null),
            Some(first) => kinds.all(|k| k == first).then_some(first),
        }
    }

    /// Records matching `predicate`, as a view over this table.
    pub fn select<P>(&self, mut predicate: P) -> Selection<'_>
    where
        P: FnMut(&Record) -> bool,
    {
        let indices = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, rec)| predicate(rec))
            .map(|(i, _)| i)
            .collect();
        Selection {
            table: self,
            indices,
        }
    }

    /// Records at `indices`, in the given order. Repeats are allowed.
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        check_indices(Axis::Row, indices, self.len())?;
        Ok(self.take_unchecked(indices))
    }

    /// Callers must have validated `indices`.
    pub(crate) fn take_unchecked(&self, indices: &[usize]) -> Self {
        Table {
            fields: self.fields.clone(),
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }

    /// Add a field, replacing any existing field of the same name.
    pub fn with_column(&self, name: &str, values: Vec<MetadataValue>) -> Result<Self> {
        if values.len() != self.len() {
            return Err(ShapeError::ColumnLength {
                field: name.to_string(),
                expected: self.len(),
                found: values.len(),
            }
            .into());
        }

        let mut fields = self.fields.clone();
        if let Err(pos) = fields.binary_search_by(|f| f.as_str().cmp(name)) {
            fields.insert(pos, name.to_string());
        }
        let records = self
            .records
            .iter()
            .zip(values)
            .map(|(rec, v)| {
                let mut rec = rec.clone();
                rec.insert(name.to_string(), v);
                rec
            })
            .collect();

        Ok(Table { fields, records })
    }
}

// ---------------------------------------------------------------------------
// Selection – a filtered view that copies nothing until asked
// ---------------------------------------------------------------------------

/// Positions of the records kept by [`Table::select`], borrowing the table.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> Selection<'a> {
    /// Kept positions, in original order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.records[i])
    }

    pub fn to_table(&self) -> Table {
        self.table.take_unchecked(&self.indices)
    }

    pub fn into_parts(self) -> (Table, Vec<usize>) {
        (self.to_table(), self.indices)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{AssayError, IndexError};

    fn genes() -> Table {
        Table::from_json(&json!([
            { "id": "g1", "len": 1200, "coding": true },
            { "id": "g2", "len": 800, "coding": false },
            { "id": "g3", "len": 450, "coding": true },
        ]))
        .unwrap()
    }

    #[test]
    fn test_inconsistent_fields() {
        let mut a = Record::new();
        a.insert("id".into(), "g1".into());
        let mut b = a.clone();
        b.insert("extra".into(), 1.into());

        let err = Table::new(vec![a, b]).unwrap_err();
        assert!(matches!(
            err,
            AssayError::Shape(ShapeError::FieldSet { record: 1, .. })
        ));
    }

    #[test]
    fn test_from_json_rejects_non_records() {
        assert!(matches!(
            Table::from_json(&json!({ "id": "g1" })),
            Err(AssayError::Shape(ShapeError::NotRecords { .. }))
        ));
        assert!(matches!(
            Table::from_json(&json!([1, 2])),
            Err(AssayError::Shape(ShapeError::NotRecords { .. }))
        ));
    }

    #[test]
    fn test_select_keeps_order() {
        let t = genes();
        let sel = t.select(|r| r["coding"] == MetadataValue::Bool(true));
        assert_eq!(sel.indices(), &[0, 2]);

        let ids: Vec<String> = sel.records().map(|r| r["id"].to_string()).collect();
        assert_eq!(ids, vec!["g1", "g3"]);

        let (sub, kept) = sel.into_parts();
        assert_eq!(sub.len(), 2);
        assert_eq!(kept, vec![0, 2]);
        assert_eq!(sub.fields(), t.fields());
    }

    #[test]
    fn test_take_repeats_and_bounds() {
        let t = genes();
        let sub = t.take(&[2, 2, 0]).unwrap();
        let ids: Vec<_> = sub.column("id").unwrap().cloned().collect();
        assert_eq!(
            ids,
            vec![
                MetadataValue::from("g3"),
                MetadataValue::from("g3"),
                MetadataValue::from("g1")
            ]
        );

        let err = t.take(&[0, 3]).unwrap_err();
        assert_eq!(
            err,
            AssayError::Index(IndexError {
                axis: Axis::Row,
                index: 3,
                len: 3
            })
        );

        let empty = t.take(&[]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.fields().len(), 3);
    }

    #[test]
    fn test_with_column() {
        let t = genes();
        let t2 = t
            .with_column("tissue", vec!["liver".into(), "brain".into(), "liver".into()])
            .unwrap();
        assert!(t2.has_field("tissue"));
        assert!(!t.has_field("tissue"));
        assert_eq!(t2.unique_values("tissue").len(), 2);

        let replaced = t2.with_column("len", vec![MetadataValue::Null; 3]).unwrap();
        assert_eq!(replaced.fields().len(), 4);
        assert_eq!(replaced.field_kind("len"), Some(FieldKind::Null));

        assert!(matches!(
            t.with_column("bad", vec![1.into()]),
            Err(AssayError::Shape(ShapeError::ColumnLength { expected: 3, found: 1, .. }))
        ));
    }

    #[test]
    fn test_field_kind() {
        let t = genes();
        assert_eq!(t.field_kind("len"), Some(FieldKind::Numeric));
        assert_eq!(t.field_kind("coding"), Some(FieldKind::Boolean));
        assert_eq!(t.field_kind("missing"), None);

        let mixed = t
            .with_column("mixed", vec![1.into(), "a".into(), MetadataValue::Null])
            .unwrap();
        assert_eq!(mixed.field_kind("mixed"), None);
    }

    #[test]
    fn test_serde_revalidates() {
        let t = genes();
        let text = serde_json::to_string(&t).unwrap();
        let back: Table = serde_json::from_str(&text).unwrap();
        assert_eq!(back, t);

        let bad = json!({ "fields": ["id"], "records": [{ "id": { "Text": "g1" } }, {}] });
        assert!(serde_json::from_value::<Table>(bad).is_err());
    }
}
