use std::collections::BTreeMap;

use anyhow::Result;
use rusty_assay::{
    init_filter_state, AssayError, Axis, Container, FieldKind, Matrix, MetadataValue, ShapeError,
    Table,
};
use serde_json::json;

fn experiment() -> Result<Container> {
    let genes = Table::from_json(&json!([
        { "gene": "ACTB", "biotype": "protein_coding", "length": 1852 },
        { "gene": "MALAT1", "biotype": "lncRNA", "length": 8779 },
        { "gene": "GAPDH", "biotype": "protein_coding", "length": 1875 },
        { "gene": "XIST", "biotype": "lncRNA", "length": 19296 },
    ]))?;
    let samples = Table::from_json(&json!([
        { "sample": "SRR1039508", "dex": "untrt" },
        { "sample": "SRR1039509", "dex": "trt" },
        { "sample": "SRR1039512", "dex": "untrt" },
    ]))?;
    let counts = Matrix::new(
        4,
        3,
        vec![
            679.0, 448.0, 873.0, //
            21.0, 30.0, 19.0, //
            0.0, 0.0, 1.0, //
            3.0, 2.0, 5.0,
        ],
    )?;
    let logcounts = Matrix::from(counts.view().mapv(|v| (v + 1.0).log2()));

    Ok(Container::new(
        BTreeMap::from([("counts".into(), counts), ("logcounts".into(), logcounts)]),
        genes,
        samples,
    )?)
}

#[test]
fn filter_then_subset_keeps_everything_aligned() -> Result<()> {
    let c = experiment()?;
    let coding = c.filter_rows(|r| r["biotype"] == MetadataValue::from("protein_coding"));
    assert_eq!(coding.dim(), (2, 3));

    let treated = coding.filter_cols(|r| r["dex"] == MetadataValue::from("trt"));
    assert_eq!(treated.dim(), (2, 1));
    assert_eq!(
        treated.assay("counts").unwrap().to_rows(),
        vec![vec![448.0], vec![0.0]]
    );
    for name in treated.assay_names() {
        assert_eq!(treated.assay(name).unwrap().shape(), treated.dim());
    }
    Ok(())
}

#[test]
fn value_set_filters_match_predicates() -> Result<()> {
    let c = experiment()?;
    let mut filters = init_filter_state(c.row_metadata());
    filters.insert("biotype".into(), [MetadataValue::from("lncRNA")].into());

    let by_set = c.filter_rows_by(&filters);
    let by_pred = c.filter_rows(|r| r["biotype"] == MetadataValue::from("lncRNA"));
    assert_eq!(by_set, by_pred);
    Ok(())
}

#[test]
fn metadata_columns_follow_subsets() -> Result<()> {
    let c = experiment()?.add_metadata_column(
        Axis::Col,
        "batch",
        vec![
            MetadataValue::category("b1"),
            MetadataValue::category("b2"),
            MetadataValue::category("b1"),
        ],
    )?;
    assert_eq!(
        c.col_metadata().field_kind("batch"),
        Some(FieldKind::Categorical)
    );

    let sub = c.subset_cols(&[2, 1])?;
    let batches: Vec<_> = sub.col_metadata().column("batch").unwrap().cloned().collect();
    assert_eq!(
        batches,
        vec![MetadataValue::category("b1"), MetadataValue::category("b2")]
    );
    Ok(())
}

#[test]
fn mismatched_assay_is_rejected() -> Result<()> {
    let c = experiment()?;
    let err = c.with_assay("tpm", Matrix::zeros(3, 3)).unwrap_err();
    assert!(matches!(
        err,
        AssayError::Shape(ShapeError::AxisLength { axis: Axis::Row, expected: 4, found: 3, .. })
    ));
    Ok(())
}
