use std::collections::BTreeMap;

use serde::Serialize;

use super::bucket::{assign_age_group, AGE_GROUP_LABELS};
use super::model::{Dataset, PatientRecord, COL_AGE};

// ---------------------------------------------------------------------------
// Group keys
// ---------------------------------------------------------------------------

/// A categorical axis to group records by.
///
/// A key has an ordered domain of categories and assigns each record at most
/// one of them.  Records with no category (null cells, ages outside the
/// bands) are excluded from the tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    /// The derived ten-band age group (default boundary policy).
    AgeGroup,
    /// Any plain column; the domain is the sorted set of non-null values
    /// observed in the dataset.
    Column(String),
}

impl GroupKey {
    pub fn name(&self) -> &str {
        match self {
            GroupKey::AgeGroup => "AGE_GROUP",
            GroupKey::Column(col) => col,
        }
    }

    /// The ordered category domain for this key over `dataset`.
    pub fn domain(&self, dataset: &Dataset) -> Vec<String> {
        match self {
            GroupKey::AgeGroup => AGE_GROUP_LABELS.iter().map(|l| l.to_string()).collect(),
            GroupKey::Column(col) => dataset
                .unique_values
                .get(col)
                .map(|vals| {
                    vals.iter()
                        .filter(|v| !v.is_null())
                        .map(|v| v.to_string())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// The category this record falls into, if any.
    pub fn label_for(&self, record: &PatientRecord) -> Option<String> {
        match self {
            GroupKey::AgeGroup => {
                let age = record.numeric(COL_AGE)? as i64;
                assign_age_group(age).map(|l| l.to_string())
            }
            GroupKey::Column(col) => record
                .get(col)
                .filter(|v| !v.is_null())
                .map(|v| v.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// One-dimensional counts
// ---------------------------------------------------------------------------

/// An ordered count-by-category result.
///
/// Entry order follows the key's domain, not arrival order, and every domain
/// category is present even when its count is zero.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationView {
    /// Name of the axis the counts are keyed by.
    pub key: String,
    /// `(category, count)` pairs in domain order.
    pub entries: Vec<(String, u64)>,
}

impl AggregationView {
    pub fn count(&self, category: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(label, _)| label == category)
            .map(|(_, n)| *n)
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

/// Count records per category of `key`, zero-filled over the key's domain.
pub fn count_by(dataset: &Dataset, key: &GroupKey) -> AggregationView {
    let mut tally: BTreeMap<String, u64> = BTreeMap::new();
    for rec in &dataset.records {
        if let Some(label) = key.label_for(rec) {
            *tally.entry(label).or_insert(0) += 1;
        }
    }

    let entries = key
        .domain(dataset)
        .into_iter()
        .map(|category| {
            let n = tally.get(&category).copied().unwrap_or(0);
            (category, n)
        })
        .collect();

    AggregationView {
        key: key.name().to_string(),
        entries,
    }
}

// ---------------------------------------------------------------------------
// Two-dimensional counts
// ---------------------------------------------------------------------------

/// A two-dimensional count: rows × columns, zero-filled over the full cross
/// product of both domains.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationView2 {
    pub row_key: String,
    pub col_key: String,
    /// Row categories, in the row key's domain order.
    pub rows: Vec<String>,
    /// Column categories, in the column key's domain order.
    pub cols: Vec<String>,
    /// `counts[r][c]` is the number of records in (rows[r], cols[c]).
    pub counts: Vec<Vec<u64>>,
}

impl AggregationView2 {
    pub fn get(&self, row: &str, col: &str) -> Option<u64> {
        let r = self.rows.iter().position(|l| l == row)?;
        let c = self.cols.iter().position(|l| l == col)?;
        Some(self.counts[r][c])
    }
}

/// Count records per (key1, key2) category pair.  A record contributes only
/// when both keys assign it a category.
pub fn count_by2(dataset: &Dataset, key1: &GroupKey, key2: &GroupKey) -> AggregationView2 {
    let rows = key1.domain(dataset);
    let cols = key2.domain(dataset);

    let row_index: BTreeMap<&str, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let col_index: BTreeMap<&str, usize> = cols
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let mut counts = vec![vec![0u64; cols.len()]; rows.len()];
    for rec in &dataset.records {
        let (Some(row_label), Some(col_label)) = (key1.label_for(rec), key2.label_for(rec))
        else {
            continue;
        };
        if let (Some(&r), Some(&c)) = (
            row_index.get(row_label.as_str()),
            col_index.get(col_label.as_str()),
        ) {
            counts[r][c] += 1;
        }
    }

    AggregationView2 {
        row_key: key1.name().to_string(),
        col_key: key2.name().to_string(),
        rows,
        cols,
        counts,
    }
}

// ---------------------------------------------------------------------------
// Per-column equality counts
// ---------------------------------------------------------------------------

/// Independently for each listed column, count records whose numeric value
/// equals `value`.  Entries keep the caller-supplied column order.
///
/// Cells that are missing or carry an unexpected encoding simply never
/// match; they are counted nowhere.
pub fn count_where_equal(dataset: &Dataset, columns: &[&str], value: f64) -> AggregationView {
    let entries = columns
        .iter()
        .map(|col| {
            let n = dataset
                .records
                .iter()
                .filter(|rec| rec.numeric(col) == Some(value))
                .count() as u64;
            (col.to_string(), n)
        })
        .collect();

    AggregationView {
        key: format!("= {value}"),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{FieldValue, PatientRecord};

    fn record(pairs: &[(&str, FieldValue)]) -> PatientRecord {
        PatientRecord {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    fn patient(age: i64, sex: &str) -> PatientRecord {
        record(&[
            ("AGE", FieldValue::Integer(age)),
            ("SEX", FieldValue::String(sex.to_string())),
        ])
    }

    #[test]
    fn test_count_by_age_group_on_empty_dataset_is_zero_filled() {
        let ds = Dataset::from_records(Vec::new());
        let view = count_by(&ds, &GroupKey::AgeGroup);
        assert_eq!(view.entries.len(), AGE_GROUP_LABELS.len());
        assert!(view.entries.iter().all(|(_, n)| *n == 0));
        assert_eq!(view.entries[0].0, "0-10");
        assert_eq!(view.entries[9].0, "91-100");
    }

    #[test]
    fn test_count_by_orders_by_domain_not_arrival() {
        let ds = Dataset::from_records(vec![patient(95, "M"), patient(5, "F"), patient(95, "F")]);
        let view = count_by(&ds, &GroupKey::AgeGroup);
        assert_eq!(view.entries[0], ("0-10".to_string(), 1));
        assert_eq!(view.entries[9], ("91-100".to_string(), 2));
        assert_eq!(view.total(), 3);
    }

    #[test]
    fn test_unbucketed_ages_are_excluded() {
        let ds = Dataset::from_records(vec![patient(100, "M"), patient(50, "F")]);
        let view = count_by(&ds, &GroupKey::AgeGroup);
        assert_eq!(view.total(), 1);
    }

    #[test]
    fn test_null_cells_form_no_category() {
        let ds = Dataset::from_records(vec![
            record(&[("SEX", FieldValue::String("M".into()))]),
            record(&[("SEX", FieldValue::Null)]),
        ]);
        let view = count_by(&ds, &GroupKey::Column("SEX".into()));
        assert_eq!(view.entries, vec![("M".to_string(), 1)]);
    }

    #[test]
    fn test_count_by2_cross_product_is_zero_filled() {
        // AGE=[15,25,15], SEX=[M,F,M]
        let ds = Dataset::from_records(vec![patient(15, "M"), patient(25, "F"), patient(15, "M")]);
        let view = count_by2(&ds, &GroupKey::AgeGroup, &GroupKey::Column("SEX".into()));

        assert_eq!(view.rows.len(), 10);
        assert_eq!(view.cols, vec!["F".to_string(), "M".to_string()]);
        assert_eq!(view.get("11-20", "M"), Some(2));
        assert_eq!(view.get("21-30", "F"), Some(1));

        let total: u64 = view.counts.iter().flatten().sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_count_where_equal_round_trip() {
        let ds = Dataset::from_records(vec![
            record(&[("DIABETES", FieldValue::Integer(1))]),
            record(&[("DIABETES", FieldValue::Integer(0))]),
            record(&[("DIABETES", FieldValue::Null)]),
            record(&[("DIABETES", FieldValue::Integer(1))]),
        ]);
        let present = count_where_equal(&ds, &["DIABETES"], 1.0);
        let absent = count_where_equal(&ds, &["DIABETES"], 0.0);
        let missing = ds
            .records
            .iter()
            .filter(|r| r.numeric("DIABETES").is_none())
            .count() as u64;

        assert_eq!(present.count("DIABETES"), Some(2));
        assert_eq!(
            present.count("DIABETES").unwrap() + absent.count("DIABETES").unwrap() + missing,
            ds.len() as u64
        );
    }

    #[test]
    fn test_count_where_equal_keeps_column_order() {
        let ds = Dataset::from_records(vec![record(&[
            ("COPD", FieldValue::Integer(1)),
            ("ASTHMA", FieldValue::Integer(1)),
        ])]);
        let view = count_where_equal(&ds, &["COPD", "ASTHMA"], 1.0);
        assert_eq!(view.entries[0].0, "COPD");
        assert_eq!(view.entries[1].0, "ASTHMA");
    }
}
