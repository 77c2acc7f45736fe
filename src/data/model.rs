use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Column-name contract
// ---------------------------------------------------------------------------

pub const COL_AGE: &str = "AGE";
pub const COL_SEX: &str = "SEX";
pub const COL_INTUBATED: &str = "INTUBATED";
pub const COL_OUTCOME: &str = "OUTCOME";
pub const COL_ICU: &str = "ICU";
pub const COL_ADMISSION_DATE: &str = "ADMISSION DATE";
pub const COL_FIRST_SYMPTOM: &str = "DATE_OF_FIRST_SYMPTOM";
pub const COL_DATE_OF_DEATH: &str = "DATE_OF_DEATH";

/// The nine comorbidity indicator columns (1 = present, anything else =
/// absent or unknown).
pub const DISEASE_COLUMNS: [&str; 9] = [
    "DIABETES",
    "COPD",
    "ASTHMA",
    "INMUSUPR",
    "HYPERTENSION",
    "CARDIOVASCULAR",
    "OBESITY",
    "CHRONIC_KIDNEY",
    "TOBACCO",
];

/// The three columns holding calendar dates.
pub const DATE_COLUMNS: [&str; 3] = [COL_ADMISSION_DATE, COL_FIRST_SYMPTOM, COL_DATE_OF_DEATH];

/// Every column the loader refuses to go on without.
pub const REQUIRED_COLUMNS: [&str; 17] = [
    COL_AGE,
    COL_SEX,
    COL_INTUBATED,
    COL_OUTCOME,
    COL_ICU,
    "DIABETES",
    "COPD",
    "ASTHMA",
    "INMUSUPR",
    "HYPERTENSION",
    "CARDIOVASCULAR",
    "OBESITY",
    "CHRONIC_KIDNEY",
    "TOBACCO",
    COL_ADMISSION_DATE,
    COL_FIRST_SYMPTOM,
    COL_DATE_OF_DEATH,
];

// ---------------------------------------------------------------------------
// FieldValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Grouped views index values in `BTreeMap` / `BTreeSet`, so `FieldValue`
/// must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Parsed calendar date (admission, first symptom, death).
    Date(NaiveDate),
}

// -- Manual Eq/Ord so FieldValue can key a BTreeSet despite the f64 variant --

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn rank(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let ra = rank(self);
        let rb = rank(other);
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::String(s) => s.hash(state),
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Date(d) => d.hash(state),
            FieldValue::Null => {}
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Date(d) => write!(f, "{d}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    /// Numeric view of the value, for range filters and correlation.
    /// Strings, dates and nulls have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

// ---------------------------------------------------------------------------
// PatientRecord – one row of the table
// ---------------------------------------------------------------------------

/// A single patient case (one row of the source table).
#[derive(Debug, Clone)]
pub struct PatientRecord {
    /// Cell values keyed by column name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl PatientRecord {
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// The cell as `f64`, or `None` when the column is absent, null or
    /// non-numeric.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.fields.get(column).and_then(FieldValue::as_f64)
    }

    /// The cell as a calendar date, or `None` for anything else.
    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        match self.fields.get(column) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
///
/// Built once by the loader and never mutated afterwards; every derived view
/// is a pure function of a `&Dataset` plus explicit parameters.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All patient records (rows), in file order.
    pub records: Vec<PatientRecord>,
    /// Ordered list of column names.
    pub column_names: Vec<String>,
    /// For each column the sorted set of values observed in it.
    pub unique_values: BTreeMap<String, BTreeSet<FieldValue>>,
}

impl Dataset {
    /// Build column indices from loaded records.
    pub fn from_records(records: Vec<PatientRecord>) -> Self {
        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        let mut unique_values: BTreeMap<String, BTreeSet<FieldValue>> = BTreeMap::new();

        for rec in &records {
            for (col, val) in &rec.fields {
                column_names_set.insert(col.clone());
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        let column_names: Vec<String> = column_names_set.into_iter().collect();
        Dataset {
            records,
            column_names,
            unique_values,
        }
    }

    /// Number of patient records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` records (overview tables).
    pub fn head(&self, n: usize) -> &[PatientRecord] {
        &self.records[..n.min(self.records.len())]
    }
}
