use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use log::debug;
use serde_json::Value as JsonValue;

use super::model::{
    Dataset, FieldValue, PatientRecord, COL_DATE_OF_DEATH, DATE_COLUMNS, REQUIRED_COLUMNS,
};
use super::DataError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a patient dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with the full column contract (recommended)
/// * `.json` – records-oriented array, `[{ "AGE": 34, "SEX": 1, ... }, ...]`
///
/// Loading is the only I/O the crate performs; the returned [`Dataset`] is
/// immutable and safe to share read-only across every downstream view.
pub fn load_file(path: &Path) -> Result<Dataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => read_csv(File::open(path)?)?,
        "json" => load_json(path)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    debug!(
        "loaded {} records, {} columns from {}",
        dataset.len(),
        dataset.column_names.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV from any reader.  The header row must contain every column in
/// [`REQUIRED_COLUMNS`]; extra columns are carried through untouched.
pub fn read_csv<R: io::Read>(reader: R) -> Result<Dataset, DataError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(DataError::MissingColumn(required.to_string()));
        }
    }

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;

        let mut fields = BTreeMap::new();
        for (col_idx, raw) in record.iter().enumerate() {
            // Trailing ragged cells have no header; skip them.
            let Some(column) = headers.get(col_idx) else {
                continue;
            };
            let value = if DATE_COLUMNS.contains(&column.as_str()) {
                parse_date_cell(raw, row_no, column)?
            } else {
                guess_field_type(raw)
            };
            fields.insert(column.clone(), value);
        }

        records.push(PatientRecord { fields });
    }

    Ok(Dataset::from_records(records))
}

/// Best-effort typing of a raw CSV cell.
fn guess_field_type(s: &str) -> FieldValue {
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return FieldValue::Float(f);
    }
    if s == "true" || s == "false" {
        return FieldValue::Bool(s == "true");
    }
    FieldValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a cell from one of the three date columns.
///
/// An empty cell is null in all of them.  A non-empty cell that is not a
/// recognizable date fails the load, except in the death column: not every
/// patient died and the source files mark that with sentinel pseudo-dates,
/// so there the value degrades to null.
fn parse_date_cell(raw: &str, row: usize, column: &str) -> Result<FieldValue, DataError> {
    if raw.is_empty() {
        return Ok(FieldValue::Null);
    }
    match parse_date_str(raw) {
        Some(date) => Ok(FieldValue::Date(date)),
        None if column == COL_DATE_OF_DEATH => {
            debug!("row {row}: unparseable {column:?} value {raw:?} kept as null");
            Ok(FieldValue::Null)
        }
        None => Err(DataError::BadDate {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "AGE": 34, "SEX": 1, "DIABETES": 2, ..., "ADMISSION DATE": "2020-04-01" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, DataError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records_json = root
        .as_array()
        .ok_or_else(|| DataError::MissingColumn("<top-level array>".to_string()))?;

    let mut records = Vec::with_capacity(records_json.len());

    for (row_no, rec) in records_json.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| DataError::BadDate {
            row: row_no,
            column: "<record>".to_string(),
            value: rec.to_string(),
        })?;

        for required in REQUIRED_COLUMNS {
            if !obj.contains_key(required) {
                return Err(DataError::MissingColumn(required.to_string()));
            }
        }

        let mut fields = BTreeMap::new();
        for (column, val) in obj {
            let value = if DATE_COLUMNS.contains(&column.as_str()) {
                match val {
                    JsonValue::String(s) => parse_date_cell(s, row_no, column)?,
                    JsonValue::Null => FieldValue::Null,
                    other => {
                        return Err(DataError::BadDate {
                            row: row_no,
                            column: column.clone(),
                            value: other.to_string(),
                        })
                    }
                }
            } else {
                json_to_field(val)
            };
            fields.insert(column.clone(), value);
        }

        records.push(PatientRecord { fields });
    }

    Ok(Dataset::from_records(records))
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{COL_ADMISSION_DATE, COL_AGE, COL_FIRST_SYMPTOM, COL_SEX};

    /// A minimal header line satisfying the column contract.
    fn full_header() -> String {
        REQUIRED_COLUMNS.join(",")
    }

    /// One CSV row in [`REQUIRED_COLUMNS`] order.
    fn csv_row(
        age: &str,
        sex: &str,
        intubated: &str,
        outcome: &str,
        icu: &str,
        diseases: [&str; 9],
        admission: &str,
        first_symptom: &str,
        death: &str,
    ) -> String {
        let mut cells = vec![age, sex, intubated, outcome, icu];
        cells.extend(diseases);
        cells.push(admission);
        cells.push(first_symptom);
        cells.push(death);
        cells.join(",")
    }

    fn ones() -> [&'static str; 9] {
        ["1"; 9]
    }

    #[test]
    fn test_read_csv_types_cells() {
        let text = format!(
            "{}\n{}",
            full_header(),
            csv_row(
                "34",
                "2",
                "97",
                "0",
                "2",
                ones(),
                "2020-04-01",
                "28/03/2020",
                ""
            )
        );
        let ds = read_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        let rec = &ds.records[0];
        assert_eq!(rec.get(COL_AGE), Some(&FieldValue::Integer(34)));
        assert_eq!(rec.get(COL_SEX), Some(&FieldValue::Integer(2)));
        assert_eq!(
            rec.date(COL_ADMISSION_DATE),
            NaiveDate::from_ymd_opt(2020, 4, 1)
        );
        assert_eq!(
            rec.date(COL_FIRST_SYMPTOM),
            NaiveDate::from_ymd_opt(2020, 3, 28)
        );
        assert_eq!(rec.get(COL_DATE_OF_DEATH), Some(&FieldValue::Null));
    }

    #[test]
    fn test_missing_required_column_fails() {
        let headers: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != COL_AGE)
            .collect();
        let text = headers.join(",");
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == COL_AGE));
    }

    #[test]
    fn test_bad_admission_date_fails() {
        let text = format!(
            "{}\n{}",
            full_header(),
            csv_row("34", "2", "97", "0", "2", ones(), "not-a-date", "", "")
        );
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::BadDate { column, .. } if column == COL_ADMISSION_DATE));
    }

    #[test]
    fn test_sentinel_death_date_degrades_to_null() {
        let text = format!(
            "{}\n{}",
            full_header(),
            csv_row(
                "80",
                "1",
                "1",
                "1",
                "1",
                ones(),
                "2020-05-02",
                "2020-04-30",
                "9999-99-99"
            )
        );
        let ds = read_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.records[0].get(COL_DATE_OF_DEATH), Some(&FieldValue::Null));
    }

    #[test]
    fn test_guess_field_type() {
        assert_eq!(guess_field_type(""), FieldValue::Null);
        assert_eq!(guess_field_type("12"), FieldValue::Integer(12));
        assert_eq!(guess_field_type("1.5"), FieldValue::Float(1.5));
        assert_eq!(guess_field_type("true"), FieldValue::Bool(true));
        assert_eq!(
            guess_field_type("unknown"),
            FieldValue::String("unknown".to_string())
        );
    }
}
