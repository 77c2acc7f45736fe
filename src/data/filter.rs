use super::model::Dataset;
use super::DataError;

// ---------------------------------------------------------------------------
// Numeric range filter
// ---------------------------------------------------------------------------

/// Restrict the dataset to records whose `column` value lies in
/// `[low, high]`, both bounds inclusive.
///
/// The result is a fresh [`Dataset`] (indices rebuilt) holding the surviving
/// records in their original order; the input is untouched.  Records whose
/// value is missing or non-numeric never match.  `low > high` is a caller
/// error.
pub fn filter_by_range(
    dataset: &Dataset,
    column: &str,
    low: f64,
    high: f64,
) -> Result<Dataset, DataError> {
    if low > high {
        return Err(DataError::InvalidRange { low, high });
    }

    let records = dataset
        .records
        .iter()
        .filter(|rec| {
            rec.numeric(column)
                .map(|v| low <= v && v <= high)
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    Ok(Dataset::from_records(records))
}
