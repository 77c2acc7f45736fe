use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::data::aggregate::{
    count_by, count_by2, count_where_equal, AggregationView, AggregationView2, GroupKey,
};
use crate::data::correlate::{correlate, CorrelationMatrix};
use crate::data::filter::filter_by_range;
use crate::data::loader::load_file;
use crate::data::model::{
    Dataset, PatientRecord, COL_AGE, COL_ICU, COL_INTUBATED, COL_OUTCOME, COL_SEX, DISEASE_COLUMNS,
};
use crate::data::DataError;

// ---------------------------------------------------------------------------
// Session – the load-once dataset handle
// ---------------------------------------------------------------------------

/// A loaded dataset plus the canonical dashboard queries.
///
/// The dataset is read exactly once, at construction, and shared read-only
/// behind an `Arc` for the rest of the session; every query is a pure
/// function of it.  A failing query (e.g. a reversed age range) never
/// touches the shared dataset.
#[derive(Debug)]
pub struct Session {
    dataset: Arc<Dataset>,
}

impl Session {
    /// Load the dataset from `path` and wrap it for the session.
    pub fn open(path: &Path) -> Result<Self, DataError> {
        let dataset = load_file(path)?;
        info!("session opened with {} patient records", dataset.len());
        Ok(Session {
            dataset: Arc::new(dataset),
        })
    }

    /// Wrap an already-built dataset (tests, in-memory pipelines).
    pub fn from_dataset(dataset: Dataset) -> Self {
        Session {
            dataset: Arc::new(dataset),
        }
    }

    /// Cheap shared handle to the immutable dataset.
    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    // ---- Data overview ----

    /// The first `n` records, for overview tables.
    pub fn head(&self, n: usize) -> &[PatientRecord] {
        self.dataset.head(n)
    }

    /// Records whose age lies in `[low, high]` (the age-range slider).
    pub fn filter_ages(&self, low: f64, high: f64) -> Result<Dataset, DataError> {
        filter_by_range(&self.dataset, COL_AGE, low, high)
    }

    // ---- Age & gender analysis ----

    /// Case counts per age band.
    pub fn age_distribution(&self) -> AggregationView {
        count_by(&self.dataset, &GroupKey::AgeGroup)
    }

    /// Case counts per (age band, sex) pair.
    pub fn age_gender_distribution(&self) -> AggregationView2 {
        count_by2(
            &self.dataset,
            &GroupKey::AgeGroup,
            &GroupKey::Column(COL_SEX.to_string()),
        )
    }

    // ---- Intubation & ICU ----

    /// Case counts per intubation status code.
    pub fn intubation_counts(&self) -> AggregationView {
        count_by(&self.dataset, &GroupKey::Column(COL_INTUBATED.to_string()))
    }

    /// Pearson correlation of the nine disease indicators and ICU admission.
    pub fn disease_icu_correlation(&self) -> CorrelationMatrix {
        let columns: Vec<&str> = DISEASE_COLUMNS.iter().copied().chain([COL_ICU]).collect();
        correlate(&self.dataset, &columns)
    }

    // ---- Diseases & mortality ----

    /// How many patients carry each disease.
    pub fn disease_prevalence(&self) -> AggregationView {
        count_where_equal(&self.dataset, &DISEASE_COLUMNS, 1.0)
    }

    /// How many deceased patients carry each disease.
    pub fn deceased_disease_prevalence(&self) -> AggregationView {
        let deceased: Vec<PatientRecord> = self
            .dataset
            .records
            .iter()
            .filter(|rec| rec.numeric(COL_OUTCOME) == Some(1.0))
            .cloned()
            .collect();
        count_where_equal(&Dataset::from_records(deceased), &DISEASE_COLUMNS, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FieldValue;

    fn patient(age: i64, sex: i64, outcome: i64, diabetes: i64) -> PatientRecord {
        PatientRecord {
            fields: [
                ("AGE".to_string(), FieldValue::Integer(age)),
                ("SEX".to_string(), FieldValue::Integer(sex)),
                ("OUTCOME".to_string(), FieldValue::Integer(outcome)),
                ("DIABETES".to_string(), FieldValue::Integer(diabetes)),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn session() -> Session {
        Session::from_dataset(Dataset::from_records(vec![
            patient(34, 1, 0, 2),
            patient(67, 2, 1, 1),
            patient(71, 2, 1, 2),
        ]))
    }

    #[test]
    fn test_dataset_handle_is_shared() {
        let s = session();
        let a = s.dataset();
        let b = s.dataset();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_filter_ages_reports_errors_without_corrupting_dataset() {
        let s = session();
        assert!(s.filter_ages(60.0, 20.0).is_err());
        assert_eq!(s.dataset().len(), 3);
        let mid = s.filter_ages(60.0, 80.0).unwrap();
        assert_eq!(mid.len(), 2);
    }

    #[test]
    fn test_deceased_prevalence_only_counts_deceased() {
        let s = session();
        let all = s.disease_prevalence();
        let deceased = s.deceased_disease_prevalence();
        assert_eq!(all.count("DIABETES"), Some(1));
        assert_eq!(deceased.count("DIABETES"), Some(1));
        assert_eq!(deceased.count("COPD"), Some(0));
    }

    #[test]
    fn test_age_distribution_uses_bands() {
        let s = session();
        let view = s.age_distribution();
        assert_eq!(view.count("31-40"), Some(1));
        assert_eq!(view.count("61-70"), Some(1));
        assert_eq!(view.count("71-80"), Some(1));
    }
}
