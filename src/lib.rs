//! Data preparation and aggregation behind a COVID-19 patient dashboard.
//!
//! The crate loads a patient case table once ([`Session::open`]) and answers
//! the dashboard's questions as pure queries over the immutable dataset:
//! age-range filtering, ten-band age grouping, ordered count-by views, and a
//! Pearson correlation matrix over the disease/ICU indicator columns.  The
//! presentation layer (sidebar, tabs, charts) is an external collaborator
//! that calls these functions and renders their results.

pub mod data;
pub mod session;

pub use data::aggregate::{AggregationView, AggregationView2, GroupKey};
pub use data::correlate::CorrelationMatrix;
pub use data::model::{Dataset, FieldValue, PatientRecord};
pub use data::DataError;
pub use session::Session;
