//! Data layer: core types, loading, and the derived-view primitives.
//!
//! Architecture:
//! ```text
//!  .csv / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<PatientRecord>, column indices
//!   └──────────┘
//!        │
//!        ├──────────────┬──────────────┬───────────────┐
//!        ▼              ▼              ▼               ▼
//!   ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌───────────┐
//!   │  filter   │  │  bucket   │  │ aggregate  │  │ correlate  │
//!   └──────────┘  └──────────┘  └───────────┘  └───────────┘
//!      age range     age bands     ordered tallies   Pearson matrix
//! ```
//!
//! Every view is a pure function of `(&Dataset, parameters)`; the dataset is
//! never mutated after load.

use thiserror::Error;

pub mod aggregate;
pub mod bucket;
pub mod correlate;
pub mod filter;
pub mod loader;
pub mod model;

/// Error type used across the data layer.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("row {row}: column {column:?} holds {value:?}, not a calendar date")]
    BadDate {
        row: usize,
        column: String,
        value: String,
    },

    #[error("invalid range: low {low} is greater than high {high}")]
    InvalidRange { low: f64, high: f64 },
}
