use serde::Serialize;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Coercion: Dataset columns → numeric table
// ---------------------------------------------------------------------------

/// Coerce the named columns into a column-major numeric table.
///
/// Cells that are missing or non-numeric default to 0.0.  This is the
/// explicit coerce-or-default step the correlation runs on; callers that
/// need a different default can build their own table.
pub fn numeric_table(dataset: &Dataset, columns: &[&str]) -> Vec<Vec<f64>> {
    columns
        .iter()
        .map(|col| {
            dataset
                .records
                .iter()
                .map(|rec| rec.numeric(col).unwrap_or(0.0))
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pearson correlation matrix
// ---------------------------------------------------------------------------

/// A symmetric pairwise correlation table over a fixed column list.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    /// Column labels, in the order the caller supplied them.
    pub columns: Vec<String>,
    /// `values[i][j]` is the correlation of columns i and j.  The diagonal
    /// is exactly 1.0; pairings with a zero-variance column are NaN.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Look up a correlation by column names.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Compute the pairwise Pearson correlation matrix over `columns`.
///
/// Values are coerced through [`numeric_table`] first.  A column with zero
/// variance has no defined correlation with any other column; those cells
/// hold `f64::NAN` rather than raising.  This never panics, whatever the
/// dataset contents.
pub fn correlate(dataset: &Dataset, columns: &[&str]) -> CorrelationMatrix {
    let table = numeric_table(dataset, columns);
    let k = columns.len();

    let mut values = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        values[i][i] = 1.0;
        for j in (i + 1)..k {
            let r = pearson(&table[i], &table[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    }
}

/// Pearson r of two equal-length samples; NaN when either has zero variance.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n == 0 {
        return f64::NAN;
    }
    let nf = n as f64;

    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        let dy = ys[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    // Accumulated rounding can push |r| a hair past 1.
    (cov / denom).clamp(-1.0, 1.0)
}
