use serde::Serialize;

use crate::error::KiraError;
use crate::matrix::{AggregatedMatrix, ExpressionMatrix};

/// Name of the appended per-row mean column.
pub const AGGREGATE_COLUMN: &str = "mean_expression";

/// Descriptive statistics of one numeric column.
///
/// `std` is the sample standard deviation (n - 1 denominator), so a single
/// value gives NaN. Quartiles interpolate linearly between order statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl SummaryStatistics {
    pub fn from_values(values: &[f64]) -> Result<Self, KiraError> {
        if values.is_empty() {
            return Err(KiraError::EmptyResult(
                "cannot describe an empty column".to_string(),
            ));
        }

        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if count > 1 {
            let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Ok(Self {
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile_sorted(&sorted, 0.25),
            p50: quantile_sorted(&sorted, 0.5),
            p75: quantile_sorted(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }

    /// Labelled rows in report order.
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.p25),
            ("50%", self.p50),
            ("75%", self.p75),
            ("max", self.max),
        ]
    }
}

/// Linear interpolation between the order statistics of `sorted`.
pub fn quantile_sorted(sorted: &[f64], quantile: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = quantile.clamp(0.0, 1.0) * (sorted.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Arithmetic mean of each row across all sample columns.
pub fn row_means(matrix: &ExpressionMatrix) -> Vec<f64> {
    let width = matrix.n_samples() as f64;
    (0..matrix.n_rows())
        .map(|row| matrix.row(row).iter().sum::<f64>() / width)
        .collect()
}

/// Append the aggregate column and describe it.
pub fn summarize(
    matrix: ExpressionMatrix,
) -> Result<(AggregatedMatrix, SummaryStatistics), KiraError> {
    let aggregate = row_means(&matrix);
    let stats = SummaryStatistics::from_values(&aggregate)?;
    Ok((
        AggregatedMatrix::new(matrix, AGGREGATE_COLUMN, aggregate),
        stats,
    ))
}
