//! Gene-by-sample expression matrix and its assembly from normalized series.

use crate::error::KiraError;
use crate::normalize::NormalizedSeries;

/// Dense identifier × sample matrix with no missing cells.
///
/// Rows keep the first-appearance order of the first contributing series,
/// columns keep the order samples were encountered in the series.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMatrix {
    id_column: String,
    samples: Vec<String>,
    row_ids: Vec<String>,
    /// Row-major, `row_ids.len() * samples.len()` values.
    values: Vec<f64>,
}

impl ExpressionMatrix {
    pub fn new(
        id_column: impl Into<String>,
        samples: Vec<String>,
        row_ids: Vec<String>,
        values: Vec<f64>,
    ) -> Result<Self, KiraError> {
        let expected = row_ids.len() * samples.len();
        if values.len() != expected {
            return Err(KiraError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            id_column: id_column.into(),
            samples,
            row_ids,
            values,
        })
    }

    /// Shared identifier column name, empty when the samples disagreed.
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.row_ids.len()
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.n_samples() + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let width = self.n_samples();
        &self.values[row * width..(row + 1) * width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.n_samples().max(1))
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.n_rows()).map(|row| self.get(row, col)).collect()
    }

    /// Look a row up by identifier.
    pub fn row_by_id(&self, id: &str) -> Option<&[f64]> {
        self.row_ids
            .iter()
            .position(|row_id| row_id == id)
            .map(|row| self.row(row))
    }
}

/// Join normalized series on their identifiers.
///
/// An identifier survives only if every series has it with a non-missing
/// value. No series, or an empty intersection, is an `EmptyResult`.
pub fn assemble(series: Vec<NormalizedSeries>) -> Result<ExpressionMatrix, KiraError> {
    let Some(first) = series.first() else {
        return Err(KiraError::EmptyResult(
            "every sample was skipped".to_string(),
        ));
    };

    let id_column = if series
        .iter()
        .all(|item| item.id_column() == first.id_column())
    {
        first.id_column().to_string()
    } else {
        String::new()
    };
    let samples: Vec<String> = series.iter().map(|item| item.sample().to_string()).collect();

    let mut row_ids = Vec::new();
    let mut values = Vec::new();
    let mut row = Vec::with_capacity(series.len());
    for (id, _) in first.entries() {
        row.clear();
        for item in &series {
            match item.get(id) {
                Some(Some(value)) => row.push(value),
                _ => break,
            }
        }
        if row.len() == series.len() {
            row_ids.push(id.clone());
            values.extend_from_slice(&row);
        }
    }

    if row_ids.is_empty() {
        return Err(KiraError::EmptyResult(format!(
            "no identifier is present with a value in all {} samples",
            series.len()
        )));
    }

    ExpressionMatrix::new(id_column, samples, row_ids, values)
}

/// An expression matrix with its per-row aggregate column appended.
///
/// Only `stats::summarize` builds one, so the aggregate is appended exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedMatrix {
    matrix: ExpressionMatrix,
    aggregate_name: String,
    aggregate: Vec<f64>,
}

impl AggregatedMatrix {
    pub(crate) fn new(
        matrix: ExpressionMatrix,
        aggregate_name: impl Into<String>,
        aggregate: Vec<f64>,
    ) -> Self {
        Self {
            matrix,
            aggregate_name: aggregate_name.into(),
            aggregate,
        }
    }

    /// The sample columns, aggregate excluded.
    pub fn matrix(&self) -> &ExpressionMatrix {
        &self.matrix
    }

    pub fn aggregate_name(&self) -> &str {
        &self.aggregate_name
    }

    pub fn aggregate(&self) -> &[f64] {
        &self.aggregate
    }

    pub fn into_parts(self) -> (ExpressionMatrix, Vec<f64>) {
        (self.matrix, self.aggregate)
    }
}
