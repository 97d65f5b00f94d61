use std::collections::HashMap;

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::Sample;
use crate::resolve::{Unusable, resolve_columns};

/// Cell texts read as a missing measurement (the usual NA spellings of
/// tabular exports).
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One sample reduced to identifier -> measurement, in first-appearance order.
///
/// A `None` value is a gap in the source table; assembly drops that identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    sample: String,
    id_column: String,
    entries: Vec<(String, Option<f64>)>,
    index: HashMap<String, usize>,
    duplicates: usize,
    blank_identifiers: usize,
}

impl NormalizedSeries {
    pub fn new(sample: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            sample: sample.into(),
            id_column: id_column.into(),
            entries: Vec::new(),
            index: HashMap::new(),
            duplicates: 0,
            blank_identifiers: 0,
        }
    }

    /// Insert a measurement; a repeated identifier keeps its position but
    /// takes the newer value.
    pub fn insert(&mut self, id: impl Into<String>, value: Option<f64>) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&position) => {
                self.entries[position].1 = value;
                self.duplicates += 1;
            }
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, value));
            }
        }
    }

    /// The sample name, which is also the name of the series' data column.
    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn entries(&self) -> &[(String, Option<f64>)] {
        &self.entries
    }

    /// `None` when the identifier is absent, `Some(None)` when present but missing.
    pub fn get(&self, id: &str) -> Option<Option<f64>> {
        self.index.get(id).map(|&position| self.entries[position].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows overwritten by a later row with the same identifier.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Rows dropped because their identifier cell was blank.
    pub fn blank_identifiers(&self) -> usize {
        self.blank_identifiers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSample {
    pub sample: String,
    pub reason: Unusable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Series(NormalizedSeries),
    Skipped(SkippedSample),
}

#[derive(Debug, Clone, Default)]
pub struct NormalizationOutcome {
    pub series: Vec<NormalizedSeries>,
    pub skipped: Vec<SkippedSample>,
}

impl NormalizationOutcome {
    pub fn duplicates(&self) -> usize {
        self.series.iter().map(NormalizedSeries::duplicates).sum()
    }
}

pub fn parse_measurement(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if MISSING_TOKENS.contains(&cell) {
        return None;
    }
    cell.parse::<f64>().ok().filter(|value| !value.is_nan())
}

/// Reduce one sample to its (identifier, value) series. The sample is
/// consumed; nothing of the raw table survives normalization.
///
/// Identifiers are trimmed; a row whose identifier is blank after trimming
/// cannot be joined and is counted in `blank_identifiers` instead.
pub fn normalize_sample(sample: Sample) -> Normalized {
    let Sample { name, table, .. } = sample;
    let choice = match resolve_columns(table.columns()) {
        Ok(choice) => choice,
        Err(reason) => return skipped(name, reason),
    };
    let Some(id_index) = table.column_index(&choice.id_column) else {
        return skipped(name, Unusable::NoIdentifierColumn);
    };
    let Some(value_index) = table.column_index(&choice.value_column) else {
        return skipped(name, Unusable::NoValueColumn);
    };

    let mut series = NormalizedSeries::new(name, choice.id_column);
    for row in table.rows() {
        let id = row[id_index].trim();
        if id.is_empty() {
            series.blank_identifiers += 1;
            continue;
        }
        series.insert(id, parse_measurement(&row[value_index]));
    }
    Normalized::Series(series)
}

fn skipped(sample: String, reason: Unusable) -> Normalized {
    Normalized::Skipped(SkippedSample { sample, reason })
}

/// Normalize every sample in series order, reporting skips, duplicate
/// identifiers and blank identifiers to `sink`.
pub fn normalize_all(samples: Vec<Sample>, sink: &dyn ProgressSink) -> NormalizationOutcome {
    let mut outcome = NormalizationOutcome::default();
    for sample in samples {
        match normalize_sample(sample) {
            Normalized::Series(series) => {
                if series.duplicates() > 0 {
                    sink.event(ProgressEvent::new(format!(
                        "warning: {} duplicate identifier row(s) in {}, last occurrence kept",
                        series.duplicates(),
                        series.sample()
                    )));
                }
                if series.blank_identifiers() > 0 {
                    sink.event(ProgressEvent::new(format!(
                        "warning: {} row(s) without identifier in {} dropped",
                        series.blank_identifiers(),
                        series.sample()
                    )));
                }
                outcome.series.push(series);
            }
            Normalized::Skipped(skipped) => {
                sink.event(ProgressEvent::new(format!(
                    "sample skipped (missing columns: {}): {}",
                    skipped.reason, skipped.sample
                )));
                outcome.skipped.push(skipped);
            }
        }
    }
    outcome
}
