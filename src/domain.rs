use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KiraError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoSeriesAccession(String);

impl GeoSeriesAccession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeoSeriesAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GeoSeriesAccession {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let digits = normalized.strip_prefix("GSE").unwrap_or("");
        let is_valid = !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(KiraError::InvalidExpressionAccession(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// One sample's measurement table as delivered by the provider.
///
/// The schema is not fixed: column names and count vary between samples of
/// the same series, so consumers look columns up by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSampleTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawSampleTable {
    /// Rows shorter than the header are padded with empty cells, longer rows
    /// are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate a single column top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub title: Option<String>,
    pub table: RawSampleTable,
}

impl Sample {
    pub fn new(name: impl Into<String>, table: RawSampleTable) -> Self {
        Self {
            name: name.into(),
            title: None,
            table,
        }
    }
}

/// A series as returned by a dataset provider, samples in series order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDataset {
    pub accession: Option<String>,
    pub title: Option<String>,
    pub samples: Vec<Sample>,
}
