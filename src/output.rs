use std::io::{self, Write};

use serde::Serialize;

use crate::app::{InspectResult, ProgressEvent, ProgressSink, RunResult};
use crate::error::KiraError;
use crate::matrix::AggregatedMatrix;
use crate::stats::SummaryStatistics;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

/// Shortest text that reads back to the same `f64`, always with a decimal
/// point or exponent (`2.0`, `0.7071067811865476`, `NaN`).
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}

/// Two tab-separated columns: statistic name, value. The header row names
/// the described column.
pub fn summary_tsv(stats: &SummaryStatistics, column: &str) -> Result<Vec<u8>, KiraError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());
    writer.write_record(["", column]).map_err(csv_error)?;
    for (name, value) in stats.entries() {
        writer
            .write_record([name, format_value(value).as_str()])
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|err| KiraError::Filesystem(err.to_string()))
}

/// Comma-separated matrix: identifier column, one column per sample, then
/// the aggregate column.
pub fn matrix_csv(aggregated: &AggregatedMatrix) -> Result<Vec<u8>, KiraError> {
    let matrix = aggregated.matrix();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(matrix.n_samples() + 2);
    header.push(matrix.id_column());
    header.extend(matrix.samples().iter().map(String::as_str));
    header.push(aggregated.aggregate_name());
    writer.write_record(&header).map_err(csv_error)?;

    let mut record = Vec::with_capacity(header.len());
    for (row, id) in matrix.row_ids().iter().enumerate() {
        record.clear();
        record.push(id.clone());
        record.extend(matrix.row(row).iter().map(|&value| format_value(value)));
        record.push(format_value(aggregated.aggregate()[row]));
        writer.write_record(&record).map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|err| KiraError::Filesystem(err.to_string()))
}

fn csv_error(err: csv::Error) -> KiraError {
    KiraError::Filesystem(err.to_string())
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_inspect(result: &InspectResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_keep_a_decimal_point() {
        assert_eq!(format_value(2.0), "2.0");
        assert_eq!(format_value(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_value(f64::NAN), "NaN");
    }
}
