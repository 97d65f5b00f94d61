//! Parser for GEO SOFT "family" files.
//!
//! A family file is a sequence of entities (`^SERIES`, `^PLATFORM`,
//! `^SAMPLE`, ...) each followed by `!Key = value` attributes and optionally a
//! tab-separated data table between `!<entity>_table_begin` and
//! `!<entity>_table_end`. Only sample tables are kept.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::domain::{RawSampleTable, Sample, SeriesDataset};
use crate::error::KiraError;

const SAMPLE_TABLE_BEGIN: &str = "!sample_table_begin";
const SAMPLE_TABLE_END: &str = "!sample_table_end";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entity {
    Series,
    Sample,
    Other,
}

struct PendingSample {
    name: String,
    title: Option<String>,
    table: Option<RawSampleTable>,
}

impl PendingSample {
    fn finish(self) -> Sample {
        Sample {
            name: self.name,
            title: self.title,
            table: self.table.unwrap_or_default(),
        }
    }
}

pub fn parse_soft(text: &str) -> Result<SeriesDataset, KiraError> {
    let mut dataset = SeriesDataset {
        accession: None,
        title: None,
        samples: Vec::new(),
    };
    let mut entity = Entity::Other;
    let mut current: Option<PendingSample> = None;
    let mut lines = text.lines().enumerate();

    while let Some((line_no, raw_line)) = lines.next() {
        let line = raw_line.trim_end_matches('\r');
        if let Some(header) = line.strip_prefix('^') {
            if let Some(sample) = current.take() {
                dataset.samples.push(sample.finish());
            }
            let (kind, value) = split_attribute(header);
            entity = match kind.to_ascii_uppercase().as_str() {
                "SERIES" => {
                    dataset.accession = Some(value.to_string());
                    Entity::Series
                }
                "SAMPLE" => {
                    current = Some(PendingSample {
                        name: value.to_string(),
                        title: None,
                        table: None,
                    });
                    Entity::Sample
                }
                _ => Entity::Other,
            };
            continue;
        }

        if line.eq_ignore_ascii_case(SAMPLE_TABLE_BEGIN) {
            let table = read_table(&mut lines, line_no)?;
            if let (Entity::Sample, Some(sample)) = (entity, current.as_mut()) {
                sample.table = Some(table);
            }
            continue;
        }

        let Some(attribute) = line.strip_prefix('!') else {
            continue;
        };
        let (key, value) = split_attribute(attribute);
        match (entity, key) {
            (Entity::Series, "Series_title") if dataset.title.is_none() => {
                dataset.title = Some(value.to_string());
            }
            (Entity::Sample, "Sample_title") => {
                if let Some(sample) = current.as_mut() {
                    sample.title = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    if let Some(sample) = current.take() {
        dataset.samples.push(sample.finish());
    }
    Ok(dataset)
}

/// Read a SOFT file from disk, gunzipping when the name ends in `.gz`.
pub fn read_soft_file(path: &Path) -> Result<SeriesDataset, KiraError> {
    let mut file = File::open(path)
        .map_err(|err| KiraError::Filesystem(format!("open {}: {err}", path.display())))?;
    let mut bytes = Vec::new();
    let is_gz = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);
    let read = if is_gz {
        GzDecoder::new(file).read_to_end(&mut bytes)
    } else {
        file.read_to_end(&mut bytes)
    };
    read.map_err(|err| KiraError::SoftParse(format!("{}: {err}", path.display())))?;
    parse_soft(&String::from_utf8_lossy(&bytes))
}

/// Gunzip a downloaded family file. Bytes that are not UTF-8 (GEO free text
/// is sometimes Latin-1) become U+FFFD instead of failing the read.
pub fn decode_soft_gz(bytes: &[u8]) -> Result<String, KiraError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|err| KiraError::SoftParse(err.to_string()))?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn split_attribute(line: &str) -> (&str, &str) {
    match line.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (line.trim(), ""),
    }
}

fn read_table<'a, I>(lines: &mut I, begin_line: usize) -> Result<RawSampleTable, KiraError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (_, raw_line) in lines.by_ref() {
        let line = raw_line.trim_end_matches('\r');
        if line.eq_ignore_ascii_case(SAMPLE_TABLE_END) {
            let columns = header.unwrap_or_default();
            return Ok(RawSampleTable::new(columns, rows));
        }
        let cells: Vec<String> = line.split('\t').map(|cell| cell.trim().to_string()).collect();
        if header.is_none() {
            header = Some(cells);
        } else {
            rows.push(cells);
        }
    }
    Err(KiraError::SoftParse(format!(
        "sample table opened at line {} is never closed",
        begin_line + 1
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_without_value() {
        assert_eq!(split_attribute("sample_table_begin"), ("sample_table_begin", ""));
        assert_eq!(split_attribute("Sample_title = tumor 1 "), ("Sample_title", "tumor 1"));
    }

    #[test]
    fn platform_tables_are_ignored() {
        let text = "^PLATFORM = GPL96\n!platform_table_begin\nID\tGB_ACC\n1007_s_at\tU48705\n!platform_table_end\n";
        let dataset = parse_soft(text).unwrap();
        assert!(dataset.samples.is_empty());
    }
}
