#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use camino::Utf8PathBuf;

use kira_expression::app::{ProgressEvent, ProgressSink};
use kira_expression::domain::{RawSampleTable, Sample};
use kira_expression::error::KiraError;
use kira_expression::render::ChartRenderer;
use kira_expression::store::Workspace;
use kira_expression::view::{ClusteredHeatmap, HistogramData};

/// Build a sample from a header and string rows.
pub fn sample(name: &str, columns: &[&str], rows: &[&[&str]]) -> Sample {
    let table = RawSampleTable::new(
        columns.iter().map(|column| column.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    );
    Sample::new(name, table)
}

pub fn id_value_sample(name: &str, rows: &[(&str, &str)]) -> Sample {
    let rows: Vec<[&str; 2]> = rows.iter().map(|(id, value)| [*id, *value]).collect();
    let rows: Vec<&[&str]> = rows.iter().map(|row| row.as_slice()).collect();
    sample(name, &["ID_REF", "VALUE"], &rows)
}

#[derive(Default)]
pub struct RecordingSink {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|message| message.contains(needle))
    }
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.messages.lock().unwrap().push(event.message);
    }
}

/// Renderer that records what it was asked to draw and writes a marker file.
#[derive(Default)]
pub struct RecordingRenderer {
    pub histograms: Mutex<Vec<HistogramData>>,
    pub heatmaps: Mutex<Vec<ClusteredHeatmap>>,
}

impl ChartRenderer for RecordingRenderer {
    fn render_histogram(&self, data: &HistogramData, destination: &Path) -> Result<(), KiraError> {
        self.histograms.lock().unwrap().push(data.clone());
        std::fs::write(destination, b"histogram").map_err(|err| KiraError::Render(err.to_string()))
    }

    fn render_heatmap(
        &self,
        heatmap: &ClusteredHeatmap,
        destination: &Path,
    ) -> Result<(), KiraError> {
        self.heatmaps.lock().unwrap().push(heatmap.clone());
        std::fs::write(destination, b"heatmap").map_err(|err| KiraError::Render(err.to_string()))
    }
}

pub fn temp_workspace(root: &Path) -> Workspace {
    let root = Utf8PathBuf::from_path_buf(root.to_path_buf()).unwrap();
    Workspace::new_with_paths(
        root.join("data"),
        root.join("results"),
        root.join("logs/run.log"),
        Some(root.join("cache")),
    )
}
