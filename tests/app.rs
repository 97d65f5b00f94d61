mod common;

use assert_matches::assert_matches;

use kira_expression::app::{App, ProgressSink, RunOptions};
use kira_expression::domain::{GeoSeriesAccession, SeriesDataset};
use kira_expression::error::KiraError;
use kira_expression::provider::DatasetProvider;
use kira_expression::render::ChartRenderer;
use kira_expression::view::{ClusteredHeatmap, HistogramData};

use common::{RecordingRenderer, RecordingSink, id_value_sample, sample, temp_workspace};

struct FixedProvider(SeriesDataset);

impl DatasetProvider for FixedProvider {
    fn load(
        &self,
        _accession: &GeoSeriesAccession,
        _sink: &dyn ProgressSink,
    ) -> Result<SeriesDataset, KiraError> {
        Ok(self.0.clone())
    }
}

struct BrokenCharts;

impl ChartRenderer for BrokenCharts {
    fn render_histogram(
        &self,
        _data: &HistogramData,
        _destination: &std::path::Path,
    ) -> Result<(), KiraError> {
        Err(KiraError::Render("no display".to_string()))
    }

    fn render_heatmap(
        &self,
        _heatmap: &ClusteredHeatmap,
        _destination: &std::path::Path,
    ) -> Result<(), KiraError> {
        Err(KiraError::Render("no display".to_string()))
    }
}

fn dataset() -> SeriesDataset {
    SeriesDataset {
        accession: Some("GSE1".to_string()),
        title: Some("two samples".to_string()),
        samples: vec![
            id_value_sample("sample1", &[("g1", "1.0"), ("g2", "2.0")]),
            id_value_sample("sample2", &[("g1", "3.0"), ("g2", "4.0")]),
            sample("sample3", &["ID_REF", "DETECTION"], &[&["g1", "P"]]),
        ],
    }
}

fn accession() -> GeoSeriesAccession {
    "GSE1".parse().unwrap()
}

#[test]
fn run_writes_every_output() {
    let temp = tempfile::tempdir().unwrap();
    let workspace = temp_workspace(temp.path());
    let app = App::new(
        workspace.clone(),
        FixedProvider(dataset()),
        RecordingRenderer::default(),
    );
    let sink = RecordingSink::default();

    let result = app
        .run(&accession(), &RunOptions::default(), &sink)
        .unwrap();

    assert_eq!(result.samples_total, 3);
    assert_eq!(result.samples_used, vec!["sample1", "sample2"]);
    assert_eq!(result.samples_skipped.len(), 1);
    assert_eq!(result.genes, 2);
    assert_eq!(result.statistics.mean, 2.5);

    let matrix = std::fs::read_to_string(workspace.matrix_path().as_std_path()).unwrap();
    assert_eq!(
        matrix,
        "ID_REF,sample1,sample2,mean_expression\ng1,1.0,3.0,2.0\ng2,2.0,4.0,3.0\n"
    );

    let summary = std::fs::read_to_string(workspace.summary_stats_path().as_std_path()).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "\tmean_expression");
    assert_eq!(lines[1], "count\t2.0");
    assert_eq!(lines[2], "mean\t2.5");
    assert_eq!(lines[3], "std\t0.7071067811865476");
    assert_eq!(lines[8], "max\t3.0");

    assert!(workspace.histogram_path().as_std_path().exists());
    assert!(workspace.heatmap_path().as_std_path().exists());
    assert!(sink.contains("sample skipped"));
    assert!(sink.contains("merge complete: 2 genes, 2 samples"));
}

#[test]
fn charts_see_aggregate_and_sampled_rows() {
    let temp = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let app = App::new(temp_workspace(temp.path()), FixedProvider(dataset()), renderer);
    let options = RunOptions {
        heatmap_rows: 1,
        seed: 42,
        histogram_bins: 4,
    };

    app.run(&accession(), &options, &RecordingSink::default())
        .unwrap();

    let histograms = app.renderer().histograms.lock().unwrap().clone();
    assert_eq!(histograms.len(), 1);
    assert_eq!(histograms[0].bins.len(), 4);
    assert_eq!(
        histograms[0].bins.iter().map(|bin| bin.count).sum::<usize>(),
        2
    );

    let heatmaps = app.renderer().heatmaps.lock().unwrap().clone();
    assert_eq!(heatmaps[0].row_labels.len(), 1);
    assert_eq!(heatmaps[0].col_labels.len(), 2);
}

#[test]
fn empty_result_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let workspace = temp_workspace(temp.path());
    let unusable = SeriesDataset {
        accession: Some("GSE1".to_string()),
        title: None,
        samples: vec![
            sample("sample1", &["ID_REF"], &[&["g1"]]),
            sample("sample2", &["DETECTION", "VALUE"], &[&["P", "1.0"]]),
        ],
    };
    let app = App::new(
        workspace.clone(),
        FixedProvider(unusable),
        RecordingRenderer::default(),
    );

    let result = app.run(&accession(), &RunOptions::default(), &RecordingSink::default());

    assert_matches!(result, Err(KiraError::EmptyResult(_)));
    assert!(!workspace.results_dir().as_std_path().exists());
}

#[test]
fn inspect_lists_every_sample() {
    let temp = tempfile::tempdir().unwrap();
    let app = App::new(
        temp_workspace(temp.path()),
        FixedProvider(dataset()),
        RecordingRenderer::default(),
    );

    let result = app.inspect(&accession(), &RecordingSink::default()).unwrap();

    assert_eq!(result.title.as_deref(), Some("two samples"));
    assert_eq!(result.samples.len(), 3);
    assert_eq!(result.samples[0].id_column.as_deref(), Some("ID_REF"));
    assert_eq!(result.samples[0].value_column.as_deref(), Some("VALUE"));
    assert!(result.samples[2].unusable.is_some());
    assert!(!app.workspace().results_dir().as_std_path().exists());
}

#[test]
fn chart_failure_keeps_data_outputs() {
    let temp = tempfile::tempdir().unwrap();
    let workspace = temp_workspace(temp.path());
    let app = App::new(workspace.clone(), FixedProvider(dataset()), BrokenCharts);

    let result = app.run(&accession(), &RunOptions::default(), &RecordingSink::default());

    assert_matches!(result, Err(KiraError::Render(_)));
    assert!(workspace.summary_stats_path().as_std_path().exists());
    let matrix = std::fs::read_to_string(workspace.matrix_path().as_std_path()).unwrap();
    assert!(matrix.starts_with("ID_REF,sample1,sample2,mean_expression\n"));
}

#[test]
fn rerun_is_identical() {
    let temp = tempfile::tempdir().unwrap();
    let workspace = temp_workspace(temp.path());
    let app = App::new(
        workspace.clone(),
        FixedProvider(dataset()),
        RecordingRenderer::default(),
    );

    let first = app
        .run(&accession(), &RunOptions::default(), &RecordingSink::default())
        .unwrap();
    let first_matrix = std::fs::read(workspace.matrix_path().as_std_path()).unwrap();
    let first_stats = std::fs::read(workspace.summary_stats_path().as_std_path()).unwrap();

    let second = app
        .run(&accession(), &RunOptions::default(), &RecordingSink::default())
        .unwrap();

    assert_eq!(first.statistics, second.statistics);
    assert_eq!(first.samples_used, second.samples_used);
    assert_eq!(
        std::fs::read(workspace.matrix_path().as_std_path()).unwrap(),
        first_matrix
    );
    assert_eq!(
        std::fs::read(workspace.summary_stats_path().as_std_path()).unwrap(),
        first_stats
    );
    let heatmaps = app.renderer().heatmaps.lock().unwrap().clone();
    assert_eq!(heatmaps[0], heatmaps[1]);
}
