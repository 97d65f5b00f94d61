use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::GeoSeriesAccession;
use crate::error::KiraError;
use crate::matrix::assemble;
use crate::normalize::{SkippedSample, normalize_all};
use crate::output::{matrix_csv, summary_tsv};
use crate::provider::DatasetProvider;
use crate::render::ChartRenderer;
use crate::resolve::{Unusable, resolve_columns};
use crate::stats::{SummaryStatistics, summarize};
use crate::store::Workspace;
use crate::view::{
    ClusteredHeatmap, DEFAULT_HEATMAP_ROWS, DEFAULT_HISTOGRAM_BINS, DEFAULT_SEED, HistogramData,
    sample_rows,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub heatmap_rows: usize,
    pub seed: u64,
    pub histogram_bins: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            heatmap_rows: DEFAULT_HEATMAP_ROWS,
            seed: DEFAULT_SEED,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub accession: String,
    pub title: Option<String>,
    pub samples_total: usize,
    pub samples_used: Vec<String>,
    pub samples_skipped: Vec<SkippedSample>,
    pub genes: usize,
    pub duplicate_rows: usize,
    pub statistics: SummaryStatistics,
    pub outputs: RunOutputs,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutputs {
    pub summary_stats: String,
    pub matrix: String,
    pub histogram: String,
    pub heatmap: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectResult {
    pub accession: String,
    pub title: Option<String>,
    pub samples: Vec<InspectEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectEntry {
    pub sample: String,
    pub title: Option<String>,
    pub rows: usize,
    pub columns: Vec<String>,
    pub id_column: Option<String>,
    pub value_column: Option<String>,
    pub unusable: Option<Unusable>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

impl ProgressEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            elapsed: None,
        }
    }

    pub fn timed(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            message: message.into(),
            elapsed: Some(elapsed),
        }
    }
}

/// Receiver of human-readable progress; never part of the data contract.
pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<P: DatasetProvider, R: ChartRenderer> {
    workspace: Workspace,
    provider: P,
    renderer: R,
}

impl<P: DatasetProvider, R: ChartRenderer> App<P, R> {
    pub fn new(workspace: Workspace, provider: P, renderer: R) -> Self {
        Self {
            workspace,
            provider,
            renderer,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Full pipeline: load, normalize, assemble, describe, export, chart.
    ///
    /// Nothing is written to the results directory unless assembly succeeds,
    /// and the statistics and matrix files are written before the renderer
    /// runs, so a chart failure leaves the data outputs complete.
    pub fn run(
        &self,
        accession: &GeoSeriesAccession,
        options: &RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RunResult, KiraError> {
        let start = Instant::now();
        sink.event(ProgressEvent::new(format!(
            "fetching dataset {}...",
            accession.as_str()
        )));
        let dataset = self.provider.load(accession, sink)?;
        sink.event(ProgressEvent::new(format!(
            "series title: {}",
            dataset.title.as_deref().unwrap_or("title not available")
        )));
        let samples_total = dataset.samples.len();
        sink.event(ProgressEvent::new(format!("samples: {samples_total}")));

        sink.event(ProgressEvent::new(
            "extracting and merging expression tables...",
        ));
        let outcome = normalize_all(dataset.samples, sink);
        let duplicate_rows = outcome.duplicates();
        let samples_used: Vec<String> = outcome
            .series
            .iter()
            .map(|series| series.sample().to_string())
            .collect();
        let samples_skipped = outcome.skipped;

        let matrix = assemble(outcome.series)?;
        sink.event(ProgressEvent::new(format!(
            "merge complete: {} genes, {} samples",
            matrix.n_rows(),
            matrix.n_samples()
        )));

        sink.event(ProgressEvent::new("computing descriptive statistics..."));
        let (aggregated, statistics) = summarize(matrix)?;

        // Both data files are in place before any chart is attempted.
        let stats_tsv = summary_tsv(&statistics, aggregated.aggregate_name())?;
        let matrix_bytes = matrix_csv(&aggregated)?;
        self.workspace.ensure_results_dir()?;
        let stats_path = self.workspace.summary_stats_path();
        Workspace::write_bytes_atomic(&stats_path, &stats_tsv)?;
        sink.event(ProgressEvent::new(format!("statistics written to {stats_path}")));
        let matrix_path = self.workspace.matrix_path();
        Workspace::write_bytes_atomic(&matrix_path, &matrix_bytes)?;
        sink.event(ProgressEvent::new(format!("matrix exported to {matrix_path}")));

        let histogram = HistogramData::build(aggregated.aggregate(), options.histogram_bins);
        let histogram_path = self.workspace.histogram_path();
        self.renderer
            .render_histogram(&histogram, histogram_path.as_std_path())?;
        sink.event(ProgressEvent::new(format!(
            "histogram saved to {histogram_path}"
        )));

        sink.event(ProgressEvent::new("building clustered heatmap..."));
        let subset = sample_rows(aggregated.matrix(), options.heatmap_rows, options.seed);
        let heatmap = ClusteredHeatmap::build(&subset);
        let heatmap_path = self.workspace.heatmap_path();
        self.renderer
            .render_heatmap(&heatmap, heatmap_path.as_std_path())?;
        sink.event(ProgressEvent::new(format!("heatmap saved to {heatmap_path}")));
        sink.event(ProgressEvent::timed("run complete", start.elapsed()));

        Ok(RunResult {
            accession: accession.as_str().to_string(),
            title: dataset.title,
            samples_total,
            samples_used,
            samples_skipped,
            genes: aggregated.matrix().n_rows(),
            duplicate_rows,
            statistics,
            outputs: RunOutputs {
                summary_stats: stats_path.to_string(),
                matrix: matrix_path.to_string(),
                histogram: histogram_path.to_string(),
                heatmap: heatmap_path.to_string(),
            },
        })
    }

    /// Report how each sample's columns resolve without building anything.
    pub fn inspect(
        &self,
        accession: &GeoSeriesAccession,
        sink: &dyn ProgressSink,
    ) -> Result<InspectResult, KiraError> {
        let dataset = self.provider.load(accession, sink)?;
        let samples = dataset
            .samples
            .into_iter()
            .map(|sample| {
                let resolution = resolve_columns(sample.table.columns());
                let (id_column, value_column, unusable) = match resolution {
                    Ok(choice) => (Some(choice.id_column), Some(choice.value_column), None),
                    Err(reason) => (None, None, Some(reason)),
                };
                InspectEntry {
                    rows: sample.table.len(),
                    columns: sample.table.columns().to_vec(),
                    sample: sample.name,
                    title: sample.title,
                    id_column,
                    value_column,
                    unusable,
                }
            })
            .collect();
        Ok(InspectResult {
            accession: accession.as_str().to_string(),
            title: dataset.title,
            samples,
        })
    }
}
