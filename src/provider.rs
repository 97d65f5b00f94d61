use std::time::Instant;

use camino::Utf8PathBuf;

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::{GeoSeriesAccession, SeriesDataset};
use crate::error::KiraError;
use crate::geo::GeoClient;
use crate::soft::{decode_soft_gz, parse_soft, read_soft_file};
use crate::store::Workspace;

/// Source of per-sample tables for one series.
pub trait DatasetProvider {
    fn load(
        &self,
        accession: &GeoSeriesAccession,
        sink: &dyn ProgressSink,
    ) -> Result<SeriesDataset, KiraError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub force: bool,
    pub no_cache: bool,
}

/// GEO family files, looked up in the project data dir, then the shared
/// cache, then downloaded.
pub struct GeoDatasetProvider<C: GeoClient> {
    client: C,
    workspace: Workspace,
    options: FetchOptions,
}

impl<C: GeoClient> GeoDatasetProvider<C> {
    pub fn new(client: C, workspace: Workspace, options: FetchOptions) -> Self {
        Self {
            client,
            workspace,
            options,
        }
    }

    fn download(
        &self,
        accession: &GeoSeriesAccession,
        project_path: &Utf8PathBuf,
        sink: &dyn ProgressSink,
    ) -> Result<SeriesDataset, KiraError> {
        sink.event(ProgressEvent::new(format!(
            "downloading {} from NCBI GEO...",
            accession.as_str()
        )));
        let start = Instant::now();
        let bytes = self.client.fetch_soft_gz(accession)?;
        sink.event(ProgressEvent::timed(
            format!("geo.response bytes={}", bytes.len()),
            start.elapsed(),
        ));

        // Only a file that decodes and parses is persisted.
        let dataset = parse_soft(&decode_soft_gz(&bytes)?)?;

        self.workspace.ensure_data_dir()?;
        Workspace::write_bytes_atomic(project_path, &bytes)?;
        if !self.options.no_cache {
            if let Some(cache_path) = self.workspace.cache_soft_path(accession) {
                Workspace::write_bytes_atomic(&cache_path, &bytes)?;
            }
        }
        sink.event(ProgressEvent::new("download complete"));
        Ok(dataset)
    }
}

impl<C: GeoClient> DatasetProvider for GeoDatasetProvider<C> {
    fn load(
        &self,
        accession: &GeoSeriesAccession,
        sink: &dyn ProgressSink,
    ) -> Result<SeriesDataset, KiraError> {
        let project_path = self.workspace.project_soft_path(accession);

        if !self.options.force && project_path.as_std_path().exists() {
            sink.event(ProgressEvent::new(format!(
                "using local copy {project_path}"
            )));
            return read_soft_file(project_path.as_std_path());
        }

        if !self.options.force {
            if let Some(cache_path) = self.workspace.cache_soft_path(accession) {
                if cache_path.as_std_path().exists() {
                    sink.event(ProgressEvent::new(format!(
                        "using cached copy {cache_path}"
                    )));
                    Workspace::copy_file_atomic(&cache_path, &project_path)?;
                    return read_soft_file(project_path.as_std_path());
                }
            }
        }

        self.download(accession, &project_path, sink)
    }
}

/// A SOFT file already on disk (`.soft` or `.soft.gz`).
#[derive(Debug, Clone)]
pub struct SoftFileProvider {
    path: Utf8PathBuf,
}

impl SoftFileProvider {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl DatasetProvider for SoftFileProvider {
    fn load(
        &self,
        accession: &GeoSeriesAccession,
        sink: &dyn ProgressSink,
    ) -> Result<SeriesDataset, KiraError> {
        sink.event(ProgressEvent::new(format!("reading {}", self.path)));
        let dataset = read_soft_file(self.path.as_std_path())?;
        if let Some(found) = dataset.accession.as_deref() {
            if !found.eq_ignore_ascii_case(accession.as_str()) {
                sink.event(ProgressEvent::new(format!(
                    "warning: {} describes {found}, not {}",
                    self.path,
                    accession.as_str()
                )));
            }
        }
        Ok(dataset)
    }
}
