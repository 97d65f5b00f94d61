use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

use crate::domain::GeoSeriesAccession;
use crate::error::KiraError;

pub const SUMMARY_STATS_FILE: &str = "summary_stats.txt";
pub const MATRIX_FILE: &str = "expression_cleaned.csv";
pub const HISTOGRAM_FILE: &str = "hist_expression.png";
pub const HEATMAP_FILE: &str = "heatmap_clustering.png";

/// Directory layout of one analysis run.
///
/// `data_dir` keeps downloaded SOFT files next to the project, `cache_root`
/// is shared between projects, `results_dir` is overwritten on every run.
#[derive(Debug, Clone)]
pub struct Workspace {
    data_dir: Utf8PathBuf,
    results_dir: Utf8PathBuf,
    log_file: Utf8PathBuf,
    cache_root: Option<Utf8PathBuf>,
}

impl Workspace {
    pub fn new_with_paths(
        data_dir: Utf8PathBuf,
        results_dir: Utf8PathBuf,
        log_file: Utf8PathBuf,
        cache_root: Option<Utf8PathBuf>,
    ) -> Self {
        Self {
            data_dir,
            results_dir,
            log_file,
            cache_root,
        }
    }

    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    pub fn results_dir(&self) -> &Utf8Path {
        &self.results_dir
    }

    pub fn log_file(&self) -> &Utf8Path {
        &self.log_file
    }

    pub fn cache_root(&self) -> Option<&Utf8Path> {
        self.cache_root.as_deref()
    }

    pub fn project_soft_path(&self, accession: &GeoSeriesAccession) -> Utf8PathBuf {
        self.data_dir.join(soft_file_name(accession))
    }

    pub fn cache_soft_path(&self, accession: &GeoSeriesAccession) -> Option<Utf8PathBuf> {
        self.cache_root
            .as_ref()
            .map(|root| root.join("geo").join(soft_file_name(accession)))
    }

    pub fn summary_stats_path(&self) -> Utf8PathBuf {
        self.results_dir.join(SUMMARY_STATS_FILE)
    }

    pub fn matrix_path(&self) -> Utf8PathBuf {
        self.results_dir.join(MATRIX_FILE)
    }

    pub fn histogram_path(&self) -> Utf8PathBuf {
        self.results_dir.join(HISTOGRAM_FILE)
    }

    pub fn heatmap_path(&self) -> Utf8PathBuf {
        self.results_dir.join(HEATMAP_FILE)
    }

    pub fn ensure_data_dir(&self) -> Result<(), KiraError> {
        create_dir(&self.data_dir)
    }

    pub fn ensure_results_dir(&self) -> Result<(), KiraError> {
        create_dir(&self.results_dir)
    }

    pub fn ensure_log_dir(&self) -> Result<(), KiraError> {
        match self.log_file.parent() {
            Some(parent) => create_dir(parent),
            None => Ok(()),
        }
    }

    /// Write through a sibling temp file and rename over `path`.
    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), KiraError> {
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }
        let tmp_path = Utf8PathBuf::from(format!("{path}.tmp"));
        fs::write(tmp_path.as_std_path(), content)
            .map_err(|err| KiraError::Filesystem(format!("write {tmp_path}: {err}")))?;
        fs::rename(tmp_path.as_std_path(), path.as_std_path())
            .map_err(|err| KiraError::Filesystem(format!("rename to {path}: {err}")))?;
        Ok(())
    }

    pub fn copy_file_atomic(source: &Utf8Path, dest: &Utf8Path) -> Result<(), KiraError> {
        let parent = dest
            .parent()
            .ok_or_else(|| KiraError::Filesystem("invalid destination path".to_string()))?;
        create_dir(parent)?;
        let temp = tempfile::Builder::new()
            .prefix("kira-expr-file")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        fs::copy(source.as_std_path(), temp.path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        temp.persist(dest.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

fn create_dir(path: &Utf8Path) -> Result<(), KiraError> {
    if path.as_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("create {path}: {err}")))
}

fn soft_file_name(accession: &GeoSeriesAccession) -> String {
    format!("{}_family.soft.gz", accession.as_str())
}

pub fn default_cache_root() -> Result<Utf8PathBuf, KiraError> {
    BaseDirs::new()
        .and_then(|dirs| {
            Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("kira-expression")).ok()
        })
        .ok_or_else(|| KiraError::Filesystem("unable to resolve cache directory".to_string()))
}
