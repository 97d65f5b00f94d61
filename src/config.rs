use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::app::RunOptions;
use crate::domain::GeoSeriesAccession;
use crate::error::KiraError;
use crate::store::{Workspace, default_cache_root};

pub const DEFAULT_CONFIG_FILE: &str = "kira-expr.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub accession: Option<String>,
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub results_dir: Option<String>,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub heatmap: HeatmapSection,
    #[serde(default)]
    pub histogram: HistogramSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HeatmapSection {
    #[serde(default)]
    pub max_rows: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HistogramSection {
    #[serde(default)]
    pub bins: Option<usize>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub accession: Option<String>,
    pub data_dir: Option<String>,
    pub results_dir: Option<String>,
    pub heatmap_rows: Option<usize>,
    pub seed: Option<u64>,
    pub bins: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub accession: GeoSeriesAccession,
    pub data_dir: Utf8PathBuf,
    pub results_dir: Utf8PathBuf,
    pub log_file: Utf8PathBuf,
    pub options: RunOptions,
}

impl ResolvedConfig {
    /// Workspace for these paths; the shared cache is skipped when no home
    /// directory can be resolved.
    pub fn workspace(&self) -> Workspace {
        Workspace::new_with_paths(
            self.data_dir.clone(),
            self.results_dir.clone(),
            self.log_file.clone(),
            default_cache_root().ok(),
        )
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Read the config at `path`, or `kira-expr.json` when present, or
    /// fall back to defaults.
    pub fn load(path: Option<&str>) -> Result<Config, KiraError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| KiraError::ConfigRead(config_path.clone()))?;
        serde_json::from_str(&content).map_err(|err| KiraError::ConfigParse(err.to_string()))
    }

    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, KiraError> {
        Self::resolve_config(Self::load(path)?, overrides)
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, KiraError> {
        let schema_version = config.schema_version.unwrap_or(1);
        let accession: GeoSeriesAccession = overrides
            .accession
            .or(config.accession)
            .ok_or(KiraError::MissingAccession)?
            .parse()?;

        let defaults = RunOptions::default();
        let options = RunOptions {
            heatmap_rows: overrides
                .heatmap_rows
                .or(config.heatmap.max_rows)
                .unwrap_or(defaults.heatmap_rows),
            seed: overrides
                .seed
                .or(config.heatmap.seed)
                .unwrap_or(defaults.seed),
            histogram_bins: overrides
                .bins
                .or(config.histogram.bins)
                .unwrap_or(defaults.histogram_bins),
        };
        if options.heatmap_rows == 0 {
            return Err(KiraError::InvalidConfig(
                "heatmap max_rows must be at least 1".to_string(),
            ));
        }
        if options.histogram_bins == 0 {
            return Err(KiraError::InvalidConfig(
                "histogram bins must be at least 1".to_string(),
            ));
        }

        Ok(ResolvedConfig {
            schema_version,
            accession,
            data_dir: Utf8PathBuf::from(
                overrides
                    .data_dir
                    .or(config.data_dir)
                    .unwrap_or_else(|| "data".to_string()),
            ),
            results_dir: Utf8PathBuf::from(
                overrides
                    .results_dir
                    .or(config.results_dir)
                    .unwrap_or_else(|| "results".to_string()),
            ),
            log_file: Utf8PathBuf::from(
                config
                    .log_file
                    .unwrap_or_else(|| "logs/kira-expr.log".to_string()),
            ),
            options,
        })
    }
}
