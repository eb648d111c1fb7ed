//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sampling::{CalculationInput, InspectionLevel, QualityLimit};

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = "inspcalc.yaml";

/// inspcalc configuration with layered hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default inspection level for new calculations
    pub inspection_level: Option<InspectionLevel>,

    /// Default AQL for major defects
    pub aql_major: Option<QualityLimit>,

    /// Default AQL for minor defects
    pub aql_minor: Option<QualityLimit>,

    pub preparation_time_minutes: Option<f64>,
    pub sampling_time_minutes: Option<f64>,
    pub inspection_time_per_unit_minutes: Option<f64>,
    pub packing_check_time_minutes: Option<f64>,
    pub report_time_minutes: Option<f64>,
    pub travel_time_minutes: Option<f64>,

    /// History database location
    pub database: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/inspcalc/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_file(&global_path);
        }

        // 3. Local config (./inspcalc.yaml)
        config.merge_file(&Self::local_config_path());

        // 4. Environment variables
        if let Ok(level) = std::env::var("INSPCALC_LEVEL") {
            match level.parse() {
                Ok(level) => config.inspection_level = Some(level),
                Err(e) => tracing::warn!("ignoring INSPCALC_LEVEL: {}", e),
            }
        }
        if let Ok(db) = std::env::var("INSPCALC_DB") {
            if !db.is_empty() {
                config.database = Some(PathBuf::from(db));
            }
        }

        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "inspcalc")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Get the path to the local config file in the working directory
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(LOCAL_CONFIG_FILE)
    }

    /// Default history database location
    pub fn default_database_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "inspcalc")
            .map(|dirs| dirs.data_dir().join("history.db"))
    }

    /// Parse one config layer
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        // An empty file parses as null
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents)
    }

    /// Merge a config file if it exists; unreadable files are skipped
    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_yaml(&contents) {
                Ok(layer) => {
                    tracing::debug!(path = %path.display(), "loaded config layer");
                    self.merge(layer);
                }
                Err(e) => tracing::warn!(path = %path.display(), "ignoring invalid config: {}", e),
            },
            Err(e) => tracing::warn!(path = %path.display(), "cannot read config: {}", e),
        }
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.inspection_level.is_some() {
            self.inspection_level = other.inspection_level;
        }
        if other.aql_major.is_some() {
            self.aql_major = other.aql_major;
        }
        if other.aql_minor.is_some() {
            self.aql_minor = other.aql_minor;
        }
        if other.preparation_time_minutes.is_some() {
            self.preparation_time_minutes = other.preparation_time_minutes;
        }
        if other.sampling_time_minutes.is_some() {
            self.sampling_time_minutes = other.sampling_time_minutes;
        }
        if other.inspection_time_per_unit_minutes.is_some() {
            self.inspection_time_per_unit_minutes = other.inspection_time_per_unit_minutes;
        }
        if other.packing_check_time_minutes.is_some() {
            self.packing_check_time_minutes = other.packing_check_time_minutes;
        }
        if other.report_time_minutes.is_some() {
            self.report_time_minutes = other.report_time_minutes;
        }
        if other.travel_time_minutes.is_some() {
            self.travel_time_minutes = other.travel_time_minutes;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Calculation input pre-filled with the configured defaults and no orders
    pub fn calculation_defaults(&self) -> CalculationInput {
        let base = CalculationInput::default();
        CalculationInput {
            inspection_level: self.inspection_level.unwrap_or(base.inspection_level),
            aql_major: self.aql_major.unwrap_or(base.aql_major),
            aql_minor: self.aql_minor.unwrap_or(base.aql_minor),
            preparation_time_minutes: self
                .preparation_time_minutes
                .unwrap_or(base.preparation_time_minutes),
            sampling_time_minutes: self
                .sampling_time_minutes
                .unwrap_or(base.sampling_time_minutes),
            inspection_time_per_unit_minutes: self
                .inspection_time_per_unit_minutes
                .unwrap_or(base.inspection_time_per_unit_minutes),
            packing_check_time_minutes: self
                .packing_check_time_minutes
                .unwrap_or(base.packing_check_time_minutes),
            report_time_minutes: self.report_time_minutes.unwrap_or(base.report_time_minutes),
            travel_time_minutes: self.travel_time_minutes.unwrap_or(base.travel_time_minutes),
            ..base
        }
    }

    /// History database path: configured, else the per-user data dir
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database.clone().or_else(Self::default_database_path)
    }
}
