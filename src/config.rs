use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::aggregate::ViewSettings;
use crate::data::boundary::BoundarySource;

/// San Francisco neighbourhood outlines used as the map background.
pub const DEFAULT_BOUNDARIES_URL: &str = "https://gist.githubusercontent.com/cdolek/d08cac2fa3f6338d84ea/raw/ebe3d2a4eda405775a860d251974e1f08cbe4f48/SanFrancisco.Neighborhoods.json";

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

/// Dashboard settings. Every field has a default, so a partial
/// `dashboard.json` only overrides what it names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listings file loaded at startup.
    pub data_path: PathBuf,
    /// GeoJSON neighbourhood outlines; `None` disables the map background.
    pub boundaries_url: Option<String>,
    pub boundaries_cache: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub fetch_attempts: u32,
    pub top_n: usize,
    pub geo_price_ceiling: f64,
    pub default_price_range: (f64, f64),
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("listings.csv"),
            boundaries_url: Some(DEFAULT_BOUNDARIES_URL.to_string()),
            boundaries_cache: None,
            fetch_timeout_secs: 20,
            fetch_attempts: 2,
            top_n: 10,
            geo_price_ceiling: 1000.0,
            default_price_range: (50.0, 300.0),
        }
    }
}

impl DashboardConfig {
    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing dashboard config")
    }

    /// Read `path` if it exists. A missing file gives the defaults; an
    /// unreadable or malformed one is logged and also gives the defaults.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {} found, using default settings", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("Cannot read {}: {e}, using default settings", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&text) {
            Ok(config) => {
                log::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            top_n: self.top_n,
            geo_price_ceiling: self.geo_price_ceiling,
        }
    }

    pub fn boundary_source(&self) -> Option<BoundarySource> {
        let url = self.boundaries_url.clone()?;
        Some(BoundarySource {
            url,
            cache: self.boundaries_cache.clone(),
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            attempts: self.fetch_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.view_settings(), ViewSettings::default());
    }

    #[test]
    fn partial_config_overrides_named_fields() {
        let config = DashboardConfig::from_json(
            r#"{"data_path": "data/la.parquet", "top_n": 5, "default_price_range": [0, 500]}"#,
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("data/la.parquet"));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.default_price_range, (0.0, 500.0));
        assert_eq!(config.geo_price_ceiling, 1000.0);
    }

    #[test]
    fn null_url_disables_boundaries() {
        let config = DashboardConfig::from_json(r#"{"boundaries_url": null}"#).unwrap();
        assert!(config.boundary_source().is_none());

        let source = DashboardConfig::default().boundary_source().unwrap();
        assert_eq!(source.url, DEFAULT_BOUNDARIES_URL);
        assert_eq!(source.timeout, Duration::from_secs(20));
    }

    #[test]
    fn missing_or_malformed_file_falls_back() {
        let missing = DashboardConfig::load(Path::new("/nonexistent/dashboard.json"));
        assert_eq!(missing, DashboardConfig::default());

        let path = std::env::temp_dir().join(format!("dashboard-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(DashboardConfig::load(&path), DashboardConfig::default());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unreadable_path_falls_back() {
        // A directory exists but cannot be read as a file.
        let dir = std::env::temp_dir();
        assert_eq!(DashboardConfig::load(&dir), DashboardConfig::default());
    }
}
