use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils;

const ANALYTICS_URL_VAR: &str = "GOOGLE_SCRIPT_URL";
const CATALOG_VAR: &str = "MOVIE_FINDER_CATALOG";
const CITY_VAR: &str = "MOVIE_FINDER_CITY";
const PAGE_URL_VAR: &str = "MOVIE_FINDER_PAGE_URL";

pub const DEFAULT_PAGE_URL: &str = "https://startfilmstudio.github.io/movie-finder-by-city/";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the click analytics script. Unset disables tracking.
    pub analytics_url: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub default_city: Option<String>,
    pub page_url: Option<String>,
}

impl AppConfig {
    /// Reads `config.json` from the data root, then applies environment
    /// overrides. A missing or broken file falls back to defaults.
    pub fn load() -> Self {
        let path = utils::config_path();
        let mut config = match read_config(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring config file: {err}");
                AppConfig::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = lookup(ANALYTICS_URL_VAR) {
            self.analytics_url = Some(url);
        }
        if let Some(path) = lookup(CATALOG_VAR) {
            self.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(city) = lookup(CITY_VAR) {
            self.default_city = Some(city);
        }
        if let Some(url) = lookup(PAGE_URL_VAR) {
            self.page_url = Some(url);
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.catalog_path
            .clone()
            .unwrap_or_else(utils::default_catalog_path)
    }

    pub fn page_url(&self) -> &str {
        self.page_url.as_deref().unwrap_or(DEFAULT_PAGE_URL)
    }
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}
