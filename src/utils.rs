use dirs::data_dir;
use once_cell::sync::Lazy;
use std::path::PathBuf;

static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    base.join("movie-finder")
});

pub fn data_root() -> PathBuf {
    DATA_ROOT.clone()
}

pub fn config_path() -> PathBuf {
    data_root().join("config.json")
}

pub fn default_catalog_path() -> PathBuf {
    data_root().join("movies.json")
}
