use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::cli::OutputFormat;

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
    pub watermark: Option<String>,
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "poolstat").map(|d| d.config_dir().join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Config::default(),
    }
}

pub fn load_config_from(path: &Path) -> Config {
    let Ok(data) = fs::read_to_string(path) else {
        return Config::default();
    };

    match toml::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("invalid config at {}: {}", path.display(), e);
            Config::default()
        }
    }
}
