/// Application configuration
///
/// Stored as JSON at `<config_dir>/exercise-thumbs/config.json`. A missing
/// file means defaults; missing fields fall back to their defaults too.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::thumb::ImageSize;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL (or directory) holding built-in images as `<size>/<stem>.png`
    pub image_base_url: String,

    /// Optional local copy of the image set, scanned to learn which
    /// built-in images exist
    pub image_mirror_dir: Option<PathBuf>,

    /// Extra image stems known to exist, e.g. `benchpress_barbell_small`
    pub known_images: Vec<String>,

    /// Override for the custom exercise database location
    pub database_path: Option<PathBuf>,

    /// Maximum number of decoded thumbnails kept in memory
    pub cache_capacity: usize,

    /// Timeout for remote image requests
    pub request_timeout_secs: u64,

    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,

    /// Thumbnail size used by the gallery grid
    pub default_size: ImageSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            image_base_url: "https://images.example.com/exercises".to_string(),
            image_mirror_dir: None,
            known_images: Vec::new(),
            database_path: None,
            cache_capacity: 256,
            request_timeout_secs: 10,
            log_filter: "info".to_string(),
            default_size: ImageSize::Small,
        }
    }
}

impl AppConfig {
    /// Default location of the config file
    pub fn config_path() -> Result<PathBuf, AppError> {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or(AppError::NoDataDir)?;

        path.push("exercise-thumbs");
        path.push("config.json");
        Ok(path)
    }

    /// Load from the default location, writing a default file on first run
    pub fn load() -> Result<Self, AppError> {
        Self::load_or_create(&Self::config_path()?)
    }

    /// Load `path`, or save and return the defaults if it does not exist yet
    pub fn load_or_create(path: &Path) -> Result<Self, AppError> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::default();
        config.save_to(path)?;
        tracing::info!(path = %path.display(), "wrote default config");
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
