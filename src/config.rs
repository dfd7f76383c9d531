use crate::tmdb::{DEFAULT_API_BASE_URL, DEFAULT_IMAGE_BASE_URL};
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub tmdb: TmdbSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbSection {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub image_base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub image_base_url: String,
}

impl Config {
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "poster-lookup", "poster-lookup")
    }

    pub fn default_path() -> PathBuf {
        match Self::project_dirs() {
            Some(dirs) => dirs.config_dir().join("config.toml"),
            None => PathBuf::from("config.toml"),
        }
    }

    /// Loads the config file (a missing file is fine), then applies the
    /// environment and the command line, in increasing precedence.
    pub fn load(path: Option<&Path>, cli_api_key: Option<&str>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let file = Self::read_file(&path)?;
        let env_key = std::env::var(API_KEY_ENV).ok();
        Self::resolve(file, env_key.as_deref(), cli_api_key)
    }

    fn read_file(path: &Path) -> Result<FileConfig> {
        if !path.exists() {
            debug!("No config file at {:?}", path);
            return Ok(FileConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let file = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!("Loaded config from {:?}", path);
        Ok(file)
    }

    pub fn resolve(file: FileConfig, env_key: Option<&str>, cli_key: Option<&str>) -> Result<Self> {
        let api_key = cli_key
            .or(env_key)
            .map(str::to_owned)
            .or(file.tmdb.api_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let Some(api_key) = api_key else {
            bail!(
                "No TMDb API key configured. Pass --api-key, set {}, or add api_key under [tmdb] in {:?}",
                API_KEY_ENV,
                Self::default_path()
            );
        };

        Ok(Self {
            api_key,
            api_base_url: file
                .tmdb
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            image_base_url: file
                .tmdb
                .image_base_url
                .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string()),
        })
    }
}
