use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_origin() -> String {
    // Where the original wizard page is served from
    "http://localhost:3000".to_string()
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_user_agent() -> String {
    "deliverzone/0.1.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    /// Origin prepended to generated share links
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub nominatim: Option<NominatimConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NominatimConfig {
    #[serde(default = "default_nominatim_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: default_nominatim_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FileConfig {
    /// Read and parse a config file at an explicit path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Search the default config locations and return the first file that
    /// parses. Parse failures warn and fall through to the next location.
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Share-link origin, falling back to the default serve address.
    pub fn origin(&self) -> String {
        self.origin.clone().unwrap_or_else(default_origin)
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("deliverzone.toml"));
    paths.push(PathBuf::from(".deliverzone.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("deliverzone").join("config.toml"));
        paths.push(config_dir.join("deliverzone.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".deliverzone.toml"));
        paths.push(home.join(".config").join("deliverzone").join("config.toml"));
    }

    paths
}
