/// Settings loaded from `revcg.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "revcg.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Filter directive for tracing; `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Rayon worker count; half the cores when unset.
    pub workers: Option<usize>,
    /// Directory of the sled revision store.
    pub store_path: Option<PathBuf>,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            workers: None,
            store_path: None,
            pretty: false,
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid settings")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("In config file: {}", path.display()))
    }

    /// An explicit path must exist. Without one, `revcg.toml` in the working
    /// directory is used if present, defaults otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
