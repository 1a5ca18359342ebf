//! Config file loading.
//!
//! The format is chosen by file extension. Every error that comes from a file
//! names that file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: invalid {format}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: ConfigFormat,
        message: String,
    },
    #[error("{}: unsupported config format (expected json, jsonc, yaml, yml or toml)", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("validation: {0}")]
    Validation(String),
}

/// On-disk config syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON, with `//` and `/* */` comments allowed.
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str())? {
            "json" | "jsonc" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    fn parse(self, data: &str) -> Result<Config, String> {
        match self {
            Self::Json => {
                let stripped = json_comments::StripComments::new(data.as_bytes());
                serde_json::from_reader(stripped).map_err(|e| e.to_string())
            }
            Self::Yaml => serde_yaml::from_str(data).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(data).map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        })
    }
}

/// Read and parse a config file. Blank optional settings read as unset.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut config = format.parse(&data).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        format,
        message,
    })?;
    config.clear_blank_settings();
    Ok(config)
}
