//! Persistent settings read from `config.toml` in the application directory.
//!
//! Every key is optional; a missing file or section falls back to the
//! defaults below. Command-line flags override whatever is loaded here.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::app_dirs;

/// File name of the settings file inside the application directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_ENDPOINT: &str = "http://cedre-14a.med.univ-rennes1.fr:3030/WS287-rdf-coexp0.8/sparql";
const DEFAULT_DOMAINS: [&str; 2] = [
    "cell physiology phenotype",
    "cytoskeleton organization biogenesis variant",
];

/// Errors that may occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        /// Directory path that failed to create.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// The configured endpoint is not an absolute http(s) URL.
    #[error("Invalid SPARQL endpoint URL {url:?}: {reason}")]
    InvalidEndpoint {
        /// Offending value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// All settings understood by the command-line tools.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: EndpointSettings,
    pub prediction: PredictionSettings,
    pub report: ReportSettings,
}

/// Where label and ontology queries are sent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    pub url: String,
    /// Seconds to wait for each query answer.
    pub timeout_secs: u64,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Defaults for the prediction post-processing tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PredictionSettings {
    /// Ontology terms whose descendants are kept in domain mode.
    pub domains: Vec<String>,
    /// Number of phenotype rows written to a generated query file.
    pub cutoff: usize,
    /// Ontology used by the ancestor-count filter.
    pub ontology: String,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            domains: DEFAULT_DOMAINS.iter().map(|term| term.to_string()).collect(),
            cutoff: 50,
            ontology: "phenotype".to_string(),
        }
    }
}

/// Output image size for loss-curve reports.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Resolve the settings file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(|error| match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    })?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from the application directory, returning defaults if missing.
pub fn load_or_default() -> Result<Settings, ConfigError> {
    load_from_path(&config_path()?)
}

/// Load settings from an explicit file, returning defaults if it does not exist.
pub fn load_from_path(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    validate_endpoint(&settings.endpoint.url)?;
    Ok(settings)
}

/// Check that an endpoint string is an absolute http or https URL.
pub fn validate_endpoint(url: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(url).map_err(|err| ConfigError::InvalidEndpoint {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
