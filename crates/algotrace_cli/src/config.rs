//! Run configuration: encoder and post-processor settings.

use algotrace_log::EncoderConfig;
use algotrace_replay::ProcessorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid
    #[error("invalid config {path}: {source}")]
    Parse {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Settings for one run, loadable from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Encoder settings
    pub encoder: EncoderConfig,
    /// Post-processor settings
    pub processor: ProcessorConfig,
}

impl RunConfig {
    /// Load from a JSON file; absent fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Parse`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Apply command-line overrides on top of the loaded values
    #[must_use]
    pub fn with_overrides(
        mut self,
        autoplay: Option<bool>,
        pretty: bool,
        namespace: Option<String>,
    ) -> Self {
        if autoplay.is_some() {
            self.processor.autoplay = autoplay;
        }
        if pretty {
            self.encoder.pretty = true;
        }
        if let Some(namespace) = namespace {
            self.encoder.namespace = namespace;
        }
        self
    }
}
