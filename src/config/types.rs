use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{AssemblerConfigBuilder, ConfigError, ConfigResult, ConfigValidator};
use crate::assembler::MarkerPair;

/// Top-level configuration for the assembler and the extractor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub assembler: AssemblerConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl AppConfig {
    /// Load and validate a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}

/// Streaming assembler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Marker pairs delimiting reasoning blocks, tried in order
    #[serde(default = "default_markers")]
    pub markers: Vec<MarkerPair>,
    /// Once the source sends native reasoning deltas, stop scanning response
    /// text for markers
    #[serde(default)]
    pub native_reasoning_bypass: bool,
}

fn default_markers() -> Vec<MarkerPair> {
    vec![MarkerPair::think()]
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            markers: default_markers(),
            native_reasoning_bypass: false,
        }
    }
}

impl AssemblerConfig {
    /// Configuration with a single marker pair
    pub fn with_markers(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            markers: vec![MarkerPair::new(open, close)],
            ..Default::default()
        }
    }

    pub fn builder() -> AssemblerConfigBuilder {
        AssemblerConfigBuilder::new()
    }
}

/// Dirty JSON extractor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum nesting depth accepted by the lenient parser
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Return containers cut off by end-of-input with their complete members
    #[serde(default = "default_true")]
    pub allow_partial: bool,
    /// Remove markdown code fences before looking for a value
    #[serde(default = "default_true")]
    pub strip_code_fences: bool,
    /// Return the trimmed input as a string when no value is found
    #[serde(default)]
    pub raw_text_fallback: bool,
}

fn default_max_depth() -> usize {
    32
}

fn default_true() -> bool {
    true
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            allow_partial: true,
            strip_code_fences: true,
            raw_text_fallback: false,
        }
    }
}
