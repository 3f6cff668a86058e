use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PipelineError};
use crate::layout::LayoutConfig;
use crate::rank::DEFAULT_TOP_N;

pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Parameters of one pipeline run.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// threshold = 0.25
/// keyword = "battery"
///
/// [layout]
/// iterations = 100
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub threshold: f64,
    /// empty means no keyword filter
    pub keyword: String,
    pub top_n: usize,
    pub layout: LayoutConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            threshold: DEFAULT_THRESHOLD,
            keyword: String::new(),
            top_n: DEFAULT_TOP_N,
            layout: LayoutConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(threshold: f64, keyword: impl Into<String>) -> Self {
        PipelineConfig {
            threshold,
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks the ranges every run relies on.
    ///
    /// # Errors
    /// - `InvalidThreshold` for a NaN or out-of-range threshold
    /// - `InvalidConfig` for a zero `top_n` or a bad layout scale
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PipelineError::InvalidThreshold(self.threshold));
        }
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN.into());
        }
        if !(self.layout.scale.is_finite() && self.layout.scale > 0.0) {
            return Err(ConfigError::LayoutScale(self.layout.scale).into());
        }
        Ok(())
    }
}
