//! Editor settings.
//!
//! ```rust
//! use outliner_core::{OutlinerConfig, WrapMode};
//!
//! let config = OutlinerConfig::from_json_str(r#"{ "wrap_width": 60, "wrap_mode": "word" }"#).unwrap();
//! assert_eq!(config.wrap_width, 60);
//! assert_eq!(config.wrap_mode, WrapMode::Word);
//! assert_eq!(config.paragraph_separator, "\n\n");
//! ```

use crate::layout::{DEFAULT_TAB_WIDTH, LayoutOptions, WrapMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid outliner config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Tab width must be positive.
    #[error("tab width must be greater than 0")]
    ZeroTabWidth,
}

/// Settings shared by every buffer of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlinerConfig {
    /// Soft-wrap width of block text in cells (`0` disables wrapping).
    pub wrap_width: usize,
    /// Soft-wrap mode.
    pub wrap_mode: WrapMode,
    /// Tab width in cells.
    pub tab_width: usize,
    /// Separator placed between blocks in clipboard text.
    pub paragraph_separator: String,
}

impl Default for OutlinerConfig {
    fn default() -> Self {
        Self {
            wrap_width: 0,
            wrap_mode: WrapMode::Char,
            tab_width: DEFAULT_TAB_WIDTH,
            paragraph_separator: "\n\n".to_string(),
        }
    }
}

impl OutlinerConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_width == 0 {
            return Err(ConfigError::ZeroTabWidth);
        }
        Ok(())
    }

    /// Layout parameters derived from this config.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            wrap_width: self.wrap_width,
            wrap_mode: self.wrap_mode,
            tab_width: self.tab_width,
        }
    }
}
