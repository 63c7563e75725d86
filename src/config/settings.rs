//! Configuration settings for fieldcrm.
//!
//! Settings are loaded from `~/.fieldcrm/config.yaml`.

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::CrmError;
use crate::features::automation::EngineConfig;
use crate::features::templates::{ActionStyle, PreviewLinks};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Template preview settings.
    pub preview: PreviewConfig,
    /// Automation check settings.
    pub automation: AutomationConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorSetting {
    /// Apply to the global `colored` switch.
    pub fn apply(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

/// How action keywords look in previews.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PreviewConfig {
    /// Placeholder href for every action link.
    #[serde(default = "default_action_href")]
    pub action_href: String,
    /// Button background color.
    #[serde(default = "default_button_background")]
    pub button_background: String,
    /// Button text color.
    #[serde(default = "default_button_text_color")]
    pub button_text_color: String,
}

impl PreviewConfig {
    /// Resolver that points every action at the placeholder href.
    #[must_use]
    pub fn links(&self) -> PreviewLinks {
        PreviewLinks::new(self.action_href.clone())
    }

    #[must_use]
    pub fn style(&self) -> ActionStyle {
        ActionStyle {
            background: self.button_background.clone(),
            text_color: self.button_text_color.clone(),
        }
    }
}

/// Automation check settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AutomationConfig {
    /// Maximum actions previewed per eligible workflow.
    #[serde(default = "default_max_actions")]
    pub max_actions: usize,
}

impl AutomationConfig {
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_actions: self.max_actions,
        }
    }
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

fn default_action_href() -> String {
    "#".to_string()
}

fn default_button_background() -> String {
    "#27ae60".to_string()
}

fn default_button_text_color() -> String {
    "#ffffff".to_string()
}

const fn default_max_actions() -> usize {
    10
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            action_href: default_action_href(),
            button_background: default_button_background(),
            button_text_color: default_button_text_color(),
        }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            max_actions: default_max_actions(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, CrmError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, CrmError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CrmError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        // An empty file deserializes to null
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|e| {
            CrmError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }
}
