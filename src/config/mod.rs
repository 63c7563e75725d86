//! Configuration management for fieldcrm.
//!
//! This module handles loading and saving configuration from `~/.fieldcrm/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{AutomationConfig, ColorSetting, Config, GeneralConfig, PreviewConfig};
