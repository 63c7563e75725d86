//! Path resolution for fieldcrm configuration files.
//!
//! All fieldcrm settings live in `~/.fieldcrm/`:
//! - `config.yaml` - Main configuration file

use std::path::PathBuf;

use crate::error::CrmError;

/// Paths to fieldcrm configuration files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.fieldcrm/`
    pub root: PathBuf,
    /// Config file: `~/.fieldcrm/config.yaml`
    pub config_file: PathBuf,
}

impl Paths {
    /// Paths under `$HOME/.fieldcrm`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CrmError> {
        let home = std::env::var("HOME")
            .map_err(|_| CrmError::Config("Could not determine home directory".to_string()))?;

        Ok(Self::with_root(PathBuf::from(home).join(".fieldcrm")))
    }

    /// Paths rooted at an explicit directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            root,
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_root(PathBuf::from(".fieldcrm")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-fieldcrm");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
    }
}
