//! Command implementations for fieldcrm.
//!
//! Every handler returns the text to print; `main` decides where it goes.

mod automation;
mod filter;
mod shell;
mod template;
mod terms;

pub use automation::automation;
pub use filter::filter;
pub use shell::completions;
pub use template::template;
pub use terms::terms;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::error::CrmError;

/// Read a file argument, treating `-` as stdin.
///
/// # Errors
///
/// Returns an error if the file or stdin cannot be read.
pub fn read_input(path: &Path) -> Result<String, CrmError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    fs::read_to_string(path)
        .map_err(|e| CrmError::NotFound(format!("Cannot read {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_input_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("record.json");
        fs::write(&path, "{\"status\": \"open\"}").unwrap();

        assert_eq!(read_input(&path).unwrap(), "{\"status\": \"open\"}");
    }

    #[test]
    fn test_read_input_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_input(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }
}
