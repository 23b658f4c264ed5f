//! File I/O for the command-line tools

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

static YAML_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.ya?ml$").expect("yaml suffix pattern is valid"));

/// Read a spec file as UTF-8 text
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// `<input without .yaml/.yml>.fixed.yaml`
pub fn fixed_output_path(input: &Path) -> PathBuf {
    let text = input.to_string_lossy();
    PathBuf::from(format!("{}.fixed.yaml", YAML_SUFFIX.replace(&text, "")))
}

/// `<input>.bak`
pub fn backup_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Where a merge run wrote its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenMerge {
    pub output: PathBuf,
    pub backup: Option<PathBuf>,
}

/// Write merged YAML next to `input`, or over it after backing up the original
pub fn write_merged(input: &Path, yaml: &str, in_place: bool) -> Result<WrittenMerge> {
    if in_place {
        let backup = backup_path(input);
        fs::copy(input, &backup)
            .with_context(|| format!("Failed to back up {} to {}", input.display(), backup.display()))?;
        write_text(input, yaml)?;
        info!(output = %input.display(), backup = %backup.display(), "wrote merged document in place");
        Ok(WrittenMerge {
            output: input.to_path_buf(),
            backup: Some(backup),
        })
    } else {
        let output = fixed_output_path(input);
        write_text(&output, yaml)?;
        info!(output = %output.display(), "wrote merged document");
        Ok(WrittenMerge { output, backup: None })
    }
}

/// Write a text file, creating parent directories
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fixed_output_path() {
        assert_eq!(fixed_output_path(Path::new("api/combined.yaml")), PathBuf::from("api/combined.fixed.yaml"));
        assert_eq!(fixed_output_path(Path::new("combined.yml")), PathBuf::from("combined.fixed.yaml"));
        assert_eq!(fixed_output_path(Path::new("combined.txt")), PathBuf::from("combined.txt.fixed.yaml"));
    }

    #[test]
    fn test_write_beside_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("spec.yaml");
        fs::write(&input, "original").unwrap();

        let written = write_merged(&input, "merged: true\n", false).unwrap();
        assert_eq!(written.output, dir.path().join("spec.fixed.yaml"));
        assert_eq!(written.backup, None);
        assert_eq!(fs::read_to_string(&input).unwrap(), "original");
        assert_eq!(fs::read_to_string(&written.output).unwrap(), "merged: true\n");
    }

    #[test]
    fn test_write_in_place_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("spec.yaml");
        fs::write(&input, "original").unwrap();

        let written = write_merged(&input, "merged: true\n", true).unwrap();
        let backup = dir.path().join("spec.yaml.bak");
        assert_eq!(written.backup.as_deref(), Some(backup.as_path()));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "original");
        assert_eq!(fs::read_to_string(&input).unwrap(), "merged: true\n");
    }

    #[test]
    fn test_write_text_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/nested/report.json");
        write_text(&path, "{}").unwrap();
        assert_eq!(read_text(&path).unwrap(), "{}");
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let err = read_text(Path::new("/nonexistent/spec.yaml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/spec.yaml"));
    }
}
