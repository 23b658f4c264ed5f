//! Error types for the merge and analysis pipelines

use thiserror::Error;

/// Result type for spec operations
pub type Result<T> = std::result::Result<T, SpecError>;

/// Merge/analysis errors
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("No documents parsed from input ({fragments} fragment(s) scanned)")]
    NoDocuments { fragments: usize },

    #[error("Invalid document format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpecError {
    /// Process exit status a CLI should use for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoDocuments { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_documents_is_distinct_exit() {
        assert_eq!(SpecError::NoDocuments { fragments: 3 }.exit_code(), 2);
        assert_eq!(SpecError::InvalidFormat("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_display() {
        let err = SpecError::NoDocuments { fragments: 2 };
        assert_eq!(err.to_string(), "No documents parsed from input (2 fragment(s) scanned)");
    }
}
