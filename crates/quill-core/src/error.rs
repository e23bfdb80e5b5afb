use thiserror::Error;

use crate::types::Dimension;

/// Failure surfaced to callers of the pipeline. A run either produces a
/// complete report or one of these; never a partial report.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("input is not valid UTF-8 (first invalid byte at offset {offset})")]
    Encoding { offset: usize },

    #[error("{dimension} analyzer failed")]
    Analyzer {
        dimension: Dimension,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl AnalysisError {
    pub fn config(message: impl Into<String>) -> Self {
        AnalysisError::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_error_names_dimension() {
        let err = AnalysisError::Analyzer {
            dimension: Dimension::Readability,
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.to_string(), "Readability analyzer failed");
        let chained = format!("{:#}", anyhow::Error::new(err));
        assert!(chained.contains("boom"), "source should be chained: {chained}");
    }

    #[test]
    fn test_encoding_error_message() {
        let err = AnalysisError::Encoding { offset: 3 };
        assert!(err.to_string().contains("offset 3"));
    }
}
