//! Unified error model for the pre-processor
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    /// Body predicate name outside the dispatchable vocabulary
    #[error("PRED/unknown predicate: {0}")]
    UnknownPredicate(String),

    /// Preamble predicate name outside the preamble vocabulary
    #[error("PREAMBLE/unknown preamble event: {0}")]
    UnknownPreamble(String),

    /// A topology-dependent predicate was requested without topology metadata
    #[error("INFRA/{0} requires global infra")]
    MissingInfra(String),

    /// Requested policies that are not in the registry
    #[error("POLICY/unsupported policies: {}", .0.join(", "))]
    UnsupportedPolicy(Vec<String>),

    #[error("DOC/{0}")]
    MalformedDocument(String),

    #[error("INFRA/failed to load topology: {0}")]
    Infra(String),

    #[error("IO/{0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PreprocessError>;

impl PreprocessError {
    /// Configuration errors are deterministic and never worth retrying
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownPredicate(_)
                | Self::UnknownPreamble(_)
                | Self::MissingInfra(_)
                | Self::UnsupportedPolicy(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_unsupported_policies() {
        let err = PreprocessError::UnsupportedPolicy(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "POLICY/unsupported policies: a, b");
    }

    #[test]
    fn test_configuration_classification() {
        assert!(PreprocessError::MissingInfra("originally_in_subnet".into()).is_configuration());
        assert!(!PreprocessError::MalformedDocument("no timestamp".into()).is_configuration());
    }
}
