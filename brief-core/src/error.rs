#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BriefError::Agent("company name is blank".to_string());
        assert_eq!(err.to_string(), "Agent error: company name is blank");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "template not found");
        let err: BriefError = io_err.into();
        assert!(matches!(err, BriefError::Io(_)));
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: BriefError = serde_err.into();
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
