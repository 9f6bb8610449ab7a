use thiserror::Error;

/// Core error type for the flow editing core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The persistence collaborator rejected a create or update
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// The deploy collaborator rejected a publish request
    #[error("Deployment error: {0}")]
    DeploymentError(String),

    /// A save was requested while another one is still in flight
    #[error("Save already in progress")]
    SaveInProgress,

    /// An asynchronous operation was requested outside of a tokio runtime
    #[error("No async runtime available: {0}")]
    NoAsyncRuntime(String),

    /// A required callback was not supplied
    #[error("Missing handler: {0}")]
    MissingHandler(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigurationError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (CoreError::ValidationError("invalid".to_string()), "Validation error: invalid"),
            (CoreError::PersistenceError("503".to_string()), "Persistence error: 503"),
            (CoreError::DeploymentError("denied".to_string()), "Deployment error: denied"),
            (CoreError::SaveInProgress, "Save already in progress"),
            (CoreError::NoAsyncRuntime("save".to_string()), "No async runtime available: save"),
            (CoreError::MissingHandler("confirm".to_string()), "Missing handler: confirm"),
            (CoreError::SerializationError("ser_err".to_string()), "Serialization error: ser_err"),
            (CoreError::ConfigurationError("config_err".to_string()), "Configuration error: config_err"),
            (CoreError::Other("other_err".to_string()), "other_err"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: CoreError = json_error.into();

        match error {
            CoreError::SerializationError(msg) => {
                assert!(msg.contains("expected value"));
            }
            _ => panic!("Expected SerializationError variant"),
        }
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<Vec<u32>>("{ not: [a list").unwrap_err();
        let error: CoreError = yaml_error.into();
        assert!(matches!(error, CoreError::ConfigurationError(_)));
    }

    #[test]
    fn test_from_str() {
        let error: CoreError = "test error message".into();
        assert_eq!(error, CoreError::Other("test error message".to_string()));
    }
}
