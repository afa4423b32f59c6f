//! Control plane error types

use thiserror::Error;

/// Errors returned by a control plane call
#[derive(Error, Debug)]
pub enum CloudError {
    /// The control plane answered with a status outside the success range
    #[error("{operation} failed: status {status}{}", describe(code, message))]
    Api {
        operation: String,
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe(code: &Option<String>, message: &Option<String>) -> String {
    match (code, message) {
        (Some(code), Some(message)) => format!(" ({}: {})", code, message),
        (None, Some(message)) => format!(" ({})", message),
        (Some(code), None) => format!(" ({})", code),
        (None, None) => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Fail with [`CloudError::Api`] unless `status` is 200 or 201
pub fn ensure_success(operation: &str, status: u16) -> Result<()> {
    if (200..=201).contains(&status) {
        return Ok(());
    }
    Err(CloudError::Api {
        operation: operation.to_string(),
        status,
        code: None,
        message: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 200 and 201 are success
    #[test]
    fn test_success_range() {
        assert!(ensure_success("get server", 200).is_ok());
        assert!(ensure_success("create server", 201).is_ok());
        assert!(ensure_success("delete server", 204).is_err());
        assert!(ensure_success("get server", 404).is_err());
    }

    /// API error display
    #[test]
    fn test_api_error_message() {
        let err = ensure_success("shutdown server", 423).unwrap_err();
        assert_eq!(err.to_string(), "shutdown server failed: status 423");

        let err = CloudError::Api {
            operation: "assign floating ip".to_string(),
            status: 409,
            code: Some("conflict".to_string()),
            message: Some("resource is locked".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "assign floating ip failed: status 409 (conflict: resource is locked)"
        );
    }
}
