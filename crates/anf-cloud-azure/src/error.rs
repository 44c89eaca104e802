//! Azure provider error types

use anf_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("token request failed: {0}")]
    TokenRequest(String),

    #[error("ARM request failed ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("long-running operation {status} {code}: {message}")]
    OperationFailed {
        status: String,
        code: String,
        message: String,
    },

    #[error("long-running operation did not finish: {0}")]
    OperationTimeout(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AzureError>;

impl From<AzureError> for CloudError {
    fn from(e: AzureError) -> Self {
        match e {
            AzureError::Api {
                status: 404,
                code,
                message,
            } => CloudError::ResourceNotFound(format!("{}: {}", code, message)),
            AzureError::Api {
                status,
                code,
                message,
            } => CloudError::Api {
                status,
                code,
                message,
            },
            AzureError::OperationFailed { code, message, .. } => {
                CloudError::OperationFailed { code, message }
            }
            AzureError::TokenRequest(msg) => CloudError::AuthenticationFailed(msg),
            AzureError::OperationTimeout(msg) => CloudError::Timeout(msg),
            AzureError::JsonError(e) => CloudError::Json(e),
            other => CloudError::Http(other.to_string()),
        }
    }
}
