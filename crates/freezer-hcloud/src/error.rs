//! Hetzner Cloud client error types

use freezer_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HcloudError {
    #[error("API token is empty")]
    MissingToken,

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, HcloudError>;

impl From<HcloudError> for CloudError {
    fn from(err: HcloudError) -> Self {
        match err {
            HcloudError::MissingToken | HcloudError::InvalidEndpoint(_) => {
                CloudError::InvalidConfig(err.to_string())
            }
            HcloudError::Http(e) => CloudError::Http(e.to_string()),
        }
    }
}
