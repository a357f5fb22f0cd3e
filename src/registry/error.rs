use reqwest::{header::InvalidHeaderValue, Method, StatusCode, Url};
use thiserror::Error;

use super::types::ApiErrorDetail;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("error marshalling body")]
    Serialization(#[source] serde_json::Error),

    #[error("invalid request URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid value for header '{name}'")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: InvalidHeaderValue,
    },

    #[error("{method} {url}: request failed")]
    Transport {
        method: Method,
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url}: failed reading response body")]
    ReadBody {
        method: Method,
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url}: registry returned {status}: {}", join_details(.errors))]
    Api {
        method: Method,
        url: Url,
        status: StatusCode,
        errors: Vec<ApiErrorDetail>,
    },

    #[error("{method} {url}: expected status {expected}, got {status}")]
    UnexpectedStatus {
        method: Method,
        url: Url,
        status: StatusCode,
        expected: StatusCode,
    },

    #[error("{method} {url}: invalid response body")]
    Decode {
        method: Method,
        url: Url,
        #[source]
        source: serde_json::Error,
    },
}

impl RegistryError {
    /// HTTP status received from the registry, if the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RegistryError::Api { status, .. } | RegistryError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// True for failures where no usable response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RegistryError::Transport { .. } | RegistryError::ReadBody { .. }
        )
    }

    /// Messages decoded from a registry error document.
    pub fn messages(&self) -> Vec<String> {
        match self {
            RegistryError::Api { errors, .. } => errors.iter().map(|e| e.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_details(errors: &[ApiErrorDetail]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
