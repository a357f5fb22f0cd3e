use async_trait::async_trait;
use reqwest::{Method, Request, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::RegistryError;
use super::types::ApiErrorDocument;

/// The parts of an HTTP response the handler needs. Consuming the body
/// takes ownership, so it happens at most once per response.
#[async_trait]
pub trait HttpResponse: Send {
    fn status(&self) -> StatusCode;

    async fn into_body(self) -> Result<Vec<u8>, reqwest::Error>;
}

#[async_trait]
impl HttpResponse for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    async fn into_body(self) -> Result<Vec<u8>, reqwest::Error> {
        Ok(self.bytes().await?.to_vec())
    }
}

/// Method and URL of a dispatched request, kept for error context.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub url: Url,
}

impl From<&Request> for RequestInfo {
    fn from(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            url: request.url().clone(),
        }
    }
}

/// Validate the response and decode its body into `T`.
pub async fn handle_response<R, T>(
    request: &RequestInfo,
    result: Result<R, reqwest::Error>,
    expected: StatusCode,
) -> Result<T, RegistryError>
where
    R: HttpResponse,
    T: DeserializeOwned,
{
    let body = check_response(request, result, expected).await?;
    serde_json::from_slice(&body).map_err(|source| RegistryError::Decode {
        method: request.method.clone(),
        url: request.url.clone(),
        source,
    })
}

/// Validate the response, discarding whatever body it carried.
pub async fn handle_empty_response<R>(
    request: &RequestInfo,
    result: Result<R, reqwest::Error>,
    expected: StatusCode,
) -> Result<(), RegistryError>
where
    R: HttpResponse,
{
    check_response(request, result, expected).await.map(|_| ())
}

async fn check_response<R: HttpResponse>(
    request: &RequestInfo,
    result: Result<R, reqwest::Error>,
    expected: StatusCode,
) -> Result<Vec<u8>, RegistryError> {
    let response = result.map_err(|source| RegistryError::Transport {
        method: request.method.clone(),
        url: request.url.clone(),
        source,
    })?;

    let status = response.status();
    debug!(
        "{} {} answered {} (expected {})",
        request.method, request.url, status, expected
    );

    // Always drain the body so the connection goes back to the pool clean.
    let body = response.into_body().await;

    if status != expected {
        let errors = body
            .ok()
            .and_then(|bytes| serde_json::from_slice::<ApiErrorDocument>(&bytes).ok());
        return Err(match errors {
            Some(doc) => RegistryError::Api {
                method: request.method.clone(),
                url: request.url.clone(),
                status,
                errors: doc.errors,
            },
            None => RegistryError::UnexpectedStatus {
                method: request.method.clone(),
                url: request.url.clone(),
                status,
                expected,
            },
        });
    }

    body.map_err(|source| RegistryError::ReadBody {
        method: request.method.clone(),
        url: request.url.clone(),
        source,
    })
}
