use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Request, Url};
use serde::Serialize;
use std::time::Duration;

use super::error::RegistryError;
use crate::config::Config;

pub const PATH_API: &str = "api";
pub const PATH_V2: &str = "v2";
pub const PATH_ORGANIZATIONS: &str = "organizations";
pub const PATH_REGISTRY_PROVIDERS: &str = "registry-providers";
pub const PATH_VERSIONS: &str = "versions";
pub const PATH_PLATFORMS: &str = "platforms";

pub const APPLICATION_VND_API_JSON: &str = "application/vnd.api+json";
pub const APPLICATION_JSON: &str = "application/json";
pub const BINARY_OCTET_STREAM: &str = "binary/octet-stream";

/// Join path segments with `/`. Segments are used verbatim, so callers
/// must hand in URL-safe identifiers.
pub fn build_route<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn provider_versions_route(
    org: &str,
    registry_name: &str,
    namespace: &str,
    provider_name: &str,
) -> String {
    build_route(&[
        PATH_API,
        PATH_V2,
        PATH_ORGANIZATIONS,
        org,
        PATH_REGISTRY_PROVIDERS,
        registry_name,
        namespace,
        provider_name,
        PATH_VERSIONS,
    ])
}

pub fn provider_version_platforms_route(
    org: &str,
    registry_name: &str,
    namespace: &str,
    provider_name: &str,
    version: &str,
) -> String {
    build_route(&[
        PATH_API,
        PATH_V2,
        PATH_ORGANIZATIONS,
        org,
        PATH_REGISTRY_PROVIDERS,
        registry_name,
        namespace,
        provider_name,
        PATH_VERSIONS,
        version,
        PATH_PLATFORMS,
    ])
}

/// Where a request goes.
#[derive(Debug, Clone, Copy)]
pub enum RequestTarget<'a> {
    /// Relative to the configured registry address.
    Route(&'a str),
    /// Used as-is, e.g. a pre-signed upload URL handed out by the registry.
    Absolute(&'a str),
}

/// Request payload, chosen explicitly by the operation building it.
pub enum RequestBody {
    /// Sent unmodified: file contents, checksum files, streams.
    Raw(reqwest::Body),
    /// Already-encoded JSON document.
    Json(Vec<u8>),
}

impl RequestBody {
    pub fn raw(body: impl Into<reqwest::Body>) -> Self {
        RequestBody::Raw(body.into())
    }

    /// Serialize a structured value. Fails before any network activity.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, RegistryError> {
        serde_json::to_vec(value)
            .map(RequestBody::Json)
            .map_err(RegistryError::Serialization)
    }

    fn into_body(self) -> reqwest::Body {
        match self {
            RequestBody::Raw(body) => body,
            RequestBody::Json(bytes) => reqwest::Body::from(bytes),
        }
    }
}

pub(crate) fn resolve_url(
    config: &Config,
    target: RequestTarget<'_>,
    query: &[(&str, &str)],
) -> Result<Url, RegistryError> {
    let raw = match target {
        RequestTarget::Route(route) => format!("{}/{}", config.address(), route),
        RequestTarget::Absolute(url) => url.to_string(),
    };
    let mut url = Url::parse(&raw).map_err(|source| RegistryError::InvalidUrl {
        url: raw.clone(),
        source,
    })?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Build a ready-to-send request. Nothing here touches the network.
pub fn build_request(
    config: &Config,
    method: Method,
    target: RequestTarget<'_>,
    query: &[(&str, &str)],
    body: Option<RequestBody>,
    timeout: Option<Duration>,
) -> Result<Request, RegistryError> {
    let body = body.map(RequestBody::into_body);
    let url = resolve_url(config, target, query)?;

    let mut request = Request::new(method, url);
    *request.body_mut() = body;
    *request.timeout_mut() = timeout;
    Ok(request)
}

pub(crate) fn set_header(
    request: &mut Request,
    name: HeaderName,
    display_name: &'static str,
    value: &str,
) -> Result<(), RegistryError> {
    let value = HeaderValue::from_str(value).map_err(|source| RegistryError::InvalidHeader {
        name: display_name,
        source,
    })?;
    request.headers_mut().insert(name, value);
    Ok(())
}

pub(crate) fn set_bearer_token(request: &mut Request, token: &str) -> Result<(), RegistryError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|source| {
        RegistryError::InvalidHeader {
            name: "Authorization",
            source,
        }
    })?;
    value.set_sensitive(true);
    request
        .headers_mut()
        .insert(reqwest::header::AUTHORIZATION, value);
    Ok(())
}
