use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::error::RegistryError;
use super::request::{
    build_request, provider_version_platforms_route, provider_versions_route, set_bearer_token,
    set_header, RequestBody, RequestTarget, APPLICATION_JSON, APPLICATION_VND_API_JSON,
};
use super::response::{handle_empty_response, handle_response, RequestInfo};
use super::types::{
    CreateProviderVersionPlatformRequest, CreateProviderVersionPlatformResponse,
    CreateProviderVersionRequest, CreateProviderVersionResponse, FileUploadRequest,
};
use crate::config::Config;

/// Shared plumbing behind every operation client: configuration, the
/// transport it dispatches on and an optional per-request deadline.
#[derive(Clone)]
struct ClientCore {
    config: Arc<Config>,
    transport: Client,
    timeout: Option<Duration>,
}

impl ClientCore {
    /// Same configuration, different transport.
    fn with_transport(&self, transport: Client) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport,
            timeout: self.timeout,
        }
    }

    fn build_request(
        &self,
        method: Method,
        target: RequestTarget<'_>,
        body: Option<RequestBody>,
    ) -> Result<Request, RegistryError> {
        build_request(&self.config, method, target, &[], body, self.timeout)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: Request,
        expected: StatusCode,
    ) -> Result<T, RegistryError> {
        let info = RequestInfo::from(&request);
        debug!("Dispatching {} {}", info.method, info.url);
        let result = self.transport.execute(request).await;
        handle_response(&info, result, expected).await
    }

    async fn send_empty(&self, request: Request, expected: StatusCode) -> Result<(), RegistryError> {
        let info = RequestInfo::from(&request);
        debug!("Dispatching {} {}", info.method, info.url);
        let result = self.transport.execute(request).await;
        handle_empty_response(&info, result, expected).await
    }
}

/// Entry point: owns the configuration and hands out operation clients.
#[derive(Clone)]
pub struct TfClient {
    core: ClientCore,
}

impl TfClient {
    /// Create a client with a default-configured transport.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, Client::new())
    }

    pub fn with_transport(config: Config, transport: Client) -> Self {
        Self {
            core: ClientCore {
                config: Arc::new(config),
                transport,
                timeout: None,
            },
        }
    }

    /// Apply a deadline to every request made through clients derived from
    /// this one. Expiry surfaces as a transport error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.core.timeout = Some(timeout);
        self
    }

    pub fn config(&self) -> &Config {
        &self.core.config
    }

    /// Client for provider version and platform metadata. Shares this
    /// client's transport.
    pub fn provider_client(&self) -> ProviderClient {
        ProviderClient {
            core: self.core.clone(),
        }
    }

    /// Client for artifact and checksum uploads, on a fresh transport of its
    /// own so upload traffic never shares connections with API calls.
    pub fn uploads_client(&self) -> UploadsClient {
        self.uploads_client_with(Client::new())
    }

    pub fn uploads_client_with(&self, transport: Client) -> UploadsClient {
        UploadsClient {
            core: self.core.with_transport(transport),
        }
    }
}

#[derive(Clone)]
pub struct ProviderClient {
    core: ClientCore,
}

impl ProviderClient {
    /// Register a new version of a private provider. The response carries
    /// the upload URLs for the SHA256SUMS file and its signature.
    pub async fn create_provider_version(
        &self,
        org: &str,
        registry_name: &str,
        namespace: &str,
        provider_name: &str,
        data: &CreateProviderVersionRequest,
    ) -> Result<CreateProviderVersionResponse, RegistryError> {
        let route = provider_versions_route(org, registry_name, namespace, provider_name);
        let request = self.build_api_request(&route, RequestBody::json(data)?)?;
        self.core.send(request, StatusCode::CREATED).await
    }

    /// Register a platform binary under an existing provider version. The
    /// response carries the upload URL for the binary itself.
    pub async fn create_provider_version_platform(
        &self,
        org: &str,
        registry_name: &str,
        namespace: &str,
        provider_name: &str,
        version: &str,
        data: &CreateProviderVersionPlatformRequest,
    ) -> Result<CreateProviderVersionPlatformResponse, RegistryError> {
        let route =
            provider_version_platforms_route(org, registry_name, namespace, provider_name, version);
        let request = self.build_api_request(&route, RequestBody::json(data)?)?;
        self.core.send(request, StatusCode::CREATED).await
    }

    fn build_api_request(&self, route: &str, body: RequestBody) -> Result<Request, RegistryError> {
        let mut request =
            self.core
                .build_request(Method::POST, RequestTarget::Route(route), Some(body))?;
        set_bearer_token(&mut request, self.core.config.token())?;
        set_header(
            &mut request,
            CONTENT_TYPE,
            "Content-Type",
            APPLICATION_VND_API_JSON,
        )?;
        set_header(&mut request, ACCEPT, "Accept", APPLICATION_JSON)?;
        Ok(request)
    }
}

#[derive(Clone)]
pub struct UploadsClient {
    core: ClientCore,
}

impl UploadsClient {
    /// PUT a file straight to its pre-signed destination. No bearer token is
    /// attached; the destination URL carries its own authorization.
    pub async fn upload_file(&self, data: FileUploadRequest) -> Result<(), RegistryError> {
        let request = self.build_upload_request(data)?;
        self.core.send_empty(request, StatusCode::OK).await
    }

    pub(crate) fn build_upload_request(
        &self,
        data: FileUploadRequest,
    ) -> Result<Request, RegistryError> {
        let mut request = self.core.build_request(
            Method::PUT,
            RequestTarget::Absolute(&data.destination),
            Some(RequestBody::Raw(data.file)),
        )?;
        set_header(&mut request, CONTENT_TYPE, "Content-Type", &data.content_type)?;
        set_header(
            &mut request,
            CONTENT_DISPOSITION,
            "Content-Disposition",
            &attachment_disposition(&data.filename),
        )?;
        Ok(request)
    }
}

/// `attachment; filename="..."` with the name quoted and escaped.
fn attachment_disposition(filename: &str) -> String {
    format!("attachment; filename={:?}", filename)
}
