// Re-export modules for testing and external use
pub mod registry {
    pub mod client;
    pub mod error;
    pub mod request;
    pub mod response;
    pub mod types;

    // Re-export commonly used items
    pub use client::{ProviderClient, TfClient, UploadsClient};
    pub use error::RegistryError;
    pub use request::{build_request, build_route, RequestBody, RequestTarget};
    pub use response::{handle_empty_response, handle_response, HttpResponse, RequestInfo};
    pub use types::{
        ApiErrorDetail, CreateProviderVersionPlatformRequest, CreateProviderVersionPlatformResponse,
        CreateProviderVersionRequest, CreateProviderVersionResponse, FileUploadRequest,
    };
}

pub mod shared {
    pub mod logging;
}

pub mod config;

// Re-export commonly used types for easier testing and external use
pub use config::{Config, ConfigError};
pub use registry::client::TfClient;
pub use registry::error::RegistryError;
