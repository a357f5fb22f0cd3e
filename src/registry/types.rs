use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// JSON-API payloads for the private registry provider endpoints:
// https://developer.hashicorp.com/terraform/cloud-docs/api-docs/private-registry/provider-versions-platforms

pub const PROVIDER_VERSION_TYPE: &str = "registry-provider-versions";
pub const PROVIDER_PLATFORM_TYPE: &str = "registry-provider-version-platforms";

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Create provider version

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProviderVersionRequest {
    pub data: ProviderVersionRequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderVersionRequestData {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: ProviderVersionRequestAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderVersionRequestAttributes {
    pub version: String,
    pub key_id: String,
    pub protocols: Vec<String>,
}

impl CreateProviderVersionRequest {
    pub fn new(
        version: impl Into<String>,
        key_id: impl Into<String>,
        protocols: Vec<String>,
    ) -> Self {
        Self {
            data: ProviderVersionRequestData {
                kind: PROVIDER_VERSION_TYPE.to_string(),
                attributes: ProviderVersionRequestAttributes {
                    version: version.into(),
                    key_id: key_id.into(),
                    protocols,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProviderVersionResponse {
    pub data: ProviderVersion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderVersion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: ProviderVersionAttributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: ProviderVersionLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderVersionAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protocols: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: ProviderVersionPermissions,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shasums_uploaded: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shasums_sig_uploaded: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderVersionPermissions {
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_delete: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_upload_asset: bool,
}

/// Pre-signed upload destinations for the SHA256SUMS file and its signature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderVersionLinks {
    #[serde(default)]
    pub shasums_upload: Option<String>,
    #[serde(default)]
    pub shasums_sig_upload: Option<String>,
}

// Create provider version platform

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProviderVersionPlatformRequest {
    pub data: ProviderPlatformRequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderPlatformRequestData {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: ProviderPlatformRequestAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderPlatformRequestAttributes {
    pub os: String,
    pub arch: String,
    pub shasum: String,
    pub filename: String,
}

impl CreateProviderVersionPlatformRequest {
    pub fn new(
        os: impl Into<String>,
        arch: impl Into<String>,
        shasum: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            data: ProviderPlatformRequestData {
                kind: PROVIDER_PLATFORM_TYPE.to_string(),
                attributes: ProviderPlatformRequestAttributes {
                    os: os.into(),
                    arch: arch.into(),
                    shasum: shasum.into(),
                    filename: filename.into(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProviderVersionPlatformResponse {
    pub data: ProviderPlatform,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderPlatform {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: ProviderPlatformAttributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: ProviderPlatformLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderPlatformAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub os: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arch: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shasum: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: ProviderPlatformPermissions,
    #[serde(default, deserialize_with = "null_as_default")]
    pub provider_binary_uploaded: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderPlatformPermissions {
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_delete: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_upload_asset: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderPlatformLinks {
    #[serde(default)]
    pub provider_binary_upload: Option<String>,
}

// File upload

/// A single artifact or checksum file headed for a pre-signed destination.
pub struct FileUploadRequest {
    pub destination: String,
    pub file: reqwest::Body,
    pub content_type: String,
    pub filename: String,
}

impl FileUploadRequest {
    pub fn new(
        destination: impl Into<String>,
        file: impl Into<reqwest::Body>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            destination: destination.into(),
            file: file.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }
}

// Error documents

/// Body of a non-success registry response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDocument {
    pub errors: Vec<ApiErrorDetail>,
}

/// The registry answers either with JSON-API error objects or, on some
/// legacy endpoints, with bare strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorDetail {
    Object(ApiErrorObject),
    Message(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ApiErrorSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl fmt::Display for ApiErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorDetail::Message(message) => write!(f, "{}", message),
            ApiErrorDetail::Object(obj) => {
                match (&obj.title, &obj.detail) {
                    (Some(title), Some(detail)) => write!(f, "{}: {}", title, detail)?,
                    (Some(text), None) | (None, Some(text)) => write!(f, "{}", text)?,
                    (None, None) => match &obj.status {
                        Some(status) => write!(f, "status {}", status)?,
                        None => write!(f, "unknown error")?,
                    },
                }
                if let Some(pointer) = obj.source.as_ref().and_then(|s| s.pointer.as_ref()) {
                    write!(f, " ({})", pointer)?;
                }
                Ok(())
            }
        }
    }
}
