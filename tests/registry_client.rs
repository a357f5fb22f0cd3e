use serde_json::json;
use std::io::Write;
use std::time::Duration;

use reqwest::StatusCode;
use tfpublish::registry::{
    CreateProviderVersionPlatformRequest, CreateProviderVersionRequest, FileUploadRequest,
    RegistryError,
};
use tfpublish::{Config, TfClient};
use wiremock::matchers::{body_bytes, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VERSIONS_PATH: &str = "/api/v2/organizations/acme/registry-providers/priv/myorg/tool/versions";
const PLATFORMS_PATH: &str =
    "/api/v2/organizations/acme/registry-providers/priv/myorg/tool/versions/1.2.3/platforms";

/// Helper function to create a client pointed at the mock server
fn create_test_client(server: &MockServer) -> TfClient {
    let config = Config::new(format!("{}/", server.uri()), "test-token").unwrap();
    TfClient::new(config)
}

fn version_request() -> CreateProviderVersionRequest {
    CreateProviderVersionRequest::new("1.2.3", "32966F3FB5AC1129", vec!["5.0".to_string()])
}

#[tokio::test]
async fn test_create_provider_version() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(VERSIONS_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/vnd.api+json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({
            "data": {
                "type": "registry-provider-versions",
                "attributes": {
                    "version": "1.2.3",
                    "key-id": "32966F3FB5AC1129",
                    "protocols": ["5.0"]
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "id": "v1",
                "type": "registry-provider-versions",
                "attributes": { "version": "1.2.3" },
                "links": {
                    "shasums-upload": "https://storage.example/sums",
                    "shasums-sig-upload": "https://storage.example/sig"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let response = client
        .provider_client()
        .create_provider_version("acme", "priv", "myorg", "tool", &version_request())
        .await
        .unwrap();

    assert_eq!(response.data.id, "v1");
    assert_eq!(
        response.data.links.shasums_upload.as_deref(),
        Some("https://storage.example/sums")
    );
}

#[tokio::test]
async fn test_create_provider_version_minimal_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(VERSIONS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"data":{"id":"v1"}}"#))
        .mount(&server)
        .await;

    let response = create_test_client(&server)
        .provider_client()
        .create_provider_version("acme", "priv", "myorg", "tool", &version_request())
        .await
        .unwrap();

    assert_eq!(response.data.id, "v1");
}

#[tokio::test]
async fn test_create_provider_version_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(VERSIONS_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": [{
                "status": "422",
                "title": "invalid attribute",
                "detail": "Version has already been taken",
                "source": { "pointer": "/data/attributes/version" }
            }]
        })))
        .mount(&server)
        .await;

    let err = create_test_client(&server)
        .provider_client()
        .create_provider_version("acme", "priv", "myorg", "tool", &version_request())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
    assert_eq!(
        err.messages(),
        vec![
            "invalid attribute: Version has already been taken (/data/attributes/version)"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_ok_instead_of_created_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(VERSIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":{"id":"v1"}}"#))
        .mount(&server)
        .await;

    let err = create_test_client(&server)
        .provider_client()
        .create_provider_version("acme", "priv", "myorg", "tool", &version_request())
        .await
        .unwrap_err();

    match err {
        RegistryError::UnexpectedStatus {
            status, expected, ..
        } => {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(expected, StatusCode::CREATED);
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_with_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(VERSIONS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = create_test_client(&server)
        .provider_client()
        .create_provider_version("acme", "priv", "myorg", "tool", &version_request())
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::UnexpectedStatus { .. }));
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(err.to_string().contains(VERSIONS_PATH));
}

#[tokio::test]
async fn test_create_provider_version_platform() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PLATFORMS_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/vnd.api+json"))
        .and(body_json(json!({
            "data": {
                "type": "registry-provider-version-platforms",
                "attributes": {
                    "os": "linux",
                    "arch": "amd64",
                    "shasum": "abc123",
                    "filename": "tool_1.2.3_linux_amd64.zip"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "id": "provpltfrm-1",
                "type": "registry-provider-platforms",
                "attributes": {
                    "os": "linux",
                    "arch": "amd64",
                    "filename": "tool_1.2.3_linux_amd64.zip",
                    "shasum": "abc123",
                    "provider-binary-uploaded": false
                },
                "links": { "provider-binary-upload": "https://storage.example/bin" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CreateProviderVersionPlatformRequest::new(
        "linux",
        "amd64",
        "abc123",
        "tool_1.2.3_linux_amd64.zip",
    );
    let response = create_test_client(&server)
        .provider_client()
        .create_provider_version_platform("acme", "priv", "myorg", "tool", "1.2.3", &request)
        .await
        .unwrap();

    assert_eq!(response.data.id, "provpltfrm-1");
    assert!(!response.data.attributes.provider_binary_uploaded);
    assert_eq!(
        response.data.links.provider_binary_upload.as_deref(),
        Some("https://storage.example/bin")
    );
}

#[tokio::test]
async fn test_create_platform_malformed_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PLATFORMS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_string("{\"data\": [1, 2"))
        .mount(&server)
        .await;

    let request = CreateProviderVersionPlatformRequest::new("linux", "amd64", "x", "y.zip");
    let err = create_test_client(&server)
        .provider_client()
        .create_provider_version_platform("acme", "priv", "myorg", "tool", "1.2.3", &request)
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::Decode { .. }));
}

#[tokio::test]
async fn test_upload_file() {
    let server = MockServer::start().await;
    let payload = b"PK\x03\x04 zip bytes".to_vec();

    Mock::given(method("PUT"))
        .and(path("/x"))
        .and(header("content-type", "application/zip"))
        .and(header(
            "content-disposition",
            r#"attachment; filename="tool_1.2.3_linux_amd64.zip""#,
        ))
        .and(body_bytes(payload.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let destination = format!("{}/x", server.uri());
    create_test_client(&server)
        .uploads_client()
        .upload_file(FileUploadRequest::new(
            destination,
            payload,
            "application/zip",
            "tool_1.2.3_linux_amd64.zip",
        ))
        .await
        .unwrap();

    // Pre-signed destinations carry their own authorization.
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_upload_file_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let err = create_test_client(&server)
        .uploads_client()
        .upload_file(FileUploadRequest::new(
            format!("{}/x", server.uri()),
            b"data".to_vec(),
            "application/zip",
            "tool_1.2.3_linux_amd64.zip",
        ))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_upload_streams_file_from_disk() {
    let server = MockServer::start().await;
    let contents = b"0123456789abcdef  tool_1.2.3_linux_amd64.zip\n".to_vec();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&contents).unwrap();
    file.flush().unwrap();

    Mock::given(method("PUT"))
        .and(path("/sums"))
        .and(body_bytes(contents.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let handle = tokio::fs::File::open(file.path()).await.unwrap();
    create_test_client(&server)
        .uploads_client()
        .upload_file(FileUploadRequest::new(
            format!("{}/sums", server.uri()),
            handle,
            "binary/octet-stream",
            "tool_1.2.3_SHA256SUMS",
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deadline_surfaces_as_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(VERSIONS_PATH))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_string(r#"{"data":{"id":"v1"}}"#)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = create_test_client(&server)
        .with_timeout(Duration::from_millis(100))
        .provider_client()
        .create_provider_version("acme", "priv", "myorg", "tool", &version_request())
        .await
        .unwrap_err();

    match &err {
        RegistryError::Transport { source, method, .. } => {
            assert!(source.is_timeout());
            assert_eq!(*method, reqwest::Method::POST);
        }
        other => panic!("expected Transport error, got {:?}", other),
    }
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on port 1.
    let config = Config::new("http://127.0.0.1:1", "test-token").unwrap();
    let err = TfClient::new(config)
        .provider_client()
        .create_provider_version("acme", "priv", "myorg", "tool", &version_request())
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}
