use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tfpublish::registry::request::BINARY_OCTET_STREAM;
use tfpublish::registry::{
    CreateProviderVersionPlatformRequest, CreateProviderVersionRequest, FileUploadRequest,
};
use tfpublish::shared::logging;
use tfpublish::{Config, TfClient};
use tracing::{error, info};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(
    name = "tfpublish",
    about = "Publish Terraform provider releases to a private Terraform registry.",
    version = APP_VERSION
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Registry address (defaults to $TF_ADDRESS, then https://app.terraform.io)"
    )]
    pub address: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "TOKEN",
        help = "Registry API token (defaults to $TF_TOKEN)"
    )]
    pub token: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "SECS",
        help = "Per-request deadline in seconds"
    )]
    pub timeout: Option<u64>,
}

#[derive(Args)]
struct ProviderArgs {
    #[arg(long, help = "Organization owning the private registry")]
    org: String,

    #[arg(long, default_value = "private", help = "Registry name")]
    registry_name: String,

    #[arg(long, help = "Provider namespace")]
    namespace: String,

    #[arg(long, help = "Provider name, e.g. aws")]
    provider: String,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "create-version", about = "Create a provider version")]
    CreateVersion {
        #[command(flatten)]
        provider: ProviderArgs,

        #[arg(long, help = "Semantic version being published")]
        version: String,

        #[arg(long, help = "ID of the GPG key that signed the SHA256SUMS file")]
        key_id: String,

        #[arg(long, default_value = "5.0", help = "Supported plugin protocol (repeatable)")]
        protocols: Vec<String>,
    },

    #[command(name = "create-platform", about = "Register a platform binary for a provider version")]
    CreatePlatform {
        #[command(flatten)]
        provider: ProviderArgs,

        #[arg(long, help = "Provider version the platform belongs to")]
        version: String,

        #[arg(long, help = "Target operating system, e.g. linux")]
        os: String,

        #[arg(long, help = "Target architecture, e.g. amd64")]
        arch: String,

        #[arg(long, help = "SHA256 of the platform zip")]
        shasum: String,

        #[arg(long, help = "File name of the platform zip")]
        filename: String,
    },

    #[command(name = "upload", about = "Upload a file to a pre-signed registry URL")]
    Upload {
        #[arg(long, help = "Pre-signed destination URL")]
        url: String,

        #[arg(long, value_name = "PATH", help = "File to upload")]
        file: PathBuf,

        #[arg(long, default_value = BINARY_OCTET_STREAM, help = "Content type of the file")]
        content_type: String,

        #[arg(long, help = "File name to announce (defaults to the file's base name)")]
        filename: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env_with(cli.address.clone(), cli.token.clone())
        .context("Failed to load registry configuration")?;
    info!("Using registry at {}", config.address());

    let mut client = TfClient::new(config);
    if let Some(secs) = cli.timeout {
        client = client.with_timeout(Duration::from_secs(secs));
    }

    match cli.command {
        Commands::CreateVersion {
            provider,
            version,
            key_id,
            protocols,
        } => {
            let request = CreateProviderVersionRequest::new(&version, key_id, protocols);
            let response = client
                .provider_client()
                .create_provider_version(
                    &provider.org,
                    &provider.registry_name,
                    &provider.namespace,
                    &provider.provider,
                    &request,
                )
                .await
                .with_context(|| format!("Failed to create provider version {}", version))?;
            print_json(&response)
        }
        Commands::CreatePlatform {
            provider,
            version,
            os,
            arch,
            shasum,
            filename,
        } => {
            let request = CreateProviderVersionPlatformRequest::new(&os, &arch, shasum, filename);
            let response = client
                .provider_client()
                .create_provider_version_platform(
                    &provider.org,
                    &provider.registry_name,
                    &provider.namespace,
                    &provider.provider,
                    &version,
                    &request,
                )
                .await
                .with_context(|| format!("Failed to create platform {}_{} for {}", os, arch, version))?;
            print_json(&response)
        }
        Commands::Upload {
            url,
            file,
            content_type,
            filename,
        } => {
            let filename = match filename {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .with_context(|| format!("Cannot derive a file name from {}", file.display()))?,
            };
            let handle = tokio::fs::File::open(&file)
                .await
                .with_context(|| format!("Failed to open {}", file.display()))?;

            client
                .uploads_client()
                .upload_file(FileUploadRequest::new(url, handle, content_type, &filename))
                .await
                .with_context(|| format!("Failed to upload {}", filename))?;
            info!("Uploaded {}", filename);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
