use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "TFPUBLISH_LOG_LEVEL";

/// Map a user-supplied level name onto a filter directive, falling back to
/// `info` for anything unrecognised.
pub fn filter_directive(level: &str) -> String {
    let level = match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    };
    format!("tfpublish={},reqwest=warn,hyper=warn", level)
}

/// Install the global subscriber. `RUST_LOG` wins over `TFPUBLISH_LOG_LEVEL`.
/// Output goes to stderr; stdout is reserved for command results.
pub fn init() {
    let level = std::env::var(ENV_LOG_LEVEL).unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_directive(&level).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
