use std::{fs, net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

/// CLI / env configuration parsed at process startup.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "marquee-backend",
    about = "Movie discovery API backed by the TMDB catalog",
    version,
    disable_help_subcommand = true
)]
struct CliConfig {
    /// TMDB API read access token sent as a bearer credential
    #[arg(long, env = "TMDB_API_TOKEN", hide_env_values = true)]
    tmdb_api_token: String,

    /// Base URL of the TMDB API
    #[arg(
        long,
        env = "MARQUEE_TMDB_BASE_URL",
        default_value = "https://api.themoviedb.org/3"
    )]
    tmdb_base_url: String,

    /// Directory for the search journal and other persisted data
    #[arg(long, env = "MARQUEE_DATA_DIR", default_value = "./.data")]
    data_dir: PathBuf,

    /// Address to bind the HTTP server to (e.g., 0.0.0.0:8080)
    #[arg(long, env = "MARQUEE_BIND_ADDR", default_value = "0.0.0.0:8080")]
    listen_addr: SocketAddr,

    /// Quiet period in milliseconds before a search input is committed
    #[arg(long, env = "MARQUEE_SEARCH_DEBOUNCE_MS", default_value_t = 500)]
    search_debounce_ms: u64,

    /// Optional OTLP endpoint (grpc or http/proto) for OpenTelemetry export
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otel_endpoint: Option<String>,

    /// Logical service name for telemetry (resource attribute)
    #[arg(long, env = "OTEL_SERVICE_NAME", default_value = "marquee-backend")]
    otel_service_name: String,

    /// Disable OTLP trace export even if an endpoint is set
    #[arg(long, env = "MARQUEE_OTEL_DISABLE_TRACES", default_value_t = false)]
    otel_disable_traces: bool,

    /// Disable OTLP log export even if an endpoint is set
    #[arg(long, env = "MARQUEE_OTEL_DISABLE_LOGS", default_value_t = false)]
    otel_disable_logs: bool,

    /// Deployment environment tag for telemetry (e.g., development, staging, prod)
    #[arg(long, env = "MARQUEE_ENV", default_value = "development")]
    environment: String,

    /// Default log filter when RUST_LOG is not provided
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Comma-separated list of allowed CORS origins
    #[arg(long, env = "MARQUEE_CORS_ALLOWED_ORIGINS", value_delimiter = ',')]
    cors_allowed_origins: Vec<String>,

    /// Directory containing the built frontend assets
    #[arg(long, env = "MARQUEE_FRONTEND_DIST_DIR")]
    frontend_dist_dir: Option<PathBuf>,
}

/// Fully validated configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tmdb: TmdbConfig,
    pub data_dir: PathBuf,
    pub listen_addr: SocketAddr,
    pub search_debounce: Duration,
    pub otel: OtelConfig,
    pub log: LogConfig,
    pub environment: String,
    pub cors_allowed_origins: Vec<String>,
    pub frontend_dist_dir: Option<PathBuf>,
}

/// Catalog API access configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_token: String,
    pub base_url: String,
}

/// OpenTelemetry exporter configuration.
#[derive(Debug, Clone)]
pub struct OtelConfig {
    pub endpoint: Option<String>,
    pub service_name: String,
    pub disable_traces: bool,
    pub disable_logs: bool,
}

/// Structured logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
}

impl AppConfig {
    /// Parse CLI/env arguments and return a validated configuration.
    pub fn load() -> Result<Self> {
        let cli = CliConfig::parse();
        Self::try_from(cli)
    }
}

impl TryFrom<CliConfig> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(value: CliConfig) -> Result<Self> {
        // The bearer credential must be usable before the first catalog
        // request, so reject it here rather than on first use.
        let api_token = value.tmdb_api_token.trim().to_string();
        if api_token.is_empty() {
            return Err(anyhow!(
                "TMDB API token is empty; set TMDB_API_TOKEN or pass --tmdb-api-token"
            ));
        }

        let base_url = value.tmdb_base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(anyhow!("TMDB base URL must not be empty"));
        }

        fs::create_dir_all(&value.data_dir)
            .with_context(|| format!("failed to create data dir '{}'", value.data_dir.display()))?;

        let frontend_dist_dir = value.frontend_dist_dir.clone();
        if let Some(dir) = &frontend_dist_dir {
            if !dir.is_dir() {
                return Err(anyhow!(
                    "frontend dist directory '{}' does not exist or is not a directory",
                    dir.display()
                ));
            }
        }

        Ok(Self {
            tmdb: TmdbConfig {
                api_token,
                base_url,
            },
            data_dir: value.data_dir,
            listen_addr: value.listen_addr,
            search_debounce: Duration::from_millis(value.search_debounce_ms),
            environment: value.environment,
            otel: OtelConfig {
                endpoint: value.otel_endpoint,
                service_name: value.otel_service_name,
                disable_traces: value.otel_disable_traces,
                disable_logs: value.otel_disable_logs,
            },
            log: LogConfig {
                level: value.log_level,
            },
            cors_allowed_origins: value
                .cors_allowed_origins
                .into_iter()
                .filter(|origin| !origin.is_empty())
                .collect(),
            frontend_dist_dir,
        })
    }
}
