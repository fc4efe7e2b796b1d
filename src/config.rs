use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "geography-frontend")]
#[command(about = "Frontend controller for geography pages")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:23700")]
    pub bind_addr: String,

    /// Base URL of the page renderer
    #[arg(long, env = "RENDERER_URL", default_value = "http://localhost:20010")]
    pub renderer_url: String,

    /// API router URL, including its version path (e.g., http://localhost:23200/v1)
    #[arg(long, env = "API_ROUTER_URL", default_value = "http://localhost:23200/v1")]
    pub api_router_url: String,

    /// Code-list API URL, if not reached through the API router
    #[arg(long, env = "CODE_LIST_API_URL")]
    pub code_list_api_url: Option<String>,

    /// Dataset API URL, if not reached through the API router
    #[arg(long, env = "DATASET_API_URL")]
    pub dataset_api_url: Option<String>,

    /// Taxonomy domain passed through to page models
    #[arg(long, env = "TAXONOMY_DOMAIN")]
    pub taxonomy_domain: Option<String>,

    /// Enable the Loop11 usability snippet on rendered pages
    #[arg(long, env = "ENABLE_LOOP11", default_value = "false")]
    pub enable_loop11: bool,

    /// Maximum number of concurrent upstream lookups per page
    #[arg(long, env = "MAX_FAN_OUT", default_value = "16")]
    pub max_fan_out: usize,

    /// Timeout for a single upstream request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Time allowed for in-flight requests to drain on shutdown, in seconds
    #[arg(long, env = "GRACEFUL_SHUTDOWN_TIMEOUT", default_value = "5")]
    pub graceful_shutdown_timeout_secs: u64,

    /// Interval between health checks, in seconds
    #[arg(long, env = "HEALTHCHECK_INTERVAL", default_value = "30")]
    pub health_check_interval_secs: u64,

    /// How long the service may stay unhealthy before reporting CRITICAL, in seconds
    #[arg(long, env = "HEALTHCHECK_CRITICAL_TIMEOUT", default_value = "90")]
    pub health_check_critical_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn effective_code_list_api_url(&self) -> String {
        self.code_list_api_url
            .clone()
            .unwrap_or_else(|| self.api_router_url.clone())
    }

    pub fn effective_dataset_api_url(&self) -> String {
        self.dataset_api_url
            .clone()
            .unwrap_or_else(|| self.api_router_url.clone())
    }

    /// Version prefix of the API router (the path of its URL, e.g. `/v1`).
    ///
    /// Dataset links returned through the router carry this prefix; it is
    /// stripped before the links are used as website paths.
    pub fn api_router_version(&self) -> Result<String, url::ParseError> {
        let url = url::Url::parse(&self.api_router_url)?;
        Ok(url.path().trim_end_matches('/').to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn graceful_shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.graceful_shutdown_timeout_secs)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }

    pub fn health_check_critical_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_critical_timeout_secs)
    }
}
