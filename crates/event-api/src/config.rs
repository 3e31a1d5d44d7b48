//! Server configuration
//!
//! Every option can be given on the command line or through the
//! environment, matching how the service is configured in a pod spec.

use clap::Args;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PORT")]
    pub port: u16,

    /// Message returned by `GET /`
    #[arg(long, default_value = "Hello!", env = "MESSAGE")]
    pub message: String,

    /// Service name returned by `GET /`
    #[arg(long, default_value = "event-api", env = "SERVICE_NAME")]
    pub service_name: String,

    /// Seconds before the startup probe passes
    #[arg(long, default_value = "5", env = "STARTUP_DELAY_SECS")]
    pub startup_delay_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            message: "Hello!".to_string(),
            service_name: "event-api".to_string(),
            startup_delay_secs: 5,
        }
    }
}

impl ApiConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn startup_threshold(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }
}
