//! HTTP server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Lowest port that does not need elevated privileges.
const MIN_PORT: u16 = 1024;

/// Upper bound for the graceful shutdown window, in seconds.
const MAX_SHUTDOWN_TIMEOUT: u64 = 300;

/// Network binding and shutdown settings.
///
/// # Environment Variables
///
/// - `HOST` - Server host address (default: 127.0.0.1)
/// - `PORT` - Server port (default: 3000, valid range: 1024-65535)
/// - `SHUTDOWN_TIMEOUT` - Graceful shutdown window in seconds (default: 30, max: 300)
///
/// Request timeouts and CORS origins belong to [`MiddlewareConfig`].
///
/// [`MiddlewareConfig`]: crate::config::MiddlewareConfig
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Host address to bind the server to.
    ///
    /// Use "127.0.0.1" for localhost only, "0.0.0.0" for all interfaces.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// TCP port number for the server to listen on.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds to wait for in-flight requests once a shutdown signal arrives.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 3000,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    /// Validates the port and the shutdown window.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.port < MIN_PORT {
            return Err(anyhow!(
                "Port {} is below {MIN_PORT}. Use ports {MIN_PORT}-65535 to avoid requiring root privileges.",
                self.port
            ));
        }

        if self.shutdown_timeout == 0 || self.shutdown_timeout > MAX_SHUTDOWN_TIMEOUT {
            return Err(anyhow!(
                "Shutdown timeout {} seconds is invalid. Must be between 1 and {MAX_SHUTDOWN_TIMEOUT} seconds.",
                self.shutdown_timeout
            ));
        }

        Ok(())
    }

    /// Returns the socket address to bind.
    #[inline]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the graceful shutdown window.
    #[inline]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Returns true if the server listens on every interface.
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    /// Returns true if the server only listens on loopback.
    pub fn is_development(&self) -> bool {
        self.host.is_loopback()
    }

    /// Logs server configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            host = %self.host,
            port = self.port,
            shutdown_timeout_secs = self.shutdown_timeout,
            development = self.is_development(),
            "Server configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_development());
        assert!(!config.binds_to_all_interfaces());
        assert_eq!(config.server_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn rejects_privileged_ports() {
        let config = ServerConfig {
            port: 443,
            ..ServerConfig::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("below 1024"));
    }

    #[test]
    fn rejects_shutdown_timeout_out_of_range() {
        for shutdown_timeout in [0, 301] {
            let config = ServerConfig {
                shutdown_timeout,
                ..ServerConfig::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn detects_unspecified_hosts() {
        let config = ServerConfig {
            host: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            ..ServerConfig::default()
        };
        assert!(config.binds_to_all_interfaces());
        assert!(!config.is_development());
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }
}
