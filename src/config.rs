//! Configuration for the gateway.
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// Netzke gateway - routes /netzke/* requests to session components
#[derive(Parser, Debug, Clone)]
#[command(name = "netzke-gateway")]
#[command(about = "HTTP gateway for session-resident component endpoints")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Upstream application URL; requests outside /netzke/* are forwarded
    /// here. When unset, such requests get a 404.
    #[arg(long, env = "UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Session time-to-live in seconds
    #[arg(long, env = "SESSION_TTL_SECONDS", default_value = "3600")]
    pub session_ttl_seconds: u64,

    /// Enable development mode (registers a demo component under a
    /// well-known session id)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.upstream_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("upstream_url must be http(s), got: {}", url));
            }
        }
        if self.session_ttl_seconds == 0 {
            return Err("session_ttl_seconds must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["netzke-gateway"])
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_upstream() {
        let mut args = base_args();
        args.upstream_url = Some("ftp://example.com".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_ttl() {
        let mut args = base_args();
        args.session_ttl_seconds = 0;
        assert!(args.validate().is_err());
    }
}
