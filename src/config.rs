// ⚙️ Server Configuration

use anyhow::{Context, Result};
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const BIND_ADDR_ENV: &str = "RECEIPT_PROCESSOR_ADDR";
pub const DEFAULT_LOG_FILTER: &str = "receipt_processor=info,tower_http=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Read overrides from the environment, falling back to the local default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = lookup(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {:?}", BIND_ADDR_ENV, raw))?;
        Ok(ServerConfig { bind_addr })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_local_port_8080() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_env_override() {
        let config = ServerConfig::from_lookup(|key| {
            (key == BIND_ADDR_ENV).then(|| "0.0.0.0:3000".to_string())
        })
        .unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn test_rejects_malformed_addr() {
        let result = ServerConfig::from_lookup(|_| Some("localhost".to_string()));
        assert!(result.is_err());
    }
}
