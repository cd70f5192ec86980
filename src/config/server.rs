//! Listener configuration for the submission endpoint.

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use super::dispatcher::env_parse;

/// Address the HTTP submission endpoint binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8081,
        }
    }
}

impl ServerConfig {
    /// Build from `HOST` and `PORT`, falling back to `0.0.0.0:8081`.
    ///
    /// # Errors
    ///
    /// Returns a message if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, String> {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("HOST") {
            cfg.host = host;
        }
        if let Some(port) = env_parse("PORT")? {
            cfg.port = port;
        }
        Ok(cfg)
    }

    /// Resolve the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns a message if `host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| format!("invalid HOST `{}`: {e}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
