//! Configuration types for the Axum HTTP server.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Configuration for the Axum HTTP server.
///
/// # Examples
///
/// ```
/// use ev_axum::config::AxumConfig;
///
/// // Use default configuration
/// let config = AxumConfig::default();
///
/// // Custom configuration
/// let config = AxumConfig {
///     bind_address: "127.0.0.1:3000".parse().unwrap(),
///     leaderboard_size: 10,
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AxumConfig {
    /// The address to bind the server to
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// The number of entries on the leaderboard, unless a request asks for fewer
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_leaderboard_size() -> usize {
    ev_core::models::LEADERBOARD_SIZE
}

impl Default for AxumConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}
