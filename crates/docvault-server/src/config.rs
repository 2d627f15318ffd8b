//! Server configuration for `docvault`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `DOCVAULT_*` environment variables.

use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Upload size ceiling in bytes.
    pub max_file_size: u64,
    /// Per-stage pipeline timeout.
    pub stage_timeout: Duration,
    /// Latency profile for the mock gateways.
    pub latency_profile: LatencyProfile,
    /// Probability that the mock verifier grants access.
    pub verify_success_rate: f64,
    /// Idle TTL after which a wallet session expires.
    pub session_ttl: Duration,
    /// Interval between session expiry sweeps.
    pub session_scan_interval: Duration,
}

/// Latency profile applied to the mock gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyProfile {
    /// Source-accurate delays (2s store, 1.5s encrypt, 1s deploy, …).
    Realistic,
    /// No artificial delay — for local development and smoke tests.
    Zero,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (binds to `0.0.0.0`)
    /// - `DOCVAULT_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8200`)
    /// - `DOCVAULT_LOG_LEVEL` — log filter (default: `info`)
    /// - `DOCVAULT_MAX_FILE_SIZE` — upload ceiling in bytes (default: 10 MiB)
    /// - `DOCVAULT_STAGE_TIMEOUT` — per-stage timeout in seconds (default: `30`)
    /// - `DOCVAULT_MOCK_LATENCY` — `realistic` or `zero` (default: `realistic`)
    /// - `DOCVAULT_VERIFY_SUCCESS_RATE` — verifier grant probability (default: `0.7`)
    /// - `DOCVAULT_SESSION_TTL` — idle session TTL in seconds (default: `1800`)
    /// - `DOCVAULT_SESSION_SCAN_INTERVAL` — seconds between expiry sweeps (default: `60`)
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = if let Ok(addr) = std::env::var("DOCVAULT_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8200)))
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(8200);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 8200))
        };

        let log_level =
            std::env::var("DOCVAULT_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        let max_file_size = std::env::var("DOCVAULT_MAX_FILE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(docvault_core::upload::DEFAULT_MAX_FILE_SIZE);

        let stage_timeout = std::env::var("DOCVAULT_STAGE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(docvault_core::upload::DEFAULT_STAGE_TIMEOUT, Duration::from_secs);

        let latency_profile = match std::env::var("DOCVAULT_MOCK_LATENCY")
            .unwrap_or_else(|_| "realistic".to_owned())
            .to_lowercase()
            .as_str()
        {
            "zero" | "none" | "off" => LatencyProfile::Zero,
            _ => LatencyProfile::Realistic,
        };

        let verify_success_rate = std::env::var("DOCVAULT_VERIFY_SUCCESS_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.7);

        let session_ttl = std::env::var("DOCVAULT_SESSION_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(Duration::from_secs(1800), Duration::from_secs);

        let session_scan_interval = std::env::var("DOCVAULT_SESSION_SCAN_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(Duration::from_secs(60), Duration::from_secs);

        Self {
            bind_addr,
            log_level,
            max_file_size,
            stage_timeout,
            latency_profile,
            verify_success_rate,
            session_ttl,
            session_scan_interval,
        }
    }
}
