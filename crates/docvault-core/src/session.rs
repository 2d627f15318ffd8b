//! Wallet session lifecycle.
//!
//! A session walks `Disconnected → Connecting → Connected`. The store
//! keeps one session per wallet address; the route gate only lets
//! `Connected` sessions through. Sessions carry no credential — this is
//! the demo's stand-in for a wallet handshake — and expire after an idle
//! TTL swept by a background worker.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;

use crate::error::SessionError;

/// Connection state of a wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No wallet attached.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Wallet attached; the session passes the route gate.
    Connected,
}

/// One wallet session.
#[derive(Debug, Clone)]
pub struct WalletSession {
    /// The connected wallet address.
    pub address: String,
    /// Current lifecycle state.
    pub state: SessionState,
    /// Last activity, refreshed by the gate on every authenticated
    /// request.
    pub last_seen: Instant,
}

/// In-memory session store, one entry per wallet address.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, WalletSession>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a handshake for `address`, entering the `Connecting` state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyAddress`] if the address is empty or
    /// whitespace.
    pub async fn begin_connect(&self, address: &str) -> Result<(), SessionError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(SessionError::EmptyAddress);
        }
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            address.to_owned(),
            WalletSession {
                address: address.to_owned(),
                state: SessionState::Connecting,
                last_seen: Instant::now(),
            },
        );
        Ok(())
    }

    /// Complete the handshake, entering the `Connected` state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] if no handshake was started
    /// for this address.
    pub async fn complete_connect(&self, address: &str) -> Result<WalletSession, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(address)
            .ok_or_else(|| SessionError::NotConnected {
                address: address.to_owned(),
            })?;
        session.state = SessionState::Connected;
        session.last_seen = Instant::now();
        info!(address = %session.address, "wallet connected");
        Ok(session.clone())
    }

    /// Connect in one step. The mock handshake resolves immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyAddress`] if the address is empty or
    /// whitespace.
    pub async fn connect(&self, address: &str) -> Result<WalletSession, SessionError> {
        self.begin_connect(address).await?;
        self.complete_connect(address.trim()).await
    }

    /// Drop the session for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] if there is none.
    pub async fn disconnect(&self, address: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(address)
            .ok_or_else(|| SessionError::NotConnected {
                address: address.to_owned(),
            })?;
        info!(address = %address, "wallet disconnected");
        Ok(())
    }

    /// Look up the session for `address`.
    pub async fn get(&self, address: &str) -> Option<WalletSession> {
        self.sessions.read().await.get(address).cloned()
    }

    /// Whether `address` has a `Connected` session.
    pub async fn is_connected(&self, address: &str) -> bool {
        self.sessions
            .read()
            .await
            .get(address)
            .is_some_and(|s| s.state == SessionState::Connected)
    }

    /// Refresh the activity timestamp for `address`.
    pub async fn touch(&self, address: &str) {
        if let Some(session) = self.sessions.write().await.get_mut(address) {
            session.last_seen = Instant::now();
        }
    }

    /// Remove sessions idle for longer than `ttl`. Returns how many were
    /// removed.
    pub async fn expire_older_than(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen.elapsed() <= ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, "expired idle sessions");
        }
        removed
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
