//! External-service seams for `docvault`.
//!
//! This crate defines the four gateway traits the vault talks to — an
//! object store, a sealing (client-side encryption) service, an access
//! ledger, and an access verifier. It knows nothing about documents,
//! sessions, or HTTP. Real integrations (a content-addressed store, a
//! threshold-encryption network, a chain RPC) attach here; the bundled
//! [`MockBackend`] stands in for all four with fixed latency and
//! fabricated identifiers.

mod error;
mod mock;

pub use error::GatewayError;
pub use mock::{MockBackend, MockLatency};

/// Receipt for an object handed to the object store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredObject {
    /// Store-assigned object identifier.
    pub id: String,
    /// Opaque content reference (stands in for a content address).
    pub reference_hash: String,
    /// Size of the stored object in bytes.
    pub size: u64,
    /// Name the object was stored under.
    pub name: String,
}

/// Receipt for an object sealed by the encryption service.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SealedObject {
    /// Identifier of the sealed object.
    pub sealed_id: String,
    /// Identifier of the key material held by the sealing service. The
    /// vault never uses this to decrypt anything — no retrieval path
    /// exists on this side of the seam.
    pub key_id: String,
}

/// Receipt for an access-policy contract deployed to the ledger.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PolicyContract {
    /// Address of the deployed contract.
    pub contract_address: String,
    /// Transaction that deployed it.
    pub transaction_id: String,
}

/// An external object store.
///
/// Consumes raw bytes, produces an opaque reference. Implementations must
/// be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Store `bytes` under `name` and return the store's receipt.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unavailable`] if the store cannot be
    /// reached, or [`GatewayError::Rejected`] if it refuses the object.
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<StoredObject, GatewayError>;
}

/// An external sealing (encryption) service.
#[async_trait::async_trait]
pub trait EncryptionService: Send + Sync + 'static {
    /// Seal the stored object identified by `object_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unavailable`] or [`GatewayError::Rejected`]
    /// if the sealing service fails.
    async fn encrypt(&self, object_id: &str) -> Result<SealedObject, GatewayError>;
}

/// An external ledger that records access-control state.
#[async_trait::async_trait]
pub trait AccessLedger: Send + Sync + 'static {
    /// Deploy an access-policy contract for a sealed object. `policy` is
    /// the policy tag as a string — the ledger treats it as opaque.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unavailable`] or [`GatewayError::Rejected`]
    /// if deployment fails.
    async fn deploy_policy(
        &self,
        sealed_id: &str,
        policy: &str,
    ) -> Result<PolicyContract, GatewayError>;

    /// Record a grant of access to `recipient` on an existing contract.
    /// Returns the confirming transaction id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unavailable`] or [`GatewayError::Rejected`]
    /// if the grant transaction fails.
    async fn record_grant(
        &self,
        contract_address: &str,
        recipient: &str,
    ) -> Result<String, GatewayError>;
}

/// An external authorization-check service.
#[async_trait::async_trait]
pub trait AccessVerifier: Send + Sync + 'static {
    /// Ask whether `requester` may access the object governed by the
    /// contract at `contract_address`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unavailable`] if the verifier cannot be
    /// reached.
    async fn verify_access(
        &self,
        contract_address: &str,
        requester: &str,
    ) -> Result<bool, GatewayError>;
}
