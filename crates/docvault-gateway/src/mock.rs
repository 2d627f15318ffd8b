//! Mock backend standing in for all four external services.
//!
//! Every operation sleeps a fixed delay and returns a fabricated
//! identifier drawn from an internal RNG. Nothing is validated, nothing
//! is persisted, and nothing ever fails — this is the demo's stand-in
//! for object storage, sealing, contract deployment, and verification.
//! Construct it with [`MockBackend::with_seed`] and
//! [`MockLatency::zero`] in tests for fast, reproducible runs.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    AccessLedger, AccessVerifier, EncryptionService, GatewayError, ObjectStore, PolicyContract,
    SealedObject, StoredObject,
};

/// Probability that the mock verifier grants access.
const DEFAULT_SUCCESS_RATE: f64 = 0.7;

/// Artificial latency per mock operation.
#[derive(Debug, Clone)]
pub struct MockLatency {
    /// Delay before the object store answers.
    pub store: Duration,
    /// Delay before the sealing service answers.
    pub encrypt: Duration,
    /// Delay before contract deployment confirms.
    pub deploy: Duration,
    /// Delay before the verifier answers.
    pub verify: Duration,
    /// Delay before a share grant confirms.
    pub confirm: Duration,
}

impl Default for MockLatency {
    fn default() -> Self {
        Self {
            store: Duration::from_millis(2000),
            encrypt: Duration::from_millis(1500),
            deploy: Duration::from_millis(1000),
            verify: Duration::from_millis(800),
            confirm: Duration::from_millis(1000),
        }
    }
}

impl MockLatency {
    /// All delays zero — for tests.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            store: Duration::ZERO,
            encrypt: Duration::ZERO,
            deploy: Duration::ZERO,
            verify: Duration::ZERO,
            confirm: Duration::ZERO,
        }
    }
}

/// Fixed-latency, fabricated-identifier implementation of all four
/// gateway traits.
pub struct MockBackend {
    latency: MockLatency,
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("latency", &self.latency)
            .field("success_rate", &self.success_rate)
            .finish_non_exhaustive()
    }
}

impl MockBackend {
    /// Create a mock backend with the given latency profile and an
    /// entropy-seeded RNG.
    #[must_use]
    pub fn new(latency: MockLatency) -> Self {
        Self {
            latency,
            success_rate: DEFAULT_SUCCESS_RATE,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a mock backend with a deterministic identifier stream.
    #[must_use]
    pub fn with_seed(latency: MockLatency, seed: u64) -> Self {
        Self {
            latency,
            success_rate: DEFAULT_SUCCESS_RATE,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Override the verifier's grant probability. Clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_success_rate(mut self, rate: f64) -> Self {
        self.success_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Draw `len` random bytes and render them as lowercase hex.
    async fn hex_token(&self, len: usize) -> String {
        let mut buf = vec![0u8; len];
        self.rng.lock().await.fill_bytes(&mut buf);
        hex::encode(buf)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(MockLatency::default())
    }
}

#[async_trait::async_trait]
impl ObjectStore for MockBackend {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<StoredObject, GatewayError> {
        tokio::time::sleep(self.latency.store).await;
        let receipt = StoredObject {
            id: format!("obj_{}", self.hex_token(6).await),
            reference_hash: format!("0x{}", self.hex_token(20).await),
            size: bytes.len() as u64,
            name: name.to_owned(),
        };
        debug!(object_id = %receipt.id, size = receipt.size, "mock store complete");
        Ok(receipt)
    }
}

#[async_trait::async_trait]
impl EncryptionService for MockBackend {
    async fn encrypt(&self, object_id: &str) -> Result<SealedObject, GatewayError> {
        tokio::time::sleep(self.latency.encrypt).await;
        // The sealed id is a plain derivation from the object id, matching
        // the shape a real sealing service would echo back.
        let receipt = SealedObject {
            sealed_id: format!("sealed_{object_id}"),
            key_id: format!("key_{}", self.hex_token(16).await),
        };
        debug!(sealed_id = %receipt.sealed_id, "mock seal complete");
        Ok(receipt)
    }
}

#[async_trait::async_trait]
impl AccessLedger for MockBackend {
    async fn deploy_policy(
        &self,
        sealed_id: &str,
        policy: &str,
    ) -> Result<PolicyContract, GatewayError> {
        tokio::time::sleep(self.latency.deploy).await;
        let receipt = PolicyContract {
            contract_address: format!("0x{}", self.hex_token(20).await),
            transaction_id: format!("tx_{}", self.hex_token(16).await),
        };
        debug!(
            sealed_id = %sealed_id,
            policy = %policy,
            contract = %receipt.contract_address,
            "mock contract deployed"
        );
        Ok(receipt)
    }

    async fn record_grant(
        &self,
        contract_address: &str,
        recipient: &str,
    ) -> Result<String, GatewayError> {
        tokio::time::sleep(self.latency.confirm).await;
        let tx = format!("tx_{}", self.hex_token(16).await);
        debug!(contract = %contract_address, recipient = %recipient, tx = %tx, "mock grant recorded");
        Ok(tx)
    }
}

#[async_trait::async_trait]
impl AccessVerifier for MockBackend {
    async fn verify_access(
        &self,
        contract_address: &str,
        requester: &str,
    ) -> Result<bool, GatewayError> {
        tokio::time::sleep(self.latency.verify).await;
        // Grants with fixed probability regardless of inputs.
        let granted = self.rng.lock().await.gen_bool(self.success_rate);
        debug!(contract = %contract_address, requester = %requester, granted, "mock verification");
        Ok(granted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn backend() -> MockBackend {
        MockBackend::with_seed(MockLatency::zero(), 7)
    }

    // ── identifier shapes ────────────────────────────────────────────

    #[tokio::test]
    async fn store_receipt_has_reference_hash_and_size() {
        let receipt = backend().store("report.pdf", &[0u8; 64]).await.unwrap();
        assert!(receipt.id.starts_with("obj_"));
        assert!(receipt.reference_hash.starts_with("0x"));
        assert_eq!(receipt.reference_hash.len(), 42);
        assert_eq!(receipt.size, 64);
        assert_eq!(receipt.name, "report.pdf");
    }

    #[tokio::test]
    async fn sealed_id_derives_from_object_id() {
        let receipt = backend().encrypt("obj_abc123").await.unwrap();
        assert_eq!(receipt.sealed_id, "sealed_obj_abc123");
        assert!(receipt.key_id.starts_with("key_"));
    }

    #[tokio::test]
    async fn deploy_returns_contract_and_transaction() {
        let receipt = backend()
            .deploy_policy("sealed_obj_abc123", "private")
            .await
            .unwrap();
        assert!(receipt.contract_address.starts_with("0x"));
        assert_eq!(receipt.contract_address.len(), 42);
        assert!(receipt.transaction_id.starts_with("tx_"));
    }

    #[tokio::test]
    async fn grant_returns_transaction_id() {
        let tx = backend().record_grant("0xdeadbeef", "0xrecipient").await.unwrap();
        assert!(tx.starts_with("tx_"));
    }

    // ── determinism ──────────────────────────────────────────────────

    #[tokio::test]
    async fn same_seed_same_identifier_stream() {
        let a = MockBackend::with_seed(MockLatency::zero(), 42);
        let b = MockBackend::with_seed(MockLatency::zero(), 42);
        let ra = a.store("f", b"x").await.unwrap();
        let rb = b.store("f", b"x").await.unwrap();
        assert_eq!(ra.reference_hash, rb.reference_hash);
        assert_eq!(ra.id, rb.id);
    }

    // ── verifier probability bounds ──────────────────────────────────

    #[tokio::test]
    async fn verify_always_grants_at_rate_one() {
        let b = backend().with_success_rate(1.0);
        for _ in 0..20 {
            assert!(b.verify_access("0xc", "0xu").await.unwrap());
        }
    }

    #[tokio::test]
    async fn verify_never_grants_at_rate_zero() {
        let b = backend().with_success_rate(0.0);
        for _ in 0..20 {
            assert!(!b.verify_access("0xc", "0xu").await.unwrap());
        }
    }

    #[tokio::test]
    async fn success_rate_is_clamped() {
        let b = backend().with_success_rate(7.5);
        assert!(b.verify_access("0xc", "0xu").await.unwrap());
    }
}
