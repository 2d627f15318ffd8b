//! Upload pipeline controller.
//!
//! Drives a document through the three external stages in strict
//! sequence — store, encrypt, deploy — and appends the resulting
//! [`Document`] to the registry on completion. The controller is a state
//! machine:
//!
//! ```text
//! Idle ── upload() ──► Storing ──► Encrypting ──► Deploying ──► Complete
//!                         │             │             │
//!                         └─────────────┴─────────────┴──► Failed
//! ```
//!
//! One upload may be in flight per controller; a second call while a run
//! is active is rejected with [`UploadError::InFlight`]. A failed run
//! leaves the registry untouched and the controller ready for a fresh
//! attempt — there is no partial resume. Each stage runs under a timeout
//! so a stalled gateway fails the run instead of pinning it forever.
//!
//! Progress is reported at fixed checkpoints (10/40/70/100). It is
//! cosmetic — never derived from bytes transferred.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use docvault_gateway::{AccessLedger, EncryptionService, GatewayError, ObjectStore};

use crate::document::{AccessPolicy, Document};
use crate::error::UploadError;
use crate::registry::DocumentRegistry;

/// Default upload size ceiling: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default per-stage timeout.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

const PROGRESS_STORING: u8 = 10;
const PROGRESS_ENCRYPTING: u8 = 40;
const PROGRESS_DEPLOYING: u8 = 70;
const PROGRESS_COMPLETE: u8 = 100;

/// The three external stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Handing bytes to the object store.
    Store,
    /// Sealing the stored object.
    Encrypt,
    /// Deploying the access-policy contract.
    Deploy,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Store => "store",
            Self::Encrypt => "encrypt",
            Self::Deploy => "deploy",
        })
    }
}

/// Observable phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadPhase {
    /// No run has started.
    Idle,
    /// Bytes are with the object store.
    Storing,
    /// The stored object is being sealed.
    Encrypting,
    /// The access contract is being deployed.
    Deploying,
    /// The last run finished and its document is registered.
    Complete,
    /// The last run aborted; a new run may start.
    Failed,
}

impl UploadPhase {
    /// Whether a run is currently active.
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Storing | Self::Encrypting | Self::Deploying)
    }
}

/// Snapshot of the controller's phase and progress checkpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UploadStatus {
    /// Current phase.
    pub phase: UploadPhase,
    /// Progress checkpoint, 0–100.
    pub progress: u8,
}

/// One upload request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// File name.
    pub name: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Sharing rule to deploy with the access contract.
    pub policy: AccessPolicy,
    /// Wallet address of the uploader.
    pub owner: String,
}

/// Limits applied to every run of a controller.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Reject files larger than this many bytes.
    pub max_file_size: u64,
    /// Fail a stage that takes longer than this.
    pub stage_timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }
}

/// Orchestrates the store → encrypt → deploy pipeline for one caller.
pub struct UploadController {
    registry: Arc<DocumentRegistry>,
    store: Arc<dyn ObjectStore>,
    sealer: Arc<dyn EncryptionService>,
    ledger: Arc<dyn AccessLedger>,
    settings: UploadSettings,
    status: RwLock<UploadStatus>,
}

impl UploadController {
    /// Create an idle controller over the given registry and gateways.
    #[must_use]
    pub fn new(
        registry: Arc<DocumentRegistry>,
        store: Arc<dyn ObjectStore>,
        sealer: Arc<dyn EncryptionService>,
        ledger: Arc<dyn AccessLedger>,
        settings: UploadSettings,
    ) -> Self {
        Self {
            registry,
            store,
            sealer,
            ledger,
            settings,
            status: RwLock::new(UploadStatus {
                phase: UploadPhase::Idle,
                progress: 0,
            }),
        }
    }

    /// Current phase and progress checkpoint.
    pub async fn status(&self) -> UploadStatus {
        *self.status.read().await
    }

    /// Run the full pipeline for one file.
    ///
    /// Validation happens before any state transition or gateway call:
    /// an empty name or an oversized file is rejected immediately and the
    /// controller stays in its previous phase.
    ///
    /// # Errors
    ///
    /// - [`UploadError::EmptyName`] / [`UploadError::FileTooLarge`] on
    ///   invalid input.
    /// - [`UploadError::InFlight`] if a run is already active.
    /// - [`UploadError::Stage`] / [`UploadError::StageTimeout`] when a
    ///   stage fails or stalls; the registry is untouched and the whole
    ///   upload may be retried.
    pub async fn upload(&self, request: UploadRequest) -> Result<Document, UploadError> {
        let name = request.name.trim().to_owned();
        if name.is_empty() {
            return Err(UploadError::EmptyName);
        }
        let size = request.bytes.len() as u64;
        if size > self.settings.max_file_size {
            return Err(UploadError::FileTooLarge {
                size,
                limit: self.settings.max_file_size,
            });
        }

        // Claim the controller. The check and the transition happen under
        // one write guard so two concurrent callers cannot both enter.
        {
            let mut status = self.status.write().await;
            if status.phase.is_in_flight() {
                return Err(UploadError::InFlight);
            }
            *status = UploadStatus {
                phase: UploadPhase::Storing,
                progress: PROGRESS_STORING,
            };
        }

        info!(name = %name, size, policy = %request.policy, "upload pipeline started");

        match self.run_stages(&name, &request).await {
            Ok(doc) => {
                self.set_status(UploadPhase::Complete, PROGRESS_COMPLETE).await;
                info!(id = %doc.id, contract = %doc.contract_address, "upload pipeline complete");
                Ok(doc)
            }
            Err(err) => {
                warn!(name = %name, error = %err, "upload pipeline failed");
                self.status.write().await.phase = UploadPhase::Failed;
                Err(err)
            }
        }
    }

    /// The three stages in strict sequence. Any error aborts the run
    /// before the registry is touched.
    async fn run_stages(
        &self,
        name: &str,
        request: &UploadRequest,
    ) -> Result<Document, UploadError> {
        let stored = self
            .stage(PipelineStage::Store, self.store.store(name, &request.bytes))
            .await?;
        self.set_status(UploadPhase::Encrypting, PROGRESS_ENCRYPTING).await;

        let sealed = self
            .stage(PipelineStage::Encrypt, self.sealer.encrypt(&stored.id))
            .await?;
        self.set_status(UploadPhase::Deploying, PROGRESS_DEPLOYING).await;

        let contract = self
            .stage(
                PipelineStage::Deploy,
                self.ledger
                    .deploy_policy(&sealed.sealed_id, request.policy.as_str()),
            )
            .await?;

        let doc = Document {
            id: uuid::Uuid::new_v4().to_string(),
            name: stored.name,
            size: stored.size,
            uploaded_at: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            storage_ref: stored.reference_hash,
            sealed_ref: sealed.sealed_id,
            contract_address: contract.contract_address,
            policy: request.policy,
            owner: request.owner.clone(),
            recipients: Vec::new(),
            views: 0,
        };
        self.registry.insert(doc.clone()).await?;
        Ok(doc)
    }

    /// Run one stage under the stage timeout.
    async fn stage<T>(
        &self,
        stage: PipelineStage,
        op: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, UploadError> {
        match tokio::time::timeout(self.settings.stage_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(UploadError::Stage { stage, source }),
            Err(_) => Err(UploadError::StageTimeout {
                stage,
                timeout: self.settings.stage_timeout,
            }),
        }
    }

    async fn set_status(&self, phase: UploadPhase, progress: u8) {
        *self.status.write().await = UploadStatus { phase, progress };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use docvault_gateway::{MockBackend, MockLatency};

    fn controller(latency: MockLatency, settings: UploadSettings) -> (Arc<UploadController>, Arc<DocumentRegistry>) {
        let registry = Arc::new(DocumentRegistry::new());
        let backend = Arc::new(MockBackend::with_seed(latency, 1));
        let store: Arc<dyn ObjectStore> = backend.clone();
        let sealer: Arc<dyn EncryptionService> = backend.clone();
        let ledger: Arc<dyn AccessLedger> = backend;
        let controller = Arc::new(UploadController::new(
            Arc::clone(&registry),
            store,
            sealer,
            ledger,
            settings,
        ));
        (controller, registry)
    }

    fn request(name: &str, size: usize) -> UploadRequest {
        UploadRequest {
            name: name.to_owned(),
            bytes: vec![0u8; size],
            policy: AccessPolicy::NftGated,
            owner: "0xowner".to_owned(),
        }
    }

    // ── happy path ───────────────────────────────────────────────────

    #[tokio::test]
    async fn successful_run_registers_exactly_one_document() {
        let (ctl, registry) = controller(MockLatency::zero(), UploadSettings::default());
        let doc = ctl.upload(request("report.pdf", 1024 * 1024)).await.unwrap();

        assert_eq!(registry.len().await, 1);
        assert_eq!(doc.name, "report.pdf");
        assert_eq!(doc.size, 1024 * 1024);
        assert_eq!(doc.policy, AccessPolicy::NftGated);
        assert_eq!(doc.owner, "0xowner");
        assert!(doc.storage_ref.starts_with("0x"));
        assert!(doc.sealed_ref.starts_with("sealed_obj_"));
        assert!(doc.recipients.is_empty());
        assert_eq!(doc.views, 0);

        let status = ctl.status().await;
        assert_eq!(status.phase, UploadPhase::Complete);
        assert_eq!(status.progress, 100);
    }

    #[tokio::test]
    async fn document_ids_are_unique_across_runs() {
        let (ctl, registry) = controller(MockLatency::zero(), UploadSettings::default());
        let a = ctl.upload(request("a.pdf", 10)).await.unwrap();
        let b = ctl.upload(request("b.pdf", 10)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pipeline_walks_the_stage_sequence() {
        let (ctl, _registry) = controller(MockLatency::default(), UploadSettings::default());
        assert_eq!(ctl.status().await.phase, UploadPhase::Idle);

        let runner = Arc::clone(&ctl);
        let handle = tokio::spawn(async move { runner.upload(request("walk.pdf", 64)).await });
        tokio::task::yield_now().await;
        let status = ctl.status().await;
        assert_eq!(status.phase, UploadPhase::Storing);
        assert_eq!(status.progress, 10);

        // Mock latencies: store 2000ms, encrypt 1500ms, deploy 1000ms.
        tokio::time::sleep(Duration::from_millis(2001)).await;
        let status = ctl.status().await;
        assert_eq!(status.phase, UploadPhase::Encrypting);
        assert_eq!(status.progress, 40);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let status = ctl.status().await;
        assert_eq!(status.phase, UploadPhase::Deploying);
        assert_eq!(status.progress, 70);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(handle.await.unwrap().is_ok());
        let status = ctl.status().await;
        assert_eq!(status.phase, UploadPhase::Complete);
        assert_eq!(status.progress, 100);
    }

    // ── validation ───────────────────────────────────────────────────

    #[tokio::test]
    async fn oversized_file_is_rejected_without_state_transition() {
        let (ctl, registry) = controller(MockLatency::zero(), UploadSettings::default());
        let err = ctl
            .upload(request("big.bin", 11 * 1024 * 1024))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::FileTooLarge { size, limit }
                if size == 11 * 1024 * 1024 && limit == DEFAULT_MAX_FILE_SIZE
        ));
        assert!(registry.is_empty().await);
        assert_eq!(ctl.status().await.phase, UploadPhase::Idle);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let (ctl, registry) = controller(MockLatency::zero(), UploadSettings::default());
        let err = ctl.upload(request("   ", 10)).await.unwrap_err();
        assert!(matches!(err, UploadError::EmptyName));
        assert!(registry.is_empty().await);
    }

    // ── concurrency guard ────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn second_upload_while_in_flight_is_rejected() {
        let (ctl, registry) = controller(MockLatency::default(), UploadSettings::default());

        let runner = Arc::clone(&ctl);
        let handle = tokio::spawn(async move { runner.upload(request("first.pdf", 64)).await });
        tokio::task::yield_now().await;

        let err = ctl.upload(request("second.pdf", 64)).await.unwrap_err();
        assert!(matches!(err, UploadError::InFlight));

        // The first run is unaffected by the rejected attempt.
        assert!(handle.await.unwrap().is_ok());
        assert_eq!(registry.len().await, 1);
    }

    // ── failure & retry ──────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn stalled_stage_times_out_and_fails_the_run() {
        let stalled = MockLatency {
            store: Duration::from_secs(3600),
            ..MockLatency::zero()
        };
        let settings = UploadSettings {
            stage_timeout: Duration::from_secs(5),
            ..UploadSettings::default()
        };
        let (ctl, registry) = controller(stalled, settings);

        let err = ctl.upload(request("stuck.pdf", 64)).await.unwrap_err();
        assert!(matches!(
            err,
            UploadError::StageTimeout { stage: PipelineStage::Store, .. }
        ));
        assert!(registry.is_empty().await);
        assert_eq!(ctl.status().await.phase, UploadPhase::Failed);

        // A failed controller accepts a fresh run (no InFlight rejection).
        let err = ctl.upload(request("stuck-again.pdf", 64)).await.unwrap_err();
        assert!(matches!(err, UploadError::StageTimeout { .. }));
    }
}
