//! Shared application state for the `docvault` server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the session store, the document
//! registry, the share and access controllers, and one upload controller
//! per connected wallet so each session gets its own in-flight guard.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use docvault_core::registry::DocumentRegistry;
use docvault_core::session::SessionStore;
use docvault_core::share::ShareController;
use docvault_core::upload::{UploadController, UploadSettings};
use docvault_core::verify::AccessController;
use docvault_gateway::{AccessLedger, AccessVerifier, EncryptionService, ObjectStore};

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Wallet session store consulted by the route gate.
    pub sessions: Arc<SessionStore>,
    /// The in-memory document registry.
    pub registry: Arc<DocumentRegistry>,
    /// Share grants.
    pub share: ShareController,
    /// Access checks.
    pub access: AccessController,
    /// One upload controller per wallet address, created on demand.
    uploads: RwLock<HashMap<String, Arc<UploadController>>>,
    store: Arc<dyn ObjectStore>,
    sealer: Arc<dyn EncryptionService>,
    ledger: Arc<dyn AccessLedger>,
    upload_settings: UploadSettings,
}

impl AppState {
    /// Build the state over one set of gateways.
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        sealer: Arc<dyn EncryptionService>,
        ledger: Arc<dyn AccessLedger>,
        verifier: Arc<dyn AccessVerifier>,
        upload_settings: UploadSettings,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let registry = Arc::new(DocumentRegistry::new());
        Self {
            sessions,
            share: ShareController::new(Arc::clone(&registry), Arc::clone(&ledger)),
            access: AccessController::new(Arc::clone(&registry), verifier),
            registry,
            uploads: RwLock::new(HashMap::new()),
            store,
            sealer,
            ledger,
            upload_settings,
        }
    }

    /// The upload controller for `address`, created on first use.
    pub async fn upload_controller(&self, address: &str) -> Arc<UploadController> {
        if let Some(ctl) = self.uploads.read().await.get(address) {
            return Arc::clone(ctl);
        }
        let mut uploads = self.uploads.write().await;
        // Re-check under the write lock — another request may have won.
        if let Some(ctl) = uploads.get(address) {
            return Arc::clone(ctl);
        }
        let ctl = Arc::new(UploadController::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.store),
            Arc::clone(&self.sealer),
            Arc::clone(&self.ledger),
            self.upload_settings.clone(),
        ));
        uploads.insert(address.to_owned(), Arc::clone(&ctl));
        ctl
    }

    /// The upload controller for `address`, if one exists.
    pub async fn existing_upload_controller(&self, address: &str) -> Option<Arc<UploadController>> {
        self.uploads.read().await.get(address).cloned()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
