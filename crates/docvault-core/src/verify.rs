//! Access verification controller.
//!
//! Asks the external verifier whether a requester may access a
//! registered document. Read-only — the registry is never mutated here,
//! and no content retrieval is gated behind the answer.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use docvault_gateway::AccessVerifier;

use crate::error::VerifyError;
use crate::registry::DocumentRegistry;

/// The verifier's answer for one document and requester.
#[derive(Debug, Clone, Serialize)]
pub struct AccessDecision {
    /// The document the check ran against.
    pub document_id: String,
    /// The wallet address that asked.
    pub requester: String,
    /// Whether access was granted.
    pub granted: bool,
}

/// Runs access checks against registry documents.
pub struct AccessController {
    registry: Arc<DocumentRegistry>,
    verifier: Arc<dyn AccessVerifier>,
}

impl AccessController {
    /// Create an access controller over the given registry and verifier.
    #[must_use]
    pub fn new(registry: Arc<DocumentRegistry>, verifier: Arc<dyn AccessVerifier>) -> Self {
        Self { registry, verifier }
    }

    /// Check whether `requester` may access `document_id`.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::NotFound`] if the document is not registered —
    ///   the verifier is never invoked in that case.
    /// - [`VerifyError::Gateway`] if the verifier cannot be consulted.
    pub async fn verify(
        &self,
        document_id: &str,
        requester: &str,
    ) -> Result<AccessDecision, VerifyError> {
        let doc = self
            .registry
            .get(document_id)
            .await
            .ok_or_else(|| VerifyError::NotFound {
                id: document_id.to_owned(),
            })?;

        let granted = self
            .verifier
            .verify_access(&doc.contract_address, requester)
            .await?;

        info!(id = %document_id, requester = %requester, granted, "access check");

        Ok(AccessDecision {
            document_id: document_id.to_owned(),
            requester: requester.to_owned(),
            granted,
        })
    }
}
