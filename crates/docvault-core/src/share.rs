//! Share controller.
//!
//! Grants another wallet address access to a registered document. Input
//! is validated and the target looked up before the ledger is consulted,
//! so bad requests never pay the confirmation latency.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use docvault_gateway::AccessLedger;

use crate::error::ShareError;
use crate::registry::DocumentRegistry;

/// Outcome of a successful share.
#[derive(Debug, Clone, Serialize)]
pub struct ShareReceipt {
    /// The shared document.
    pub document_id: String,
    /// The granted address.
    pub recipient: String,
    /// Share count after this grant.
    pub share_count: u64,
    /// Ledger transaction that confirmed the grant.
    pub transaction_id: String,
}

/// Records share grants against registry documents.
pub struct ShareController {
    registry: Arc<DocumentRegistry>,
    ledger: Arc<dyn AccessLedger>,
}

impl ShareController {
    /// Create a share controller over the given registry and ledger.
    #[must_use]
    pub fn new(registry: Arc<DocumentRegistry>, ledger: Arc<dyn AccessLedger>) -> Self {
        Self { registry, ledger }
    }

    /// Share `document_id` with `recipient`.
    ///
    /// Each successful call appends exactly one recipient entry, so the
    /// share count grows by one per call.
    ///
    /// # Errors
    ///
    /// - [`ShareError::EmptyRecipient`] if the address is empty or
    ///   whitespace — reported before any delay is incurred.
    /// - [`ShareError::NotFound`] if the document is not registered —
    ///   also reported before the ledger call.
    /// - [`ShareError::Gateway`] if the ledger fails to confirm.
    pub async fn share(
        &self,
        document_id: &str,
        recipient: &str,
    ) -> Result<ShareReceipt, ShareError> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(ShareError::EmptyRecipient);
        }

        let doc = self
            .registry
            .get(document_id)
            .await
            .ok_or_else(|| ShareError::NotFound {
                id: document_id.to_owned(),
            })?;

        let transaction_id = self
            .ledger
            .record_grant(&doc.contract_address, recipient)
            .await?;

        // The document cannot disappear — no delete exists — so the grant
        // always lands.
        let share_count = self
            .registry
            .add_recipient(document_id, recipient)
            .await
            .ok_or_else(|| ShareError::NotFound {
                id: document_id.to_owned(),
            })?;

        info!(
            id = %document_id,
            recipient = %recipient,
            share_count,
            tx = %transaction_id,
            "document shared"
        );

        Ok(ShareReceipt {
            document_id: document_id.to_owned(),
            recipient: recipient.to_owned(),
            share_count,
            transaction_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use docvault_gateway::{MockBackend, MockLatency};

    use crate::document::{AccessPolicy, Document};

    async fn setup() -> (ShareController, Arc<DocumentRegistry>) {
        let registry = Arc::new(DocumentRegistry::new());
        let backend = Arc::new(MockBackend::with_seed(MockLatency::zero(), 3));
        registry
            .insert(Document {
                id: "doc-1".to_owned(),
                name: "report.pdf".to_owned(),
                size: 2048,
                uploaded_at: "2025-03-15".to_owned(),
                storage_ref: "0xabc".to_owned(),
                sealed_ref: "sealed_obj_1".to_owned(),
                contract_address: "0xcontract".to_owned(),
                policy: AccessPolicy::Private,
                owner: "0xowner".to_owned(),
                recipients: Vec::new(),
                views: 0,
            })
            .await
            .unwrap();
        (
            ShareController::new(Arc::clone(&registry), backend),
            registry,
        )
    }

    #[tokio::test]
    async fn share_appends_recipient_and_returns_receipt() {
        let (ctl, registry) = setup().await;
        let receipt = ctl.share("doc-1", "0xfriend").await.unwrap();

        assert_eq!(receipt.document_id, "doc-1");
        assert_eq!(receipt.recipient, "0xfriend");
        assert_eq!(receipt.share_count, 1);
        assert!(receipt.transaction_id.starts_with("tx_"));

        let doc = registry.get("doc-1").await.unwrap();
        assert_eq!(doc.recipients, vec!["0xfriend"]);
    }

    #[tokio::test]
    async fn share_count_grows_by_one_per_call() {
        let (ctl, _registry) = setup().await;
        assert_eq!(ctl.share("doc-1", "0xa").await.unwrap().share_count, 1);
        assert_eq!(ctl.share("doc-1", "0xb").await.unwrap().share_count, 2);
        assert_eq!(ctl.share("doc-1", "0xa").await.unwrap().share_count, 3);
    }

    #[tokio::test]
    async fn empty_recipient_fails_fast_without_mutation() {
        let (ctl, registry) = setup().await;
        let err = ctl.share("doc-1", "   ").await.unwrap_err();
        assert!(matches!(err, ShareError::EmptyRecipient));
        assert!(registry.get("doc-1").await.unwrap().recipients.is_empty());
    }

    #[tokio::test]
    async fn unknown_document_reports_not_found() {
        let (ctl, _registry) = setup().await;
        let err = ctl.share("doc-404", "0xfriend").await.unwrap_err();
        assert!(matches!(err, ShareError::NotFound { id } if id == "doc-404"));
    }

    #[tokio::test]
    async fn recipient_address_is_trimmed() {
        let (ctl, registry) = setup().await;
        ctl.share("doc-1", "  0xfriend  ").await.unwrap();
        assert_eq!(
            registry.get("doc-1").await.unwrap().recipients,
            vec!["0xfriend"]
        );
    }
}
