//! In-memory document registry.
//!
//! An ordered collection of [`Document`] records behind a single
//! `RwLock`, so every mutation goes through one writer. Documents are
//! appended in completion order — the registry is a monotonic history for
//! the life of the process. Nothing is persisted.

use tokio::sync::RwLock;
use tracing::info;

use crate::document::Document;
use crate::error::RegistryError;

/// Ordered in-memory collection of documents for the current session.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    docs: RwLock<Vec<Document>>,
}

impl DocumentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if a document with the same
    /// id is already registered.
    pub async fn insert(&self, doc: Document) -> Result<(), RegistryError> {
        let mut docs = self.docs.write().await;
        if docs.iter().any(|d| d.id == doc.id) {
            return Err(RegistryError::DuplicateId { id: doc.id });
        }
        info!(id = %doc.id, name = %doc.name, "document registered");
        docs.push(doc);
        Ok(())
    }

    /// Snapshot of all documents in insertion order.
    pub async fn list(&self) -> Vec<Document> {
        self.docs.read().await.clone()
    }

    /// Look up one document by id. Returns `None` if absent.
    pub async fn get(&self, id: &str) -> Option<Document> {
        self.docs.read().await.iter().find(|d| d.id == id).cloned()
    }

    /// Record a share grant on a document. Every call appends exactly one
    /// recipient entry. Returns the new share count, or `None` if the
    /// document is absent.
    pub async fn add_recipient(&self, id: &str, recipient: &str) -> Option<u64> {
        let mut docs = self.docs.write().await;
        let doc = docs.iter_mut().find(|d| d.id == id)?;
        doc.recipients.push(recipient.to_owned());
        Some(doc.recipients.len() as u64)
    }

    /// Record a view on a document. Returns the new view count, or `None`
    /// if the document is absent.
    pub async fn record_view(&self, id: &str) -> Option<u64> {
        let mut docs = self.docs.write().await;
        let doc = docs.iter_mut().find(|d| d.id == id)?;
        doc.views += 1;
        Some(doc.views)
    }

    /// Number of registered documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Whether the registry holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::AccessPolicy;

    fn doc(id: &str) -> Document {
        Document {
            id: id.to_owned(),
            name: format!("{id}.pdf"),
            size: 1024,
            uploaded_at: "2025-03-15".to_owned(),
            storage_ref: "0xabc".to_owned(),
            sealed_ref: "sealed_obj_1".to_owned(),
            contract_address: "0xdef".to_owned(),
            policy: AccessPolicy::Private,
            owner: "0xowner".to_owned(),
            recipients: Vec::new(),
            views: 0,
        }
    }

    #[tokio::test]
    async fn insert_appends_in_order() {
        let registry = DocumentRegistry::new();
        registry.insert(doc("a")).await.unwrap();
        registry.insert(doc("b")).await.unwrap();
        registry.insert(doc("c")).await.unwrap();
        let ids: Vec<String> = registry.list().await.into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn insert_duplicate_id_is_rejected() {
        let registry = DocumentRegistry::new();
        registry.insert(doc("a")).await.unwrap();
        let err = registry.insert(doc("a")).await.unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId { id } if id == "a"));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn get_nonexistent_returns_none() {
        let registry = DocumentRegistry::new();
        assert!(registry.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn add_recipient_grows_share_count_by_one() {
        let registry = DocumentRegistry::new();
        registry.insert(doc("a")).await.unwrap();
        assert_eq!(registry.add_recipient("a", "0x1").await, Some(1));
        assert_eq!(registry.add_recipient("a", "0x2").await, Some(2));
        // Repeat grants to the same address still count.
        assert_eq!(registry.add_recipient("a", "0x1").await, Some(3));
        let doc = registry.get("a").await.unwrap();
        assert_eq!(doc.recipients, vec!["0x1", "0x2", "0x1"]);
        assert_eq!(doc.share_count(), 3);
    }

    #[tokio::test]
    async fn add_recipient_on_missing_document_is_none() {
        let registry = DocumentRegistry::new();
        assert_eq!(registry.add_recipient("nope", "0x1").await, None);
    }

    #[tokio::test]
    async fn record_view_increments() {
        let registry = DocumentRegistry::new();
        registry.insert(doc("a")).await.unwrap();
        assert_eq!(registry.record_view("a").await, Some(1));
        assert_eq!(registry.record_view("a").await, Some(2));
    }

    #[tokio::test]
    async fn record_view_on_missing_document_is_none() {
        let registry = DocumentRegistry::new();
        assert_eq!(registry.record_view("nope").await, None);
    }
}
