//! The document record and its access policy.

use serde::{Deserialize, Serialize};

/// Sharing rule attached to a document at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessPolicy {
    /// Anyone can access.
    Public,
    /// Only the owner.
    Private,
    /// Holders of a qualifying NFT.
    NftGated,
    /// Access granted on payment.
    PaymentGated,
}

impl AccessPolicy {
    /// The policy tag as sent to the access ledger.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::NftGated => "nft-gated",
            Self::PaymentGated => "payment-gated",
        }
    }
}

impl std::fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded item, created as the terminal step of a successful
/// pipeline run. Documents live in the registry for the process lifetime;
/// there is no delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier within the registry.
    pub id: String,
    /// Display name (the uploaded file's name).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Upload date as `YYYY-MM-DD`.
    pub uploaded_at: String,
    /// Opaque content reference from the object store.
    pub storage_ref: String,
    /// Opaque sealed-object reference from the encryption service.
    pub sealed_ref: String,
    /// Address of the access-policy contract on the ledger.
    pub contract_address: String,
    /// Sharing rule chosen before the upload started.
    pub policy: AccessPolicy,
    /// Wallet address that uploaded the document.
    pub owner: String,
    /// Addresses this document has been shared with, in grant order.
    /// The share count is the length of this list.
    pub recipients: Vec<String>,
    /// Number of recorded views.
    pub views: u64,
}

impl Document {
    /// Share count for display.
    #[must_use]
    pub fn share_count(&self) -> u64 {
        self.recipients.len() as u64
    }
}
