//! Error types for `docvault-core`.
//!
//! One enum per subsystem. Validation failures are reported before any
//! gateway call is made, so no artificial latency is paid for bad input.

use std::time::Duration;

use docvault_gateway::GatewayError;

use crate::upload::PipelineStage;

/// Errors from the document registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A document with this identifier already exists in the registry.
    #[error("document id '{id}' already registered")]
    DuplicateId { id: String },
}

/// Errors from the wallet session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The wallet address was empty or whitespace.
    #[error("wallet address must not be empty")]
    EmptyAddress,

    /// No session exists for this address.
    #[error("no session for address '{address}'")]
    NotConnected { address: String },
}

/// Errors from the upload pipeline controller.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The file name was empty or whitespace.
    #[error("file name must not be empty")]
    EmptyName,

    /// The file exceeds the configured size ceiling.
    #[error("file of {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    /// Another upload is already running on this controller.
    #[error("an upload is already in flight")]
    InFlight,

    /// A pipeline stage failed. The run aborted and the registry is
    /// untouched; the whole upload may be retried from the start.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: GatewayError,
    },

    /// A pipeline stage did not complete within the stage timeout.
    #[error("{stage} stage timed out after {timeout:?}")]
    StageTimeout {
        stage: PipelineStage,
        timeout: Duration,
    },

    /// The completed document could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors from the share controller.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// The recipient address was empty or whitespace.
    #[error("recipient address must not be empty")]
    EmptyRecipient,

    /// The target document is not in the registry.
    #[error("document '{id}' not found")]
    NotFound { id: String },

    /// The ledger failed to record the grant.
    #[error("grant not recorded: {0}")]
    Gateway(#[from] GatewayError),
}

/// Errors from the access verification controller.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The target document is not in the registry.
    #[error("document '{id}' not found")]
    NotFound { id: String },

    /// The verifier could not be consulted.
    #[error("verification failed: {0}")]
    Gateway(#[from] GatewayError),
}
