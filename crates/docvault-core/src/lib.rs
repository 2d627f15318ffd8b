//! Core library for `docvault`.
//!
//! Contains the document record and registry, the wallet session store,
//! the upload pipeline state machine, and the share and verification
//! controllers. This crate depends on `docvault-gateway` for the
//! external-service seams and knows nothing about HTTP.

pub mod document;
pub mod error;
pub mod registry;
pub mod session;
pub mod share;
pub mod upload;
pub mod verify;

pub use document::{AccessPolicy, Document};
pub use registry::DocumentRegistry;
pub use session::{SessionState, SessionStore, WalletSession};
pub use share::{ShareController, ShareReceipt};
pub use upload::{
    UploadController, UploadPhase, UploadRequest, UploadSettings, UploadStatus,
};
pub use verify::{AccessController, AccessDecision};
