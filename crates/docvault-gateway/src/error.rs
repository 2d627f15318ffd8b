//! Gateway error types.
//!
//! Every error variant names the external service it came from and carries
//! enough context to diagnose the problem without a debugger. The mock
//! backend never produces these — the error channel exists for the real
//! integrations that attach at this seam.

/// Errors that can occur when calling an external service gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The service could not be reached or did not answer in time.
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    /// The service answered but refused the operation.
    #[error("{service} rejected the request: {reason}")]
    Rejected { service: String, reason: String },

    /// The service answered with something the client could not interpret.
    #[error("invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },
}
