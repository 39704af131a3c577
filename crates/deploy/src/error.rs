//! Typed failure conditions for the deployment harness.

use alloy_core::primitives::U256;

/// Failure taxonomy for the harness.
///
/// Most call sites propagate through [`anyhow::Error`]; these variants exist for
/// the conditions callers branch on: fatal configuration errors, transaction-level
/// rejections, and bounded waits that elapsed.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// No network profile exists for the requested chain id.
    #[error("no network profile configured for chain id {0}")]
    ConfigurationNotFound(u64),

    /// A mint request carried less than the configured mint fee.
    #[error("insufficient payment: sent {sent} wei, mint fee is {required} wei")]
    InsufficientPayment { sent: U256, required: U256 },

    /// A randomness-derived selector fell outside the interpretable domain.
    #[error("selector {0} is out of range (expected 0..100)")]
    RangeOutOfBounds(u64),

    /// The content-addressed store rejected or failed an upload.
    #[error("publishing service unavailable: {0}")]
    PublishingUnavailable(String),

    /// The verification service rejected a submission. Logged, never fatal.
    #[error("source verification failed: {0}")]
    VerificationFailure(String),

    /// A bounded wait elapsed before the expected condition was observed.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}
