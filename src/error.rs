//! Error taxonomy for the Mchango client core.
//!
//! The gateway client normalizes every backend failure into one of a
//! closed set of kinds before it reaches the session controller, so
//! callers branch on typed values instead of raw HTTP status codes or
//! stringly-typed exceptions:
//! - [`ApiError::Transport`] — no usable response (network, timeout,
//!   server fault, undecodable body)
//! - [`ApiError::Authentication`] — the credential or login attempt was
//!   rejected
//! - [`ApiError::Validation`] — the backend understood the request and
//!   refused it, with machine-readable detail
//! - [`StorageError`] — local credential storage failed (distinct type:
//!   it never travels over the wire)

use serde::Deserialize;

/// Fallback reason when an authentication rejection carries no
/// machine-readable code.
pub const REASON_INVALID_CREDENTIALS: &str = "invalid_credentials";

/// Normalized reason recorded when an attempt fails before the backend
/// produced a response.
pub const REASON_NETWORK: &str = "network_error";

/// Fallback code for 429 responses without a body.
pub const CODE_RATE_LIMITED: &str = "rate_limited";

/// Fallback code for 4xx responses without a body.
pub const CODE_REQUEST_INVALID: &str = "request_invalid";

/// Field-level validation detail reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    /// Name of the offending request field.
    pub field: String,
    /// Human-readable description of what is wrong with it.
    pub message: String,
}

/// Machine-readable failure payload the backend attaches to non-2xx
/// responses. Every field is optional — older deployments return bare
/// status codes.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

/// A failed API gateway operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No usable response: network unreachable, request timed out, the
    /// server faulted, or the body did not decode to the expected shape.
    #[error("network failure: {0}")]
    Transport(String),

    /// The backend rejected the credential or the login attempt.
    #[error("authentication rejected: {reason}")]
    Authentication {
        /// Normalized reason code, e.g. `invalid_credentials`,
        /// `session_expired`, `account_locked`.
        reason: String,
    },

    /// The backend refused the request with validation detail.
    #[error("{message}")]
    Validation {
        /// Stable machine-readable code, e.g. `otp_invalid`, `rate_limited`.
        code: String,
        /// Human-readable summary for display.
        message: String,
        /// Per-field detail, possibly empty.
        fields: Vec<FieldError>,
    },
}

impl ApiError {
    /// Whether this failure means the credential is no longer usable.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Reason code recorded in the session state when a login or
    /// registration attempt ends with this error.
    pub fn failure_reason(&self) -> &str {
        match self {
            Self::Transport(_) => REASON_NETWORK,
            Self::Authentication { reason } => reason,
            Self::Validation { code, .. } => code,
        }
    }
}

/// Local credential storage failed. Read paths may treat this like an
/// absent credential; write paths must report it upward so the user can
/// be told the session will not survive a restart.
#[derive(Debug, thiserror::Error)]
#[error("credential storage failure: {0}")]
pub struct StorageError(#[from] std::io::Error);
