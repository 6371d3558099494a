//! Request authorization state.
//!
//! One process-wide slot associates the current credential with outgoing
//! requests. The slot is an explicitly injected, cloneable handle rather
//! than an ambient global so tests can isolate instances and assert
//! header presence deterministically.
//!
//! Ownership: the session controller is the sole writer; the gateway
//! client reads the slot once per request at construction time, so the
//! header on any request reflects the most recent completed
//! `set_credential` call — a cleared credential can never leak into a
//! request issued after logout.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Shared handle deciding whether requests carry an `Authorization`
/// header. Cloning shares the underlying slot.
#[derive(Clone, Default)]
pub struct RequestAuthorizer {
    credential: Arc<Mutex<Option<String>>>,
}

impl RequestAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active credential. `None` removes the header from all
    /// subsequently issued requests — the header is omitted, never sent
    /// empty.
    pub fn set_credential(&self, credential: Option<String>) {
        *self.credential.lock() = credential;
    }

    /// Remove and return the active credential.
    pub fn take(&self) -> Option<String> {
        self.credential.lock().take()
    }

    /// Snapshot of the credential for a request about to be issued.
    pub fn bearer(&self) -> Option<String> {
        self.credential.lock().clone()
    }

    /// Whether a credential is currently attached.
    pub fn is_attached(&self) -> bool {
        self.credential.lock().is_some()
    }
}

// Credentials never appear in logs, not even via Debug formatting.
impl fmt::Debug for RequestAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAuthorizer")
            .field("attached", &self.is_attached())
            .finish()
    }
}
