//! Authentication and session lifecycle.
//!
//! Provides:
//! - Durable single-credential storage ([`TokenStore`], file-backed in
//!   production, in-memory for tests)
//! - The injectable request-authorization slot ([`RequestAuthorizer`])
//!   read by the gateway client at request-construction time
//! - The session state machine ([`SessionController`]) owning both
//! - The multi-step signup flow ([`RegistrationFlow`])
//!
//! ## Design Decisions
//! - The credential is an opaque bearer string; the client never
//!   inspects it, only forwards it verbatim in the Authorization header.
//! - Exactly one writer: the session controller mutates the authorizer
//!   and store; everything else reads.
//! - Stale async results (a login settling after a logout) are fenced by
//!   a generation counter instead of ad hoc flags.

pub mod authorizer;
pub mod registration;
pub mod session;
pub mod token_store;

pub use authorizer::RequestAuthorizer;
pub use registration::{RegistrationFlow, RegistrationStep};
pub use session::{LoginOutcome, SessionController, SessionState};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
