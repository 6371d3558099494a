#![forbid(unsafe_code)]

//! Mchango client core.
//!
//! The Rust heart of the Mchango savings-group ("chama") mobile app:
//! session lifecycle, credential storage, request authorization, and a
//! typed HTTP gateway to the backend. Platform shells (Kotlin/Swift)
//! embed this crate, render the session state it exposes, and invoke
//! its operations — they hold no auth logic of their own.
//!
//! ## Layering
//! ```text
//! UI shell
//!   └── SessionController      (state machine, owns the pieces below)
//!         ├── ApiClient        (typed operations, error normalization)
//!         │     └── RequestAuthorizer   (bearer header on/off)
//!         └── TokenStore       (one durable credential)
//! ```
//!
//! Typical startup:
//! ```no_run
//! # async fn start() -> anyhow::Result<()> {
//! let config = mchango_core::Config::load()?;
//! let session = mchango_core::SessionController::from_config(&config)?;
//! session.bootstrap().await.ok(); // offline start stays logged out
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;

pub use api::ApiClient;
pub use auth::{
    FileTokenStore, LoginOutcome, MemoryTokenStore, RegistrationFlow, RegistrationStep,
    RequestAuthorizer, SessionController, SessionState, TokenStore,
};
pub use config::Config;
pub use error::{ApiError, FieldError, StorageError};
