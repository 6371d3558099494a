//! Session lifecycle controller.
//!
//! Orchestrates login, registration, and logout; reconciles the token
//! store and request authorizer; and exposes the current session state
//! to the UI layer.
//!
//! ## State machine
//! - `Unknown` → `Anonymous | Authenticated` via [`SessionController::bootstrap`]
//! - `Anonymous` → `Authenticating` → `Authenticated | AuthenticationFailed`
//!   via [`SessionController::login`] or the registration flow
//! - `Authenticated` → `Anonymous` via [`SessionController::logout`], or
//!   implicitly when the backend rejects the credential
//!
//! ## Invariants
//! - A session exists iff a credential is attached to the authorizer;
//!   there is never a partially attached credential after a failure.
//! - Observers are notified synchronously on every transition; no stale
//!   reads after a transition completes.
//! - Every state-changing operation captures a monotonically increasing
//!   generation at its start and re-checks it before applying the
//!   result, so a stale in-flight response (a login settling after the
//!   user logged out) is discarded instead of resurrecting the session.

use crate::api::types::{AuthResponse, User};
use crate::api::ApiClient;
use crate::auth::registration::RegistrationFlow;
use crate::auth::token_store::{FileTokenStore, TokenStore};
use crate::auth::RequestAuthorizer;
use crate::config::Config;
use crate::error::{ApiError, StorageError};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Current phase of the session lifecycle, as observed by the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Before the stored credential has been examined.
    Unknown,
    /// Logged out; no credential attached.
    Anonymous,
    /// A login or registration request is in flight.
    Authenticating,
    /// Logged in as the contained user.
    Authenticated(User),
    /// The last login/registration attempt failed; carries the
    /// normalized reason code (e.g. `invalid_credentials`).
    AuthenticationFailed(String),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Result of a completed login or registration attempt.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Session established and the credential persisted.
    Authenticated,
    /// Session established for this process only: persisting the
    /// credential failed, so it will not survive an app restart. The UI
    /// should warn the user.
    AuthenticatedEphemeral(StorageError),
    /// The session moved on (e.g. the user logged out) while the request
    /// was in flight; the response was discarded.
    Superseded,
}

struct SessionInner {
    state: SessionState,
    generation: u64,
}

/// Owner of the session state machine and of the only mutable shared
/// resource in this layer, the authorizer credential.
pub struct SessionController {
    api: Arc<ApiClient>,
    store: Arc<dyn TokenStore>,
    authorizer: RequestAuthorizer,
    inner: Mutex<SessionInner>,
    notify: watch::Sender<SessionState>,
}

impl SessionController {
    pub fn new(
        api: Arc<ApiClient>,
        store: Arc<dyn TokenStore>,
        authorizer: RequestAuthorizer,
    ) -> Arc<Self> {
        let (notify, _) = watch::channel(SessionState::Unknown);
        Arc::new(Self {
            api,
            store,
            authorizer,
            inner: Mutex::new(SessionInner {
                state: SessionState::Unknown,
                generation: 0,
            }),
            notify,
        })
    }

    /// Assemble the production stack from configuration: a fresh
    /// authorizer, an API client bound to it, and a file-backed token
    /// store under the configured data directory.
    pub fn from_config(config: &Config) -> anyhow::Result<Arc<Self>> {
        let authorizer = RequestAuthorizer::new();
        let api = Arc::new(ApiClient::new(config, authorizer.clone())?);
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.credential_path()));
        Ok(Self::new(api, store, authorizer))
    }

    /// The gateway client, for domain operations. Authenticated calls
    /// should go through [`SessionController::run_authorized`].
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    /// The authenticated user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    /// Observe every state transition. The receiver always sees the
    /// state set by the most recently completed transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.notify.subscribe()
    }

    /// Start the interactive registration flow (phone → OTP → profile).
    pub fn begin_registration(self: &Arc<Self>) -> RegistrationFlow {
        RegistrationFlow::new(Arc::clone(self))
    }

    // ── Startup ──────────────────────────────────────────────

    /// Resolve `Unknown` into `Anonymous` or `Authenticated` by
    /// examining the stored credential.
    ///
    /// A stored credential is attached optimistically and validated with
    /// one profile fetch; if the backend rejects it, it is discarded
    /// rather than retried. A transport failure starts this process
    /// logged out but leaves the credential on disk for the next
    /// launch, and is returned so the UI can offer a retry.
    pub async fn bootstrap(&self) -> Result<(), ApiError> {
        let generation = {
            let inner = self.inner.lock();
            if !matches!(inner.state, SessionState::Unknown | SessionState::Anonymous) {
                return Ok(());
            }
            inner.generation
        };

        let stored = self.store.load().unwrap_or_else(|err| {
            tracing::warn!("could not read stored credential: {err}");
            None
        });
        let Some(token) = stored else {
            self.apply(generation, SessionState::Anonymous);
            return Ok(());
        };

        self.authorizer.set_credential(Some(token));
        match self.api.get_me().await {
            Ok(user) => {
                self.apply(generation, SessionState::Authenticated(user));
                Ok(())
            }
            Err(err) if err.is_authentication() => {
                tracing::info!("stored credential rejected by backend, discarding");
                self.detach(generation, true);
                Ok(())
            }
            Err(err) => {
                self.detach(generation, false);
                Err(err)
            }
        }
    }

    /// Undo the optimistic credential attachment from a failed
    /// bootstrap, unless a newer transition already owns the authorizer.
    fn detach(&self, generation: u64, discard_stored: bool) {
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return;
            }
            self.authorizer.set_credential(None);
            inner.state = SessionState::Anonymous;
            let _ = self.notify.send(SessionState::Anonymous);
        }
        if discard_stored {
            self.clear_store_logged();
        }
    }

    // ── Login / registration ─────────────────────────────────

    /// Authenticate with phone number and PIN.
    ///
    /// On success the credential is persisted and attached before the
    /// state transition; a persistence failure still authenticates for
    /// this process lifetime and is surfaced in the returned
    /// [`LoginOutcome`]. On failure nothing is attached or stored and
    /// the state carries the normalized reason.
    pub async fn login(&self, phone: &str, pin: &str) -> Result<LoginOutcome, ApiError> {
        let generation = self.begin_attempt();
        match self.api.login(phone, pin).await {
            Ok(auth) => Ok(self.establish(generation, auth)),
            Err(err) => {
                self.apply(
                    generation,
                    SessionState::AuthenticationFailed(err.failure_reason().to_string()),
                );
                Err(err)
            }
        }
    }

    /// Final registration step, invoked by [`RegistrationFlow`] once the
    /// phone number is OTP-verified and profile fields are collected.
    pub(crate) async fn complete_registration(
        &self,
        phone: &str,
        otp: &str,
        pin: &str,
        name: &str,
    ) -> Result<LoginOutcome, ApiError> {
        let generation = self.begin_attempt();
        match self.api.register(phone, otp, pin, name).await {
            Ok(auth) => Ok(self.establish(generation, auth)),
            Err(err) => {
                self.apply(
                    generation,
                    SessionState::AuthenticationFailed(err.failure_reason().to_string()),
                );
                Err(err)
            }
        }
    }

    // ── Logout ───────────────────────────────────────────────

    /// Log out. Local state (authorizer, token store) is cleared
    /// unconditionally before the remote revocation is attempted
    /// best-effort: the UI must never stay authenticated after the user
    /// asked to leave, even with the network down. Idempotent — a second
    /// call observes `Anonymous` and does nothing.
    pub async fn logout(&self) {
        let credential = {
            let mut inner = self.inner.lock();
            if matches!(inner.state, SessionState::Anonymous) {
                return;
            }
            inner.generation += 1;
            let credential = self.authorizer.take();
            inner.state = SessionState::Anonymous;
            let _ = self.notify.send(SessionState::Anonymous);
            credential
        };

        self.clear_store_logged();

        if let Some(token) = credential {
            if let Err(err) = self.api.logout(&token).await {
                tracing::warn!("remote logout failed, session already cleared locally: {err}");
            }
        }
    }

    // ── Authenticated operations ─────────────────────────────

    /// Run an authenticated API operation with central expiry handling:
    /// if the backend rejects the credential, the session transitions to
    /// `Anonymous` exactly once, here, instead of per screen.
    pub async fn run_authorized<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let generation = self.inner.lock().generation;
        let result = op.await;
        if matches!(&result, Err(err) if err.is_authentication()) {
            self.expire(generation);
        }
        result
    }

    /// Re-fetch the authenticated user's profile and fold it into the
    /// session state.
    pub async fn refresh_user(&self) -> Result<User, ApiError> {
        let generation = self.inner.lock().generation;
        let user = self.run_authorized(self.api.get_me()).await?;
        {
            let mut inner = self.inner.lock();
            if inner.generation == generation && inner.state.is_authenticated() {
                inner.state = SessionState::Authenticated(user.clone());
                let _ = self.notify.send(inner.state.clone());
            }
        }
        Ok(user)
    }

    // ── Internals ────────────────────────────────────────────

    /// Enter `Authenticating` and return the generation guarding this
    /// attempt.
    fn begin_attempt(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = SessionState::Authenticating;
        let _ = self.notify.send(SessionState::Authenticating);
        inner.generation
    }

    /// Persist and attach the credential, then transition to
    /// `Authenticated` — unless a newer transition won the race, in
    /// which case the response is dropped on the floor.
    fn establish(&self, generation: u64, auth: AuthResponse) -> LoginOutcome {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            tracing::debug!("discarding authentication response superseded by a newer transition");
            return LoginOutcome::Superseded;
        }

        let persisted = self.store.save(&auth.token);
        self.authorizer.set_credential(Some(auth.token));
        inner.state = SessionState::Authenticated(auth.user);
        let _ = self.notify.send(inner.state.clone());

        match persisted {
            Ok(()) => LoginOutcome::Authenticated,
            Err(err) => {
                tracing::warn!("credential not persisted, session will not survive restart: {err}");
                LoginOutcome::AuthenticatedEphemeral(err)
            }
        }
    }

    /// Apply a state transition iff no newer transition has happened
    /// since `generation` was captured.
    fn apply(&self, generation: u64, next: SessionState) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            tracing::debug!("discarding stale session transition");
            return false;
        }
        inner.state = next.clone();
        let _ = self.notify.send(next);
        true
    }

    /// Implicit `Authenticated → Anonymous` after the backend rejected
    /// the credential mid-session.
    fn expire(&self, generation: u64) {
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation || !inner.state.is_authenticated() {
                return;
            }
            inner.generation += 1;
            self.authorizer.set_credential(None);
            inner.state = SessionState::Anonymous;
            let _ = self.notify.send(SessionState::Anonymous);
        }
        tracing::info!("credential expired server-side, session ended");
        self.clear_store_logged();
    }

    fn clear_store_logged(&self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!("could not remove stored credential: {err}");
        }
    }
}
