//! Interactive multi-step registration: phone → OTP → profile.
//!
//! The flow is a short-lived, in-memory record owned by the signup
//! screen. A failure at any step keeps the flow at the step that failed
//! and preserves everything already entered — the form is never reset
//! wholesale. Only the final step touches session state; dropping the
//! flow (navigating away) discards it without side effects.

use crate::auth::session::{LoginOutcome, SessionController};
use crate::error::ApiError;
use std::sync::Arc;

/// Where the flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    /// Waiting for a phone number.
    EnterPhone,
    /// OTP dispatched; waiting for the code.
    EnterOtp,
    /// OTP verified; waiting for display name and PIN.
    EnterProfile,
    /// Registration finished; the session state carries the result.
    Complete,
}

/// One in-progress signup.
pub struct RegistrationFlow {
    session: Arc<SessionController>,
    step: RegistrationStep,
    phone: Option<String>,
    otp: Option<String>,
}

impl RegistrationFlow {
    pub(crate) fn new(session: Arc<SessionController>) -> Self {
        Self {
            session,
            step: RegistrationStep::EnterPhone,
            phone: None,
            otp: None,
        }
    }

    pub fn step(&self) -> RegistrationStep {
        self.step
    }

    /// Phone number entered so far, preserved across step failures.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Submit a phone number and request an OTP for it. May also be
    /// called from a later step to change the number, which restarts
    /// verification.
    pub async fn submit_phone(&mut self, phone: &str) -> Result<(), ApiError> {
        let phone = phone.trim().to_string();
        self.session.api().send_otp(&phone).await?;
        self.phone = Some(phone);
        self.otp = None;
        self.step = RegistrationStep::EnterOtp;
        Ok(())
    }

    /// Re-request an OTP for the already-entered phone number.
    pub async fn resend_otp(&mut self) -> Result<(), ApiError> {
        let Some(phone) = self.phone.clone() else {
            return Err(step_error("a phone number has not been submitted yet"));
        };
        self.session.api().send_otp(&phone).await.map(|_| ())
    }

    /// Submit the received OTP for verification. On failure the flow
    /// stays at the OTP step with the phone number intact.
    pub async fn submit_otp(&mut self, code: &str) -> Result<(), ApiError> {
        let Some(phone) = self.phone.clone() else {
            return Err(step_error("a phone number has not been submitted yet"));
        };
        let code = code.trim();
        let verification = self.session.api().verify_otp(&phone, code).await?;
        if !verification.verified {
            return Err(ApiError::Validation {
                code: "otp_invalid".into(),
                message: "the code could not be verified".into(),
                fields: Vec::new(),
            });
        }
        self.otp = Some(code.to_string());
        self.step = RegistrationStep::EnterProfile;
        Ok(())
    }

    /// Submit display name and PIN, completing registration. On success
    /// the session transitions to `Authenticated`; on failure the flow
    /// stays at the profile step so the user can correct and resubmit.
    pub async fn submit_profile(&mut self, name: &str, pin: &str) -> Result<LoginOutcome, ApiError> {
        let (Some(phone), Some(otp)) = (self.phone.clone(), self.otp.clone()) else {
            return Err(step_error("the OTP step has not been completed"));
        };
        let outcome = self
            .session
            .complete_registration(&phone, &otp, pin, name.trim())
            .await?;
        self.step = RegistrationStep::Complete;
        Ok(outcome)
    }

    /// Abandon the flow. Equivalent to dropping it; nothing was
    /// persisted at any step before completion.
    pub fn cancel(self) {}
}

/// Misuse of the step sequence, reported as a normal validation failure
/// so screens handle it like any other rejected input.
fn step_error(message: &str) -> ApiError {
    ApiError::Validation {
        code: "invalid_step".into(),
        message: message.into(),
        fields: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::auth::token_store::MemoryTokenStore;
    use crate::auth::RequestAuthorizer;
    use crate::auth::SessionState;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> Arc<SessionController> {
        let config = Config::new(server.uri(), std::env::temp_dir());
        let authorizer = RequestAuthorizer::new();
        let api = Arc::new(ApiClient::new(&config, authorizer.clone()).unwrap());
        SessionController::new(api, Arc::new(MemoryTokenStore::new()), authorizer)
    }

    async fn mount_send_otp_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/send-otp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "sent" })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn full_flow_ends_authenticated() {
        let server = MockServer::start().await;
        mount_send_otp_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .and(body_json(json!({ "phone": "+255700000000", "otp": "1111" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "verified": true })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({
                "phone": "+255700000000", "otp": "1111", "pin": "1234", "name": "Asha"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "abc123",
                "user": { "id": 1, "phone": "+255700000000", "name": "Asha" }
            })))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let mut flow = session.begin_registration();

        flow.submit_phone("+255700000000").await.unwrap();
        assert_eq!(flow.step(), RegistrationStep::EnterOtp);

        flow.submit_otp("1111").await.unwrap();
        assert_eq!(flow.step(), RegistrationStep::EnterProfile);

        let outcome = flow.submit_profile("Asha", "1234").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Authenticated));
        assert_eq!(flow.step(), RegistrationStep::Complete);
        assert!(session.state().is_authenticated());
    }

    #[tokio::test]
    async fn wrong_otp_keeps_the_step_and_the_phone_number() {
        let server = MockServer::start().await;
        mount_send_otp_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "code": "otp_invalid", "message": "wrong code" })),
            )
            .mount(&server)
            .await;

        let session = session_for(&server);
        let mut flow = session.begin_registration();
        flow.submit_phone("+255700000000").await.unwrap();

        let err = flow.submit_otp("0000").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert_eq!(flow.step(), RegistrationStep::EnterOtp);
        assert_eq!(flow.phone(), Some("+255700000000"));
        // Session state was never touched by the intermediate step.
        assert_eq!(session.state(), SessionState::Unknown);
    }

    #[tokio::test]
    async fn backend_rejecting_verification_flag_keeps_the_step() {
        let server = MockServer::start().await;
        mount_send_otp_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "verified": false })))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let mut flow = session.begin_registration();
        flow.submit_phone("+255700000000").await.unwrap();

        let err = flow.submit_otp("0000").await.unwrap_err();
        assert_eq!(err.failure_reason(), "otp_invalid");
        assert_eq!(flow.step(), RegistrationStep::EnterOtp);
    }

    #[tokio::test]
    async fn failed_otp_dispatch_keeps_the_flow_at_phone_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/send-otp"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "code": "phone_invalid", "message": "bad number" })),
            )
            .mount(&server)
            .await;

        let session = session_for(&server);
        let mut flow = session.begin_registration();
        let err = flow.submit_phone("12345").await.unwrap_err();
        assert_eq!(err.failure_reason(), "phone_invalid");
        assert_eq!(flow.step(), RegistrationStep::EnterPhone);
    }

    #[tokio::test]
    async fn profile_rejection_preserves_phone_and_otp_for_resubmission() {
        let server = MockServer::start().await;
        mount_send_otp_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "verified": true })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": "pin_policy",
                "message": "PIN rejected",
                "errors": [{ "field": "pin", "message": "must be 4 digits" }]
            })))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let mut flow = session.begin_registration();
        flow.submit_phone("+255700000000").await.unwrap();
        flow.submit_otp("1111").await.unwrap();

        let err = flow.submit_profile("Asha", "12").await.unwrap_err();
        assert_eq!(err.failure_reason(), "pin_policy");
        assert_eq!(flow.step(), RegistrationStep::EnterProfile);
        assert_eq!(flow.phone(), Some("+255700000000"));
        // The failed final attempt is visible in session state.
        assert_eq!(
            session.state(),
            SessionState::AuthenticationFailed("pin_policy".into())
        );
    }

    #[tokio::test]
    async fn otp_submission_before_phone_is_rejected_client_side() {
        let server = MockServer::start().await;
        let session = session_for(&server);
        let mut flow = session.begin_registration();

        let err = flow.submit_otp("1111").await.unwrap_err();
        assert_eq!(err.failure_reason(), "invalid_step");
        // No request reached the backend.
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
