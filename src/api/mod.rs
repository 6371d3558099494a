//! HTTP gateway client for the Mchango backend.
//!
//! Translates domain operations into HTTP calls against one configured
//! base URL, decodes JSON responses, and normalizes failures into the
//! [`ApiError`] taxonomy.
//!
//! ## Design
//! - One `reqwest` client with a bounded timeout; expiry surfaces as a
//!   transport failure instead of hanging callers
//! - Every operation is a pure request/decode mapping — no retry, no
//!   caching, no backoff (resilience belongs to a future layer, not here)
//! - The bearer header is read from the injected [`RequestAuthorizer`]
//!   at request-construction time; when no credential is attached the
//!   header is omitted entirely
//! - Callers never see raw status codes: each call ends in success,
//!   a normalized application failure, or a transport failure

pub mod contributions;
pub mod groups;
pub mod loans;
pub mod types;

use crate::auth::RequestAuthorizer;
use crate::config::Config;
use crate::error::{
    ApiError, ErrorBody, CODE_RATE_LIMITED, CODE_REQUEST_INVALID, REASON_INVALID_CREDENTIALS,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use types::{Ack, AuthResponse, OtpVerification, ProfileUpdate, Transaction, User, WalletBalance};

/// Typed HTTP client for all backend operations.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    authorizer: RequestAuthorizer,
}

impl ApiClient {
    /// Build a client against the configured origin, bound to the given
    /// authorizer.
    pub fn new(config: &Config, authorizer: RequestAuthorizer) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            authorizer,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request, attaching the bearer header when a credential is
    /// currently attached to the authorizer.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = self.authorizer.bearer() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return decode_body(response).await;
        }
        Err(normalize_failure(status, response).await)
    }

    /// Like [`ApiClient::execute`] for endpoints that answer with an
    /// empty body (e.g. 204 on deletes).
    async fn execute_no_content(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(normalize_failure(status, response).await)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.request(Method::POST, path).json(body)).await
    }

    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.request(Method::PUT, path).json(body)).await
    }

    pub(crate) async fn delete_no_content(&self, path: &str) -> Result<(), ApiError> {
        self.execute_no_content(self.request(Method::DELETE, path)).await
    }

    // ── Authentication ───────────────────────────────────────

    /// Request an OTP to be sent to the given phone number.
    pub async fn send_otp(&self, phone: &str) -> Result<Ack, ApiError> {
        self.post_json("/auth/send-otp", &serde_json::json!({ "phone": phone }))
            .await
    }

    /// Check an OTP against the code the backend dispatched.
    pub async fn verify_otp(&self, phone: &str, otp: &str) -> Result<OtpVerification, ApiError> {
        self.post_json(
            "/auth/verify-otp",
            &serde_json::json!({ "phone": phone, "otp": otp }),
        )
        .await
    }

    /// Complete registration: verified phone, OTP, chosen PIN, profile.
    pub async fn register(
        &self,
        phone: &str,
        otp: &str,
        pin: &str,
        name: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.post_json(
            "/auth/register",
            &serde_json::json!({ "phone": phone, "otp": otp, "pin": pin, "name": name }),
        )
        .await
    }

    /// Authenticate with phone number and PIN.
    pub async fn login(&self, phone: &str, pin: &str) -> Result<AuthResponse, ApiError> {
        self.post_json(
            "/auth/login",
            &serde_json::json!({ "phone": phone, "pin": pin }),
        )
        .await
    }

    /// Revoke the session server-side. The credential is supplied
    /// explicitly because the session controller detaches it locally
    /// before making this best-effort call.
    pub async fn logout(&self, credential: &str) -> Result<Ack, ApiError> {
        self.execute(self.http.post(self.url("/auth/logout")).bearer_auth(credential))
            .await
    }

    /// Replace a forgotten PIN after OTP verification.
    pub async fn reset_pin(&self, phone: &str, otp: &str, new_pin: &str) -> Result<Ack, ApiError> {
        self.post_json(
            "/auth/reset-pin",
            &serde_json::json!({ "phone": phone, "otp": otp, "new_pin": new_pin }),
        )
        .await
    }

    // ── Current user ─────────────────────────────────────────

    /// Profile of the account the attached credential belongs to.
    pub async fn get_me(&self) -> Result<User, ApiError> {
        self.get_json("/user/me").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.put_json("/user/profile", update).await
    }

    pub async fn wallet_balance(&self) -> Result<WalletBalance, ApiError> {
        self.get_json("/user/wallet").await
    }

    pub async fn user_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        self.get_json("/user/transactions").await
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Transport(format!("request timed out: {err}"))
    } else {
        ApiError::Transport(err.to_string())
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Transport(format!("malformed response body: {err}")))
}

/// Map a non-2xx response onto the error taxonomy. The body is decoded
/// best-effort; responses without a machine-readable payload fall back
/// to stable default codes.
async fn normalize_failure(status: StatusCode, response: Response) -> ApiError {
    let body: ErrorBody = response.json().await.unwrap_or_default();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return ApiError::Authentication {
            reason: body
                .code
                .unwrap_or_else(|| REASON_INVALID_CREDENTIALS.to_string()),
        };
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ApiError::Validation {
            code: body.code.unwrap_or_else(|| CODE_RATE_LIMITED.to_string()),
            message: body
                .message
                .unwrap_or_else(|| "too many requests, try again shortly".to_string()),
            fields: body.errors,
        };
    }

    if status.is_client_error() {
        return ApiError::Validation {
            code: body.code.unwrap_or_else(|| CODE_REQUEST_INVALID.to_string()),
            message: body
                .message
                .unwrap_or_else(|| format!("request rejected ({status})")),
            fields: body.errors,
        };
    }

    // 5xx: the backend produced no usable response
    ApiError::Transport(format!("server error ({status})"))
}
