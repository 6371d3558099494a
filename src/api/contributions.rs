//! Contribution payments against the mobile-money rail.

use super::types::{Contribution, NewContribution, PaymentMethod};
use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// Initiate a contribution payment. A fresh client reference is
    /// generated per call so the payment rail can deduplicate the
    /// retries users make when a mobile-money prompt stalls.
    pub async fn make_contribution(
        &self,
        group_id: i64,
        amount: i64,
        method: &str,
    ) -> Result<Contribution, ApiError> {
        let request = NewContribution {
            group_id,
            amount,
            method: method.to_string(),
            reference: uuid::Uuid::new_v4().to_string(),
        };
        self.post_json("/contributions", &request).await
    }

    /// Poll the status of an initiated payment by its rail transaction id.
    pub async fn verify_contribution(&self, transaction_id: &str) -> Result<Contribution, ApiError> {
        self.get_json(&format!("/contributions/verify/{transaction_id}"))
            .await
    }

    /// Payment rails the backend currently accepts.
    pub async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, ApiError> {
        self.get_json("/payment-methods").await
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::ContributionStatus;
    use super::*;
    use crate::auth::RequestAuthorizer;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config::new(server.uri(), std::env::temp_dir());
        ApiClient::new(&config, RequestAuthorizer::new()).unwrap()
    }

    #[tokio::test]
    async fn make_contribution_attaches_a_unique_reference() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contributions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 11,
                "group_id": 7,
                "member_name": "Asha",
                "amount": 50000,
                "status": "pending",
                "method": "mpesa",
                "created_at": "2026-03-01T09:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let contribution = client.make_contribution(7, 50_000, "mpesa").await.unwrap();
        assert_eq!(contribution.status, ContributionStatus::Pending);
        client.make_contribution(7, 50_000, "mpesa").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let references: Vec<String> = requests
            .iter()
            .map(|req| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                body["reference"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(references.len(), 2);
        assert_ne!(references[0], references[1]);
    }

    #[tokio::test]
    async fn verify_contribution_decodes_confirmed_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contributions/verify/TX-900"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 11,
                "group_id": 7,
                "member_name": "Asha",
                "amount": 50000,
                "status": "confirmed",
                "method": "mpesa",
                "transaction_id": "TX-900",
                "created_at": "2026-03-01T09:00:00Z"
            })))
            .mount(&server)
            .await;

        let contribution = client_for(&server).verify_contribution("TX-900").await.unwrap();
        assert_eq!(contribution.status, ContributionStatus::Confirmed);
        assert_eq!(contribution.transaction_id.as_deref(), Some("TX-900"));
    }

    #[tokio::test]
    async fn payment_methods_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payment-methods"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "mpesa", "name": "M-Pesa" },
                { "id": "tigopesa", "name": "Tigo Pesa" }
            ])))
            .mount(&server)
            .await;

        let methods = client_for(&server).payment_methods().await.unwrap();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].id, "mpesa");
    }
}
