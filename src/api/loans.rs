//! Loan requests and repayments.
//!
//! Interest terms are set by the group and computed server-side; the
//! client only renders what the backend returns.

use super::types::{Loan, LoanApplication, LoanRepayment};
use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    pub async fn request_loan(&self, application: &LoanApplication) -> Result<Loan, ApiError> {
        self.post_json("/loans", application).await
    }

    /// Loans the authenticated user has requested, across groups.
    pub async fn user_loans(&self) -> Result<Vec<Loan>, ApiError> {
        self.get_json("/loans/user").await
    }

    /// All loans within a group (admin/treasurer view).
    pub async fn group_loans(&self, group_id: i64) -> Result<Vec<Loan>, ApiError> {
        self.get_json(&format!("/loans/group/{group_id}")).await
    }

    pub async fn get_loan(&self, loan_id: i64) -> Result<Loan, ApiError> {
        self.get_json(&format!("/loans/{loan_id}")).await
    }

    pub async fn repay_loan(&self, loan_id: i64, amount: i64) -> Result<LoanRepayment, ApiError> {
        self.post_json(
            &format!("/loans/{loan_id}/repayments"),
            &serde_json::json!({ "amount": amount }),
        )
        .await
    }
}
