//! Wire types exchanged with the Mchango backend.
//!
//! Domain records are read-mostly: the client decodes them, renders
//! them, and refreshes by re-fetching — it never mutates them locally.
//! Monetary amounts are integer TZS.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Authentication ───────────────────────────────────────────────

/// Successful login/registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer credential. Some deployments still emit the legacy
    /// `access_token` field name; both decode to the same place.
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

/// Profile of the authenticated account holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// E.164 phone number, the login identifier.
    pub phone: String,
    pub name: String,
    /// Aggregate contribution/repayment reliability, 0.0–5.0.
    #[serde(default)]
    pub trust_score: Option<f64>,
}

/// Acknowledgement for fire-and-forget operations (OTP dispatch,
/// logout, PIN reset).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of OTP verification.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpVerification {
    pub verified: bool,
}

// ── Groups & rotation ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

/// How payout turns are assigned when a group is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationOrder {
    Manual,
    Randomized,
}

/// A savings group the user belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Fixed amount each member pays per cycle.
    pub contribution_amount: i64,
    pub frequency: ContributionFrequency,
    pub rotation_order: RotationOrder,
    /// Pooled balance not yet disbursed.
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub member_count: u32,
    /// Share code handed to invitees; only visible to admins.
    #[serde(default)]
    pub invite_code: Option<String>,
    #[serde(default)]
    pub next_rotation: Option<NextRotation>,
    pub created_at: DateTime<Utc>,
}

/// Upcoming payout, denormalized onto the group for list screens.
#[derive(Debug, Clone, Deserialize)]
pub struct NextRotation {
    pub member_name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Treasurer,
    Member,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupMember {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub role: MemberRole,
    #[serde(default)]
    pub trust_score: Option<f64>,
    /// Whether the member is current on this cycle's contribution.
    #[serde(default)]
    pub up_to_date: bool,
    pub joined_at: DateTime<Utc>,
}

/// One slot in a group's payout rotation.
#[derive(Debug, Clone, Deserialize)]
pub struct RotationTurn {
    /// 1-based position in the cycle.
    pub position: u32,
    pub member_id: i64,
    pub member_name: String,
    pub scheduled_date: NaiveDate,
    /// Payout for this turn.
    pub amount: i64,
    pub disbursed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub group_id: i64,
    pub sender_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// ── Contributions & payments ─────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionStatus {
    /// Payment initiated on the mobile-money rail, awaiting confirmation.
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contribution {
    pub id: i64,
    pub group_id: i64,
    pub member_name: String,
    pub amount: i64,
    pub status: ContributionStatus,
    /// Identifier of the payment method used (see [`PaymentMethod`]).
    pub method: String,
    /// Rail-side transaction identifier, present once the payment is
    /// acknowledged.
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A payment rail the backend accepts (mobile money operators, bank).
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
}

// ── Loans ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Pending,
    Approved,
    Active,
    Repaid,
    Rejected,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub group_id: i64,
    pub borrower_name: String,
    pub principal: i64,
    /// Flat interest rate in percent, set per group.
    pub interest_rate: f64,
    /// Principal plus interest.
    pub total_due: i64,
    pub status: LoanStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoanRepayment {
    pub id: i64,
    pub loan_id: i64,
    pub amount: i64,
    pub paid_at: DateTime<Utc>,
}

// ── Wallet ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Contribution,
    Payout,
    LoanDisbursement,
    LoanRepayment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub kind: TransactionKind,
    pub amount: i64,
    #[serde(default)]
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletBalance {
    pub balance: i64,
    /// ISO 4217 code, currently always `TZS`.
    pub currency: String,
}

// ── Request payloads ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub contribution_amount: i64,
    pub frequency: ContributionFrequency,
    pub rotation_order: RotationOrder,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contribution_amount: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    /// Phone number of the person to invite.
    pub phone: String,
    pub role: MemberRole,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MemberRole>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewContribution {
    pub group_id: i64,
    pub amount: i64,
    /// Payment method identifier from [`PaymentMethod::id`].
    pub method: String,
    /// Client-generated idempotency reference for the payment rail.
    pub reference: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanApplication {
    pub group_id: i64,
    pub amount: i64,
    pub duration_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_accepts_legacy_access_token_field() {
        let canonical: AuthResponse = serde_json::from_str(
            r#"{"token":"abc123","user":{"id":1,"phone":"+255700000000","name":"Asha"}}"#,
        )
        .unwrap();
        let legacy: AuthResponse = serde_json::from_str(
            r#"{"access_token":"abc123","user":{"id":1,"phone":"+255700000000","name":"Asha"}}"#,
        )
        .unwrap();
        assert_eq!(canonical.token, "abc123");
        assert_eq!(legacy.token, "abc123");
    }

    #[test]
    fn user_trust_score_is_optional() {
        let user: User =
            serde_json::from_str(r#"{"id":1,"phone":"+255700000000","name":"Asha"}"#).unwrap();
        assert!(user.trust_score.is_none());
    }

    #[test]
    fn group_decodes_with_optional_fields_missing() {
        let group: Group = serde_json::from_str(
            r#"{
                "id": 7,
                "name": "Upendo Circle",
                "contribution_amount": 50000,
                "frequency": "monthly",
                "rotation_order": "manual",
                "created_at": "2026-01-10T08:30:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(group.member_count, 0);
        assert!(group.invite_code.is_none());
        assert!(group.next_rotation.is_none());
        assert_eq!(group.frequency, ContributionFrequency::Monthly);
    }

    #[test]
    fn rotation_turn_decodes_schedule_dates() {
        let turn: RotationTurn = serde_json::from_str(
            r#"{
                "position": 2,
                "member_id": 4,
                "member_name": "Neema",
                "scheduled_date": "2026-09-15",
                "amount": 250000,
                "disbursed": false
            }"#,
        )
        .unwrap();
        assert_eq!(turn.scheduled_date, NaiveDate::from_ymd_opt(2026, 9, 15).unwrap());
    }

    #[test]
    fn optional_request_fields_are_omitted_from_json() {
        let update = GroupUpdate {
            name: Some("Upendo".into()),
            ..GroupUpdate::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("name"));
        assert!(!json.contains("description"));
        assert!(!json.contains("contribution_amount"));
    }

    #[test]
    fn loan_status_uses_snake_case_on_the_wire() {
        let status: LoanStatus = serde_json::from_str(r#""repaid""#).unwrap();
        assert_eq!(status, LoanStatus::Repaid);
    }
}
