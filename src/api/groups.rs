//! Group operations: creation, joining, membership, rotation schedule,
//! and the group activity feeds.

use super::types::{
    Announcement, Contribution, Group, GroupMember, GroupUpdate, MemberUpdate, NewGroup, NewMember,
    RotationTurn,
};
use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    pub async fn create_group(&self, group: &NewGroup) -> Result<Group, ApiError> {
        self.post_json("/groups", group).await
    }

    /// Groups the authenticated user belongs to.
    pub async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.get_json("/groups").await
    }

    pub async fn get_group(&self, group_id: i64) -> Result<Group, ApiError> {
        self.get_json(&format!("/groups/{group_id}")).await
    }

    pub async fn update_group(&self, group_id: i64, update: &GroupUpdate) -> Result<Group, ApiError> {
        self.put_json(&format!("/groups/{group_id}"), update).await
    }

    /// Join a group using its invite code.
    pub async fn join_group(&self, invite_code: &str) -> Result<Group, ApiError> {
        self.post_json(
            "/groups/join",
            &serde_json::json!({ "invite_code": invite_code }),
        )
        .await
    }

    /// Look up a group by invite code without joining, for the preview
    /// screen shown before the user commits.
    pub async fn preview_group(&self, invite_code: &str) -> Result<Group, ApiError> {
        self.get_json(&format!("/groups/code/{invite_code}")).await
    }

    // ── Membership ───────────────────────────────────────────

    pub async fn group_members(&self, group_id: i64) -> Result<Vec<GroupMember>, ApiError> {
        self.get_json(&format!("/groups/{group_id}/members")).await
    }

    pub async fn add_member(&self, group_id: i64, member: &NewMember) -> Result<GroupMember, ApiError> {
        self.post_json(&format!("/groups/{group_id}/members"), member)
            .await
    }

    pub async fn update_member(
        &self,
        group_id: i64,
        member_id: i64,
        update: &MemberUpdate,
    ) -> Result<GroupMember, ApiError> {
        self.put_json(&format!("/groups/{group_id}/members/{member_id}"), update)
            .await
    }

    pub async fn remove_member(&self, group_id: i64, member_id: i64) -> Result<(), ApiError> {
        self.delete_no_content(&format!("/groups/{group_id}/members/{member_id}"))
            .await
    }

    // ── Activity ─────────────────────────────────────────────

    pub async fn group_contributions(&self, group_id: i64) -> Result<Vec<Contribution>, ApiError> {
        self.get_json(&format!("/groups/{group_id}/contributions"))
            .await
    }

    /// The group's payout rotation, one turn per member per cycle.
    pub async fn rotation_schedule(&self, group_id: i64) -> Result<Vec<RotationTurn>, ApiError> {
        self.get_json(&format!("/groups/{group_id}/rotation")).await
    }

    pub async fn group_announcements(&self, group_id: i64) -> Result<Vec<Announcement>, ApiError> {
        self.get_json(&format!("/groups/{group_id}/announcements"))
            .await
    }

    pub async fn post_announcement(&self, group_id: i64, message: &str) -> Result<Announcement, ApiError> {
        self.post_json(
            &format!("/groups/{group_id}/announcements"),
            &serde_json::json!({ "message": message }),
        )
        .await
    }
}
