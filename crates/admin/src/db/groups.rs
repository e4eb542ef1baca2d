//! Group and discipleship group repositories.
//!
//! Joining a group from the mobile app creates a `pending` membership
//! request; staff approve or reject it from the dashboard. A rejected
//! contact may re-apply, which resets the row to `pending` and clears the
//! rejection reason.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{
    ContactId, DiscipleshipGroupId, DiscipleshipRole, GroupId, MembershipId, MembershipStatus,
};

use super::RepositoryError;

/// A small group.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub meeting_day: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A discipleship (mentoring) group.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DiscipleshipGroup {
    pub id: DiscipleshipGroupId,
    pub name: String,
    pub description: Option<String>,
    pub mentor_contact_id: Option<ContactId>,
    pub created_at: DateTime<Utc>,
}

/// A membership request/record in either kind of group.
#[derive(Debug, Clone, Serialize)]
pub struct Membership {
    pub id: MembershipId,
    pub contact_id: ContactId,
    pub status: MembershipStatus,
    pub role: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

#[derive(sqlx::FromRow)]
struct MembershipRow {
    id: MembershipId,
    contact_id: ContactId,
    status: String,
    role: Option<String>,
    requested_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = RepositoryError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<MembershipStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid membership status in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            contact_id: row.contact_id,
            status,
            role: row.role,
            requested_at: row.requested_at,
            approved_at: row.approved_at,
            rejection_reason: row.rejection_reason,
        })
    }
}

const MEMBERSHIP_COLUMNS: &str =
    "id, contact_id, status, role, requested_at, approved_at, rejection_reason";

/// Outcome of a mobile join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum JoinOutcome {
    /// New pending request created (or a rejected one reset to pending).
    Requested,
    /// Contact is already an active member.
    AlreadyMember,
    /// A pending request already exists.
    AlreadyPending,
}

/// Repository for groups, discipleship groups, and their memberships.
pub struct GroupRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GroupRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// List groups, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_groups(&self, page: super::Page) -> Result<Vec<Group>, RepositoryError> {
        let page = page.clamped();
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, name, description, meeting_day, created_at
             FROM groups ORDER BY name LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(groups)
    }

    /// Get a single group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_group(&self, id: GroupId) -> Result<Option<Group>, RepositoryError> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, description, meeting_day, created_at FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(group)
    }

    /// Create a group (staff entry).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
        meeting_day: Option<&str>,
    ) -> Result<Group, RepositoryError> {
        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO groups (id, name, description, meeting_day)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, description, meeting_day, created_at",
        )
        .bind(GroupId::generate())
        .bind(name)
        .bind(description)
        .bind(meeting_day)
        .fetch_one(self.pool)
        .await?;
        Ok(group)
    }

    // =========================================================================
    // Group memberships
    // =========================================================================

    /// Current membership row for a contact in a group, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn membership_status(
        &self,
        group_id: GroupId,
        contact_id: ContactId,
    ) -> Result<Option<Membership>, RepositoryError> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM group_memberships
             WHERE group_id = $1 AND contact_id = $2"
        ))
        .bind(group_id)
        .bind(contact_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Membership::try_from).transpose()
    }

    /// Request to join a group from the mobile app.
    ///
    /// Active and pending memberships are reported back unchanged; a
    /// rejected one is reset to pending (re-application).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn request_join(
        &self,
        group_id: GroupId,
        contact_id: ContactId,
    ) -> Result<JoinOutcome, RepositoryError> {
        if let Some(existing) = self.membership_status(group_id, contact_id).await? {
            return match existing.status {
                MembershipStatus::Active => Ok(JoinOutcome::AlreadyMember),
                MembershipStatus::Pending => Ok(JoinOutcome::AlreadyPending),
                MembershipStatus::Rejected | MembershipStatus::Inactive => {
                    sqlx::query(
                        "UPDATE group_memberships
                         SET status = 'pending', requested_at = NOW(), rejection_reason = NULL
                         WHERE id = $1",
                    )
                    .bind(existing.id)
                    .execute(self.pool)
                    .await?;
                    Ok(JoinOutcome::Requested)
                }
            };
        }

        sqlx::query(
            "INSERT INTO group_memberships (id, group_id, contact_id, status, requested_at)
             VALUES ($1, $2, $3, 'pending', NOW())
             ON CONFLICT (group_id, contact_id) DO NOTHING",
        )
        .bind(MembershipId::generate())
        .bind(group_id)
        .bind(contact_id)
        .execute(self.pool)
        .await?;

        Ok(JoinOutcome::Requested)
    }

    /// List membership rows for a group (dashboard approval queue).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_memberships(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Membership>, RepositoryError> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM group_memberships
             WHERE group_id = $1 ORDER BY requested_at"
        ))
        .bind(group_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Membership::try_from).collect()
    }

    /// Approve a pending membership (staff action).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the membership does not exist.
    pub async fn approve_membership(&self, id: MembershipId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE group_memberships
             SET status = 'active', approved_at = NOW(), joined_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Reject a pending membership with a reason (staff action).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the membership does not exist.
    pub async fn reject_membership(
        &self,
        id: MembershipId,
        reason: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE group_memberships SET status = 'rejected', rejection_reason = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(reason)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Discipleship groups
    // =========================================================================

    /// List discipleship groups, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_discipleship_groups(
        &self,
        page: super::Page,
    ) -> Result<Vec<DiscipleshipGroup>, RepositoryError> {
        let page = page.clamped();
        let groups = sqlx::query_as::<_, DiscipleshipGroup>(
            "SELECT id, name, description, mentor_contact_id, created_at
             FROM discipleship_groups ORDER BY name LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(groups)
    }

    /// Current discipleship membership for a contact, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn discipleship_membership_status(
        &self,
        group_id: DiscipleshipGroupId,
        contact_id: ContactId,
    ) -> Result<Option<Membership>, RepositoryError> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM discipleship_memberships
             WHERE discipleship_group_id = $1 AND contact_id = $2"
        ))
        .bind(group_id)
        .bind(contact_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Membership::try_from).transpose()
    }

    /// Request to join a discipleship group; new members enter as mentees.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn request_join_discipleship(
        &self,
        group_id: DiscipleshipGroupId,
        contact_id: ContactId,
    ) -> Result<JoinOutcome, RepositoryError> {
        if let Some(existing) = self
            .discipleship_membership_status(group_id, contact_id)
            .await?
        {
            return match existing.status {
                MembershipStatus::Active => Ok(JoinOutcome::AlreadyMember),
                MembershipStatus::Pending => Ok(JoinOutcome::AlreadyPending),
                MembershipStatus::Rejected | MembershipStatus::Inactive => {
                    sqlx::query(
                        "UPDATE discipleship_memberships
                         SET status = 'pending', requested_at = NOW(), rejection_reason = NULL
                         WHERE id = $1",
                    )
                    .bind(existing.id)
                    .execute(self.pool)
                    .await?;
                    Ok(JoinOutcome::Requested)
                }
            };
        }

        sqlx::query(
            "INSERT INTO discipleship_memberships
                 (id, discipleship_group_id, contact_id, status, role, requested_at)
             VALUES ($1, $2, $3, 'pending', $4, NOW())
             ON CONFLICT (discipleship_group_id, contact_id) DO NOTHING",
        )
        .bind(MembershipId::generate())
        .bind(group_id)
        .bind(contact_id)
        .bind(DiscipleshipRole::Mentee.as_str())
        .execute(self.pool)
        .await?;

        Ok(JoinOutcome::Requested)
    }
}
