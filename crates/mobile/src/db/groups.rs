//! Small groups and discipleship groups, from the member's side.
//!
//! Joining creates a `pending` request that staff act on from the
//! dashboard. A rejected member may re-apply, which resets the existing
//! row to pending.

use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{
    ContactId, DiscipleshipGroupId, DiscipleshipRole, GroupId, MembershipId, MembershipStatus,
};

use super::RepositoryError;

/// A group as listed in the app, with the member's membership status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub meeting_day: Option<String>,
    pub membership_status: Option<MembershipStatus>,
}

#[derive(sqlx::FromRow)]
struct GroupViewRow {
    id: GroupId,
    name: String,
    description: Option<String>,
    meeting_day: Option<String>,
    membership_status: Option<String>,
}

impl TryFrom<GroupViewRow> for GroupView {
    type Error = RepositoryError;

    fn try_from(row: GroupViewRow) -> Result<Self, Self::Error> {
        let membership_status = row
            .membership_status
            .map(|s| s.parse::<MembershipStatus>())
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid membership status in database: {e}"
                ))
            })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            meeting_day: row.meeting_day,
            membership_status,
        })
    }
}

/// A discipleship group with the member's status and role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscipleshipView {
    pub id: DiscipleshipGroupId,
    pub name: String,
    pub description: Option<String>,
    pub membership_status: Option<MembershipStatus>,
    pub role: Option<String>,
}

#[derive(sqlx::FromRow)]
struct DiscipleshipViewRow {
    id: DiscipleshipGroupId,
    name: String,
    description: Option<String>,
    membership_status: Option<String>,
    role: Option<String>,
}

impl TryFrom<DiscipleshipViewRow> for DiscipleshipView {
    type Error = RepositoryError;

    fn try_from(row: DiscipleshipViewRow) -> Result<Self, Self::Error> {
        let membership_status = row
            .membership_status
            .map(|s| s.parse::<MembershipStatus>())
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid membership status in database: {e}"
                ))
            })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            membership_status,
            role: row.role,
        })
    }
}

/// Outcome of a join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum JoinOutcome {
    /// New pending request created (or a rejected one reset to pending).
    Requested,
    /// Member is already active in the group.
    AlreadyMember,
    /// A pending request already exists.
    AlreadyPending,
}

/// Member-facing group repository.
pub struct GroupRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GroupRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All groups with the member's own membership status, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, contact_id: ContactId) -> Result<Vec<GroupView>, RepositoryError> {
        let rows = sqlx::query_as::<_, GroupViewRow>(
            "SELECT g.id, g.name, g.description, g.meeting_day, m.status AS membership_status
             FROM groups g
             LEFT JOIN group_memberships m
                 ON m.group_id = g.id AND m.contact_id = $1
             ORDER BY g.name",
        )
        .bind(contact_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(GroupView::try_from).collect()
    }

    /// Request to join a group.
    ///
    /// Active and pending memberships are reported back unchanged; a
    /// rejected or inactive one is reset to pending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the group does not exist.
    pub async fn request_join(
        &self,
        group_id: GroupId,
        contact_id: ContactId,
    ) -> Result<JoinOutcome, RepositoryError> {
        let existing = sqlx::query_as::<_, (MembershipId, String)>(
            "SELECT id, status FROM group_memberships
             WHERE group_id = $1 AND contact_id = $2",
        )
        .bind(group_id)
        .bind(contact_id)
        .fetch_optional(self.pool)
        .await?;

        if let Some((membership_id, status)) = existing {
            let status = status.parse::<MembershipStatus>().map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid membership status in database: {e}"
                ))
            })?;
            return match status {
                MembershipStatus::Active => Ok(JoinOutcome::AlreadyMember),
                MembershipStatus::Pending => Ok(JoinOutcome::AlreadyPending),
                MembershipStatus::Rejected | MembershipStatus::Inactive => {
                    sqlx::query(
                        "UPDATE group_memberships
                         SET status = 'pending', requested_at = NOW(), rejection_reason = NULL
                         WHERE id = $1",
                    )
                    .bind(membership_id)
                    .execute(self.pool)
                    .await?;
                    Ok(JoinOutcome::Requested)
                }
            };
        }

        let result = sqlx::query(
            "INSERT INTO group_memberships (id, group_id, contact_id, status, requested_at)
             SELECT $1, g.id, $3, 'pending', NOW() FROM groups g WHERE g.id = $2
             ON CONFLICT (group_id, contact_id) DO NOTHING",
        )
        .bind(MembershipId::generate())
        .bind(group_id)
        .bind(contact_id)
        .execute(self.pool)
        .await?;

        // Zero rows here means the group itself is missing (the conflict
        // path was handled above).
        if result.rows_affected() == 0 {
            let exists = sqlx::query_as::<_, (bool,)>(
                "SELECT EXISTS (SELECT 1 FROM groups WHERE id = $1)",
            )
            .bind(group_id)
            .fetch_one(self.pool)
            .await?;
            if !exists.0 {
                return Err(RepositoryError::NotFound);
            }
        }

        Ok(JoinOutcome::Requested)
    }

    /// Discipleship groups with the member's status and role, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_discipleship(
        &self,
        contact_id: ContactId,
    ) -> Result<Vec<DiscipleshipView>, RepositoryError> {
        let rows = sqlx::query_as::<_, DiscipleshipViewRow>(
            "SELECT d.id, d.name, d.description, m.status AS membership_status, m.role
             FROM discipleship_groups d
             LEFT JOIN discipleship_memberships m
                 ON m.discipleship_group_id = d.id AND m.contact_id = $1
             ORDER BY d.name",
        )
        .bind(contact_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(DiscipleshipView::try_from).collect()
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
        let existing = sqlx::query_as::<_, (MembershipId, String)>(
            "SELECT id, status FROM discipleship_memberships
             WHERE discipleship_group_id = $1 AND contact_id = $2",
        )
        .bind(group_id)
        .bind(contact_id)
        .fetch_optional(self.pool)
        .await?;

        if let Some((membership_id, status)) = existing {
            let status = status.parse::<MembershipStatus>().map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid membership status in database: {e}"
                ))
            })?;
            return match status {
                MembershipStatus::Active => Ok(JoinOutcome::AlreadyMember),
                MembershipStatus::Pending => Ok(JoinOutcome::AlreadyPending),
                MembershipStatus::Rejected | MembershipStatus::Inactive => {
                    sqlx::query(
                        "UPDATE discipleship_memberships
                         SET status = 'pending', requested_at = NOW(), rejection_reason = NULL
                         WHERE id = $1",
                    )
                    .bind(membership_id)
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::JoinOutcome;

    #[test]
    fn join_outcome_serializes_with_tag() {
        let json = serde_json::to_value(JoinOutcome::AlreadyPending).unwrap();
        assert_eq!(json["outcome"], "already_pending");
    }
}
