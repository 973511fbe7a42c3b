//! Team management: admin overview and Team role changes.

use aashray_common::AppResult;
use aashray_db::{
    entities::{
        case::{self, CaseStatus},
        group::{DEFAULT_GROUPS, TEAM_GROUP, VOLUNTEER_GROUP},
        user,
    },
    repositories::{CaseRepository, GroupRepository, UserRepository},
};

const ADMIN_RECENT: u64 = 10;

/// Figures and listings for the admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminOverview {
    pub total_cases: u64,
    pub pending_cases: u64,
    /// RESOLVED only; FORWARDED cases are not counted.
    pub resolved_cases: u64,
    pub total_users: u64,
    pub team_members: Vec<user::Model>,
    pub volunteers: Vec<user::Model>,
    pub recent_cases: Vec<case::Model>,
}

/// Result of granting the Team role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointOutcome {
    Appointed(user::Model),
    AlreadyMember(user::Model),
}

/// Result of revoking the Team role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(user::Model),
    NotMember(user::Model),
}

/// Team service for business logic.
#[derive(Clone)]
pub struct TeamService {
    user_repo: UserRepository,
    group_repo: GroupRepository,
    case_repo: CaseRepository,
}

impl TeamService {
    /// Create a new team service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        group_repo: GroupRepository,
        case_repo: CaseRepository,
    ) -> Self {
        Self {
            user_repo,
            group_repo,
            case_repo,
        }
    }

    /// Gather the admin dashboard.
    pub async fn overview(&self) -> AppResult<AdminOverview> {
        Ok(AdminOverview {
            total_cases: self.case_repo.count().await?,
            pending_cases: self.case_repo.count_by_status(CaseStatus::Pending).await?,
            resolved_cases: self.case_repo.count_by_status(CaseStatus::Resolved).await?,
            total_users: self.user_repo.count().await?,
            team_members: self.user_repo.find_in_group(TEAM_GROUP).await?,
            volunteers: self.user_repo.find_in_group(VOLUNTEER_GROUP).await?,
            recent_cases: self.case_repo.find_recent(ADMIN_RECENT).await?,
        })
    }

    /// Add a user to the Team group. Appointing an existing member changes nothing.
    pub async fn appoint(&self, user_id: i64) -> AppResult<AppointOutcome> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let team = self.group_repo.get_or_create(TEAM_GROUP).await?;

        if !self.group_repo.add_member(user.id, team.id).await? {
            return Ok(AppointOutcome::AlreadyMember(user));
        }

        tracing::info!(user_id = user.id, username = %user.username, "Appointed Team member");
        Ok(AppointOutcome::Appointed(user))
    }

    /// Remove a user from the Team group if they are in it.
    pub async fn remove(&self, user_id: i64) -> AppResult<RemoveOutcome> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let Some(team) = self.group_repo.find_by_name(TEAM_GROUP).await? else {
            return Ok(RemoveOutcome::NotMember(user));
        };

        if self.group_repo.remove_member(user.id, team.id).await? == 0 {
            return Ok(RemoveOutcome::NotMember(user));
        }

        tracing::info!(user_id = user.id, username = %user.username, "Removed Team member");
        Ok(RemoveOutcome::Removed(user))
    }

    /// Make sure the default groups exist. Returns the names that were created.
    pub async fn ensure_default_groups(&self) -> AppResult<Vec<String>> {
        let mut created = Vec::new();
        for name in DEFAULT_GROUPS {
            if self.group_repo.find_by_name(name).await?.is_none() {
                self.group_repo.get_or_create(name).await?;
                created.push(name.to_string());
            }
        }
        Ok(created)
    }
}
