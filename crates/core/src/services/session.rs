//! Session service: issuing, resolving and ending login sessions.

use aashray_common::{AppResult, IdGenerator};
use aashray_db::{
    entities::{session, user},
    repositories::{GroupRepository, SessionRepository, UserRepository},
};
use chrono::{Duration, Utc};
use sea_orm::Set;

use super::role::Identity;

/// Session service for business logic.
#[derive(Clone)]
pub struct SessionService {
    session_repo: SessionRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    id_gen: IdGenerator,
    ttl: Duration,
}

impl SessionService {
    /// Create a new session service whose sessions live for `ttl_hours`.
    #[must_use]
    pub fn new(
        session_repo: SessionRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        ttl_hours: i64,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
            group_repo,
            id_gen: IdGenerator::new(),
            ttl: Duration::hours(ttl_hours.max(1)),
        }
    }

    /// Open a session for a user and return it.
    pub async fn start(&self, user_id: i64) -> AppResult<session::Model> {
        let now = Utc::now();
        let model = session::ActiveModel {
            token: Set(self.id_gen.generate_token()),
            user_id: Set(user_id),
            created_at: Set(now.into()),
            expires_at: Set((now + self.ttl).into()),
        };

        let session = self.session_repo.create(model).await?;
        tracing::debug!(user_id, "Session started");
        Ok(session)
    }

    /// Resolve a session token into an identity.
    ///
    /// Expired sessions, deleted users and inactive users resolve to `None`.
    pub async fn resolve(&self, token: &str) -> AppResult<Option<Identity>> {
        let Some(session) = self.session_repo.find_active(token, Utc::now()).await? else {
            return Ok(None);
        };

        let Some(user) = self.user_repo.find_by_id(session.user_id).await? else {
            return Ok(None);
        };
        if !user.is_active {
            return Ok(None);
        }

        self.identity_for(user).await.map(Some)
    }

    /// Attach group names to a user.
    pub async fn identity_for(&self, user: user::Model) -> AppResult<Identity> {
        let groups = self.group_repo.names_for_user(user.id).await?;
        Ok(Identity::new(user, groups))
    }

    /// End a session.
    pub async fn end(&self, token: &str) -> AppResult<()> {
        self.session_repo.delete(token).await
    }

    /// Remove sessions that are past their expiry.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let purged = self.session_repo.delete_expired(Utc::now()).await?;
        if purged > 0 {
            tracing::info!(purged, "Purged expired sessions");
        }
        Ok(purged)
    }
}
