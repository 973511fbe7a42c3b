//! User repository.

use std::sync::Arc;

use crate::entities::{User, group, user, user_group};
use crate::repositories::group::{find_or_insert_group, insert_membership};
use aashray_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
    sea_query::{Expr, Func},
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether any user holds this username, ignoring case.
    pub async fn username_taken(&self, username: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((User, user::Column::Username))))
                    .eq(username.to_lowercase()),
            )
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a user and their membership of the named group in one
    /// transaction. The group is created when missing.
    pub async fn create_in_group(
        &self,
        model: user::ActiveModel,
        group_name: &str,
    ) -> AppResult<user::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = async {
            let user = model.insert(&txn).await?;
            let (group, _) = find_or_insert_group(&txn, group_name).await?;
            insert_membership(&txn, user.id, group.id).await?;
            Ok::<_, sea_orm::DbErr>(user)
        }
        .await;

        match created {
            Ok(user) => {
                txn.commit()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(user)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "Failed to roll back user creation");
                }
                Err(AppError::Database(e.to_string()))
            }
        }
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a successful login (single UPDATE query, no fetch).
    pub async fn touch_last_login(&self, user_id: i64) -> AppResult<()> {
        User::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<u64> {
        User::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users belonging to the named group, ordered by username.
    pub async fn find_in_group(&self, group_name: &str) -> AppResult<Vec<user::Model>> {
        User::find()
            .join(JoinType::InnerJoin, user::Relation::Memberships.def())
            .join(JoinType::InnerJoin, user_group::Relation::Group.def())
            .filter(group::Column::Name.eq(group_name))
            .order_by_asc(user::Column::Username)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
