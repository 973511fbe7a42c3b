//! Group and membership repository.

use std::sync::Arc;

use crate::entities::{Group, UserGroup, group, user_group};
use aashray_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, sea_query::OnConflict,
};

/// Look up a group by name on any connection, inserting it when missing.
pub(crate) async fn find_or_insert_group<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<(group::Model, bool), DbErr> {
    if let Some(existing) = Group::find()
        .filter(group::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok((existing, false));
    }

    let model = group::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    };
    Ok((model.insert(db).await?, true))
}

/// Insert a membership unless it already exists. Returns whether a row was added.
pub(crate) async fn insert_membership<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    group_id: i64,
) -> Result<bool, DbErr> {
    let model = user_group::ActiveModel {
        user_id: Set(user_id),
        group_id: Set(group_id),
        ..Default::default()
    };

    let inserted = UserGroup::insert(model)
        .on_conflict(
            OnConflict::columns([user_group::Column::UserId, user_group::Column::GroupId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(inserted > 0)
}

/// Group repository for database operations.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a group by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<group::Model>> {
        Group::find()
            .filter(group::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch the named group, creating it when missing.
    pub async fn get_or_create(&self, name: &str) -> AppResult<group::Model> {
        let (group, created) = find_or_insert_group(self.db.as_ref(), name)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if created {
            tracing::info!(group = %group.name, "Created group");
        }
        Ok(group)
    }

    /// Names of every group the user belongs to, sorted.
    pub async fn names_for_user(&self, user_id: i64) -> AppResult<Vec<String>> {
        let groups = Group::find()
            .join(JoinType::InnerJoin, group::Relation::Members.def())
            .filter(user_group::Column::UserId.eq(user_id))
            .order_by_asc(group::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(groups.into_iter().map(|g| g.name).collect())
    }

    /// Add the user to the group in a single statement.
    ///
    /// Returns `false` when the membership already existed, including when a
    /// concurrent request added it first.
    pub async fn add_member(&self, user_id: i64, group_id: i64) -> AppResult<bool> {
        insert_membership(self.db.as_ref(), user_id, group_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove the user from the group. Returns the number of memberships dropped.
    pub async fn remove_member(&self, user_id: i64, group_id: i64) -> AppResult<u64> {
        let result = UserGroup::delete_many()
            .filter(user_group::Column::UserId.eq(user_id))
            .filter(user_group::Column::GroupId.eq(group_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
