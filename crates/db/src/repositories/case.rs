//! Case repository.

use std::sync::Arc;

use crate::entities::{
    Case,
    case::{self, CasePriority, CaseStatus},
};
use aashray_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

/// Optional narrowing of the case board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseFilter {
    /// Only cases in this status.
    pub status: Option<CaseStatus>,
    /// Only cases with this priority.
    pub priority: Option<CasePriority>,
}

/// Case repository for database operations.
#[derive(Clone)]
pub struct CaseRepository {
    db: Arc<DatabaseConnection>,
}

impl CaseRepository {
    /// Create a new case repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a case.
    pub async fn create(&self, model: case::ActiveModel) -> AppResult<case::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a case by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<case::Model>> {
        Case::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a case by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<case::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::CaseNotFound(id))
    }

    /// Update a case.
    pub async fn update(&self, model: case::ActiveModel) -> AppResult<case::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Query for the case board: newest first, narrowed by the filter.
    #[must_use]
    pub fn board_query(filter: CaseFilter) -> Select<Case> {
        let mut query = Case::find();

        if let Some(status) = filter.status {
            query = query.filter(case::Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(case::Column::Priority.eq(priority));
        }

        query
            .order_by_desc(case::Column::CreatedAt)
            .order_by_desc(case::Column::Id)
    }

    /// Cases matching the filter, newest first.
    pub async fn find_filtered(&self, filter: CaseFilter) -> AppResult<Vec<case::Model>> {
        Self::board_query(filter)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The `limit` most recent cases.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<case::Model>> {
        Self::board_query(CaseFilter::default())
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The `limit` most recent cases reported by a user.
    pub async fn find_recent_by_reporter(
        &self,
        user_id: i64,
        limit: u64,
    ) -> AppResult<Vec<case::Model>> {
        Self::board_query(CaseFilter::default())
            .filter(case::Column::ReportedBy.eq(user_id))
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of cases reported by a user.
    pub async fn count_by_reporter(&self, user_id: i64) -> AppResult<u64> {
        Case::find()
            .filter(case::Column::ReportedBy.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of cases.
    pub async fn count(&self) -> AppResult<u64> {
        Case::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of cases in a status.
    pub async fn count_by_status(&self, status: CaseStatus) -> AppResult<u64> {
        Case::find()
            .filter(case::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
