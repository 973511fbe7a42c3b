//! Case entity: one reported hunger/vulnerability situation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Severity tag chosen by the reporting volunteer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum CasePriority {
    #[sea_orm(string_value = "HIGH")]
    High,
    #[sea_orm(string_value = "MEDIUM")]
    #[default]
    Medium,
    #[sea_orm(string_value = "LOW")]
    Low,
}

impl CasePriority {
    /// All priorities in display order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Parse a stored value; matching is exact and case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// CSS badge class for listings.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::High => "danger",
            Self::Medium => "warning",
            Self::Low => "info",
        }
    }
}

/// Lifecycle tag of a case. Team members may move it between any two values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum CaseStatus {
    #[sea_orm(string_value = "PENDING")]
    #[default]
    Pending,
    #[sea_orm(string_value = "VALIDATED")]
    Validated,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "RESOLVED")]
    Resolved,
    #[sea_orm(string_value = "FORWARDED")]
    Forwarded,
}

/// Team dashboard column a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    /// Not yet looked at.
    Pending,
    /// Validated or being worked on.
    InProgress,
    /// Resolved or handed over elsewhere.
    Resolved,
}

impl CaseStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Validated,
        Self::InProgress,
        Self::Resolved,
        Self::Forwarded,
    ];

    /// Stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Validated => "VALIDATED",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Forwarded => "FORWARDED",
        }
    }

    /// Parse a stored value; matching is exact and case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Validated => "Validated",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Forwarded => "Forwarded",
        }
    }

    /// CSS badge class for listings.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Pending => "secondary",
            Self::Validated => "primary",
            Self::InProgress => "warning",
            Self::Resolved => "success",
            Self::Forwarded => "info",
        }
    }

    /// Dashboard column for this status.
    #[must_use]
    pub const fn bucket(self) -> StatusBucket {
        match self {
            Self::Pending => StatusBucket::Pending,
            Self::Validated | Self::InProgress => StatusBucket::InProgress,
            Self::Resolved | Self::Forwarded => StatusBucket::Resolved,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "case")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Free-form label, e.g. "Food Shortage"
    pub case_type: String,

    /// Where the situation was seen
    pub place_spotted: String,

    #[sea_orm(column_type = "Text")]
    pub needs: String,

    pub priority: CasePriority,

    /// Storage key under `case_images/`
    #[sea_orm(nullable)]
    pub image: Option<String>,

    pub status: CaseStatus,

    /// Reporting user, cascade-deleted with them
    #[sea_orm(indexed)]
    pub reported_by: i64,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReportedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reporter,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reporter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
