//! Named group of users. Role membership ("Team", "Volunteer") is modelled here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the group whose members triage cases.
pub const TEAM_GROUP: &str = "Team";

/// Name of the group every registered user joins.
pub const VOLUNTEER_GROUP: &str = "Volunteer";

/// Groups created at startup if missing.
pub const DEFAULT_GROUPS: [&str; 2] = [TEAM_GROUP, VOLUNTEER_GROUP];

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_group::Entity")]
    Members,
}

impl Related<super::user_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
