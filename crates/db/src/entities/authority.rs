//! Authority (role) entity.
//!
//! Static reference data. `level` ranks seniority ascending: level 0 is
//! the most senior role. Queried by the resolution service, never mutated
//! at runtime.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authority")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub category_id: String,

    /// Stable symbolic name, e.g. `LEADER`.
    #[sea_orm(unique)]
    pub name: String,

    /// Human-readable name shown in the app, e.g. `리더`.
    pub display_name: String,

    /// Seniority rank. Lower = more privileged.
    pub level: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::authority_category::Entity",
        from = "Column::CategoryId",
        to = "super::authority_category::Column::Id"
    )]
    Category,

    #[sea_orm(has_many = "super::user_authority::Entity")]
    Assignments,
}

impl Related<super::authority_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::user_authority::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
