//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Login key. Stored normalized (digits only).
    #[sea_orm(unique)]
    pub phone: String,

    /// Argon2 password hash.
    pub password: String,

    pub name: String,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    #[sea_orm(nullable)]
    pub birthday: Option<Date>,

    /// "male" / "female", free-form from the client.
    #[sea_orm(nullable)]
    pub gender: Option<String>,

    /// School affiliation (campus ministry).
    #[sea_orm(nullable)]
    pub school: Option<String>,

    /// Academic year/grade.
    #[sea_orm(nullable)]
    pub grade: Option<String>,

    /// Organizational placement.
    #[sea_orm(nullable)]
    pub branch_id: Option<String>,

    #[sea_orm(nullable)]
    pub region_id: Option<String>,

    #[sea_orm(nullable)]
    pub group_id: Option<String>,

    /// Push messaging token from the device. NULL until the client
    /// registers one; cleared when the provider reports it dead.
    #[sea_orm(nullable)]
    pub push_token: Option<String>,

    /// Legacy single-role display string. Write-only mirror of the most
    /// senior resolved authority; never read back as a source of truth.
    #[sea_orm(nullable)]
    pub authority: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_authority::Entity")]
    UserAuthorities,

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,

    #[sea_orm(has_many = "super::team_member::Entity")]
    TeamMemberships,
}

impl Related<super::user_authority::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAuthorities.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
