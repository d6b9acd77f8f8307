//! Group memberships.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, util::parse_uuid};

/// A user's membership in a family group.
///
/// At most one membership per `(family_group_id, user_id)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub family_group_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(family_group_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_group_id,
            user_id,
            joined_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "memberships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub family_group_id: String,
    pub user_id: String,
    pub joined_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::family_groups::Entity",
        from = "Column::FamilyGroupId",
        to = "super::family_groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FamilyGroups,
}

impl Related<super::family_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FamilyGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Membership> for ActiveModel {
    fn from(membership: &Membership) -> Self {
        Self {
            id: ActiveValue::Set(membership.id.to_string()),
            family_group_id: ActiveValue::Set(membership.family_group_id.to_string()),
            user_id: ActiveValue::Set(membership.user_id.to_string()),
            joined_at: ActiveValue::Set(membership.joined_at),
        }
    }
}

impl TryFrom<Model> for Membership {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "membership")?,
            family_group_id: parse_uuid(&model.family_group_id, "membership group")?,
            user_id: parse_uuid(&model.user_id, "membership user")?,
            joined_at: model.joined_at,
        })
    }
}
