//! Family groups, the top-level unit every account hangs off.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, util::parse_uuid};

/// A household of members sharing family accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyGroup {
    /// Stable identifier, generated once and persisted so the group can be
    /// renamed without breaking references.
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// At most one default group per owner.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FamilyGroup {
    pub fn new(
        owner_id: Uuid,
        name: String,
        description: Option<String>,
        is_default: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            description,
            is_default,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "family_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::memberships::Entity")]
    Memberships,
}

impl Related<super::memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FamilyGroup> for ActiveModel {
    fn from(group: &FamilyGroup) -> Self {
        Self {
            id: ActiveValue::Set(group.id.to_string()),
            owner_id: ActiveValue::Set(group.owner_id.to_string()),
            name: ActiveValue::Set(group.name.clone()),
            description: ActiveValue::Set(group.description.clone()),
            is_default: ActiveValue::Set(group.is_default),
            created_at: ActiveValue::Set(group.created_at),
            updated_at: ActiveValue::Set(group.updated_at),
        }
    }
}

impl TryFrom<Model> for FamilyGroup {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "family group")?,
            owner_id: parse_uuid(&model.owner_id, "family group owner")?,
            name: model.name,
            description: model.description,
            is_default: model.is_default,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
