//! Family accounts, the shared pool each group draws from.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money, util::parse_uuid};

/// A shared account owned by a family group.
///
/// `family_group_id` is a plain UUID reference, not FK-enforced; the engine
/// resolves and checks it at each operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyAccount {
    pub id: Uuid,
    pub family_group_id: Uuid,
    pub name: String,
    /// Balance in minor units. Never goes negative through a transfer.
    pub balance: Money,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FamilyAccount {
    pub fn new(family_group_id: Uuid, name: String, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            family_group_id,
            name,
            balance: Money::ZERO,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "family_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub family_group_id: String,
    pub name: String,
    pub balance: i64,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sub_accounts::Entity")]
    SubAccounts,
    #[sea_orm(has_many = "super::fund_requests::Entity")]
    FundRequests,
}

impl Related<super::fund_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundRequests.def()
    }
}

impl Related<super::sub_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FamilyAccount> for ActiveModel {
    fn from(account: &FamilyAccount) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            family_group_id: ActiveValue::Set(account.family_group_id.to_string()),
            name: ActiveValue::Set(account.name.clone()),
            balance: ActiveValue::Set(account.balance.minor()),
            created_by: ActiveValue::Set(account.created_by.to_string()),
            created_at: ActiveValue::Set(account.created_at),
            updated_at: ActiveValue::Set(account.updated_at),
        }
    }
}

impl TryFrom<Model> for FamilyAccount {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "family account")?,
            family_group_id: parse_uuid(&model.family_group_id, "family account group")?,
            name: model.name,
            balance: Money::new(model.balance),
            created_by: parse_uuid(&model.created_by, "family account creator")?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
