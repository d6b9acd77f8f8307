//! Sub accounts, each member's personal slice under a family account.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubAccountKind {
    Savings,
    Investment,
}

impl SubAccountKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Investment => "investment",
        }
    }
}

impl TryFrom<&str> for SubAccountKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "savings" => Ok(Self::Savings),
            "investment" => Ok(Self::Investment),
            other => Err(LedgerError::Validation(format!(
                "invalid sub account type: {other}"
            ))),
        }
    }
}

/// A personal account attached to a family account.
///
/// Names are unique per family account, and a member holds at most one sub
/// account under a given family account (checked on creation).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAccount {
    pub id: Uuid,
    pub family_account_id: Uuid,
    pub owner_id: Uuid,
    pub created_by: Uuid,
    pub kind: SubAccountKind,
    pub name: String,
    pub is_active: bool,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubAccount {
    pub fn new(
        family_account_id: Uuid,
        owner_id: Uuid,
        created_by: Uuid,
        kind: SubAccountKind,
        name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            family_account_id,
            owner_id,
            created_by,
            kind,
            name,
            is_active: true,
            balance: Money::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sub_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub family_account_id: String,
    pub owner_id: String,
    pub created_by: String,
    pub kind: String,
    pub name: String,
    pub is_active: bool,
    pub balance: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::family_accounts::Entity",
        from = "Column::FamilyAccountId",
        to = "super::family_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FamilyAccounts,
    #[sea_orm(has_many = "super::fund_requests::Entity")]
    FundRequests,
}

impl Related<super::family_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FamilyAccounts.def()
    }
}

impl Related<super::fund_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SubAccount> for ActiveModel {
    fn from(account: &SubAccount) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            family_account_id: ActiveValue::Set(account.family_account_id.to_string()),
            owner_id: ActiveValue::Set(account.owner_id.to_string()),
            created_by: ActiveValue::Set(account.created_by.to_string()),
            kind: ActiveValue::Set(account.kind.as_str().to_string()),
            name: ActiveValue::Set(account.name.clone()),
            is_active: ActiveValue::Set(account.is_active),
            balance: ActiveValue::Set(account.balance.minor()),
            created_at: ActiveValue::Set(account.created_at),
            updated_at: ActiveValue::Set(account.updated_at),
        }
    }
}

impl TryFrom<Model> for SubAccount {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "sub account")?,
            family_account_id: parse_uuid(&model.family_account_id, "sub account parent")?,
            owner_id: parse_uuid(&model.owner_id, "sub account owner")?,
            created_by: parse_uuid(&model.created_by, "sub account creator")?,
            kind: SubAccountKind::try_from(model.kind.as_str())?,
            name: model.name,
            is_active: model.is_active,
            balance: Money::new(model.balance),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
