//! Fund requests and their lifecycle states.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money, util::parse_uuid};

/// Lifecycle of a fund request.
///
/// `Pending` is the only state that can transition; the other three are
/// terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundRequestStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl FundRequestStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl TryFrom<&str> for FundRequestStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(LedgerError::Validation(format!(
                "invalid fund request status: {other}"
            ))),
        }
    }
}

/// A member asking for money into their sub account.
///
/// The request hangs off the sub account to be credited. On acceptance the
/// requested amount moves from the named family account into that sub
/// account, in the same database transaction as the status flip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRequest {
    pub id: Uuid,
    /// Family account the funds should come out of. May be left open at
    /// creation and settled at acceptance.
    pub family_account_id: Option<Uuid>,
    /// Sub account the funds land in.
    pub source_account_id: Uuid,
    pub requested_by: Uuid,
    pub amount: Money,
    pub reason: Option<String>,
    pub status: FundRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FundRequest {
    pub fn new(
        family_account_id: Option<Uuid>,
        source_account_id: Uuid,
        requested_by: Uuid,
        amount: Money,
        reason: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            family_account_id,
            source_account_id,
            requested_by,
            amount,
            reason,
            status: FundRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fund_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub family_account_id: Option<String>,
    pub source_account_id: String,
    pub requested_by: String,
    pub amount: i64,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sub_accounts::Entity",
        from = "Column::SourceAccountId",
        to = "super::sub_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SubAccounts,
    #[sea_orm(
        belongs_to = "super::family_accounts::Entity",
        from = "Column::FamilyAccountId",
        to = "super::family_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FamilyAccounts,
}

impl Related<super::sub_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubAccounts.def()
    }
}

impl Related<super::family_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FamilyAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FundRequest> for ActiveModel {
    fn from(request: &FundRequest) -> Self {
        Self {
            id: ActiveValue::Set(request.id.to_string()),
            family_account_id: ActiveValue::Set(
                request.family_account_id.map(|id| id.to_string()),
            ),
            source_account_id: ActiveValue::Set(request.source_account_id.to_string()),
            requested_by: ActiveValue::Set(request.requested_by.to_string()),
            amount: ActiveValue::Set(request.amount.minor()),
            reason: ActiveValue::Set(request.reason.clone()),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            created_at: ActiveValue::Set(request.created_at),
            updated_at: ActiveValue::Set(request.updated_at),
        }
    }
}

impl TryFrom<Model> for FundRequest {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "fund request")?,
            family_account_id: model
                .family_account_id
                .as_deref()
                .map(|id| parse_uuid(id, "fund request account"))
                .transpose()?,
            source_account_id: parse_uuid(&model.source_account_id, "fund request sub account")?,
            requested_by: parse_uuid(&model.requested_by, "fund request requester")?,
            amount: Money::new(model.amount),
            reason: model.reason,
            status: FundRequestStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
