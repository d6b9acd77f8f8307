//! Transaction records.
//!
//! A `Transaction` is the immutable record of one transfer attempt: its
//! kind, route, amount and final status. Failed attempts are not persisted;
//! a stored row is either `Successful`, or `Pending`/`Cancelled` for flows
//! settled outside the ledger.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    LedgerError, Money, ResultLedger,
    transfer::{RouteColumns, TransferRoute},
    util::parse_uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Savings,
    Withdrawal,
    Investment,
    AirtimeTopUp,
    BillPayment,
    Transfers,
    FundRequest,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Withdrawal => "withdrawal",
            Self::Investment => "investment",
            Self::AirtimeTopUp => "airtime_top_up",
            Self::BillPayment => "bill_payment",
            Self::Transfers => "transfers",
            Self::FundRequest => "fund_request",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "savings" => Ok(Self::Savings),
            "withdrawal" => Ok(Self::Withdrawal),
            "investment" => Ok(Self::Investment),
            "airtime_top_up" => Ok(Self::AirtimeTopUp),
            "bill_payment" => Ok(Self::BillPayment),
            "transfers" => Ok(Self::Transfers),
            "fund_request" => Ok(Self::FundRequest),
            other => Err(LedgerError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Failed,
    Successful,
    Cancelled,
}

impl TransactionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Successful => "successful",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            "successful" => Ok(Self::Successful),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(LedgerError::Validation(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub route: TransferRoute,
    pub amount: Money,
    pub description: Option<String>,
    pub created_by: Uuid,
    /// Set when the transaction settles a fund request.
    pub fund_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a record for a transfer about to be applied.
    ///
    /// Amount validity is rechecked here so a record can never be
    /// constructed for a non-positive amount, whichever path creates it.
    pub fn new(
        kind: TransactionKind,
        route: TransferRoute,
        amount: Money,
        description: Option<String>,
        created_by: Uuid,
    ) -> ResultLedger<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(
                "transaction amount must be > 0".to_string(),
            ));
        }
        if kind == TransactionKind::FundRequest {
            return Err(LedgerError::InvalidFundRequest(
                "fund_request transactions must reference a fund request".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            status: TransactionStatus::Pending,
            route,
            amount,
            description,
            created_by,
            fund_request_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Builds the settlement record for an accepted fund request.
    pub fn for_fund_request(
        route: TransferRoute,
        amount: Money,
        created_by: Uuid,
        fund_request_id: Uuid,
    ) -> ResultLedger<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(
                "transaction amount must be > 0".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            kind: TransactionKind::FundRequest,
            status: TransactionStatus::Pending,
            route,
            amount,
            description: None,
            created_by,
            fund_request_id: Some(fund_request_id),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub status: String,
    pub direction: String,
    pub sub_source_account: Option<String>,
    pub sub_destination_account: Option<String>,
    pub family_source_account: Option<String>,
    pub family_destination_account: Option<String>,
    pub amount: i64,
    pub description: Option<String>,
    pub created_by: String,
    pub fund_request_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        let cols = tx.route.columns();
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            direction: ActiveValue::Set(tx.route.direction().to_string()),
            sub_source_account: ActiveValue::Set(cols.sub_source.map(|id| id.to_string())),
            sub_destination_account: ActiveValue::Set(
                cols.sub_destination.map(|id| id.to_string()),
            ),
            family_source_account: ActiveValue::Set(
                cols.family_source.map(|id| id.to_string()),
            ),
            family_destination_account: ActiveValue::Set(
                cols.family_destination.map(|id| id.to_string()),
            ),
            amount: ActiveValue::Set(tx.amount.minor()),
            description: ActiveValue::Set(tx.description.clone()),
            created_by: ActiveValue::Set(tx.created_by.to_string()),
            fund_request_id: ActiveValue::Set(tx.fund_request_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let parse_col = |value: &Option<String>, what: &str| -> ResultLedger<Option<Uuid>> {
            value.as_deref().map(|id| parse_uuid(id, what)).transpose()
        };
        let columns = RouteColumns {
            sub_source: parse_col(&model.sub_source_account, "transaction sub source")?,
            sub_destination: parse_col(
                &model.sub_destination_account,
                "transaction sub destination",
            )?,
            family_source: parse_col(&model.family_source_account, "transaction family source")?,
            family_destination: parse_col(
                &model.family_destination_account,
                "transaction family destination",
            )?,
        };
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            route: TransferRoute::try_new(&model.direction, columns)?,
            amount: Money::new(model.amount),
            description: model.description,
            created_by: parse_uuid(&model.created_by, "transaction creator")?,
            fund_request_id: parse_col(&model.fund_request_id, "transaction fund request")?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_non_positive_amount() {
        let route = TransferRoute::BankToFamily {
            destination: Uuid::new_v4(),
        };
        let err = Transaction::new(
            TransactionKind::Savings,
            route,
            Money::ZERO,
            None,
            Uuid::new_v4(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn fund_request_kind_requires_link() {
        let route = TransferRoute::FamilyToSub {
            source: Uuid::new_v4(),
            destination: Uuid::new_v4(),
        };
        let err = Transaction::new(
            TransactionKind::FundRequest,
            route,
            Money::new(100),
            None,
            Uuid::new_v4(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFundRequest(_)));

        let tx = Transaction::for_fund_request(
            route,
            Money::new(100),
            Uuid::new_v4(),
            Uuid::new_v4(),
        )
        .unwrap();
        assert_eq!(tx.kind, TransactionKind::FundRequest);
        assert!(tx.fund_request_id.is_some());
    }
}
