//! Applying transfers and reading back their records.
//!
//! Validation is pure ([`crate::transfer::plan`]); this module loads the
//! balances, runs the plan and persists record plus balance updates in one
//! database transaction. Fund request acceptance reuses the same inner path
//! so settlement and status flip commit together.

use sea_orm::{Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, LedgerError, Money, ResultLedger, Transaction, TransactionKind, TransactionStatus,
    TransferCmd,
    gate::{Action, GateContext, authorize, not_frozen},
    transactions,
    transfer::{self, AccountRef, TransferRoute},
};

use super::{Engine, with_tx};

impl Engine {
    /// Validates and applies a transfer, returning the stored record.
    pub async fn apply_transfer(
        &self,
        actor: &Actor,
        cmd: TransferCmd,
    ) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            self.apply_transfer_in(
                &db_tx,
                actor,
                cmd.route,
                cmd.amount,
                cmd.kind,
                cmd.description,
                None,
            )
            .await
        })
    }

    /// The transactional core of a transfer.
    ///
    /// Runs inside an already-open database transaction so callers can bundle
    /// it with other writes. Every account the route names must exist, even
    /// on pass-through routes that leave balances untouched.
    #[allow(clippy::too_many_arguments)]
    pub(super) async fn apply_transfer_in(
        &self,
        db: &DatabaseTransaction,
        actor: &Actor,
        route: TransferRoute,
        amount: Money,
        kind: TransactionKind,
        description: Option<String>,
        fund_request_id: Option<Uuid>,
    ) -> ResultLedger<Transaction> {
        authorize(&[not_frozen], &GateContext::new(actor, Action::Create))?;

        self.require_route_accounts(db, &route).await?;

        let source_balance = match route.debit_account() {
            Some(account) => Some(self.load_balance(db, account).await?),
            None => None,
        };
        let destination_balance = match route.credit_account() {
            Some(account) => Some(self.load_balance(db, account).await?),
            None => None,
        };

        let plan = transfer::plan(&route, amount, source_balance, destination_balance)?;

        let mut record = match fund_request_id {
            Some(request_id) => Transaction::for_fund_request(route, amount, actor.id, request_id)?,
            None => Transaction::new(kind, route, amount, description, actor.id)?,
        };
        record.status = TransactionStatus::Successful;
        transactions::ActiveModel::from(&record).insert(db).await?;

        if let Some((account, balance)) = plan.debit {
            self.write_balance(db, account, balance).await?;
        }
        if let Some((account, balance)) = plan.credit {
            self.write_balance(db, account, balance).await?;
        }

        tracing::info!(
            transaction_id = %record.id,
            direction = record.route.direction(),
            amount = %amount,
            "transfer applied"
        );
        Ok(record)
    }

    /// Confirms every account a route names exists, whether or not the route
    /// moves funds.
    async fn require_route_accounts(
        &self,
        db: &DatabaseTransaction,
        route: &TransferRoute,
    ) -> ResultLedger<()> {
        let cols = route.columns();
        for id in [cols.sub_source, cols.sub_destination].into_iter().flatten() {
            self.require_sub_account(db, id).await.map_err(|err| match err {
                LedgerError::NotFound(msg) => LedgerError::MissingAccount(msg),
                other => other,
            })?;
        }
        for id in [cols.family_source, cols.family_destination]
            .into_iter()
            .flatten()
        {
            self.require_family_account(db, id)
                .await
                .map_err(|err| match err {
                    LedgerError::NotFound(msg) => LedgerError::MissingAccount(msg),
                    other => other,
                })?;
        }
        Ok(())
    }

    /// Fetches a transaction record (creator or admin).
    pub async fn transaction(
        &self,
        actor: &Actor,
        transaction_id: Uuid,
    ) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("transaction not exists".to_string()))?;
            if !actor.is_admin && model.created_by != actor.id.to_string() {
                return Err(LedgerError::Forbidden(
                    "only the creator or an admin can view this transaction".to_string(),
                ));
            }
            Ok(Transaction::try_from(model)?)
        })
    }

    /// Lists recent transactions touching an account, newest first.
    pub async fn list_transactions_for_account(
        &self,
        actor: &Actor,
        account: AccountRef,
        limit: u64,
    ) -> ResultLedger<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            // Existence check doubles as the visibility check via the parent
            // group membership.
            match account {
                AccountRef::Sub(id) => {
                    let model = self.require_sub_account(&db_tx, id).await?;
                    let parent_id =
                        crate::util::parse_uuid(&model.family_account_id, "sub account parent")?;
                    let parent = self.require_family_account(&db_tx, parent_id).await?;
                    let group_id =
                        crate::util::parse_uuid(&parent.family_group_id, "family account group")?;
                    self.require_member_of_group(&db_tx, group_id, actor).await?;
                }
                AccountRef::Family(id) => {
                    let model = self.require_family_account(&db_tx, id).await?;
                    let group_id =
                        crate::util::parse_uuid(&model.family_group_id, "family account group")?;
                    self.require_member_of_group(&db_tx, group_id, actor).await?;
                }
            }

            let id = account.id().to_string();
            let condition = match account {
                AccountRef::Sub(_) => Condition::any()
                    .add(transactions::Column::SubSourceAccount.eq(id.clone()))
                    .add(transactions::Column::SubDestinationAccount.eq(id)),
                AccountRef::Family(_) => Condition::any()
                    .add(transactions::Column::FamilySourceAccount.eq(id.clone()))
                    .add(transactions::Column::FamilyDestinationAccount.eq(id)),
            };

            let rows = transactions::Entity::find()
                .filter(condition)
                .order_by_desc(transactions::Column::CreatedAt)
                .limit(limit)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Transaction::try_from).collect()
        })
    }
}
