//! Fund request lifecycle.
//!
//! Only pending requests transition. Acceptance settles the request with a
//! family-to-sub transfer in the same database transaction, so a request can
//! never be marked accepted without the funds moving.

use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, CreateFundRequestCmd, FundRequest, FundRequestStatus, LedgerError, ResultLedger,
    Transaction, TransactionKind, fund_requests,
    gate::{Action, GateContext, authorize, has_default_group, not_frozen, owner_or_creator},
    transfer::TransferRoute,
    util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    /// Files a fund request against one's own sub account.
    ///
    /// The actor must hold the receiving sub account and be acting in their
    /// default group. When a family account is named it has to belong to the
    /// same group; otherwise the accepting side picks one.
    pub async fn create_fund_request(
        &self,
        actor: &Actor,
        cmd: CreateFundRequestCmd,
    ) -> ResultLedger<FundRequest> {
        authorize(
            &[not_frozen, has_default_group],
            &GateContext::new(actor, Action::Create),
        )?;
        if !cmd.amount.is_positive() {
            return Err(LedgerError::Validation(
                "requested amount must be positive".to_string(),
            ));
        }
        if !cmd.amount.in_range() {
            return Err(LedgerError::Validation(
                "requested amount exceeds 10 digits".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let sub_account = self
                .require_sub_account(&db_tx, cmd.source_account_id)
                .await?;
            if sub_account.owner_id != actor.id.to_string() {
                return Err(LedgerError::Forbidden(
                    "fund requests can only target the requester's own sub account".to_string(),
                ));
            }
            let parent_id = parse_uuid(&sub_account.family_account_id, "sub account parent")?;
            let parent = self.require_family_account(&db_tx, parent_id).await?;
            let group_id = parse_uuid(&parent.family_group_id, "family account group")?;
            self.require_member_of_group(&db_tx, group_id, actor)
                .await?;
            self.require_default_group(actor, group_id)?;

            if let Some(family_account_id) = cmd.family_account_id {
                let account = self
                    .require_family_account(&db_tx, family_account_id)
                    .await?;
                if account.family_group_id != parent.family_group_id {
                    return Err(LedgerError::Validation(
                        "family account does not belong to this family group".to_string(),
                    ));
                }
            }

            let request = FundRequest::new(
                cmd.family_account_id,
                cmd.source_account_id,
                actor.id,
                cmd.amount,
                cmd.reason,
            );
            fund_requests::ActiveModel::from(&request)
                .insert(&db_tx)
                .await?;

            tracing::info!(
                request_id = %request.id,
                sub_account_id = %cmd.source_account_id,
                amount = %cmd.amount,
                "fund request created"
            );
            Ok(request)
        })
    }

    /// Accepts a pending fund request and settles it (admin, or creator of
    /// the funding family account).
    ///
    /// `family_account_id` overrides the account stored on the request; one
    /// of the two must be present. Returns the updated request and the
    /// settlement transaction.
    pub async fn accept_fund_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
        family_account_id: Option<Uuid>,
    ) -> ResultLedger<(FundRequest, Transaction)> {
        with_tx!(self, |db_tx| {
            let model = self.require_pending_request(&db_tx, request_id).await?;

            let source = match family_account_id {
                Some(id) => id,
                None => model
                    .family_account_id
                    .as_deref()
                    .map(|id| parse_uuid(id, "fund request account"))
                    .transpose()?
                    .ok_or_else(|| {
                        LedgerError::Validation(
                            "no family account named to fund this request".to_string(),
                        )
                    })?,
            };
            let source_model = self.require_family_account(&db_tx, source).await?;
            authorize(
                &[not_frozen, owner_or_creator],
                &GateContext::new(actor, Action::Update)
                    .created_by(parse_uuid(&source_model.created_by, "family account creator")?),
            )?;

            let destination = parse_uuid(&model.source_account_id, "fund request sub account")?;
            let sub_model = self.require_sub_account(&db_tx, destination).await?;
            let sub_parent_id = parse_uuid(&sub_model.family_account_id, "sub account parent")?;
            let sub_parent = self.require_family_account(&db_tx, sub_parent_id).await?;
            if sub_parent.family_group_id != source_model.family_group_id {
                return Err(LedgerError::Validation(
                    "family account does not belong to this family group".to_string(),
                ));
            }

            let route = TransferRoute::FamilyToSub {
                source,
                destination,
            };
            let record = self
                .apply_transfer_in(
                    &db_tx,
                    actor,
                    route,
                    crate::Money::new(model.amount),
                    TransactionKind::FundRequest,
                    None,
                    Some(request_id),
                )
                .await?;

            let active = fund_requests::ActiveModel {
                id: ActiveValue::Set(model.id),
                family_account_id: ActiveValue::Set(Some(source.to_string())),
                status: ActiveValue::Set(FundRequestStatus::Accepted.as_str().to_string()),
                updated_at: ActiveValue::Set(chrono::Utc::now()),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;

            tracing::info!(request_id = %request_id, transaction_id = %record.id, "fund request accepted");
            Ok((FundRequest::try_from(updated)?, record))
        })
    }

    /// Rejects a pending fund request (admin, or creator of the account it
    /// would draw from; the parent group's owner when none is stored).
    pub async fn reject_fund_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> ResultLedger<FundRequest> {
        with_tx!(self, |db_tx| {
            let model = self.require_pending_request(&db_tx, request_id).await?;

            let mut ctx = GateContext::new(actor, Action::Update);
            match model.family_account_id.as_deref() {
                Some(id) => {
                    let account = self
                        .require_family_account(&db_tx, parse_uuid(id, "fund request account")?)
                        .await?;
                    ctx = ctx
                        .created_by(parse_uuid(&account.created_by, "family account creator")?);
                }
                None => {
                    let group = self.group_of_request(&db_tx, &model).await?;
                    ctx = ctx.owner_id(parse_uuid(&group.owner_id, "family group owner")?);
                }
            }
            authorize(&[not_frozen, owner_or_creator], &ctx)?;

            let updated = self
                .set_request_status(&db_tx, model.id, FundRequestStatus::Rejected)
                .await?;
            tracing::info!(request_id = %request_id, "fund request rejected");
            Ok(updated)
        })
    }

    /// Cancels a pending fund request. Only the requester may cancel;
    /// admins get no bypass here.
    pub async fn cancel_fund_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> ResultLedger<FundRequest> {
        authorize(&[not_frozen], &GateContext::new(actor, Action::Update))?;
        with_tx!(self, |db_tx| {
            let model = self.require_pending_request(&db_tx, request_id).await?;
            if model.requested_by != actor.id.to_string() {
                return Err(LedgerError::Forbidden(
                    "only the requester can cancel a fund request".to_string(),
                ));
            }

            let updated = self
                .set_request_status(&db_tx, model.id, FundRequestStatus::Cancelled)
                .await?;
            tracing::info!(request_id = %request_id, "fund request cancelled");
            Ok(updated)
        })
    }

    /// Fetches a fund request (requester or admin).
    pub async fn fund_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> ResultLedger<FundRequest> {
        with_tx!(self, |db_tx| {
            let model = self.find_request(&db_tx, request_id).await?;
            if !actor.is_admin && model.requested_by != actor.id.to_string() {
                return Err(LedgerError::Forbidden(
                    "fund requests are only visible to their requester".to_string(),
                ));
            }
            Ok(FundRequest::try_from(model)?)
        })
    }

    async fn find_request(
        &self,
        db: &sea_orm::DatabaseTransaction,
        request_id: Uuid,
    ) -> ResultLedger<fund_requests::Model> {
        fund_requests::Entity::find_by_id(request_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("fund request not exists".to_string()))
    }

    /// Loads a request, rejecting terminal states with a conflict that names
    /// the current status.
    async fn require_pending_request(
        &self,
        db: &sea_orm::DatabaseTransaction,
        request_id: Uuid,
    ) -> ResultLedger<fund_requests::Model> {
        let model = self.find_request(db, request_id).await?;
        let status = FundRequestStatus::try_from(model.status.as_str())?;
        if status.is_terminal() {
            return Err(LedgerError::Conflict(format!(
                "fund request is already {}",
                status.as_str()
            )));
        }
        Ok(model)
    }

    /// Resolves the group a request lives in via its receiving sub account.
    async fn group_of_request(
        &self,
        db: &sea_orm::DatabaseTransaction,
        model: &fund_requests::Model,
    ) -> ResultLedger<crate::family_groups::Model> {
        let sub_id = parse_uuid(&model.source_account_id, "fund request sub account")?;
        let sub = self.require_sub_account(db, sub_id).await?;
        let parent_id = parse_uuid(&sub.family_account_id, "sub account parent")?;
        let parent = self.require_family_account(db, parent_id).await?;
        let group_id = parse_uuid(&parent.family_group_id, "family account group")?;
        self.require_group(db, group_id).await
    }

    async fn set_request_status(
        &self,
        db: &sea_orm::DatabaseTransaction,
        id: String,
        status: FundRequestStatus,
    ) -> ResultLedger<FundRequest> {
        let active = fund_requests::ActiveModel {
            id: ActiveValue::Set(id),
            status: ActiveValue::Set(status.as_str().to_string()),
            updated_at: ActiveValue::Set(chrono::Utc::now()),
            ..Default::default()
        };
        let updated = active.update(db).await?;
        Ok(FundRequest::try_from(updated)?)
    }
}
