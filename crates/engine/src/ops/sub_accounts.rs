use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, CreateSubAccountCmd, LedgerError, ResultLedger, SubAccount,
    gate::{Action, GateContext, authorize, not_frozen, owner_or_creator},
    sub_accounts,
    util::{normalize_required_name, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Opens a sub account under a family account.
    ///
    /// The owner defaults to the acting user; only admins may open accounts
    /// on someone else's behalf. The owner must be a member of the parent
    /// group, must be acting in their default group, and must not already
    /// hold a sub account under this family account. The name is unique
    /// within the family account.
    pub async fn create_sub_account(
        &self,
        actor: &Actor,
        cmd: CreateSubAccountCmd,
    ) -> ResultLedger<SubAccount> {
        authorize(&[not_frozen], &GateContext::new(actor, Action::Create))?;
        let name = normalize_required_name(&cmd.name, "sub account name")?;

        let owner_id = cmd.owner_id.unwrap_or(actor.id);
        if owner_id != actor.id && !actor.is_admin {
            return Err(LedgerError::Forbidden(
                "only admins can open sub accounts for other users".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let parent = self
                .require_family_account(&db_tx, cmd.family_account_id)
                .await?;
            let group_id = parse_uuid(&parent.family_group_id, "family account group")?;
            self.require_member_of_group(&db_tx, group_id, actor)
                .await?;
            self.require_default_group(actor, group_id)?;
            if self.membership_of(&db_tx, group_id, owner_id).await?.is_none() {
                return Err(LedgerError::Forbidden(
                    "owner is not a member of this family group".to_string(),
                ));
            }
            self.require_no_sub_account_for_owner(&db_tx, cmd.family_account_id, owner_id)
                .await?;
            self.require_sub_account_name_available(&db_tx, cmd.family_account_id, &name)
                .await?;

            let account =
                SubAccount::new(cmd.family_account_id, owner_id, actor.id, cmd.kind, name);
            sub_accounts::ActiveModel::from(&account)
                .insert(&db_tx)
                .await?;

            tracing::info!(
                sub_account_id = %account.id,
                family_account_id = %cmd.family_account_id,
                owner_id = %owner_id,
                kind = account.kind.as_str(),
                "sub account created"
            );
            Ok(account)
        })
    }

    /// Updates a sub account's name or active flag (owner, creator or
    /// admin). Fields left as `None` are unchanged.
    pub async fn update_sub_account(
        &self,
        actor: &Actor,
        sub_account_id: Uuid,
        name: Option<&str>,
        is_active: Option<bool>,
    ) -> ResultLedger<SubAccount> {
        with_tx!(self, |db_tx| {
            let model = self.require_sub_account(&db_tx, sub_account_id).await?;
            authorize(
                &[not_frozen, owner_or_creator],
                &GateContext::new(actor, Action::Update)
                    .owner_id(parse_uuid(&model.owner_id, "sub account owner")?)
                    .created_by(parse_uuid(&model.created_by, "sub account creator")?),
            )?;

            let mut active = sub_accounts::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                updated_at: ActiveValue::Set(chrono::Utc::now()),
                ..Default::default()
            };
            if let Some(name) = name {
                let name = normalize_required_name(name, "sub account name")?;
                if name != model.name {
                    let parent_id =
                        parse_uuid(&model.family_account_id, "sub account parent")?;
                    self.require_sub_account_name_available(&db_tx, parent_id, &name)
                        .await?;
                }
                active.name = ActiveValue::Set(name);
            }
            if let Some(is_active) = is_active {
                active.is_active = ActiveValue::Set(is_active);
            }

            let updated = active.update(&db_tx).await?;
            Ok(SubAccount::try_from(updated)?)
        })
    }

    /// Deletes a sub account (owner, creator or admin). The balance must be
    /// zero.
    pub async fn delete_sub_account(
        &self,
        actor: &Actor,
        sub_account_id: Uuid,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_sub_account(&db_tx, sub_account_id).await?;
            authorize(
                &[not_frozen, owner_or_creator],
                &GateContext::new(actor, Action::Delete)
                    .owner_id(parse_uuid(&model.owner_id, "sub account owner")?)
                    .created_by(parse_uuid(&model.created_by, "sub account creator")?),
            )?;

            if model.balance != 0 {
                return Err(LedgerError::Conflict(
                    "cannot delete a sub account with a non-zero balance".to_string(),
                ));
            }

            sub_accounts::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            tracing::info!(sub_account_id = %sub_account_id, "sub account deleted");
            Ok(())
        })
    }

    /// Fetches a sub account visible to the actor (group member or admin).
    pub async fn sub_account(
        &self,
        actor: &Actor,
        sub_account_id: Uuid,
    ) -> ResultLedger<SubAccount> {
        with_tx!(self, |db_tx| {
            let model = self.require_sub_account(&db_tx, sub_account_id).await?;
            let parent_id = parse_uuid(&model.family_account_id, "sub account parent")?;
            let parent = self.require_family_account(&db_tx, parent_id).await?;
            let group_id = parse_uuid(&parent.family_group_id, "family account group")?;
            self.require_member_of_group(&db_tx, group_id, actor)
                .await?;
            Ok(SubAccount::try_from(model)?)
        })
    }
}
