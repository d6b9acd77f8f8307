use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, CreateFamilyAccountCmd, FamilyAccount, LedgerError, ResultLedger, family_accounts,
    gate::{Action, GateContext, admin_only, authorize, has_default_group, not_frozen},
    util::{normalize_required_name, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a shared account inside a group (admin with a default
    /// group).
    ///
    /// The name is unique within the group.
    pub async fn create_family_account(
        &self,
        actor: &Actor,
        cmd: CreateFamilyAccountCmd,
    ) -> ResultLedger<FamilyAccount> {
        authorize(
            &[not_frozen, admin_only, has_default_group],
            &GateContext::new(actor, Action::Create),
        )?;
        let name = normalize_required_name(&cmd.name, "family account name")?;

        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, cmd.family_group_id).await?;
            self.require_account_name_available(&db_tx, cmd.family_group_id, &name)
                .await?;

            let account = FamilyAccount::new(cmd.family_group_id, name, actor.id);
            family_accounts::ActiveModel::from(&account)
                .insert(&db_tx)
                .await?;

            tracing::info!(
                account_id = %account.id,
                group_id = %cmd.family_group_id,
                "family account created"
            );
            Ok(account)
        })
    }

    /// Renames a family account (group owner or admin).
    pub async fn rename_family_account(
        &self,
        actor: &Actor,
        account_id: Uuid,
        name: &str,
    ) -> ResultLedger<FamilyAccount> {
        let name = normalize_required_name(name, "family account name")?;

        with_tx!(self, |db_tx| {
            let model = self.require_family_account(&db_tx, account_id).await?;
            let group_id = parse_uuid(&model.family_group_id, "family account group")?;
            let group = self.require_group(&db_tx, group_id).await?;
            authorize(
                &[not_frozen, crate::gate::owner_or_creator],
                &GateContext::new(actor, Action::Update)
                    .owner_id(parse_uuid(&group.owner_id, "family group owner")?)
                    .created_by(parse_uuid(&model.created_by, "family account creator")?),
            )?;

            if name != model.name {
                self.require_account_name_available(&db_tx, group_id, &name)
                    .await?;
            }

            let active = family_accounts::ActiveModel {
                id: ActiveValue::Set(model.id),
                name: ActiveValue::Set(name),
                updated_at: ActiveValue::Set(chrono::Utc::now()),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;
            Ok(FamilyAccount::try_from(updated)?)
        })
    }

    /// Deletes a family account (group owner or admin).
    ///
    /// Accounts still holding funds or sub accounts are not deletable; the
    /// funds must be moved out first.
    pub async fn delete_family_account(
        &self,
        actor: &Actor,
        account_id: Uuid,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_family_account(&db_tx, account_id).await?;
            let group_id = parse_uuid(&model.family_group_id, "family account group")?;
            let group = self.require_group(&db_tx, group_id).await?;
            authorize(
                &[not_frozen, crate::gate::owner_or_creator],
                &GateContext::new(actor, Action::Delete)
                    .owner_id(parse_uuid(&group.owner_id, "family group owner")?),
            )?;

            if model.balance != 0 {
                return Err(LedgerError::Conflict(
                    "cannot delete a family account with a non-zero balance".to_string(),
                ));
            }
            let has_sub_accounts = crate::sub_accounts::Entity::find()
                .filter(crate::sub_accounts::Column::FamilyAccountId.eq(model.id.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if has_sub_accounts {
                return Err(LedgerError::Conflict(
                    "cannot delete a family account that still has sub accounts".to_string(),
                ));
            }

            family_accounts::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            tracing::info!(account_id = %account_id, "family account deleted");
            Ok(())
        })
    }

    /// Fetches a family account visible to the actor (group member or admin).
    pub async fn family_account(
        &self,
        actor: &Actor,
        account_id: Uuid,
    ) -> ResultLedger<FamilyAccount> {
        with_tx!(self, |db_tx| {
            let model = self.require_family_account(&db_tx, account_id).await?;
            let group_id = parse_uuid(&model.family_group_id, "family account group")?;
            self.require_member_of_group(&db_tx, group_id, actor)
                .await?;
            Ok(FamilyAccount::try_from(model)?)
        })
    }
}
