//! Lookup and authorization helpers shared by the write operations.
//!
//! Every helper takes the open transaction so checks and mutations see the
//! same snapshot. Pure actor rules live in [`crate::gate`]; these are the
//! database-backed counterparts.

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, LedgerError, Money, ResultLedger, family_accounts, family_groups, memberships,
    sub_accounts, transfer::AccountRef,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultLedger<family_groups::Model> {
        family_groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("family group not exists".to_string()))
    }

    pub(super) async fn require_family_account(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultLedger<family_accounts::Model> {
        family_accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("family account not exists".to_string()))
    }

    pub(super) async fn require_sub_account(
        &self,
        db: &DatabaseTransaction,
        sub_account_id: Uuid,
    ) -> ResultLedger<sub_accounts::Model> {
        sub_accounts::Entity::find_by_id(sub_account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::NotFound("sub account not exists".to_string()))
    }

    pub(super) async fn membership_of(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultLedger<Option<memberships::Model>> {
        memberships::Entity::find()
            .filter(memberships::Column::FamilyGroupId.eq(group_id.to_string()))
            .filter(memberships::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Admins see every group; anyone else must hold a membership.
    pub(super) async fn require_member_of_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        actor: &Actor,
    ) -> ResultLedger<()> {
        if actor.is_admin {
            return Ok(());
        }
        if self.membership_of(db, group_id, actor.id).await?.is_none() {
            return Err(LedgerError::Forbidden(
                "user is not a member of this family group".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) async fn require_not_already_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultLedger<()> {
        if self.membership_of(db, group_id, user_id).await?.is_some() {
            return Err(LedgerError::Conflict(
                "user is already a member of this family group".to_string(),
            ));
        }
        Ok(())
    }

    /// Non-admin members may only act in their default family group.
    pub(super) fn require_default_group(
        &self,
        actor: &Actor,
        group_id: Uuid,
    ) -> ResultLedger<()> {
        if actor.is_admin || actor.default_group == Some(group_id) {
            return Ok(());
        }
        Err(LedgerError::Forbidden(
            "user can only act in their default family group".to_string(),
        ))
    }

    pub(super) async fn require_group_name_available(
        &self,
        db: &DatabaseTransaction,
        owner_id: Uuid,
        name: &str,
    ) -> ResultLedger<()> {
        let taken = family_groups::Entity::find()
            .filter(family_groups::Column::OwnerId.eq(owner_id.to_string()))
            .filter(family_groups::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(LedgerError::Conflict(format!(
                "family group '{name}' already exists"
            )));
        }
        Ok(())
    }

    pub(super) async fn require_account_name_available(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        name: &str,
    ) -> ResultLedger<()> {
        let taken = family_accounts::Entity::find()
            .filter(family_accounts::Column::FamilyGroupId.eq(group_id.to_string()))
            .filter(family_accounts::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(LedgerError::Conflict(format!(
                "family account '{name}' already exists in this group"
            )));
        }
        Ok(())
    }

    /// One default group per owner.
    pub(super) async fn require_no_default_group(
        &self,
        db: &DatabaseTransaction,
        owner_id: Uuid,
    ) -> ResultLedger<()> {
        let taken = family_groups::Entity::find()
            .filter(family_groups::Column::OwnerId.eq(owner_id.to_string()))
            .filter(family_groups::Column::IsDefault.eq(true))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(LedgerError::Conflict(
                "user already has a default family group".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) async fn require_sub_account_name_available(
        &self,
        db: &DatabaseTransaction,
        family_account_id: Uuid,
        name: &str,
    ) -> ResultLedger<()> {
        let taken = sub_accounts::Entity::find()
            .filter(sub_accounts::Column::FamilyAccountId.eq(family_account_id.to_string()))
            .filter(sub_accounts::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(LedgerError::Conflict(format!(
                "sub account '{name}' already exists in this family account"
            )));
        }
        Ok(())
    }

    /// One sub account per owner under each family account.
    pub(super) async fn require_no_sub_account_for_owner(
        &self,
        db: &DatabaseTransaction,
        family_account_id: Uuid,
        owner_id: Uuid,
    ) -> ResultLedger<()> {
        let taken = sub_accounts::Entity::find()
            .filter(sub_accounts::Column::FamilyAccountId.eq(family_account_id.to_string()))
            .filter(sub_accounts::Column::OwnerId.eq(owner_id.to_string()))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(LedgerError::Conflict(
                "user already holds a sub account under this family account".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads the balance behind an account reference, failing with
    /// `MissingAccount` when the referenced row does not exist.
    pub(super) async fn load_balance(
        &self,
        db: &DatabaseTransaction,
        account: AccountRef,
    ) -> ResultLedger<Money> {
        match account {
            AccountRef::Sub(id) => {
                let model = sub_accounts::Entity::find_by_id(id.to_string())
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        LedgerError::MissingAccount("sub account not exists".to_string())
                    })?;
                Ok(Money::new(model.balance))
            }
            AccountRef::Family(id) => {
                let model = family_accounts::Entity::find_by_id(id.to_string())
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        LedgerError::MissingAccount("family account not exists".to_string())
                    })?;
                Ok(Money::new(model.balance))
            }
        }
    }

    pub(super) async fn write_balance(
        &self,
        db: &DatabaseTransaction,
        account: AccountRef,
        balance: Money,
    ) -> ResultLedger<()> {
        let now = chrono::Utc::now();
        match account {
            AccountRef::Sub(id) => {
                let model = sub_accounts::ActiveModel {
                    id: ActiveValue::Set(id.to_string()),
                    balance: ActiveValue::Set(balance.minor()),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                model.update(db).await?;
            }
            AccountRef::Family(id) => {
                let model = family_accounts::ActiveModel {
                    id: ActiveValue::Set(id.to_string()),
                    balance: ActiveValue::Set(balance.minor()),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                model.update(db).await?;
            }
        }
        Ok(())
    }
}
