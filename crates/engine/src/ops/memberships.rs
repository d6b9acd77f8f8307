use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, LedgerError, Membership, ResultLedger,
    gate::{Action, GateContext, admin_only, authorize, has_default_group, not_frozen,
        owner_or_creator},
    memberships,
    util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    /// Adds a member to a family group (admin acting in their default
    /// group).
    ///
    /// A user holds at most one membership per group; a second add is a
    /// conflict.
    pub async fn add_member(
        &self,
        actor: &Actor,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultLedger<Membership> {
        authorize(
            &[not_frozen, admin_only, has_default_group],
            &GateContext::new(actor, Action::Create),
        )?;
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            self.require_not_already_member(&db_tx, group_id, user_id)
                .await?;

            let membership = Membership::new(group_id, user_id);
            memberships::ActiveModel::from(&membership)
                .insert(&db_tx)
                .await?;

            tracing::info!(
                group_id = %group_id,
                user_id = %user_id,
                "member added to family group"
            );
            Ok(membership)
        })
    }

    /// Removes a member from a family group (owner or admin).
    ///
    /// The group owner's own membership cannot be removed.
    pub async fn remove_member(
        &self,
        actor: &Actor,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;
            let owner_id = parse_uuid(&group.owner_id, "family group owner")?;
            authorize(
                &[not_frozen, owner_or_creator],
                &GateContext::new(actor, Action::Delete).owner_id(owner_id),
            )?;

            if user_id == owner_id {
                return Err(LedgerError::Conflict(
                    "cannot remove the group owner".to_string(),
                ));
            }

            let membership = self
                .membership_of(&db_tx, group_id, user_id)
                .await?
                .ok_or_else(|| {
                    LedgerError::NotFound("membership not exists".to_string())
                })?;
            memberships::Entity::delete_by_id(membership.id)
                .exec(&db_tx)
                .await?;

            tracing::info!(group_id = %group_id, user_id = %user_id, "member removed from family group");
            Ok(())
        })
    }
}
