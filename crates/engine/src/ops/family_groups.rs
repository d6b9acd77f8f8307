use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, CreateFamilyGroupCmd, FamilyGroup, Membership, ResultLedger, family_groups,
    gate::{Action, GateContext, admin_only, authorize, not_frozen, owner_or_creator},
    memberships,
    util::{normalize_optional_text, normalize_required_name, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a family group owned by the acting admin.
    ///
    /// The owner gets a membership right away so group-scoped checks hold
    /// from the first operation. At most one group per owner can be marked
    /// default; a second one is a conflict.
    pub async fn create_family_group(
        &self,
        actor: &Actor,
        cmd: CreateFamilyGroupCmd,
    ) -> ResultLedger<FamilyGroup> {
        authorize(
            &[not_frozen, admin_only],
            &GateContext::new(actor, Action::Create),
        )?;
        let name = normalize_required_name(&cmd.name, "family group name")?;
        let description = normalize_optional_text(cmd.description.as_deref());

        with_tx!(self, |db_tx| {
            self.require_group_name_available(&db_tx, actor.id, &name)
                .await?;
            if cmd.is_default {
                self.require_no_default_group(&db_tx, actor.id).await?;
            }

            let group = FamilyGroup::new(actor.id, name, description, cmd.is_default);
            family_groups::ActiveModel::from(&group)
                .insert(&db_tx)
                .await?;

            let membership = Membership::new(group.id, actor.id);
            memberships::ActiveModel::from(&membership)
                .insert(&db_tx)
                .await?;

            tracing::info!(group_id = %group.id, owner_id = %actor.id, "family group created");
            Ok(group)
        })
    }

    /// Renames a group or updates its description (owner or admin).
    pub async fn update_family_group(
        &self,
        actor: &Actor,
        group_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> ResultLedger<FamilyGroup> {
        with_tx!(self, |db_tx| {
            let model = self.require_group(&db_tx, group_id).await?;
            let owner_id = parse_uuid(&model.owner_id, "family group owner")?;
            authorize(
                &[not_frozen, owner_or_creator],
                &GateContext::new(actor, Action::Update).owner_id(owner_id),
            )?;

            let mut active = family_groups::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                updated_at: ActiveValue::Set(chrono::Utc::now()),
                ..Default::default()
            };
            if let Some(name) = name {
                let name = normalize_required_name(name, "family group name")?;
                if name != model.name {
                    self.require_group_name_available(&db_tx, owner_id, &name)
                        .await?;
                }
                active.name = ActiveValue::Set(name);
            }
            if description.is_some() {
                active.description = ActiveValue::Set(normalize_optional_text(description));
            }

            let updated = active.update(&db_tx).await?;
            Ok(FamilyGroup::try_from(updated)?)
        })
    }

    /// Deletes a group and, through the cascade, its memberships (owner or
    /// admin). Accounts keep a plain group reference and are unaffected.
    pub async fn delete_family_group(&self, actor: &Actor, group_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_group(&db_tx, group_id).await?;
            let owner_id = parse_uuid(&model.owner_id, "family group owner")?;
            authorize(
                &[not_frozen, owner_or_creator],
                &GateContext::new(actor, Action::Delete).owner_id(owner_id),
            )?;

            family_groups::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            tracing::info!(group_id = %group_id, "family group deleted");
            Ok(())
        })
    }

    /// Fetches a group visible to the actor (member or admin).
    pub async fn family_group(&self, actor: &Actor, group_id: Uuid) -> ResultLedger<FamilyGroup> {
        with_tx!(self, |db_tx| {
            let model = self.require_group(&db_tx, group_id).await?;
            self.require_member_of_group(&db_tx, group_id, actor)
                .await?;
            Ok(FamilyGroup::try_from(model)?)
        })
    }

    /// Lists the memberships of a group (member or admin).
    pub async fn members_of(
        &self,
        actor: &Actor,
        group_id: Uuid,
    ) -> ResultLedger<Vec<Membership>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            self.require_member_of_group(&db_tx, group_id, actor)
                .await?;

            let rows = memberships::Entity::find()
                .filter(memberships::Column::FamilyGroupId.eq(group_id.to_string()))
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Membership::try_from).collect()
        })
    }
}
