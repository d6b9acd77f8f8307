//! Pure authorization predicates.
//!
//! Each operation composes an ordered slice of [`Rule`]s over a
//! [`GateContext`]; [`authorize`] evaluates them in sequence and the first
//! failing predicate determines the reported reason. The predicates here are
//! pure (no I/O); membership lookups that need the database live on the
//! engine in `ops/access.rs`.

use uuid::Uuid;

use crate::{Actor, LedgerError, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    #[must_use]
    pub fn is_mutation(self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Inputs for a single authorization decision.
///
/// `owner_id`/`created_by`/`requested_by` mirror whichever ownership
/// attributes the target entity exposes; absent attributes stay `None`.
#[derive(Clone, Copy, Debug)]
pub struct GateContext<'a> {
    pub actor: &'a Actor,
    pub action: Action,
    pub owner_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub requested_by: Option<Uuid>,
}

impl<'a> GateContext<'a> {
    #[must_use]
    pub fn new(actor: &'a Actor, action: Action) -> Self {
        Self {
            actor,
            action,
            owner_id: None,
            created_by: None,
            requested_by: None,
        }
    }

    #[must_use]
    pub fn owner_id(mut self, id: Uuid) -> Self {
        self.owner_id = Some(id);
        self
    }

    #[must_use]
    pub fn created_by(mut self, id: Uuid) -> Self {
        self.created_by = Some(id);
        self
    }

    #[must_use]
    pub fn requested_by(mut self, id: Uuid) -> Self {
        self.requested_by = Some(id);
        self
    }
}

pub type Rule = fn(&GateContext<'_>) -> ResultLedger<()>;

/// Evaluates `rules` in order; the first failure wins.
pub fn authorize(rules: &[Rule], ctx: &GateContext<'_>) -> ResultLedger<()> {
    for rule in rules {
        rule(ctx)?;
    }
    Ok(())
}

/// A frozen user is rejected from every mutating operation.
pub fn not_frozen(ctx: &GateContext<'_>) -> ResultLedger<()> {
    if ctx.action.is_mutation() && ctx.actor.is_frozen {
        return Err(LedgerError::Forbidden(
            "user is frozen, operation not allowed".to_string(),
        ));
    }
    Ok(())
}

/// Only family admins may perform the gated operation.
pub fn admin_only(ctx: &GateContext<'_>) -> ResultLedger<()> {
    if ctx.action.is_mutation() && !ctx.actor.is_admin {
        return Err(LedgerError::Forbidden(
            "only family admins can perform this operation".to_string(),
        ));
    }
    Ok(())
}

/// Dependent entities (accounts, fund requests, memberships) can only be
/// created by a user who has a default family group at all. Whether the
/// *target* group is that default group is a database-adjacent check on the
/// engine.
pub fn has_default_group(ctx: &GateContext<'_>) -> ResultLedger<()> {
    if ctx.action.is_mutation() && ctx.actor.default_group.is_none() {
        return Err(LedgerError::Forbidden(
            "user has no default family group".to_string(),
        ));
    }
    Ok(())
}

/// Object-level ownership check.
///
/// Reads always pass, and admins pass every mutation. For everyone else the
/// actor must match the first exposed ownership attribute, checked in
/// priority order `owner_id`, `created_by`, `requested_by`. A target
/// exposing none of them is rejected; such operations must be gated by
/// [`admin_only`] instead.
pub fn owner_or_creator(ctx: &GateContext<'_>) -> ResultLedger<()> {
    if !ctx.action.is_mutation() || ctx.actor.is_admin {
        return Ok(());
    }

    let owner = ctx
        .owner_id
        .or(ctx.created_by)
        .or(ctx.requested_by)
        .ok_or_else(|| {
            LedgerError::Forbidden("target exposes no ownership attribute".to_string())
        })?;

    if ctx.actor.id != owner {
        return Err(LedgerError::Forbidden(
            "you are not authorized to perform this action".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Actor {
        Actor::admin(Uuid::new_v4())
    }

    #[test]
    fn first_failing_rule_wins() {
        let actor = admin().frozen();
        let ctx = GateContext::new(&actor, Action::Create);
        // Frozen fires before the ownership rule even though both would fail.
        let err = authorize(&[not_frozen, owner_or_creator], &ctx).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Forbidden("user is frozen, operation not allowed".to_string())
        );
    }

    #[test]
    fn reads_bypass_ownership_and_freeze() {
        let actor = Actor::member(Uuid::new_v4()).frozen();
        let ctx = GateContext::new(&actor, Action::Read).owner_id(Uuid::new_v4());
        assert!(authorize(&[not_frozen, owner_or_creator], &ctx).is_ok());
    }

    #[test]
    fn admin_only_rejects_members() {
        let actor = Actor::member(Uuid::new_v4());
        let ctx = GateContext::new(&actor, Action::Create);
        assert!(matches!(
            admin_only(&ctx),
            Err(LedgerError::Forbidden(_))
        ));
    }

    #[test]
    fn ownership_priority_is_owner_then_creator_then_requester() {
        let actor = Actor::member(Uuid::new_v4());
        // Actor created the object but someone else owns it: owner_id wins.
        let ctx = GateContext::new(&actor, Action::Update)
            .owner_id(Uuid::new_v4())
            .created_by(actor.id);
        assert!(owner_or_creator(&ctx).is_err());

        // No owner_id exposed: created_by decides.
        let ctx = GateContext::new(&actor, Action::Update).created_by(actor.id);
        assert!(owner_or_creator(&ctx).is_ok());

        // Only requested_by exposed (fund requests).
        let ctx = GateContext::new(&actor, Action::Delete).requested_by(actor.id);
        assert!(owner_or_creator(&ctx).is_ok());
    }

    #[test]
    fn default_group_is_required_for_creation() {
        let actor = Actor::member(Uuid::new_v4());
        let ctx = GateContext::new(&actor, Action::Create);
        assert!(matches!(
            has_default_group(&ctx),
            Err(LedgerError::Forbidden(_))
        ));

        let mut with_default = Actor::member(Uuid::new_v4());
        with_default.default_group = Some(Uuid::new_v4());
        let ctx = GateContext::new(&with_default, Action::Create);
        assert!(has_default_group(&ctx).is_ok());
    }

    #[test]
    fn admins_bypass_ownership() {
        let actor = admin();
        let ctx = GateContext::new(&actor, Action::Delete).owner_id(Uuid::new_v4());
        assert!(owner_or_creator(&ctx).is_ok());
    }
}
