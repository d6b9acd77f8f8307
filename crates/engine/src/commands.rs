//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

use crate::{Money, sub_accounts::SubAccountKind, transactions::TransactionKind, transfer::TransferRoute};

/// Create a family group.
#[derive(Clone, Debug)]
pub struct CreateFamilyGroupCmd {
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
}

impl CreateFamilyGroupCmd {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_default: false,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the new group as the owner's default group.
    #[must_use]
    pub fn default_group(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Create a family account inside a group.
#[derive(Clone, Debug)]
pub struct CreateFamilyAccountCmd {
    pub family_group_id: Uuid,
    pub name: String,
}

impl CreateFamilyAccountCmd {
    #[must_use]
    pub fn new(family_group_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            family_group_id,
            name: name.into(),
        }
    }
}

/// Open a sub account under a family account.
#[derive(Clone, Debug)]
pub struct CreateSubAccountCmd {
    pub family_account_id: Uuid,
    pub name: String,
    pub kind: SubAccountKind,
    /// Owner of the new account. Defaults to the acting user.
    pub owner_id: Option<Uuid>,
}

impl CreateSubAccountCmd {
    #[must_use]
    pub fn new(family_account_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            family_account_id,
            name: name.into(),
            kind: SubAccountKind::Savings,
            owner_id: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: SubAccountKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn owner_id(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}

/// Ask for funds into one's own sub account.
#[derive(Clone, Debug)]
pub struct CreateFundRequestCmd {
    pub source_account_id: Uuid,
    pub amount: Money,
    pub family_account_id: Option<Uuid>,
    pub reason: Option<String>,
}

impl CreateFundRequestCmd {
    #[must_use]
    pub fn new(source_account_id: Uuid, amount: Money) -> Self {
        Self {
            source_account_id,
            amount,
            family_account_id: None,
            reason: None,
        }
    }

    #[must_use]
    pub fn family_account_id(mut self, family_account_id: Uuid) -> Self {
        self.family_account_id = Some(family_account_id);
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Apply a transfer along a route.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub route: TransferRoute,
    pub amount: Money,
    pub kind: TransactionKind,
    pub description: Option<String>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(route: TransferRoute, amount: Money) -> Self {
        Self {
            route,
            amount,
            kind: TransactionKind::Transfers,
            description: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
