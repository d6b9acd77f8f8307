//! Family ledger core.
//!
//! The [`Engine`] owns the database connection and exposes the write and
//! read operations for family groups, their accounts and the transfers
//! between them. Transfer validation and authorization are pure modules
//! ([`transfer`], [`gate`]) so the rules can be tested without I/O; the ops
//! layer wires them to persistence.

pub use commands::{
    CreateFamilyAccountCmd, CreateFamilyGroupCmd, CreateFundRequestCmd, CreateSubAccountCmd,
    TransferCmd,
};
pub use error::LedgerError;
pub use family_accounts::FamilyAccount;
pub use family_groups::FamilyGroup;
pub use fund_requests::{FundRequest, FundRequestStatus};
pub use gate::{
    Action, GateContext, Rule, admin_only, authorize, has_default_group, not_frozen,
    owner_or_creator,
};
pub use identity::{Actor, IdentityProvider, RetryingIdentity};
pub use memberships::Membership;
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use sub_accounts::{SubAccount, SubAccountKind};
pub use transactions::{Transaction, TransactionKind, TransactionStatus};
pub use transfer::{AccountRef, RouteColumns, TransferPlan, TransferRoute};

mod commands;
mod error;
mod family_accounts;
mod family_groups;
mod fund_requests;
pub mod gate;
pub mod identity;
mod memberships;
mod money;
mod ops;
mod sub_accounts;
mod transactions;
pub mod transfer;
mod util;

pub type ResultLedger<T> = Result<T, LedgerError>;
