//! The module contains the errors the ledger engine can raise.
//!
//! A boundary layer (HTTP or otherwise) is expected to map variants to
//! status codes as follows:
//!
//! - [`Validation`], [`MissingAccount`], [`SelfTransfer`],
//!   [`InsufficientFunds`], [`InvalidFundRequest`] → 400
//! - [`Forbidden`] → 403
//! - [`NotFound`] → 404
//! - [`Conflict`] → 409
//! - [`IdentityUnavailable`] → 502
//!
//! [`Validation`]: LedgerError::Validation
//! [`MissingAccount`]: LedgerError::MissingAccount
//! [`SelfTransfer`]: LedgerError::SelfTransfer
//! [`InsufficientFunds`]: LedgerError::InsufficientFunds
//! [`InvalidFundRequest`]: LedgerError::InvalidFundRequest
//! [`Forbidden`]: LedgerError::Forbidden
//! [`NotFound`]: LedgerError::NotFound
//! [`Conflict`]: LedgerError::Conflict
//! [`IdentityUnavailable`]: LedgerError::IdentityUnavailable
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger engine custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid data: {0}")]
    Validation(String),
    #[error("Missing account: {0}")]
    MissingAccount(String),
    #[error("Self transfer: {0}")]
    SelfTransfer(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Invalid fund request: {0}")]
    InvalidFundRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Operation not allowed: {0}")]
    Forbidden(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Identity service unavailable: {0}")]
    IdentityUnavailable(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::MissingAccount(a), Self::MissingAccount(b)) => a == b,
            (Self::SelfTransfer(a), Self::SelfTransfer(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InvalidFundRequest(a), Self::InvalidFundRequest(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::IdentityUnavailable(a), Self::IdentityUnavailable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
