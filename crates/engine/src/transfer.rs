//! Transfer routes and the pure balance planner.
//!
//! A transfer names its direction plus exactly the accounts that direction
//! needs, as a tagged union ([`TransferRoute`]). The storage row keeps the
//! legacy four-nullable-column shape; [`TransferRoute::try_new`] is the only
//! place that shape is validated, so field-presence errors are raised once,
//! before any I/O.
//!
//! Validation runs in a fixed order: field presence (at construction) →
//! no-self-transfer → sufficient source balance → computed mutation. The
//! planner ([`plan`]) is pure so the rules can be tested without a database.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money, ResultLedger};

/// Reference to one balance-bearing account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountRef {
    Sub(Uuid),
    Family(Uuid),
}

impl AccountRef {
    #[must_use]
    pub fn id(self) -> Uuid {
        match self {
            Self::Sub(id) | Self::Family(id) => id,
        }
    }
}

/// The four nullable account columns of a stored transaction row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteColumns {
    pub sub_source: Option<Uuid>,
    pub sub_destination: Option<Uuid>,
    pub family_source: Option<Uuid>,
    pub family_destination: Option<Uuid>,
}

/// A transfer direction together with the accounts it involves.
///
/// Internal directions move funds between two ledger accounts. External
/// directions (bank / mobile wallet legs) either credit a single account or
/// pass through with no balance effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum TransferRoute {
    SubToSub { source: Uuid, destination: Uuid },
    SubToFamily { source: Uuid, destination: Uuid },
    FamilyToSub { source: Uuid, destination: Uuid },
    FamilyToFamily { source: Uuid, destination: Uuid },
    BankToSub { destination: Uuid },
    SubToBank { source: Uuid },
    BankToFamily { destination: Uuid },
    FamilyToBank { source: Uuid },
    MobileWalletToFamily { destination: Uuid },
}

impl TransferRoute {
    /// The stored direction discriminant.
    #[must_use]
    pub fn direction(&self) -> &'static str {
        match self {
            Self::SubToSub { .. } => "sub_account_to_sub_account",
            Self::SubToFamily { .. } => "sub_account_to_family_account",
            Self::FamilyToSub { .. } => "family_account_to_sub_account",
            Self::FamilyToFamily { .. } => "family_account_to_family_account",
            Self::BankToSub { .. } => "bank_to_sub_account",
            Self::SubToBank { .. } => "sub_account_to_bank",
            Self::BankToFamily { .. } => "bank_to_family_account",
            Self::FamilyToBank { .. } => "family_account_to_bank",
            Self::MobileWalletToFamily { .. } => "mobile_wallet_to_family_account",
        }
    }

    /// Builds a route from the stored direction string and the four nullable
    /// account columns.
    ///
    /// This is where field-presence rules live: a direction missing one of
    /// its required accounts fails with [`LedgerError::MissingAccount`]
    /// naming the field, and the two all-same-kind directions reject rows
    /// that also carry the other account pair.
    pub fn try_new(direction: &str, columns: RouteColumns) -> ResultLedger<Self> {
        let RouteColumns {
            sub_source,
            sub_destination,
            family_source,
            family_destination,
        } = columns;

        let missing = |field: &str| LedgerError::MissingAccount(field.to_string());

        match direction {
            "sub_account_to_sub_account" => {
                let source = sub_source.ok_or_else(|| missing("sub_source_account"))?;
                let destination =
                    sub_destination.ok_or_else(|| missing("sub_destination_account"))?;
                if family_source.is_some() || family_destination.is_some() {
                    return Err(LedgerError::Validation(
                        "family accounts cannot be set for sub_account_to_sub_account"
                            .to_string(),
                    ));
                }
                Ok(Self::SubToSub {
                    source,
                    destination,
                })
            }
            "sub_account_to_family_account" => Ok(Self::SubToFamily {
                source: sub_source.ok_or_else(|| missing("sub_source_account"))?,
                destination: family_destination
                    .ok_or_else(|| missing("family_destination_account"))?,
            }),
            "family_account_to_sub_account" => Ok(Self::FamilyToSub {
                source: family_source.ok_or_else(|| missing("family_source_account"))?,
                destination: sub_destination
                    .ok_or_else(|| missing("sub_destination_account"))?,
            }),
            "family_account_to_family_account" => {
                let source = family_source.ok_or_else(|| missing("family_source_account"))?;
                let destination =
                    family_destination.ok_or_else(|| missing("family_destination_account"))?;
                if sub_source.is_some() || sub_destination.is_some() {
                    return Err(LedgerError::Validation(
                        "sub accounts cannot be set for family_account_to_family_account"
                            .to_string(),
                    ));
                }
                Ok(Self::FamilyToFamily {
                    source,
                    destination,
                })
            }
            "bank_to_sub_account" => Ok(Self::BankToSub {
                destination: sub_destination
                    .ok_or_else(|| missing("sub_destination_account"))?,
            }),
            "sub_account_to_bank" => Ok(Self::SubToBank {
                source: sub_source.ok_or_else(|| missing("sub_source_account"))?,
            }),
            "bank_to_family_account" => Ok(Self::BankToFamily {
                destination: family_destination
                    .ok_or_else(|| missing("family_destination_account"))?,
            }),
            "family_account_to_bank" => Ok(Self::FamilyToBank {
                source: family_source.ok_or_else(|| missing("family_source_account"))?,
            }),
            "mobile_wallet_to_family_account" => Ok(Self::MobileWalletToFamily {
                destination: family_destination
                    .ok_or_else(|| missing("family_destination_account"))?,
            }),
            other => Err(LedgerError::Validation(format!(
                "invalid transaction direction: {other}"
            ))),
        }
    }

    /// The account debited by this route, if any.
    #[must_use]
    pub fn debit_account(&self) -> Option<AccountRef> {
        match *self {
            Self::SubToSub { source, .. } | Self::SubToFamily { source, .. } => {
                Some(AccountRef::Sub(source))
            }
            Self::FamilyToSub { source, .. } | Self::FamilyToFamily { source, .. } => {
                Some(AccountRef::Family(source))
            }
            _ => None,
        }
    }

    /// The account credited by this route, if any.
    #[must_use]
    pub fn credit_account(&self) -> Option<AccountRef> {
        match *self {
            Self::SubToSub { destination, .. } | Self::FamilyToSub { destination, .. } => {
                Some(AccountRef::Sub(destination))
            }
            Self::SubToFamily { destination, .. }
            | Self::FamilyToFamily { destination, .. }
            | Self::BankToFamily { destination } => Some(AccountRef::Family(destination)),
            _ => None,
        }
    }

    /// `true` when the route changes at least one ledger balance.
    ///
    /// The remaining external directions (bank→sub, sub→bank, family→bank,
    /// mobile_wallet→family) are declared but pass through with no balance
    /// effect.
    #[must_use]
    pub fn moves_funds(&self) -> bool {
        self.debit_account().is_some() || self.credit_account().is_some()
    }

    /// Maps the route back onto the stored nullable columns.
    #[must_use]
    pub fn columns(&self) -> RouteColumns {
        let mut cols = RouteColumns::default();
        match *self {
            Self::SubToSub {
                source,
                destination,
            } => {
                cols.sub_source = Some(source);
                cols.sub_destination = Some(destination);
            }
            Self::SubToFamily {
                source,
                destination,
            } => {
                cols.sub_source = Some(source);
                cols.family_destination = Some(destination);
            }
            Self::FamilyToSub {
                source,
                destination,
            } => {
                cols.family_source = Some(source);
                cols.sub_destination = Some(destination);
            }
            Self::FamilyToFamily {
                source,
                destination,
            } => {
                cols.family_source = Some(source);
                cols.family_destination = Some(destination);
            }
            Self::BankToSub { destination } => cols.sub_destination = Some(destination),
            Self::SubToBank { source } => cols.sub_source = Some(source),
            Self::BankToFamily { destination } => cols.family_destination = Some(destination),
            Self::FamilyToBank { source } => cols.family_source = Some(source),
            Self::MobileWalletToFamily { destination } => {
                cols.family_destination = Some(destination)
            }
        }
        cols
    }
}

/// Balance mutation computed by [`plan`]: the new balance for each affected
/// account. Pass-through routes produce an empty plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferPlan {
    pub debit: Option<(AccountRef, Money)>,
    pub credit: Option<(AccountRef, Money)>,
}

/// Validates a transfer against the loaded balances and computes the
/// resulting ones.
///
/// `source_balance`/`destination_balance` are the current balances of the
/// accounts returned by [`TransferRoute::debit_account`] and
/// [`TransferRoute::credit_account`]; pass `None` when the route has no such
/// account.
///
/// The sufficient-balance check always reads the **source** balance, for
/// every debiting route. A balance never goes negative through a successful
/// transfer.
pub fn plan(
    route: &TransferRoute,
    amount: Money,
    source_balance: Option<Money>,
    destination_balance: Option<Money>,
) -> ResultLedger<TransferPlan> {
    if !amount.is_positive() {
        return Err(LedgerError::Validation(
            "transfer amount must be positive".to_string(),
        ));
    }
    if !amount.in_range() {
        return Err(LedgerError::Validation(
            "transfer amount exceeds 10 digits".to_string(),
        ));
    }

    match *route {
        TransferRoute::SubToSub {
            source,
            destination,
        } if source == destination => {
            return Err(LedgerError::SelfTransfer(
                "source and destination sub accounts cannot be the same".to_string(),
            ));
        }
        TransferRoute::FamilyToFamily {
            source,
            destination,
        } if source == destination => {
            return Err(LedgerError::SelfTransfer(
                "source and destination family accounts cannot be the same".to_string(),
            ));
        }
        _ => {}
    }

    let mut result = TransferPlan::default();

    if let Some(account) = route.debit_account() {
        let balance = source_balance.ok_or_else(|| {
            LedgerError::Validation("missing source balance for debit".to_string())
        })?;
        if balance < amount {
            return Err(LedgerError::InsufficientFunds(format!(
                "not enough balance in source account: {balance} < {amount}"
            )));
        }
        let new_balance = balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::Validation("balance underflow".to_string()))?;
        // A successful debit never leaves a negative balance.
        if new_balance.is_negative() {
            return Err(LedgerError::InsufficientFunds(
                "transfer would overdraw the source account".to_string(),
            ));
        }
        result.debit = Some((account, new_balance));
    }

    if let Some(account) = route.credit_account() {
        let balance = destination_balance.ok_or_else(|| {
            LedgerError::Validation("missing destination balance for credit".to_string())
        })?;
        let new_balance = balance
            .checked_add(amount)
            .filter(|b| b.in_range())
            .ok_or_else(|| {
                LedgerError::Validation("destination balance exceeds 10 digits".to_string())
            })?;
        result.credit = Some((account, new_balance));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn try_new_requires_direction_fields() {
        let (a, _) = ids();
        let err = TransferRoute::try_new(
            "sub_account_to_sub_account",
            RouteColumns {
                sub_source: Some(a),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            LedgerError::MissingAccount("sub_destination_account".to_string())
        );
    }

    #[test]
    fn try_new_rejects_family_columns_on_sub_to_sub() {
        let (a, b) = ids();
        let err = TransferRoute::try_new(
            "sub_account_to_sub_account",
            RouteColumns {
                sub_source: Some(a),
                sub_destination: Some(b),
                family_source: Some(Uuid::new_v4()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn try_new_rejects_unknown_direction() {
        let err =
            TransferRoute::try_new("sideways", RouteColumns::default()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn columns_round_trip() {
        let (a, b) = ids();
        let route = TransferRoute::FamilyToSub {
            source: a,
            destination: b,
        };
        let rebuilt = TransferRoute::try_new(route.direction(), route.columns()).unwrap();
        assert_eq!(route, rebuilt);
    }

    #[test]
    fn plan_moves_amount_between_balances() {
        let (a, b) = ids();
        let route = TransferRoute::SubToSub {
            source: a,
            destination: b,
        };
        let plan = plan(
            &route,
            Money::new(4000),
            Some(Money::new(10000)),
            Some(Money::ZERO),
        )
        .unwrap();
        assert_eq!(plan.debit, Some((AccountRef::Sub(a), Money::new(6000))));
        assert_eq!(plan.credit, Some((AccountRef::Sub(b), Money::new(4000))));
    }

    #[test]
    fn plan_rejects_self_transfer_regardless_of_balance() {
        let (a, _) = ids();
        let route = TransferRoute::SubToSub {
            source: a,
            destination: a,
        };
        let err = plan(
            &route,
            Money::new(100),
            Some(Money::new(100_000)),
            Some(Money::new(100_000)),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::SelfTransfer(_)));
    }

    #[test]
    fn plan_checks_source_balance_not_destination() {
        let (a, b) = ids();
        let route = TransferRoute::SubToSub {
            source: a,
            destination: b,
        };
        // Destination is rich, source is broke: must still fail.
        let err = plan(
            &route,
            Money::new(5000),
            Some(Money::new(2000)),
            Some(Money::new(1_000_000)),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds(_)));
    }

    #[test]
    fn plan_guards_sub_to_family_debit() {
        let (a, b) = ids();
        let route = TransferRoute::SubToFamily {
            source: a,
            destination: b,
        };
        let err = plan(
            &route,
            Money::new(5000),
            Some(Money::new(100)),
            Some(Money::ZERO),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds(_)));
    }

    #[test]
    fn bank_to_family_credits_only() {
        let (_, b) = ids();
        let route = TransferRoute::BankToFamily { destination: b };
        let plan = plan(&route, Money::new(2500), None, Some(Money::new(100))).unwrap();
        assert_eq!(plan.debit, None);
        assert_eq!(
            plan.credit,
            Some((AccountRef::Family(b), Money::new(2600)))
        );
    }

    #[test]
    fn pass_through_routes_have_empty_plans() {
        let (a, _) = ids();
        for route in [
            TransferRoute::BankToSub { destination: a },
            TransferRoute::SubToBank { source: a },
            TransferRoute::FamilyToBank { source: a },
            TransferRoute::MobileWalletToFamily { destination: a },
        ] {
            assert!(!route.moves_funds());
            let plan = plan(&route, Money::new(100), None, None).unwrap();
            assert_eq!(plan, TransferPlan::default());
        }
    }

    #[test]
    fn plan_rejects_non_positive_amounts() {
        let (a, b) = ids();
        let route = TransferRoute::SubToSub {
            source: a,
            destination: b,
        };
        for amount in [Money::ZERO, Money::new(-100)] {
            let err = plan(&route, amount, Some(Money::new(1000)), Some(Money::ZERO))
                .unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)));
        }
    }
}
