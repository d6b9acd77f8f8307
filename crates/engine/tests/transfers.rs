mod common;

use engine::{
    Actor, LedgerError, Money, TransactionKind, TransactionStatus, TransferCmd, TransferRoute,
};
use uuid::Uuid;

use common::{engine_with_db, family_fixture};

#[tokio::test]
async fn moves_funds_between_sub_accounts() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::new(100_00)).await;

    let record = engine
        .apply_transfer(
            &family.owner,
            TransferCmd::new(
                TransferRoute::SubToSub {
                    source: family.sub_owner,
                    destination: family.sub_bob,
                },
                Money::new(40_00),
            ),
        )
        .await
        .unwrap();
    assert_eq!(record.status, TransactionStatus::Successful);
    assert_eq!(record.kind, TransactionKind::Transfers);

    let source = engine
        .sub_account(&family.owner, family.sub_owner)
        .await
        .unwrap();
    let destination = engine
        .sub_account(&family.owner, family.sub_bob)
        .await
        .unwrap();
    assert_eq!(source.balance, Money::new(60_00));
    assert_eq!(destination.balance, Money::new(40_00));
}

#[tokio::test]
async fn sequential_debits_stop_at_zero() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::new(100_00)).await;

    let route = TransferRoute::SubToSub {
        source: family.sub_owner,
        destination: family.sub_bob,
    };
    engine
        .apply_transfer(&family.owner, TransferCmd::new(route, Money::new(40_00)))
        .await
        .unwrap();
    engine
        .apply_transfer(&family.owner, TransferCmd::new(route, Money::new(40_00)))
        .await
        .unwrap();

    let err = engine
        .apply_transfer(&family.owner, TransferCmd::new(route, Money::new(50_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));

    // The failed attempt must not change any balance or leave a record.
    let source = engine
        .sub_account(&family.owner, family.sub_owner)
        .await
        .unwrap();
    let destination = engine
        .sub_account(&family.owner, family.sub_bob)
        .await
        .unwrap();
    assert_eq!(source.balance, Money::new(20_00));
    assert_eq!(destination.balance, Money::new(80_00));

    let records = engine
        .list_transactions_for_account(
            &family.owner,
            engine::AccountRef::Sub(family.sub_owner),
            10,
        )
        .await
        .unwrap();
    assert_eq!(records.len(), 3); // funding transfer + two successful moves
}

#[tokio::test]
async fn funds_are_conserved_across_internal_transfers() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(500_00), Money::new(200_00)).await;

    let total = |pool: Money, a: Money, b: Money| pool + a + b;

    let before = total(
        engine
            .family_account(&family.owner, family.pool)
            .await
            .unwrap()
            .balance,
        engine
            .sub_account(&family.owner, family.sub_owner)
            .await
            .unwrap()
            .balance,
        engine
            .sub_account(&family.owner, family.sub_bob)
            .await
            .unwrap()
            .balance,
    );

    engine
        .apply_transfer(
            &family.owner,
            TransferCmd::new(
                TransferRoute::SubToFamily {
                    source: family.sub_owner,
                    destination: family.pool,
                },
                Money::new(75_00),
            ),
        )
        .await
        .unwrap();
    engine
        .apply_transfer(
            &family.owner,
            TransferCmd::new(
                TransferRoute::FamilyToSub {
                    source: family.pool,
                    destination: family.sub_bob,
                },
                Money::new(120_00),
            ),
        )
        .await
        .unwrap();

    let after = total(
        engine
            .family_account(&family.owner, family.pool)
            .await
            .unwrap()
            .balance,
        engine
            .sub_account(&family.owner, family.sub_owner)
            .await
            .unwrap()
            .balance,
        engine
            .sub_account(&family.owner, family.sub_bob)
            .await
            .unwrap()
            .balance,
    );
    assert_eq!(before, after);
}

#[tokio::test]
async fn rejects_self_transfer() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::new(50_00)).await;

    let err = engine
        .apply_transfer(
            &family.owner,
            TransferCmd::new(
                TransferRoute::SubToSub {
                    source: family.sub_owner,
                    destination: family.sub_owner,
                },
                Money::new(10_00),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::SelfTransfer(_)));
}

#[tokio::test]
async fn insufficient_funds_checks_the_source_side() {
    let engine = engine_with_db().await;
    // Bob's sub account is empty while the owner's holds plenty.
    let family = family_fixture(&engine, Money::new(500_00), Money::new(400_00)).await;

    let err = engine
        .apply_transfer(
            &family.bob,
            TransferCmd::new(
                TransferRoute::SubToSub {
                    source: family.sub_bob,
                    destination: family.sub_owner,
                },
                Money::new(10_00),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));
}

#[tokio::test]
async fn bank_deposits_only_credit() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::ZERO, Money::ZERO).await;

    engine
        .apply_transfer(
            &family.owner,
            TransferCmd::new(
                TransferRoute::BankToFamily {
                    destination: family.pool,
                },
                Money::new(250_00),
            )
            .kind(TransactionKind::Savings),
        )
        .await
        .unwrap();

    let pool = engine
        .family_account(&family.owner, family.pool)
        .await
        .unwrap();
    assert_eq!(pool.balance, Money::new(250_00));
}

#[tokio::test]
async fn pass_through_routes_record_without_moving_funds() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::new(60_00)).await;

    let record = engine
        .apply_transfer(
            &family.owner,
            TransferCmd::new(
                TransferRoute::SubToBank {
                    source: family.sub_owner,
                },
                Money::new(30_00),
            )
            .kind(TransactionKind::Withdrawal),
        )
        .await
        .unwrap();
    assert_eq!(record.status, TransactionStatus::Successful);

    // Settlement happens outside the ledger; the balance is untouched.
    let source = engine
        .sub_account(&family.owner, family.sub_owner)
        .await
        .unwrap();
    assert_eq!(source.balance, Money::new(60_00));
}

#[tokio::test]
async fn rejects_routes_naming_unknown_accounts() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::new(50_00)).await;

    let err = engine
        .apply_transfer(
            &family.owner,
            TransferCmd::new(
                TransferRoute::SubToSub {
                    source: family.sub_owner,
                    destination: Uuid::new_v4(),
                },
                Money::new(10_00),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::MissingAccount(_)));
}

#[tokio::test]
async fn fund_request_kind_requires_a_linked_request() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let err = engine
        .apply_transfer(
            &family.owner,
            TransferCmd::new(
                TransferRoute::FamilyToSub {
                    source: family.pool,
                    destination: family.sub_owner,
                },
                Money::new(10_00),
            )
            .kind(TransactionKind::FundRequest),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidFundRequest(_)));
}

#[tokio::test]
async fn frozen_users_cannot_transfer() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::new(50_00)).await;

    let frozen = family.owner.clone().frozen();
    let err = engine
        .apply_transfer(
            &frozen,
            TransferCmd::new(
                TransferRoute::SubToSub {
                    source: family.sub_owner,
                    destination: family.sub_bob,
                },
                Money::new(10_00),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));
}

#[tokio::test]
async fn transaction_lookup_is_creator_or_admin_only() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::new(50_00)).await;

    let record = engine
        .apply_transfer(
            &family.owner,
            TransferCmd::new(
                TransferRoute::SubToSub {
                    source: family.sub_owner,
                    destination: family.sub_bob,
                },
                Money::new(10_00),
            ),
        )
        .await
        .unwrap();

    let err = engine.transaction(&family.bob, record.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));

    let admin = Actor::admin(Uuid::new_v4());
    let seen = engine.transaction(&admin, record.id).await.unwrap();
    assert_eq!(seen.id, record.id);
    assert_eq!(seen.amount, Money::new(10_00));
}
