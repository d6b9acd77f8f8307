mod common;

use engine::{
    CreateFundRequestCmd, FundRequestStatus, LedgerError, Money, TransactionKind,
    TransactionStatus, TransferRoute,
};
use uuid::Uuid;

use common::{engine_with_db, family_fixture, member_in};

#[tokio::test]
async fn accepting_a_request_settles_it() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(200_00), Money::ZERO).await;

    let request = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::new(45_00)).reason("school supplies"),
        )
        .await
        .unwrap();
    assert_eq!(request.status, FundRequestStatus::Pending);

    let (accepted, record) = engine
        .accept_fund_request(&family.owner, request.id, Some(family.pool))
        .await
        .unwrap();
    assert_eq!(accepted.status, FundRequestStatus::Accepted);
    assert_eq!(accepted.family_account_id, Some(family.pool));
    assert_eq!(record.kind, TransactionKind::FundRequest);
    assert_eq!(record.status, TransactionStatus::Successful);
    assert_eq!(record.fund_request_id, Some(request.id));
    assert_eq!(
        record.route,
        TransferRoute::FamilyToSub {
            source: family.pool,
            destination: family.sub_bob,
        }
    );

    let pool = engine
        .family_account(&family.owner, family.pool)
        .await
        .unwrap();
    let sub = engine
        .sub_account(&family.bob, family.sub_bob)
        .await
        .unwrap();
    assert_eq!(pool.balance, Money::new(155_00));
    assert_eq!(sub.balance, Money::new(45_00));
}

#[tokio::test]
async fn accepting_uses_the_account_stored_on_the_request() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let request = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::new(20_00))
                .family_account_id(family.pool),
        )
        .await
        .unwrap();

    let (accepted, _) = engine
        .accept_fund_request(&family.owner, request.id, None)
        .await
        .unwrap();
    assert_eq!(accepted.family_account_id, Some(family.pool));
}

#[tokio::test]
async fn accepting_without_any_account_fails() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let request = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::new(20_00)),
        )
        .await
        .unwrap();

    let err = engine
        .accept_fund_request(&family.owner, request.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    // The request stays pending for a later attempt.
    let reloaded = engine.fund_request(&family.bob, request.id).await.unwrap();
    assert_eq!(reloaded.status, FundRequestStatus::Pending);
}

#[tokio::test]
async fn terminal_requests_cannot_change_again() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let request = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::new(20_00))
                .family_account_id(family.pool),
        )
        .await
        .unwrap();
    engine
        .accept_fund_request(&family.owner, request.id, None)
        .await
        .unwrap();

    let err = engine
        .accept_fund_request(&family.owner, request.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));

    let err = engine
        .reject_fund_request(&family.owner, request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));

    let err = engine
        .cancel_fund_request(&family.bob, request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[tokio::test]
async fn acceptance_fails_when_the_pool_cannot_cover_it() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(30_00), Money::ZERO).await;

    let request = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::new(80_00))
                .family_account_id(family.pool),
        )
        .await
        .unwrap();

    let err = engine
        .accept_fund_request(&family.owner, request.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));

    // Nothing moved and the request is still pending.
    let pool = engine
        .family_account(&family.owner, family.pool)
        .await
        .unwrap();
    assert_eq!(pool.balance, Money::new(30_00));
    let reloaded = engine.fund_request(&family.bob, request.id).await.unwrap();
    assert_eq!(reloaded.status, FundRequestStatus::Pending);
}

#[tokio::test]
async fn members_cannot_accept_or_reject() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let request = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::new(20_00))
                .family_account_id(family.pool),
        )
        .await
        .unwrap();

    // Bob neither created the pool account nor is an admin.
    let err = engine
        .accept_fund_request(&family.bob, request.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));
    let err = engine
        .reject_fund_request(&family.bob, request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));
}

#[tokio::test]
async fn only_the_requester_cancels() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let carol = member_in(family.group);
    engine
        .add_member(&family.owner, family.group, carol.id)
        .await
        .unwrap();

    let request = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::new(20_00)),
        )
        .await
        .unwrap();

    let err = engine
        .cancel_fund_request(&carol, request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));

    // Admins get no bypass here either; the owner is an admin.
    let err = engine
        .cancel_fund_request(&family.owner, request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));

    let cancelled = engine
        .cancel_fund_request(&family.bob, request.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, FundRequestStatus::Cancelled);
}

#[tokio::test]
async fn rejecting_leaves_balances_alone() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let request = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::new(20_00))
                .family_account_id(family.pool),
        )
        .await
        .unwrap();
    let rejected = engine
        .reject_fund_request(&family.owner, request.id)
        .await
        .unwrap();
    assert_eq!(rejected.status, FundRequestStatus::Rejected);

    let pool = engine
        .family_account(&family.owner, family.pool)
        .await
        .unwrap();
    assert_eq!(pool.balance, Money::new(100_00));
}

#[tokio::test]
async fn requests_require_a_positive_amount() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let err = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::ZERO),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn requests_target_only_your_own_sub_account() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let err = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_owner, Money::new(20_00)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));
}

#[tokio::test]
async fn requests_reject_unknown_sub_accounts() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let err = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(Uuid::new_v4(), Money::new(20_00)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn requests_are_only_visible_to_their_requester() {
    let engine = engine_with_db().await;
    let family = family_fixture(&engine, Money::new(100_00), Money::ZERO).await;

    let carol = member_in(family.group);
    engine
        .add_member(&family.owner, family.group, carol.id)
        .await
        .unwrap();

    let request = engine
        .create_fund_request(
            &family.bob,
            CreateFundRequestCmd::new(family.sub_bob, Money::new(10_00)),
        )
        .await
        .unwrap();

    let err = engine.fund_request(&carol, request.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));

    // Requester and admins can read it.
    let seen = engine.fund_request(&family.bob, request.id).await.unwrap();
    assert_eq!(seen.id, request.id);
    let seen = engine
        .fund_request(&family.owner, request.id)
        .await
        .unwrap();
    assert_eq!(seen.requested_by, family.bob.id);
}
