use sea_orm::{Database, DatabaseConnection};

use ledger::{
    Engine, LedgerError, MoneyMinor, TransactionKind, TransactionListFilter, TransactionStatus,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

#[tokio::test]
async fn request_reserves_the_amount_immediately() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", MoneyMinor::new(1_000), None, None)
        .await
        .unwrap();

    let entry = engine
        .request_withdrawal("alice", MoneyMinor::new(400), "GTBank ****1234")
        .await
        .unwrap();

    assert_eq!(entry.kind, TransactionKind::Withdrawal);
    assert_eq!(entry.status, TransactionStatus::Pending);
    assert_eq!(entry.amount, MoneyMinor::new(-400));
    assert_eq!(
        entry.metadata,
        Some(serde_json::json!({ "destination": "GTBank ****1234" }))
    );

    // Reserved funds are no longer spendable.
    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(600)
    );
}

#[tokio::test]
async fn approval_finalizes_without_touching_the_balance() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", MoneyMinor::new(1_000), None, None)
        .await
        .unwrap();
    let entry = engine
        .request_withdrawal("alice", MoneyMinor::new(400), "GTBank ****1234")
        .await
        .unwrap();

    let approved = engine.approve_withdrawal(entry.id).await.unwrap();
    assert_eq!(approved.status, TransactionStatus::Completed);
    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(600)
    );

    // A completed withdrawal cannot be approved or rejected again.
    let err = engine.approve_withdrawal(entry.id).await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::TransactionNotPending(entry.id.to_string())
    );
    let err = engine.reject_withdrawal(entry.id).await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::TransactionNotPending(entry.id.to_string())
    );
}

#[tokio::test]
async fn rejection_restores_the_reserved_funds() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", MoneyMinor::new(1_000), None, None)
        .await
        .unwrap();
    let entry = engine
        .request_withdrawal("alice", MoneyMinor::new(400), "GTBank ****1234")
        .await
        .unwrap();

    let rejected = engine.reject_withdrawal(entry.id).await.unwrap();
    assert_eq!(rejected.status, TransactionStatus::Failed);
    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(1_000)
    );

    // The failed entry stays for the audit trail but no longer counts.
    let audit = engine.recompute_wallet_balance("alice").await.unwrap();
    assert!(!audit.drifted());
    assert_eq!(audit.recomputed, MoneyMinor::new(1_000));
}

#[tokio::test]
async fn approval_only_accepts_withdrawal_entries() {
    let (engine, _db) = engine_with_db().await;
    let deposit = engine
        .deposit("alice", MoneyMinor::new(1_000), None, None)
        .await
        .unwrap();

    let err = engine.approve_withdrawal(deposit.id).await.unwrap_err();
    assert_eq!(err, LedgerError::TransactionNotFound(deposit.id.to_string()));

    let unknown = Uuid::new_v4();
    let err = engine.approve_withdrawal(unknown).await.unwrap_err();
    assert_eq!(err, LedgerError::TransactionNotFound(unknown.to_string()));
}

#[tokio::test]
async fn over_reserving_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", MoneyMinor::new(100), None, None)
        .await
        .unwrap();

    let err = engine
        .request_withdrawal("alice", MoneyMinor::new(400), "GTBank ****1234")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));

    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(100)
    );
    let pending = engine
        .list_wallet_transactions(
            "alice",
            50,
            &TransactionListFilter {
                status: Some(TransactionStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn blank_destination_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", MoneyMinor::new(1_000), None, None)
        .await
        .unwrap();

    let err = engine
        .request_withdrawal("alice", MoneyMinor::new(100), "   ")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InvalidAmount("destination must not be empty".to_string())
    );
}
