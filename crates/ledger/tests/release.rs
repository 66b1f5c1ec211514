use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use ledger::{
    Engine, MoneyMinor, ReleaseOutcome, TransactionKind, TransactionListFilter,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("ledger_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db, path)
}

/// Puts a target into the completed-but-unreleased state the sweep exists
/// for, as if an earlier inline release had failed.
async fn force_complete(db: &DatabaseConnection, table: &str, id: &str, amount: i64) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        format!("UPDATE {table} SET status = ?, current_minor = ?, completed_at = ? WHERE id = ?;"),
        vec![
            "completed".into(),
            amount.into(),
            chrono::Utc::now().into(),
            id.into(),
        ],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn release_before_completion_is_not_ready() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", MoneyMinor::new(200), None, None)
        .await
        .unwrap();
    let goal = engine
        .create_goal("alice", "Japan trip", MoneyMinor::new(600), None)
        .await
        .unwrap();
    engine
        .contribute_to_goal("alice", goal.id, MoneyMinor::new(100), None)
        .await
        .unwrap();

    let outcome = engine.release_goal_funds(goal.id).await.unwrap();
    assert_eq!(outcome, ReleaseOutcome::NotReady);
    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(100)
    );
}

#[tokio::test]
async fn repeated_release_pays_exactly_once() {
    let (engine, db) = engine_with_db().await;
    let goal = engine
        .create_goal("alice", "Japan trip", MoneyMinor::new(600), None)
        .await
        .unwrap();
    force_complete(&db, "goals", &goal.id.to_string(), 600).await;

    let first = engine.release_goal_funds(goal.id).await.unwrap();
    assert_eq!(
        first,
        ReleaseOutcome::Released {
            amount: MoneyMinor::new(600)
        }
    );
    // The owner never deposited; the payout created the wallet.
    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(600)
    );

    let second = engine.release_goal_funds(goal.id).await.unwrap();
    assert_eq!(second, ReleaseOutcome::AlreadyReleased);
    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(600)
    );

    let payouts = engine
        .list_wallet_transactions(
            "alice",
            50,
            &TransactionListFilter {
                kinds: Some(vec![TransactionKind::GoalRelease]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(payouts.len(), 1);
}

#[tokio::test]
async fn manual_release_after_inline_release_is_a_no_op() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", MoneyMinor::new(600), None, None)
        .await
        .unwrap();
    let goal = engine
        .create_goal("alice", "Japan trip", MoneyMinor::new(600), None)
        .await
        .unwrap();
    let receipt = engine
        .contribute_to_goal("alice", goal.id, MoneyMinor::new(600), None)
        .await
        .unwrap();
    assert!(matches!(
        receipt.release,
        Some(ReleaseOutcome::Released { .. })
    ));

    let outcome = engine.release_goal_funds(goal.id).await.unwrap();
    assert_eq!(outcome, ReleaseOutcome::AlreadyReleased);
}

#[tokio::test]
async fn concurrent_releases_pay_once() {
    let (engine, db, path) = engine_with_file_db().await;
    let goal = engine
        .create_goal("alice", "Japan trip", MoneyMinor::new(600), None)
        .await
        .unwrap();
    let goal_id = goal.id;
    force_complete(&db, "goals", &goal_id.to_string(), 600).await;

    let engine = std::sync::Arc::new(engine);
    let a = tokio::spawn({
        let engine = engine.clone();
        async move { engine.release_goal_funds(goal_id).await }
    });
    let b = tokio::spawn({
        let engine = engine.clone();
        async move { engine.release_goal_funds(goal_id).await }
    });
    let outcomes = [a.await.unwrap(), b.await.unwrap()];

    // Exactly one attempt wins the claim; the loser sees AlreadyReleased or
    // loses its transaction to the storage-level write race. Either way the
    // money moved once.
    let released = outcomes
        .iter()
        .filter(|o| matches!(o, Ok(ReleaseOutcome::Released { .. })))
        .count();
    assert_eq!(released, 1);

    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(600)
    );
    let payouts = engine
        .list_wallet_transactions(
            "alice",
            50,
            &TransactionListFilter {
                kinds: Some(vec![TransactionKind::GoalRelease]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(payouts.len(), 1);

    drop(engine);
    drop(db);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn group_release_pays_the_creator() {
    let (engine, db) = engine_with_db().await;
    let group = engine
        .create_group("alice", "Village fund", MoneyMinor::new(400), &[])
        .await
        .unwrap();
    force_complete(&db, "groups", &group.id.to_string(), 400).await;

    let outcome = engine.release_group_funds(group.id).await.unwrap();
    assert_eq!(
        outcome,
        ReleaseOutcome::Released {
            amount: MoneyMinor::new(400)
        }
    );
    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(400)
    );

    let group = engine.group(group.id).await.unwrap();
    assert!(group.funds_released);
    assert!(group.funds_released_at.is_some());
}

#[tokio::test]
async fn completion_check_is_idempotent() {
    let (engine, db) = engine_with_db().await;
    let backend = db.get_database_backend();
    engine
        .deposit("alice", MoneyMinor::new(100), None, None)
        .await
        .unwrap();
    let goal = engine
        .create_goal("alice", "Japan trip", MoneyMinor::new(100), None)
        .await
        .unwrap();
    engine
        .contribute_to_goal("alice", goal.id, MoneyMinor::new(40), None)
        .await
        .unwrap();

    assert!(!engine.check_goal_completion(goal.id).await.unwrap());

    // Simulate the current amount reaching the target outside the usual path.
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE goals SET current_minor = ? WHERE id = ?;",
        vec![100i64.into(), goal.id.to_string().into()],
    ))
    .await
    .unwrap();

    assert!(engine.check_goal_completion(goal.id).await.unwrap());
    assert!(!engine.check_goal_completion(goal.id).await.unwrap());

    let goal = engine.goal(goal.id).await.unwrap();
    assert_eq!(goal.status, ledger::TargetStatus::Completed);
    assert!(goal.completed_at.is_some());
}
