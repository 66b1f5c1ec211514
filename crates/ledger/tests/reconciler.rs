use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use ledger::{DEFAULT_SWEEP_INTERVAL, Engine, MoneyMinor, Reconciler, SweepCounts};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

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
async fn sweep_pays_out_completed_targets() {
    let (engine, db) = engine_with_db().await;

    let done = engine
        .create_goal("alice", "Japan trip", MoneyMinor::new(600), None)
        .await
        .unwrap();
    force_complete(&db, "goals", &done.id.to_string(), 600).await;
    // An active goal is not a candidate at all.
    engine
        .create_goal("bob", "Rent fund", MoneyMinor::new(500), None)
        .await
        .unwrap();
    let group = engine
        .create_group("carol", "Village fund", MoneyMinor::new(400), &[])
        .await
        .unwrap();
    force_complete(&db, "groups", &group.id.to_string(), 400).await;

    let report = engine.sweep_unreleased().await.unwrap();
    assert_eq!(
        report.goals,
        SweepCounts {
            examined: 1,
            released: 1,
            skipped: 0,
            failed: 0
        }
    );
    assert_eq!(
        report.groups,
        SweepCounts {
            examined: 1,
            released: 1,
            skipped: 0,
            failed: 0
        }
    );
    assert_eq!(report.released_total, MoneyMinor::new(1_000));

    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(600)
    );
    assert_eq!(
        engine.wallet("carol").await.unwrap().balance,
        MoneyMinor::new(400)
    );

    // Released targets drop out of the candidate set.
    let again = engine.sweep_unreleased().await.unwrap();
    assert_eq!(again.goals.examined, 0);
    assert_eq!(again.groups.examined, 0);
    assert_eq!(again.released_total, MoneyMinor::ZERO);
}

#[tokio::test]
async fn failed_releases_stay_eligible_for_retry() {
    let (engine, db) = engine_with_db().await;
    let backend = db.get_database_backend();

    let goal = engine
        .create_goal("alice", "Japan trip", MoneyMinor::new(600), None)
        .await
        .unwrap();
    force_complete(&db, "goals", &goal.id.to_string(), 600).await;
    // A currency the ledger does not know makes the release blow up before
    // it can claim the payout.
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE goals SET currency = ? WHERE id = ?;",
        vec!["XXX".into(), goal.id.to_string().into()],
    ))
    .await
    .unwrap();

    let report = engine.sweep_unreleased().await.unwrap();
    assert_eq!(
        report.goals,
        SweepCounts {
            examined: 1,
            released: 0,
            skipped: 0,
            failed: 1
        }
    );

    // The claim never happened, so the next sweep picks the goal up again.
    let retry = engine.sweep_unreleased().await.unwrap();
    assert_eq!(retry.goals.examined, 1);
    assert_eq!(retry.goals.failed, 1);

    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE goals SET currency = ? WHERE id = ?;",
        vec!["NGN".into(), goal.id.to_string().into()],
    ))
    .await
    .unwrap();

    let fixed = engine.sweep_unreleased().await.unwrap();
    assert_eq!(fixed.goals.released, 1);
    assert_eq!(
        engine.wallet("alice").await.unwrap().balance,
        MoneyMinor::new(600)
    );
}

#[tokio::test]
async fn run_once_records_the_run() {
    let (engine, db) = engine_with_db().await;
    let goal = engine
        .create_goal("alice", "Japan trip", MoneyMinor::new(600), None)
        .await
        .unwrap();
    force_complete(&db, "goals", &goal.id.to_string(), 600).await;

    let reconciler = Reconciler::new(Arc::new(engine), DEFAULT_SWEEP_INTERVAL);
    let before = reconciler.status().await;
    assert!(!before.running);
    assert_eq!(before.runs, 0);
    assert_eq!(before.last_run_at, None);
    assert_eq!(before.last_report, None);

    let report = reconciler.run_once().await.unwrap();
    assert_eq!(report.goals.released, 1);

    let after = reconciler.status().await;
    assert!(!after.running);
    assert_eq!(after.runs, 1);
    assert!(after.last_run_at.is_some());
    assert_eq!(after.last_report, Some(report));
}

#[tokio::test]
async fn start_and_stop_toggle_the_background_loop() {
    let (engine, _db) = engine_with_db().await;
    let reconciler = Reconciler::new(Arc::new(engine), Duration::from_secs(3600));

    assert!(!reconciler.status().await.running);

    reconciler.start().await;
    assert!(reconciler.status().await.running);
    // A second start does not replace the running loop.
    reconciler.start().await;
    assert!(reconciler.status().await.running);

    reconciler.stop().await;
    assert!(!reconciler.status().await.running);
    reconciler.stop().await;

    reconciler.start().await;
    assert!(reconciler.status().await.running);
    reconciler.stop().await;
}

#[tokio::test]
async fn background_loop_keeps_sweeping() {
    let (engine, _db) = engine_with_db().await;
    let reconciler = Reconciler::new(Arc::new(engine), Duration::from_millis(25));

    reconciler.start().await;

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        if reconciler.status().await.runs >= 2 {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "reconciler loop never swept twice"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    reconciler.stop().await;
    let halted = reconciler.status().await.runs;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(reconciler.status().await.runs, halted);
}
