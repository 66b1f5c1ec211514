use std::error::Error;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use ledger::{Engine, ReleaseOutcome, SweepCounts};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "kolo_admin")]
#[command(about = "Operator utilities for Kolo (sweeps, releases, balance audits)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./kolo.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one reconciliation sweep over completed-but-unpaid targets.
    Sweep,
    Release(Release),
    Wallet(Wallet),
}

#[derive(Args, Debug)]
struct Release {
    #[command(subcommand)]
    command: ReleaseCommand,
}

#[derive(Subcommand, Debug)]
enum ReleaseCommand {
    /// Release a completed goal's funds to its owner.
    Goal(ReleaseArgs),
    /// Release a completed group's funds to its creator.
    Group(ReleaseArgs),
}

#[derive(Args, Debug)]
struct ReleaseArgs {
    #[arg(long)]
    id: Uuid,
}

#[derive(Args, Debug)]
struct Wallet {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Replay a wallet's entries and repair the stored balance if it drifted.
    Recompute(RecomputeArgs),
}

#[derive(Args, Debug)]
struct RecomputeArgs {
    #[arg(long)]
    user: String,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn print_counts(label: &str, counts: &SweepCounts) {
    println!(
        "{label}: examined {}, released {}, skipped {}, failed {}",
        counts.examined, counts.released, counts.skipped, counts.failed
    );
}

fn print_outcome(outcome: ReleaseOutcome) {
    match outcome {
        ReleaseOutcome::Released { amount } => println!("released {amount}"),
        ReleaseOutcome::NotReady => println!("not ready: target is not completed"),
        ReleaseOutcome::AlreadyReleased => println!("already released"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Sweep => {
            let report = engine.sweep_unreleased().await?;
            print_counts("goals", &report.goals);
            print_counts("groups", &report.groups);
            println!("released total: {}", report.released_total);
            if report.goals.failed + report.groups.failed > 0 {
                eprintln!("some targets failed to release; they stay queued for the next sweep");
                std::process::exit(1);
            }
        }
        Command::Release(Release {
            command: ReleaseCommand::Goal(args),
        }) => {
            print_outcome(engine.release_goal_funds(args.id).await?);
        }
        Command::Release(Release {
            command: ReleaseCommand::Group(args),
        }) => {
            print_outcome(engine.release_group_funds(args.id).await?);
        }
        Command::Wallet(Wallet {
            command: WalletCommand::Recompute(args),
        }) => {
            let audit = engine.recompute_wallet_balance(&args.user).await?;
            if audit.drifted() {
                println!(
                    "balance drifted: stored {}, recomputed {} (rewrote from replay)",
                    audit.stored, audit.recomputed
                );
            } else {
                println!("balance consistent: {}", audit.stored);
            }
        }
    }

    Ok(())
}
