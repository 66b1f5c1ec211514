//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for Kolo:
//!
//! - `wallets`: one spendable balance per user identity
//! - `wallet_transactions`: append-only signed ledger entries
//! - `goals`: personal savings targets, with optional schedule columns
//! - `groups`: shared savings targets
//! - `group_members`: group enrolment and per-member running totals
//! - `contributions`: audit records of contribution attempts

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Wallets {
    Table,
    Id,
    UserId,
    BalanceMinor,
    Currency,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum WalletTransactions {
    Table,
    Id,
    WalletId,
    Kind,
    AmountMinor,
    Currency,
    Description,
    Status,
    RefKind,
    RefId,
    Reference,
    Metadata,
    OccurredAt,
}

#[derive(Iden)]
enum Goals {
    Table,
    Id,
    UserId,
    Name,
    TargetMinor,
    CurrentMinor,
    Currency,
    Status,
    CompletedAt,
    FundsReleased,
    FundsReleasedAt,
    ScheduleFrequency,
    ScheduleAmountMinor,
    ScheduleCustomDates,
    ScheduleNextDueAt,
    ScheduleLastContributionAt,
    CreatedAt,
}

#[derive(Iden)]
enum Groups {
    Table,
    Id,
    CreatedBy,
    Name,
    TargetMinor,
    CurrentMinor,
    Currency,
    Status,
    CompletedAt,
    FundsReleased,
    FundsReleasedAt,
    CreatedAt,
}

#[derive(Iden)]
enum GroupMembers {
    Table,
    Id,
    GroupId,
    UserId,
    Role,
    Active,
    TotalContributedMinor,
    JoinedAt,
}

#[derive(Iden)]
enum Contributions {
    Table,
    Id,
    UserId,
    TargetKind,
    TargetId,
    TargetName,
    AmountMinor,
    Currency,
    PaymentMethod,
    Status,
    Reference,
    OccurredAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Wallets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wallets::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Wallets::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Wallets::Currency)
                            .string()
                            .not_null()
                            .default("NGN"),
                    )
                    .col(ColumnDef::new(Wallets::Active).boolean().not_null())
                    .col(ColumnDef::new(Wallets::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallets-user_id-unique")
                    .table(Wallets::Table)
                    .col(Wallets::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Wallet Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(WalletTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::WalletId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(WalletTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Currency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletTransactions::RefKind).string())
                    .col(ColumnDef::new(WalletTransactions::RefId).string())
                    .col(ColumnDef::new(WalletTransactions::Reference).string())
                    .col(ColumnDef::new(WalletTransactions::Metadata).string())
                    .col(
                        ColumnDef::new(WalletTransactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallet_transactions-wallet_id")
                            .from(WalletTransactions::Table, WalletTransactions::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallet_transactions-wallet_id-occurred_at")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::WalletId)
                    .col(WalletTransactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallet_transactions-wallet_id-status")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::WalletId)
                    .col(WalletTransactions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallet_transactions-ref")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::RefKind)
                    .col(WalletTransactions::RefId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Goals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Goals::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Goals::UserId).string().not_null())
                    .col(ColumnDef::new(Goals::Name).string().not_null())
                    .col(ColumnDef::new(Goals::TargetMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Goals::CurrentMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Goals::Currency)
                            .string()
                            .not_null()
                            .default("NGN"),
                    )
                    .col(ColumnDef::new(Goals::Status).string().not_null())
                    .col(ColumnDef::new(Goals::CompletedAt).timestamp())
                    .col(ColumnDef::new(Goals::FundsReleased).boolean().not_null())
                    .col(ColumnDef::new(Goals::FundsReleasedAt).timestamp())
                    .col(ColumnDef::new(Goals::ScheduleFrequency).string())
                    .col(ColumnDef::new(Goals::ScheduleAmountMinor).big_integer())
                    .col(ColumnDef::new(Goals::ScheduleCustomDates).string())
                    .col(ColumnDef::new(Goals::ScheduleNextDueAt).timestamp())
                    .col(ColumnDef::new(Goals::ScheduleLastContributionAt).timestamp())
                    .col(ColumnDef::new(Goals::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goals-user_id")
                    .table(Goals::Table)
                    .col(Goals::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goals-status-funds_released")
                    .table(Goals::Table)
                    .col(Goals::Status)
                    .col(Goals::FundsReleased)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Groups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Groups::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(
                        ColumnDef::new(Groups::TargetMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Groups::CurrentMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Groups::Currency)
                            .string()
                            .not_null()
                            .default("NGN"),
                    )
                    .col(ColumnDef::new(Groups::Status).string().not_null())
                    .col(ColumnDef::new(Groups::CompletedAt).timestamp())
                    .col(ColumnDef::new(Groups::FundsReleased).boolean().not_null())
                    .col(ColumnDef::new(Groups::FundsReleasedAt).timestamp())
                    .col(ColumnDef::new(Groups::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-groups-created_by")
                    .table(Groups::Table)
                    .col(Groups::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-groups-status-funds_released")
                    .table(Groups::Table)
                    .col(Groups::Status)
                    .col(Groups::FundsReleased)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Group Members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMembers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupMembers::GroupId).string().not_null())
                    .col(ColumnDef::new(GroupMembers::UserId).string().not_null())
                    .col(ColumnDef::new(GroupMembers::Role).string().not_null())
                    .col(ColumnDef::new(GroupMembers::Active).boolean().not_null())
                    .col(
                        ColumnDef::new(GroupMembers::TotalContributedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupMembers::JoinedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_members-group_id")
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_members-group_id-user_id-unique")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::GroupId)
                    .col(GroupMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_members-user_id")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Contributions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Contributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contributions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contributions::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Contributions::TargetKind)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contributions::TargetId).string().not_null())
                    .col(
                        ColumnDef::new(Contributions::TargetName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contributions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contributions::Currency).string().not_null())
                    .col(
                        ColumnDef::new(Contributions::PaymentMethod)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contributions::Status).string().not_null())
                    .col(ColumnDef::new(Contributions::Reference).string().not_null())
                    .col(
                        ColumnDef::new(Contributions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-contributions-user_id-occurred_at")
                    .table(Contributions::Table)
                    .col(Contributions::UserId)
                    .col(Contributions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-contributions-target")
                    .table(Contributions::Table)
                    .col(Contributions::TargetKind)
                    .col(Contributions::TargetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-contributions-reference-unique")
                    .table(Contributions::Table)
                    .col(Contributions::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Contributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await?;
        Ok(())
    }
}
