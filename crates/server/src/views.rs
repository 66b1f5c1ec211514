//! Mapping from engine types to wire DTOs.
//!
//! Kept in one place because several endpoint modules share the same views
//! (a contribution receipt carries a wallet, a contribution and a target
//! snapshot at once).

use api_types::{
    Currency, contribution, goal, group, reconciliation, release, target, transaction, wallet,
};

pub(crate) fn map_currency(currency: ledger::Currency) -> Currency {
    match currency {
        ledger::Currency::Ngn => Currency::Ngn,
    }
}

pub(crate) fn map_kind(kind: ledger::TransactionKind) -> transaction::TransactionKind {
    match kind {
        ledger::TransactionKind::Deposit => transaction::TransactionKind::Deposit,
        ledger::TransactionKind::Withdrawal => transaction::TransactionKind::Withdrawal,
        ledger::TransactionKind::Contribution => transaction::TransactionKind::Contribution,
        ledger::TransactionKind::GoalRelease => transaction::TransactionKind::GoalRelease,
        ledger::TransactionKind::GroupRelease => transaction::TransactionKind::GroupRelease,
        ledger::TransactionKind::Fee => transaction::TransactionKind::Fee,
        ledger::TransactionKind::Refund => transaction::TransactionKind::Refund,
    }
}

pub(crate) fn map_transaction_status(
    status: ledger::TransactionStatus,
) -> transaction::TransactionStatus {
    match status {
        ledger::TransactionStatus::Pending => transaction::TransactionStatus::Pending,
        ledger::TransactionStatus::Completed => transaction::TransactionStatus::Completed,
        ledger::TransactionStatus::Failed => transaction::TransactionStatus::Failed,
    }
}

pub(crate) fn engine_transaction_status(
    status: transaction::TransactionStatus,
) -> ledger::TransactionStatus {
    match status {
        transaction::TransactionStatus::Pending => ledger::TransactionStatus::Pending,
        transaction::TransactionStatus::Completed => ledger::TransactionStatus::Completed,
        transaction::TransactionStatus::Failed => ledger::TransactionStatus::Failed,
    }
}

pub(crate) fn map_target_kind(kind: ledger::TargetKind) -> target::TargetKind {
    match kind {
        ledger::TargetKind::Goal => target::TargetKind::Goal,
        ledger::TargetKind::Group => target::TargetKind::Group,
    }
}

pub(crate) fn map_target_status(status: ledger::TargetStatus) -> target::TargetStatus {
    match status {
        ledger::TargetStatus::Active => target::TargetStatus::Active,
        ledger::TargetStatus::Completed => target::TargetStatus::Completed,
        ledger::TargetStatus::Cancelled => target::TargetStatus::Cancelled,
    }
}

pub(crate) fn map_role(role: ledger::GroupRole) -> group::GroupRole {
    match role {
        ledger::GroupRole::Owner => group::GroupRole::Owner,
        ledger::GroupRole::Member => group::GroupRole::Member,
    }
}

pub(crate) fn map_frequency(frequency: ledger::ScheduleFrequency) -> goal::ScheduleFrequency {
    match frequency {
        ledger::ScheduleFrequency::Daily => goal::ScheduleFrequency::Daily,
        ledger::ScheduleFrequency::Weekly => goal::ScheduleFrequency::Weekly,
        ledger::ScheduleFrequency::Monthly => goal::ScheduleFrequency::Monthly,
        ledger::ScheduleFrequency::Custom => goal::ScheduleFrequency::Custom,
    }
}

pub(crate) fn engine_frequency(frequency: goal::ScheduleFrequency) -> ledger::ScheduleFrequency {
    match frequency {
        goal::ScheduleFrequency::Daily => ledger::ScheduleFrequency::Daily,
        goal::ScheduleFrequency::Weekly => ledger::ScheduleFrequency::Weekly,
        goal::ScheduleFrequency::Monthly => ledger::ScheduleFrequency::Monthly,
        goal::ScheduleFrequency::Custom => ledger::ScheduleFrequency::Custom,
    }
}

pub(crate) fn wallet_view(wallet: ledger::Wallet) -> wallet::WalletView {
    wallet::WalletView {
        id: wallet.id,
        user_id: wallet.user_id,
        balance_minor: wallet.balance.minor(),
        currency: map_currency(wallet.currency),
        active: wallet.active,
        created_at: wallet.created_at,
    }
}

pub(crate) fn transaction_view(entry: ledger::Transaction) -> transaction::TransactionView {
    transaction::TransactionView {
        id: entry.id,
        kind: map_kind(entry.kind),
        amount_minor: entry.amount.minor(),
        currency: map_currency(entry.currency),
        description: entry.description,
        status: map_transaction_status(entry.status),
        reference: entry.reference,
        occurred_at: entry.occurred_at,
    }
}

pub(crate) fn schedule_view(schedule: ledger::ContributionSchedule) -> goal::ScheduleView {
    goal::ScheduleView {
        frequency: map_frequency(schedule.frequency),
        amount_minor: schedule.amount.map(ledger::MoneyMinor::minor),
        custom_dates: schedule.custom_dates,
        next_due_at: schedule.next_due_at,
        last_contribution_at: schedule.last_contribution_at,
    }
}

pub(crate) fn goal_view(goal: ledger::Goal) -> goal::GoalView {
    goal::GoalView {
        id: goal.id,
        user_id: goal.user_id,
        name: goal.name,
        target_minor: goal.target.minor(),
        current_minor: goal.current.minor(),
        currency: map_currency(goal.currency),
        status: map_target_status(goal.status),
        completed_at: goal.completed_at,
        funds_released: goal.funds_released,
        funds_released_at: goal.funds_released_at,
        schedule: goal.schedule.map(schedule_view),
        created_at: goal.created_at,
    }
}

pub(crate) fn group_view(group: ledger::Group) -> group::GroupView {
    group::GroupView {
        id: group.id,
        created_by: group.created_by,
        name: group.name,
        target_minor: group.target.minor(),
        current_minor: group.current.minor(),
        currency: map_currency(group.currency),
        status: map_target_status(group.status),
        completed_at: group.completed_at,
        funds_released: group.funds_released,
        funds_released_at: group.funds_released_at,
        created_at: group.created_at,
    }
}

pub(crate) fn member_view(member: ledger::GroupMember) -> group::MemberView {
    group::MemberView {
        user_id: member.user_id,
        role: map_role(member.role),
        active: member.active,
        total_contributed_minor: member.total_contributed.minor(),
        joined_at: member.joined_at,
    }
}

pub(crate) fn contribution_view(record: ledger::Contribution) -> contribution::ContributionView {
    contribution::ContributionView {
        id: record.id,
        user_id: record.user_id,
        target_kind: map_target_kind(record.target.kind()),
        target_id: record.target.id(),
        target_name: record.target_name,
        amount_minor: record.amount.minor(),
        currency: map_currency(record.currency),
        payment_method: match record.payment_method {
            ledger::PaymentMethod::Wallet => contribution::PaymentMethod::Wallet,
        },
        status: match record.status {
            ledger::ContributionStatus::Completed => contribution::ContributionStatus::Completed,
            ledger::ContributionStatus::Failed => contribution::ContributionStatus::Failed,
        },
        reference: record.reference,
        occurred_at: record.occurred_at,
    }
}

pub(crate) fn target_view(snapshot: ledger::TargetSnapshot) -> target::TargetView {
    target::TargetView {
        id: snapshot.id,
        kind: map_target_kind(snapshot.kind),
        name: snapshot.name,
        target_minor: snapshot.target.minor(),
        current_minor: snapshot.current.minor(),
        status: map_target_status(snapshot.status),
        funds_released: snapshot.funds_released,
    }
}

pub(crate) fn release_view(outcome: ledger::ReleaseOutcome) -> release::ReleaseOutcome {
    match outcome {
        ledger::ReleaseOutcome::Released { amount } => release::ReleaseOutcome::Released {
            amount_minor: amount.minor(),
        },
        ledger::ReleaseOutcome::NotReady => release::ReleaseOutcome::NotReady,
        ledger::ReleaseOutcome::AlreadyReleased => release::ReleaseOutcome::AlreadyReleased,
    }
}

pub(crate) fn receipt_view(receipt: ledger::ContributionReceipt) -> contribution::ContributionReceipt {
    contribution::ContributionReceipt {
        wallet: wallet_view(receipt.wallet),
        contribution: contribution_view(receipt.contribution),
        target: target_view(receipt.target),
        completed: receipt.completed,
        release: receipt.release.map(release_view),
    }
}

pub(crate) fn sweep_counts_view(counts: ledger::SweepCounts) -> reconciliation::SweepCounts {
    reconciliation::SweepCounts {
        examined: counts.examined,
        released: counts.released,
        skipped: counts.skipped,
        failed: counts.failed,
    }
}

pub(crate) fn sweep_report_view(report: ledger::SweepReport) -> reconciliation::SweepReport {
    reconciliation::SweepReport {
        goals: sweep_counts_view(report.goals),
        groups: sweep_counts_view(report.groups),
        released_total_minor: report.released_total.minor(),
        finished_at: report.finished_at,
    }
}

pub(crate) fn reconciler_status_view(
    status: ledger::ReconcilerStatus,
) -> reconciliation::ReconcilerStatus {
    reconciliation::ReconcilerStatus {
        running: status.running,
        runs: status.runs,
        last_run_at: status.last_run_at,
        last_report: status.last_report.map(sweep_report_view),
    }
}
