//! Wallet transaction primitives.
//!
//! A `Transaction` is an append-only ledger entry: every balance-affecting
//! event on a wallet is recorded as one signed entry. Completed entries are
//! immutable; only `pending` withdrawal reservations ever change status.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, LedgerError, MoneyMinor, ResultLedger, TargetKind,
    util::{encode_metadata, model_currency, parse_metadata, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Contribution,
    GoalRelease,
    GroupRelease,
    Fee,
    Refund,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Contribution => "contribution",
            Self::GoalRelease => "goal_release",
            Self::GroupRelease => "group_release",
            Self::Fee => "fee",
            Self::Refund => "refund",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "contribution" => Ok(Self::Contribution),
            "goal_release" => Ok(Self::GoalRelease),
            "group_release" => Ok(Self::GroupRelease),
            "fee" => Ok(Self::Fee),
            "refund" => Ok(Self::Refund),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Disposition of a ledger entry.
///
/// `Pending` exists only for withdrawal reservations: the amount is already
/// deducted from the spendable balance while awaiting approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Optional back-reference from a ledger entry to the goal or group it was
/// recorded for. Never an ownership edge; purely for audit and filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetRef {
    Goal { goal_id: Uuid },
    Group { group_id: Uuid },
}

impl TargetRef {
    pub fn new(kind: TargetKind, id: Uuid) -> Self {
        match kind {
            TargetKind::Goal => Self::Goal { goal_id: id },
            TargetKind::Group => Self::Group { group_id: id },
        }
    }

    pub fn kind(self) -> TargetKind {
        match self {
            Self::Goal { .. } => TargetKind::Goal,
            Self::Group { .. } => TargetKind::Group,
        }
    }

    pub fn id(self) -> Uuid {
        match self {
            Self::Goal { goal_id } => goal_id,
            Self::Group { group_id } => group_id,
        }
    }

    pub(crate) fn from_columns(
        ref_kind: Option<&str>,
        ref_id: Option<&str>,
    ) -> ResultLedger<Option<Self>> {
        match (ref_kind, ref_id) {
            (None, None) => Ok(None),
            (Some(kind), Some(id)) => {
                let id = parse_uuid(id, "target ref")?;
                Ok(Some(Self::new(TargetKind::try_from(kind)?, id)))
            }
            _ => Err(LedgerError::InvalidId(
                "target ref kind and id must be set together".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub kind: TransactionKind,
    /// Signed amount: positive entries increase the balance.
    pub amount: MoneyMinor,
    pub currency: Currency,
    pub description: String,
    pub status: TransactionStatus,
    pub target: Option<TargetRef>,
    /// External reference code (e.g. a payment processor id).
    pub reference: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        wallet_id: Uuid,
        kind: TransactionKind,
        amount: MoneyMinor,
        currency: Currency,
        description: String,
        status: TransactionStatus,
        target: Option<TargetRef>,
        reference: Option<String>,
        metadata: Option<serde_json::Value>,
        occurred_at: DateTime<Utc>,
    ) -> ResultLedger<Self> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount(
                "amount_minor must not be 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            wallet_id,
            kind,
            amount,
            currency,
            description,
            status,
            target,
            reference,
            metadata,
            occurred_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub wallet_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub status: String,
    pub ref_kind: Option<String>,
    pub ref_id: Option<String>,
    pub reference: Option<String>,
    pub metadata: Option<String>,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id"
    )]
    Wallet,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            wallet_id: ActiveValue::Set(tx.wallet_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            ref_kind: ActiveValue::Set(tx.target.map(|t| t.kind().as_str().to_string())),
            ref_id: ActiveValue::Set(tx.target.map(|t| t.id().to_string())),
            reference: ActiveValue::Set(tx.reference.clone()),
            metadata: ActiveValue::Set(encode_metadata(tx.metadata.as_ref())),
            occurred_at: ActiveValue::Set(tx.occurred_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            wallet_id: parse_uuid(&model.wallet_id, "wallet")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: MoneyMinor::new(model.amount_minor),
            currency: model_currency(&model.currency)?,
            description: model.description,
            status: TransactionStatus::try_from(model.status.as_str())?,
            target: TargetRef::from_columns(model.ref_kind.as_deref(), model.ref_id.as_deref())?,
            reference: model.reference,
            metadata: parse_metadata(model.metadata.as_deref())?,
            occurred_at: model.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_amount() {
        let result = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Deposit,
            MoneyMinor::ZERO,
            Currency::Ngn,
            "zero".to_string(),
            TransactionStatus::Completed,
            None,
            None,
            None,
            Utc::now(),
        );
        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn entry_round_trips_through_model() {
        let goal_id = Uuid::new_v4();
        let tx = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Contribution,
            MoneyMinor::new(-5_000),
            Currency::Ngn,
            "Contribution to goal 'Rent'".to_string(),
            TransactionStatus::Completed,
            Some(TargetRef::Goal { goal_id }),
            Some("TXN-abc".to_string()),
            Some(serde_json::json!({ "channel": "wallet" })),
            Utc::now(),
        )
        .unwrap();

        let model = Model {
            id: tx.id.to_string(),
            wallet_id: tx.wallet_id.to_string(),
            kind: "contribution".to_string(),
            amount_minor: -5_000,
            currency: "NGN".to_string(),
            description: tx.description.clone(),
            status: "completed".to_string(),
            ref_kind: Some("goal".to_string()),
            ref_id: Some(goal_id.to_string()),
            reference: Some("TXN-abc".to_string()),
            metadata: Some(r#"{"channel":"wallet"}"#.to_string()),
            occurred_at: tx.occurred_at,
        };

        assert_eq!(Transaction::try_from(model).unwrap(), tx);
    }

    #[test]
    fn target_ref_rejects_half_set_columns() {
        let result = TargetRef::from_columns(Some("goal"), None);
        assert!(matches!(result, Err(LedgerError::InvalidId(_))));
    }
}
