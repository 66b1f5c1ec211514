//! Contribution audit records.
//!
//! Every contribution attempt leaves a record here, successful or not. These
//! rows are read-mostly history for statements and support queries; wallet
//! balances are computed from the transaction ledger alone, never from this
//! table.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, LedgerError, MoneyMinor,
    transactions::TargetRef,
    util::{model_currency, parse_uuid},
};

/// How a contribution was funded. Only wallet balance is supported; the
/// enum keeps the column honest if other rails are ever added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "wallet" => Ok(Self::Wallet),
            other => Err(LedgerError::InvalidId(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionStatus {
    Completed,
    Failed,
}

impl ContributionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for ContributionStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(LedgerError::InvalidId(format!(
                "invalid contribution status: {other}"
            ))),
        }
    }
}

/// One contribution attempt against a goal or group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: Uuid,
    pub user_id: String,
    pub target: TargetRef,
    /// Target name at the time of the contribution. Denormalized so history
    /// survives renames.
    pub target_name: String,
    pub amount: MoneyMinor,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub status: ContributionStatus,
    /// External reference code, e.g. `TXN-94ae03…`.
    pub reference: String,
    pub occurred_at: DateTime<Utc>,
}

impl Contribution {
    pub fn new(
        user_id: String,
        target: TargetRef,
        target_name: String,
        amount: MoneyMinor,
        currency: Currency,
        status: ContributionStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            target,
            target_name,
            amount,
            currency,
            payment_method: PaymentMethod::Wallet,
            status,
            reference: format!("TXN-{}", Uuid::new_v4().simple()),
            occurred_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub target_kind: String,
    pub target_id: String,
    pub target_name: String,
    pub amount_minor: i64,
    pub currency: String,
    pub payment_method: String,
    pub status: String,
    pub reference: String,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Contribution> for ActiveModel {
    fn from(value: &Contribution) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            target_kind: ActiveValue::Set(value.target.kind().as_str().to_string()),
            target_id: ActiveValue::Set(value.target.id().to_string()),
            target_name: ActiveValue::Set(value.target_name.clone()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            payment_method: ActiveValue::Set(value.payment_method.as_str().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            reference: ActiveValue::Set(value.reference.clone()),
            occurred_at: ActiveValue::Set(value.occurred_at),
        }
    }
}

impl TryFrom<Model> for Contribution {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let target = TargetRef::from_columns(Some(&model.target_kind), Some(&model.target_id))?
            .ok_or_else(|| LedgerError::InvalidId("contribution without target".to_string()))?;
        Ok(Self {
            id: parse_uuid(&model.id, "contribution")?,
            user_id: model.user_id,
            target,
            target_name: model.target_name,
            amount: MoneyMinor::new(model.amount_minor),
            currency: model_currency(&model.currency)?,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            status: ContributionStatus::try_from(model.status.as_str())?,
            reference: model.reference,
            occurred_at: model.occurred_at,
        })
    }
}
