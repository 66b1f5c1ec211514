//! Shared savings groups.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, FundableTarget, LedgerError, MoneyMinor, ResultLedger, TargetKind, TargetStatus,
    util::{model_currency, parse_uuid},
};

/// A savings target shared by several members.
///
/// Financially a group behaves exactly like a goal; the difference is that
/// contributions require an active membership and the released funds go to
/// the creator's wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub created_by: String,
    pub name: String,
    pub target: MoneyMinor,
    pub current: MoneyMinor,
    pub currency: Currency,
    pub status: TargetStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub funds_released: bool,
    pub funds_released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(created_by: String, name: String, target: MoneyMinor) -> ResultLedger<Self> {
        if !target.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "target_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            created_by,
            name,
            target,
            current: MoneyMinor::ZERO,
            currency: Currency::default(),
            status: TargetStatus::Active,
            completed_at: None,
            funds_released: false,
            funds_released_at: None,
            created_at: Utc::now(),
        })
    }
}

impl FundableTarget for Group {
    fn fundable_id(&self) -> Uuid {
        self.id
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Group
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn target_amount(&self) -> MoneyMinor {
        self.target
    }

    fn current_amount(&self) -> MoneyMinor {
        self.current
    }

    fn status(&self) -> TargetStatus {
        self.status
    }

    fn funds_released(&self) -> bool {
        self.funds_released
    }

    fn currency(&self) -> Currency {
        self.currency
    }

    fn beneficiary(&self) -> &str {
        &self.created_by
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_by: String,
    pub name: String,
    pub target_minor: i64,
    pub current_minor: i64,
    pub currency: String,
    pub status: String,
    pub completed_at: Option<DateTimeUtc>,
    pub funds_released: bool,
    pub funds_released_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_members::Entity")]
    Members,
}

impl Related<super::group_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Group> for ActiveModel {
    fn from(value: &Group) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            created_by: ActiveValue::Set(value.created_by.clone()),
            name: ActiveValue::Set(value.name.clone()),
            target_minor: ActiveValue::Set(value.target.minor()),
            current_minor: ActiveValue::Set(value.current.minor()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            completed_at: ActiveValue::Set(value.completed_at),
            funds_released: ActiveValue::Set(value.funds_released),
            funds_released_at: ActiveValue::Set(value.funds_released_at),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Group {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "group")?,
            created_by: model.created_by,
            name: model.name,
            target: MoneyMinor::new(model.target_minor),
            current: MoneyMinor::new(model.current_minor),
            currency: model_currency(&model.currency)?,
            status: TargetStatus::try_from(model.status.as_str())?,
            completed_at: model.completed_at,
            funds_released: model.funds_released,
            funds_released_at: model.funds_released_at,
            created_at: model.created_at,
        })
    }
}
