//! Group membership rows.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, MoneyMinor, util::parse_uuid};

/// Role of a user inside a savings group.
///
/// The creator is always the `Owner`; everyone else joins as `Member`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Owner,
    Member,
}

impl GroupRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }
}

impl TryFrom<&str> for GroupRole {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            other => Err(LedgerError::InvalidId(format!("invalid role: {other}"))),
        }
    }
}

/// One user's membership in one group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: String,
    pub role: GroupRole,
    pub active: bool,
    /// Running total of this member's completed contributions.
    pub total_contributed: MoneyMinor,
    pub joined_at: DateTime<Utc>,
}

impl GroupMember {
    pub fn new(group_id: Uuid, user_id: String, role: GroupRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            user_id,
            role,
            active: true,
            total_contributed: MoneyMinor::ZERO,
            joined_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub user_id: String,
    pub role: String,
    pub active: bool,
    pub total_contributed_minor: i64,
    pub joined_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id"
    )]
    Group,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&GroupMember> for ActiveModel {
    fn from(value: &GroupMember) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            group_id: ActiveValue::Set(value.group_id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            role: ActiveValue::Set(value.role.as_str().to_string()),
            active: ActiveValue::Set(value.active),
            total_contributed_minor: ActiveValue::Set(value.total_contributed.minor()),
            joined_at: ActiveValue::Set(value.joined_at),
        }
    }
}

impl TryFrom<Model> for GroupMember {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "membership")?,
            group_id: parse_uuid(&model.group_id, "group")?,
            user_id: model.user_id,
            role: GroupRole::try_from(model.role.as_str())?,
            active: model.active,
            total_contributed: MoneyMinor::new(model.total_contributed_minor),
            joined_at: model.joined_at,
        })
    }
}
