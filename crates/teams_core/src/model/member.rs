//! Players and trainers.
//!
//! Both live in the single `members` collection and are told apart by role,
//! so they draw ids from one shared namespace.

use super::{check_sequence_id, EntityId, GroupId, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Role discriminator of a member row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Player,
    Trainer,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Trainer => "trainer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "player" => Some(Self::Player),
            "trainer" => Some(Self::Trainer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: EntityId,
    pub group_id: GroupId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    /// ISO date (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Skill level, 1-5 in the legacy client.
    pub level: i32,
}

impl Player {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_sequence_id("player.id", &self.id)?;
        check_sequence_id("player.groupId", &self.group_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub id: EntityId,
    pub group_id: GroupId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Trainer {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_sequence_id("trainer.id", &self.id)?;
        check_sequence_id("trainer.groupId", &self.group_id)
    }
}
