//! Events with embedded teams and invitations.
//!
//! # Invariants
//! - An event is stored as one document; its teams and invitations are never
//!   written separately.
//! - Team and invitation ids come from their own namespaces.
//! - Reference fields (`selected_players`, `trainer_id`, `shirt_set_id`,
//!   `player_id`) are not validated: they may carry passed-through legacy ids.

use super::{check_sequence_id, EntityId, GroupId, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Reply state of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Open,
    Accepted,
    Declined,
    Injured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: EntityId,
    pub player_id: EntityId,
    pub status: InvitationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShirtAssignment {
    pub player_id: EntityId,
    pub shirt_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: EntityId,
    pub name: String,
    /// 1 (highest) to 3 (lowest).
    pub strength: i32,
    /// `HH:MM`.
    pub start_time: String,
    pub selected_players: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shirt_set_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shirt_assignments: Vec<ShirtAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EntityId,
    pub group_id: GroupId,
    pub name: String,
    /// ISO date string as exported by the legacy client.
    pub date: String,
    pub max_players_per_team: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub teams: Vec<Team>,
    pub invitations: Vec<Invitation>,
}

impl Event {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_sequence_id("event.id", &self.id)?;
        check_sequence_id("event.groupId", &self.group_id)?;
        for team in &self.teams {
            check_sequence_id("team.id", &team.id)?;
        }
        for invitation in &self.invitations {
            check_sequence_id("invitation.id", &invitation.id)?;
        }
        Ok(())
    }
}
