//! Legacy local-storage export, parsed strictly at the boundary.
//!
//! # Responsibility
//! - Decode the untrusted snapshot document into typed records.
//! - Reject documents that do not match the expected shape before any
//!   identifier is allocated.
//!
//! # Invariants
//! - Legacy ids are opaque, non-blank strings. They key the translation table
//!   of one import call and are never persisted.
//! - Top-level arrays are optional; a missing or `null` array is empty.

use super::event::InvitationStatus;
use super::shirt_set::Shirt;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque identifier of a record inside the legacy export.
pub type LegacyId = String;

/// Structural failure of a snapshot document.
#[derive(Debug)]
pub enum SnapshotError {
    /// Document is not valid JSON or does not match the typed shape.
    Decode(serde_json::Error),
    /// A record carries a blank legacy id, so it cannot be referenced.
    BlankLegacyId { kind: &'static str, index: usize },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "snapshot does not match the legacy export shape: {err}"),
            Self::BlankLegacyId { kind, index } => {
                write!(f, "{kind} #{index} has a blank legacy id")
            }
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::BlankLegacyId { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPlayer {
    #[serde(rename = "id", alias = "legacyId")]
    pub legacy_id: LegacyId,
    pub first_name: String,
    pub last_name: String,
    pub birth_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTrainer {
    #[serde(rename = "id", alias = "legacyId")]
    pub legacy_id: LegacyId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyShirtSet {
    #[serde(rename = "id", alias = "legacyId")]
    pub legacy_id: LegacyId,
    pub sponsor: String,
    pub color: String,
    #[serde(default)]
    pub shirts: Vec<Shirt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyShirtAssignment {
    pub player_id: LegacyId,
    pub shirt_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTeam {
    #[serde(rename = "id", alias = "legacyId")]
    pub legacy_id: LegacyId,
    pub name: String,
    pub strength: i32,
    pub start_time: String,
    #[serde(default)]
    pub selected_players: Vec<LegacyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<LegacyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shirt_set_id: Option<LegacyId>,
    #[serde(default)]
    pub shirt_assignments: Vec<LegacyShirtAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyInvitation {
    #[serde(rename = "id", alias = "legacyId")]
    pub legacy_id: LegacyId,
    pub player_id: LegacyId,
    pub status: InvitationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyEvent {
    #[serde(rename = "id", alias = "legacyId")]
    pub legacy_id: LegacyId,
    pub name: String,
    pub date: String,
    pub max_players_per_team: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub teams: Vec<LegacyTeam>,
    #[serde(default)]
    pub invitations: Vec<LegacyInvitation>,
}

/// Whole legacy export as written by the local-storage client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySnapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub players: Vec<LegacyPlayer>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trainers: Vec<LegacyTrainer>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub shirt_sets: Vec<LegacyShirtSet>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<LegacyEvent>,
}

impl LegacySnapshot {
    /// Parses and structurally checks a raw export document.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(raw)?;
        snapshot.check_shape()?;
        Ok(snapshot)
    }

    /// Same as [`LegacySnapshot::from_json`] for an already decoded document.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_value(value)?;
        snapshot.check_shape()?;
        Ok(snapshot)
    }

    /// Total number of top-level records.
    pub fn record_count(&self) -> usize {
        self.players.len() + self.trainers.len() + self.shirt_sets.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    fn check_shape(&self) -> Result<(), SnapshotError> {
        check_ids("player", self.players.iter().map(|p| p.legacy_id.as_str()))?;
        check_ids("trainer", self.trainers.iter().map(|t| t.legacy_id.as_str()))?;
        check_ids(
            "shirt set",
            self.shirt_sets.iter().map(|s| s.legacy_id.as_str()),
        )?;
        check_ids("event", self.events.iter().map(|e| e.legacy_id.as_str()))?;
        for event in &self.events {
            check_ids("team", event.teams.iter().map(|t| t.legacy_id.as_str()))?;
            check_ids(
                "invitation",
                event.invitations.iter().map(|i| i.legacy_id.as_str()),
            )?;
        }
        Ok(())
    }
}

fn check_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), SnapshotError> {
    for (index, id) in ids.enumerate() {
        if id.trim().is_empty() {
            return Err(SnapshotError::BlankLegacyId { kind, index });
        }
    }
    Ok(())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
