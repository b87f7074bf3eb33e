//! Shirt sets and their shirts.

use super::{check_sequence_id, EntityId, GroupId, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Shirt sizes offered by the legacy client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShirtSize {
    #[serde(rename = "128")]
    Kids128,
    #[serde(rename = "140")]
    Kids140,
    #[serde(rename = "152")]
    Kids152,
    #[serde(rename = "164")]
    Kids164,
    #[serde(rename = "XS")]
    Xs,
    #[serde(rename = "S")]
    S,
    #[serde(rename = "M")]
    M,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "XL")]
    Xl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shirt {
    pub number: u32,
    pub size: ShirtSize,
    pub is_goalkeeper: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShirtSet {
    pub id: EntityId,
    pub group_id: GroupId,
    pub sponsor: String,
    pub color: String,
    pub shirts: Vec<Shirt>,
}

impl ShirtSet {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_sequence_id("shirtSet.id", &self.id)?;
        check_sequence_id("shirtSet.groupId", &self.group_id)
    }
}
