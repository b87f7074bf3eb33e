//! Group: the owner of every imported entity.

use super::{check_not_blank, check_sequence_id, GroupId, ModelValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
    /// Unix epoch milliseconds, assigned by the store.
    #[serde(default)]
    pub created_at: i64,
}

impl Group {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_sequence_id("group.id", &self.id)?;
        check_not_blank("group.name", &self.name)
    }
}
