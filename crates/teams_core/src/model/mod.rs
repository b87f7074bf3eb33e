//! Group-scoped domain model and the legacy snapshot shape.
//!
//! # Responsibility
//! - Define the durable entities owned by one group.
//! - Define the strictly typed legacy export consumed by the importer.
//!
//! # Invariants
//! - Every durable entity id is a decimal string issued by the sequence
//!   allocator and is never reused.
//! - Teams and invitations only exist embedded in their parent event.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod event;
pub mod group;
pub mod legacy;
pub mod member;
pub mod shirt_set;

/// Durable identifier issued by a sequence namespace.
///
/// Kept as a type alias: ids travel as strings on every wire format, and
/// references may legitimately hold unresolved legacy values.
pub type EntityId = String;

/// Identifier of the owning group.
pub type GroupId = EntityId;

/// Structural validation error for durable entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// An identifier field is not a decimal sequence value.
    InvalidId { field: &'static str, value: String },
    /// A required text field is empty after trimming.
    EmptyField(&'static str),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId { field, value } => {
                write!(f, "{field} must be a decimal sequence id, got `{value}`")
            }
            Self::EmptyField(field) => write!(f, "{field} cannot be empty"),
        }
    }
}

impl Error for ModelValidationError {}

/// Returns whether `value` looks like an id issued by the allocator.
pub fn is_sequence_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

pub(crate) fn check_sequence_id(
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if is_sequence_id(value) {
        Ok(())
    } else {
        Err(ModelValidationError::InvalidId {
            field,
            value: value.to_string(),
        })
    }
}

pub(crate) fn check_not_blank(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        Err(ModelValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}
