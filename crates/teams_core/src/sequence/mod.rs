//! Durable per-namespace identifier sequences.
//!
//! # Responsibility
//! - Issue collision-free, strictly increasing ids per namespace.
//! - Bootstrap zero-valued counters without ever resetting live ones.
//!
//! # Invariants
//! - Increment and fetch happen in one store-level atomic operation.
//! - A value is returned only after the increment was applied.
//! - Namespaces are independent; allocating in one never moves another.
//! - Gaps are tolerated: an id allocated for a record that then fails to
//!   persist is burned, not handed out again.

use crate::db::DbError;
use crate::model::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::InMemorySequenceAllocator;
pub use sqlite::SqliteSequenceAllocator;

pub const GROUPS: &str = "groups";
/// Shared by players and trainers: both live in the `members` collection.
pub const MEMBERS: &str = "members";
pub const EVENTS: &str = "events";
pub const SHIRT_SETS: &str = "shirtsets";
pub const INVITATIONS: &str = "invitations";
pub const TEAMS: &str = "teams";

/// Namespaces pre-created by [`SqliteSequenceAllocator::initialize`] at startup.
pub const KNOWN_NAMESPACES: &[&str] = &[GROUPS, MEMBERS, EVENTS, SHIRT_SETS, INVITATIONS, TEAMS];

const MAX_NAMESPACE_LEN: usize = 64;

pub type SequenceResult<T> = Result<T, SequenceError>;

/// Underlying reason an increment could not be applied.
#[derive(Debug)]
pub enum AllocationCause {
    Db(DbError),
    /// Counter state is unusable after a panic in another caller.
    Poisoned,
    /// Stored counter holds a value outside the unsigned range.
    CorruptCounter(i64),
}

impl Display for AllocationCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "counter lock poisoned"),
            Self::CorruptCounter(value) => write!(f, "stored counter value {value} is invalid"),
        }
    }
}

#[derive(Debug)]
pub enum SequenceError {
    InvalidNamespace(String),
    AllocationFailure {
        namespace: String,
        cause: AllocationCause,
    },
}

impl SequenceError {
    pub(crate) fn failure(namespace: &str, cause: AllocationCause) -> Self {
        Self::AllocationFailure {
            namespace: namespace.to_string(),
            cause,
        }
    }
}

impl Display for SequenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNamespace(value) => write!(f, "sequence namespace is invalid: `{value}`"),
            Self::AllocationFailure { namespace, cause } => {
                write!(f, "failed to allocate id in namespace `{namespace}`: {cause}")
            }
        }
    }
}

impl Error for SequenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AllocationFailure {
                cause: AllocationCause::Db(err),
                ..
            } => Some(err),
            _ => None,
        }
    }
}

/// Atomic increment-and-fetch over named counters.
///
/// The first allocation in an unseen namespace returns `"1"`.
pub trait SequenceAllocator {
    fn allocate(&self, namespace: &str) -> SequenceResult<EntityId>;
}

impl<A: SequenceAllocator + ?Sized> SequenceAllocator for &A {
    fn allocate(&self, namespace: &str) -> SequenceResult<EntityId> {
        (**self).allocate(namespace)
    }
}

pub(crate) fn validate_namespace(namespace: &str) -> SequenceResult<()> {
    let valid = !namespace.is_empty()
        && namespace.len() <= MAX_NAMESPACE_LEN
        && namespace
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_' || byte == b'-');
    if valid {
        Ok(())
    } else {
        Err(SequenceError::InvalidNamespace(namespace.to_string()))
    }
}
