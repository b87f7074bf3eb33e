//! Repository contracts and the SQLite persistence implementation.
//!
//! # Responsibility
//! - Define the write gateway consumed by the importer.
//! - Define group lookup and the read-back queries used to verify imports.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Write paths call the entity `validate()` before SQL mutations.
//! - Each `create_*` call is one atomic write; an event is stored together
//!   with its embedded teams and invitations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::event::Event;
use crate::model::group::Group;
use crate::model::member::{Player, Trainer};
use crate::model::shirt_set::ShirtSet;
use crate::model::{EntityId, ModelValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure for entity writes and lookups.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    NotFound { kind: &'static str, id: EntityId },
    /// Embedded document could not be encoded or decoded.
    Document(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Document(err) => write!(f, "embedded document error: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Document(value)
    }
}

/// Write capability consumed by the importer.
///
/// Every call receives a fully formed entity, references already rewritten,
/// and either stores all of it or nothing.
pub trait RepositoryGateway {
    fn create_player(&self, player: Player) -> RepoResult<Player>;
    fn create_trainer(&self, trainer: Trainer) -> RepoResult<Trainer>;
    fn create_shirt_set(&self, shirt_set: ShirtSet) -> RepoResult<ShirtSet>;
    fn create_event(&self, event: Event) -> RepoResult<Event>;
}

impl<G: RepositoryGateway + ?Sized> RepositoryGateway for &G {
    fn create_player(&self, player: Player) -> RepoResult<Player> {
        (**self).create_player(player)
    }

    fn create_trainer(&self, trainer: Trainer) -> RepoResult<Trainer> {
        (**self).create_trainer(trainer)
    }

    fn create_shirt_set(&self, shirt_set: ShirtSet) -> RepoResult<ShirtSet> {
        (**self).create_shirt_set(shirt_set)
    }

    fn create_event(&self, event: Event) -> RepoResult<Event> {
        (**self).create_event(event)
    }
}

/// Group storage used by group management and the import precondition.
pub trait GroupRepository {
    fn create_group(&self, group: &Group) -> RepoResult<Group>;
    fn get_group(&self, id: &str) -> RepoResult<Option<Group>>;
}

impl<G: GroupRepository + ?Sized> GroupRepository for &G {
    fn create_group(&self, group: &Group) -> RepoResult<Group> {
        (**self).create_group(group)
    }

    fn get_group(&self, id: &str) -> RepoResult<Option<Group>> {
        (**self).get_group(id)
    }
}
