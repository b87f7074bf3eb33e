//! Core logic of the teams backend: group-scoped storage, shared id
//! sequences and the legacy snapshot importer.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sequence;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::event::{Event, Invitation, InvitationStatus, ShirtAssignment, Team};
pub use model::group::Group;
pub use model::legacy::{LegacySnapshot, SnapshotError};
pub use model::member::{Player, Trainer};
pub use model::shirt_set::{Shirt, ShirtSet, ShirtSize};
pub use model::{EntityId, GroupId, ModelValidationError};
pub use repo::{GroupRepository, RepoError, RepoResult, RepositoryGateway, SqliteRepository};
pub use sequence::{
    InMemorySequenceAllocator, SequenceAllocator, SequenceError, SqliteSequenceAllocator,
};
pub use service::group_service::{GroupService, GroupServiceError};
pub use service::import_endpoint::{ImportEndpoint, ImportError, ImportResponse};
pub use service::import_service::{
    ImportOptions, ImportOutcome, ImportReconciler, ImportSummary, RecordError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
