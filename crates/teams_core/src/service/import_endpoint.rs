//! Import entry point handed to the transport layer.
//!
//! # Responsibility
//! - Enforce call-level preconditions (group id present, group exists,
//!   snapshot well-formed) before any id is allocated.
//! - Wrap the reconciler summary into the response envelope.
//!
//! # Invariants
//! - A call-level error means nothing was allocated or written.
//! - Status codes are advisory; the core has no HTTP dependency.

use crate::model::legacy::{LegacySnapshot, SnapshotError};
use crate::model::GroupId;
use crate::repo::{GroupRepository, RepoError, RepositoryGateway};
use crate::sequence::SequenceAllocator;
use crate::service::import_service::{ImportReconciler, ImportSummary};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const IMPORT_COMPLETED_MESSAGE: &str = "Import completed";

/// Call-level import failure.
#[derive(Debug)]
pub enum ImportError {
    MissingGroupId,
    GroupNotFound(GroupId),
    MalformedSnapshot(SnapshotError),
    /// Store unreachable while checking preconditions.
    Storage(RepoError),
}

impl ImportError {
    /// Suggested HTTP status for the transport layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingGroupId | Self::MalformedSnapshot(_) => 400,
            Self::GroupNotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingGroupId => write!(f, "group id is required"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::MalformedSnapshot(err) => write!(f, "malformed snapshot: {err}"),
            Self::Storage(err) => write!(f, "failed to import data: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedSnapshot(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::MissingGroupId | Self::GroupNotFound(_) => None,
        }
    }
}

impl From<SnapshotError> for ImportError {
    fn from(value: SnapshotError) -> Self {
        Self::MalformedSnapshot(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Response envelope returned for every accepted import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub message: String,
    pub summary: ImportSummary,
    pub group_id: GroupId,
}

/// Import use-case over a group lookup and a reconciler.
pub struct ImportEndpoint<A, G, L>
where
    A: SequenceAllocator,
    G: RepositoryGateway,
    L: GroupRepository,
{
    reconciler: ImportReconciler<A, G>,
    groups: L,
}

impl<A, G, L> ImportEndpoint<A, G, L>
where
    A: SequenceAllocator,
    G: RepositoryGateway,
    L: GroupRepository,
{
    pub fn new(reconciler: ImportReconciler<A, G>, groups: L) -> Self {
        Self { reconciler, groups }
    }

    /// Parses a raw export document and imports it.
    pub fn handle(&self, group_id: &str, raw_snapshot: &str) -> Result<ImportResponse, ImportError> {
        let group_id = self.require_group(group_id)?;
        let snapshot = LegacySnapshot::from_json(raw_snapshot).map_err(|err| {
            error!(
                "event=import_request module=import status=error error_code=malformed_snapshot group_id={} error={}",
                group_id, err
            );
            ImportError::from(err)
        })?;
        Ok(self.run(group_id, &snapshot))
    }

    /// Imports an already parsed snapshot.
    pub fn handle_snapshot(
        &self,
        group_id: &str,
        snapshot: &LegacySnapshot,
    ) -> Result<ImportResponse, ImportError> {
        let group_id = self.require_group(group_id)?;
        Ok(self.run(group_id, snapshot))
    }

    fn require_group<'a>(&self, group_id: &'a str) -> Result<&'a str, ImportError> {
        let group_id = group_id.trim();
        if group_id.is_empty() {
            return Err(ImportError::MissingGroupId);
        }
        match self.groups.get_group(group_id) {
            Ok(Some(_)) => Ok(group_id),
            Ok(None) => {
                info!(
                    "event=import_request module=import status=rejected error_code=group_not_found group_id={}",
                    group_id
                );
                Err(ImportError::GroupNotFound(group_id.to_string()))
            }
            Err(err) => {
                error!(
                    "event=import_request module=import status=error error_code=group_lookup_failed group_id={} error={}",
                    group_id, err
                );
                Err(ImportError::Storage(err))
            }
        }
    }

    fn run(&self, group_id: &str, snapshot: &LegacySnapshot) -> ImportResponse {
        let summary = self.reconciler.import(group_id, snapshot);
        ImportResponse {
            message: IMPORT_COMPLETED_MESSAGE.to_string(),
            summary,
            group_id: group_id.to_string(),
        }
    }
}
