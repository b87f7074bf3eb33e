//! Group use-case service.
//!
//! Groups draw ids from the same shared allocator as every other entity.

use crate::model::group::Group;
use crate::repo::{GroupRepository, RepoError};
use crate::sequence::{self, SequenceAllocator, SequenceError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum GroupServiceError {
    InvalidName,
    Sequence(SequenceError),
    Repo(RepoError),
}

impl Display for GroupServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "group name cannot be empty"),
            Self::Sequence(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GroupServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName => None,
            Self::Sequence(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<SequenceError> for GroupServiceError {
    fn from(value: SequenceError) -> Self {
        Self::Sequence(value)
    }
}

impl From<RepoError> for GroupServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct GroupService<A: SequenceAllocator, R: GroupRepository> {
    allocator: A,
    repo: R,
}

impl<A: SequenceAllocator, R: GroupRepository> GroupService<A, R> {
    pub fn new(allocator: A, repo: R) -> Self {
        Self { allocator, repo }
    }

    /// Creates a group with a freshly allocated id.
    pub fn create_group(
        &self,
        name: &str,
        club: Option<&str>,
    ) -> Result<Group, GroupServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GroupServiceError::InvalidName);
        }

        let id = self.allocator.allocate(sequence::GROUPS)?;
        let group = Group {
            id,
            name: name.to_string(),
            club: club.map(str::trim).filter(|club| !club.is_empty()).map(str::to_string),
            created_at: 0,
        };
        let created = self.repo.create_group(&group)?;
        info!(
            "event=group_create module=group status=ok group_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn get_group(&self, id: &str) -> Result<Option<Group>, GroupServiceError> {
        Ok(self.repo.get_group(id)?)
    }
}
