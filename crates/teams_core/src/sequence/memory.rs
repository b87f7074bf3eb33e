//! Process-local sequence counters.
//!
//! Used where no durable store is attached (tests, embedding). The mutex is
//! the store here: increment and fetch happen under one lock acquisition.

use super::{
    validate_namespace, AllocationCause, SequenceAllocator, SequenceError, SequenceResult,
};
use crate::model::EntityId;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemorySequenceAllocator {
    counters: Mutex<HashMap<String, u64>>,
}

impl InMemorySequenceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-creates zero-valued counters; existing counters are left untouched.
    pub fn initialize(&self, namespaces: &[&str]) -> SequenceResult<usize> {
        for namespace in namespaces {
            validate_namespace(namespace)?;
        }
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| SequenceError::failure("*", AllocationCause::Poisoned))?;
        let mut created = 0;
        for namespace in namespaces {
            if !counters.contains_key(*namespace) {
                counters.insert((*namespace).to_string(), 0);
                created += 1;
            }
        }
        Ok(created)
    }

    /// Returns the last issued value, or 0 when nothing was issued yet.
    pub fn current(&self, namespace: &str) -> SequenceResult<u64> {
        validate_namespace(namespace)?;
        let counters = self
            .counters
            .lock()
            .map_err(|_| SequenceError::failure(namespace, AllocationCause::Poisoned))?;
        Ok(counters.get(namespace).copied().unwrap_or(0))
    }
}

impl SequenceAllocator for InMemorySequenceAllocator {
    fn allocate(&self, namespace: &str) -> SequenceResult<EntityId> {
        validate_namespace(namespace)?;
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| SequenceError::failure(namespace, AllocationCause::Poisoned))?;
        let counter = counters.entry(namespace.to_string()).or_insert(0);
        *counter += 1;
        Ok(counter.to_string())
    }
}
