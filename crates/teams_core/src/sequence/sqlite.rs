//! SQLite-backed sequence counters (`sequences` table).

use super::{
    validate_namespace, AllocationCause, SequenceAllocator, SequenceError, SequenceResult,
};
use crate::db::DbError;
use crate::model::EntityId;
use log::{error, info, trace};
use rusqlite::{Connection, OptionalExtension};

// One statement: SQLite applies the upsert and returns the new value under
// its write lock, so concurrent connections never observe the same value.
const ALLOCATE_SQL: &str = "INSERT INTO sequences (name, value) VALUES (?1, 1)
     ON CONFLICT(name) DO UPDATE SET value = value + 1
     RETURNING value;";

pub struct SqliteSequenceAllocator<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSequenceAllocator<'conn> {
    /// Wraps a migrated connection obtained from [`crate::db::open_db`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Pre-creates zero-valued counters; existing counters are left untouched.
    ///
    /// Returns how many counters were newly created.
    pub fn initialize(&self, namespaces: &[&str]) -> SequenceResult<usize> {
        for namespace in namespaces {
            validate_namespace(namespace)?;
        }

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|err| storage_failure("*", err))?;
        let mut created = 0;
        for namespace in namespaces {
            created += tx
                .execute(
                    "INSERT OR IGNORE INTO sequences (name, value) VALUES (?1, 0);",
                    [namespace],
                )
                .map_err(|err| storage_failure(namespace, err))?;
        }
        tx.commit().map_err(|err| storage_failure("*", err))?;

        info!(
            "event=sequence_init module=sequence status=ok requested={} created={}",
            namespaces.len(),
            created
        );
        Ok(created)
    }

    /// Returns the last issued value, or 0 when nothing was issued yet.
    pub fn current(&self, namespace: &str) -> SequenceResult<u64> {
        validate_namespace(namespace)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM sequences WHERE name = ?1;",
                [namespace],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map_err(|err| storage_failure(namespace, err))?
            .unwrap_or(0);
        to_unsigned(namespace, value)
    }
}

impl SequenceAllocator for SqliteSequenceAllocator<'_> {
    fn allocate(&self, namespace: &str) -> SequenceResult<EntityId> {
        validate_namespace(namespace)?;

        let result = self
            .conn
            .prepare_cached(ALLOCATE_SQL)
            .and_then(|mut stmt| stmt.query_row([namespace], |row| row.get::<_, i64>(0)));

        let value = match result {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=sequence_allocate module=sequence status=error namespace={} error={}",
                    namespace, err
                );
                return Err(storage_failure(namespace, err));
            }
        };

        let value = to_unsigned(namespace, value)?;
        trace!(
            "event=sequence_allocate module=sequence status=ok namespace={} value={}",
            namespace,
            value
        );
        Ok(value.to_string())
    }
}

fn storage_failure(namespace: &str, err: rusqlite::Error) -> SequenceError {
    SequenceError::failure(namespace, AllocationCause::Db(DbError::Sqlite(err)))
}

fn to_unsigned(namespace: &str, value: i64) -> SequenceResult<u64> {
    u64::try_from(value)
        .map_err(|_| SequenceError::failure(namespace, AllocationCause::CorruptCounter(value)))
}
