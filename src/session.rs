//! The session contract the dispatcher executes generated SQL against, plus a
//! concrete `sqlx`-backed MySQL adapter.

use crate::error::{CrudError, CrudResult};

/// Metadata about one column of a pending or returned result set.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
}

/// The outcome of executing a statement: rows affected and, for inserts, the
/// generated auto-increment id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub last_insert_id: u64,
}

/// What the dispatcher needs from a connection, kept deliberately synchronous:
/// the hot path of message translation has no async dependency of its own, so
/// the generator never needs a runtime. Adapters to an async driver bridge at
/// this boundary.
pub trait Session {
    fn execute(&mut self, sql: &str) -> CrudResult<ExecOutcome>;
    fn fields(&self) -> Vec<FieldInfo>;
}

/// A `Session` backed by a live `sqlx::MySqlPool`.
///
/// `execute` bridges the async pool call onto the synchronous trait via
/// `tokio::runtime::Handle::block_on`; callers must invoke it from within an
/// active Tokio runtime context (the usual case for a connection handler task).
pub struct MySqlSession {
    pool: sqlx::MySqlPool,
    fields: Vec<FieldInfo>,
}

impl MySqlSession {
    pub async fn connect(url: &str) -> CrudResult<Self> {
        let pool = sqlx::MySqlPool::connect(url)
            .await
            .map_err(|e| CrudError::Execution(e.to_string()))?;
        Ok(Self { pool, fields: Vec::new() })
    }
}

impl Session for MySqlSession {
    fn execute(&mut self, sql: &str) -> CrudResult<ExecOutcome> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| CrudError::Execution(format!("no Tokio runtime available: {e}")))?;
        let pool = self.pool.clone();
        let sql = sql.to_string();
        let result = handle.block_on(async move { sqlx::query(&sql).execute(&pool).await });
        match result {
            Ok(done) => Ok(ExecOutcome {
                rows_affected: done.rows_affected(),
                last_insert_id: done.last_insert_id(),
            }),
            Err(e) => Err(CrudError::Execution(e.to_string())),
        }
    }

    fn fields(&self) -> Vec<FieldInfo> {
        self.fields.clone()
    }
}

/// An in-memory [`Session`] implementation, public so fixture binaries and
/// integration tests can exercise the dispatcher without a live database.
pub mod fake {
    use super::*;

    /// An in-memory `Session` test double that records the SQL it was asked to
    /// execute instead of touching a real database.
    pub struct FakeSession {
        pub executed: Vec<String>,
        pub next_last_insert_id: u64,
    }

    impl FakeSession {
        pub fn new() -> Self {
            Self { executed: Vec::new(), next_last_insert_id: 0 }
        }
    }

    impl Session for FakeSession {
        fn execute(&mut self, sql: &str) -> CrudResult<ExecOutcome> {
            self.executed.push(sql.to_string());
            Ok(ExecOutcome { rows_affected: 1, last_insert_id: self.next_last_insert_id })
        }

        fn fields(&self) -> Vec<FieldInfo> {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeSession;
    use super::*;

    #[test]
    fn test_fake_session_records_sql() {
        let mut s = FakeSession::new();
        let outcome = s.execute("SELECT 1").unwrap();
        assert_eq!(s.executed, vec!["SELECT 1".to_string()]);
        assert_eq!(outcome.rows_affected, 1);
    }
}
