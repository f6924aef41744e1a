mod edge;
mod error;


pub use edge::{Edge, EdgeDelta, Transition, SENTINEL};
pub use error::{ChainError, ChainResult};

use rusqlite::{params, Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chain (
    link1 TEXT NOT NULL,
    link2 TEXT NOT NULL, -- ' ' marks the end of a sequence
    n INTEGER NOT NULL CHECK (typeof(n) = 'integer' AND n >= 1), -- overflow turns n REAL
    PRIMARY KEY (link1, link2),
    CHECK (link1 <> ' ')
);

CREATE INDEX IF NOT EXISTS chain_link1_idx ON chain (link1);
"#;

const UPSERT_EDGE: &str = "INSERT INTO chain (link1, link2, n) VALUES (?1, ?2, ?3)
     ON CONFLICT (link1, link2) DO UPDATE SET n = chain.n + excluded.n";

const SELECT_EDGES_FROM: &str = "SELECT link2, n FROM chain WHERE link1 = ?1 ORDER BY link2";

/// How long a writer waits on another connection's lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to one namespace's weighted transition table.
///
/// Clones share a single connection; writers on the same handle serialize on
/// its mutex, writers on other connections to the same file serialize on
/// SQLite's write lock.
#[derive(Debug, Clone)]
pub struct ChainStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl ChainStore {
    /// Open (or create) the store backed by the given database file
    pub fn open<P: AsRef<Path>>(path: P) -> ChainResult<Self> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |source: rusqlite::Error| ChainError::StorageUnavailable {
            path: path.clone(),
            source: Box::new(source),
        };

        let conn = Connection::open(&path).map_err(unavailable)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(unavailable)?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))
            .map_err(unavailable)?;
        conn.execute_batch(SCHEMA).map_err(unavailable)?;

        tracing::info!(path = %path.display(), "Opened chain store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> ChainResult<Self> {
        let unavailable = |source: rusqlite::Error| ChainError::StorageUnavailable {
            path: PathBuf::from(":memory:"),
            source: Box::new(source),
        };

        let conn = Connection::open_in_memory().map_err(unavailable)?;
        conn.execute_batch(SCHEMA).map_err(unavailable)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Backing file, or `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-transaction drops the transaction guard, which rolls back
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add each delta to its edge, creating missing edges, as one transaction.
    ///
    /// Any invalid entry rejects the whole batch before anything is written.
    pub fn increment_batch(&self, edges: &[EdgeDelta]) -> ChainResult<()> {
        if edges.is_empty() {
            return Ok(());
        }

        for edge in edges {
            validate_delta(edge)?;
        }

        let mut conn = self.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| ChainError::storage("begin increment_batch", e))?;

        {
            let mut stmt = tx
                .prepare_cached(UPSERT_EDGE)
                .map_err(|e| ChainError::storage("prepare upsert", e))?;

            for edge in edges {
                let delta = i64::try_from(edge.delta).map_err(|_| {
                    ChainError::ConstraintViolation(format!(
                        "weight delta {} out of range for {:?} -> {:?}",
                        edge.delta, edge.link1, edge.link2
                    ))
                })?;
                stmt.execute(params![edge.link1, edge.link2, delta])
                    .map_err(|e| ChainError::storage("upsert edge", e))?;
            }
        }

        tx.commit()
            .map_err(|e| ChainError::storage("commit increment_batch", e))?;
        Ok(())
    }

    /// All outgoing edges of `link1`, ordered by `link2`
    pub fn edges_from(&self, link1: &str) -> ChainResult<Vec<Transition>> {
        if link1 == SENTINEL {
            return Ok(Vec::new());
        }

        let conn = self.lock();
        let mut stmt = conn
            .prepare_cached(SELECT_EDGES_FROM)
            .map_err(|e| ChainError::storage("prepare edges_from", e))?;

        let transitions = stmt
            .query_map(params![link1], |row| {
                let n: i64 = row.get(1)?;
                Ok(Transition {
                    link2: row.get(0)?,
                    n: u64::try_from(n).unwrap_or(0),
                })
            })
            .map_err(|e| ChainError::storage("query edges_from", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ChainError::storage("read edges_from", e))?;

        Ok(transitions)
    }

    /// Weight of a single edge, if it has been recorded
    pub fn weight(&self, link1: &str, link2: &str) -> ChainResult<Option<u64>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare_cached("SELECT n FROM chain WHERE link1 = ?1 AND link2 = ?2")
            .map_err(|e| ChainError::storage("prepare weight", e))?;

        let mut rows = stmt
            .query(params![link1, link2])
            .map_err(|e| ChainError::storage("query weight", e))?;

        let weight = match rows.next().map_err(|e| ChainError::storage("read weight", e))? {
            Some(row) => {
                let n: i64 = row.get(0).map_err(|e| ChainError::storage("read weight", e))?;
                u64::try_from(n).ok()
            }
            None => None,
        };

        Ok(weight)
    }

    /// Every stored edge, ordered by `(link1, link2)`
    pub fn all_edges(&self) -> ChainResult<Vec<Edge>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT link1, link2, n FROM chain ORDER BY link1, link2")
            .map_err(|e| ChainError::storage("prepare all_edges", e))?;

        let edges = stmt
            .query_map([], |row| {
                let n: i64 = row.get(2)?;
                Ok(Edge {
                    link1: row.get(0)?,
                    link2: row.get(1)?,
                    n: u64::try_from(n).unwrap_or(0),
                })
            })
            .map_err(|e| ChainError::storage("query all_edges", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ChainError::storage("read all_edges", e))?;

        Ok(edges)
    }

    /// Get statistics
    pub fn stats(&self) -> ChainResult<ChainStats> {
        let conn = self.lock();
        let (edge_count, node_count, total_weight): (i64, i64, i64) = conn
            .query_row(
                "SELECT COUNT(*), COUNT(DISTINCT link1), COALESCE(SUM(n), 0) FROM chain",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| ChainError::storage("stats", e))?;

        Ok(ChainStats {
            edge_count: u64::try_from(edge_count).unwrap_or(0),
            node_count: u64::try_from(node_count).unwrap_or(0),
            total_weight: u64::try_from(total_weight).unwrap_or(0),
        })
    }

    /// Number of live handles sharing this connection
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.conn)
    }

    /// Release this handle, closing the connection if it was the last one.
    ///
    /// Returns whether the connection was closed.
    pub fn close(self) -> ChainResult<bool> {
        let Self { conn, path } = self;
        let Ok(mutex) = Arc::try_unwrap(conn) else {
            return Ok(false);
        };

        let conn = mutex.into_inner().unwrap_or_else(PoisonError::into_inner);
        conn.close()
            .map_err(|(_, e)| ChainError::storage("close", e))?;

        if let Some(path) = path {
            tracing::info!(path = %path.display(), "Closed chain store");
        }
        Ok(true)
    }
}

fn validate_delta(edge: &EdgeDelta) -> ChainResult<()> {
    if edge.link1 == SENTINEL {
        return Err(ChainError::ConstraintViolation(
            "end-of-sequence marker cannot be a source word".to_string(),
        ));
    }
    if edge.link1.is_empty() || edge.link2.is_empty() {
        return Err(ChainError::ConstraintViolation(format!(
            "empty word in edge {:?} -> {:?}",
            edge.link1, edge.link2
        )));
    }
    if edge.delta == 0 {
        return Err(ChainError::ConstraintViolation(format!(
            "zero weight delta for {:?} -> {:?}",
            edge.link1, edge.link2
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStats {
    pub edge_count: u64,
    pub node_count: u64,
    pub total_weight: u64,
}
