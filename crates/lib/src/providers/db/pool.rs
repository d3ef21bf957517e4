//! # Bounded Connection Pool
//!
//! A small pool of Turso connections shared by every request of a process. At most
//! `max_connections` connections are checked out at once; callers beyond that wait
//! for a permit. A [`PooledConnection`] hands its connection back when dropped, on
//! every exit path.

use crate::{constants, errors::PromptError};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Debug},
    ops::Deref,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};
use turso::{Connection, Database};

/// Sizing of a [`ConnectionPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOptions {
    #[serde(default = "default_min_connections")]
    pub min_connections: usize,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_min_connections() -> usize {
    constants::DEFAULT_POOL_MIN_CONNECTIONS
}

fn default_max_connections() -> usize {
    constants::DEFAULT_POOL_MAX_CONNECTIONS
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
        }
    }
}

impl PoolOptions {
    /// A pool with a single connection: one statement in flight at a time.
    pub fn single() -> Self {
        Self {
            min_connections: 1,
            max_connections: 1,
        }
    }
}

struct PoolInner {
    db: Database,
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    options: PoolOptions,
}

impl PoolInner {
    fn idle(&self) -> MutexGuard<'_, Vec<Connection>> {
        self.idle.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A cloneable handle to a bounded set of connections on one database.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Creates a pool and eagerly opens `min_connections` connections.
    pub fn new(db: Database, options: PoolOptions) -> Result<Self, PromptError> {
        let max_connections = options.max_connections.max(1);
        let min_connections = options.min_connections.min(max_connections);
        let options = PoolOptions {
            min_connections,
            max_connections,
        };

        let mut idle = Vec::with_capacity(max_connections);
        for _ in 0..min_connections {
            idle.push(
                db.connect()
                    .map_err(|e| PromptError::StorageConnection(e.to_string()))?,
            );
        }
        debug!(
            min_connections,
            max_connections, "Initialized connection pool."
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                db,
                idle: Mutex::new(idle),
                permits: Arc::new(Semaphore::new(max_connections)),
                options,
            }),
        })
    }

    /// Checks out a connection, waiting while `max_connections` are in use.
    pub async fn acquire(&self) -> Result<PooledConnection, PromptError> {
        let permit = self
            .inner
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PromptError::PoolClosed)?;

        let reused = self.inner.idle().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => self
                .inner
                .db
                .connect()
                .map_err(|e| PromptError::StorageConnection(e.to_string()))?,
        };

        Ok(PooledConnection {
            conn: Some(conn),
            busy: true,
            pool: self.inner.clone(),
            _permit: permit,
        })
    }

    /// Stops handing out connections. Waiters and later callers get `PoolClosed`.
    pub fn close(&self) {
        self.inner.permits.close();
        self.inner.idle().clear();
    }

    pub fn options(&self) -> PoolOptions {
        self.inner.options
    }

    /// Number of connections that could be checked out right now without waiting.
    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }

    /// Number of open connections waiting in the pool.
    pub fn idle_count(&self) -> usize {
        self.inner.idle().len()
    }

    /// Number of connections currently checked out.
    pub fn in_use(&self) -> usize {
        self.inner.options.max_connections - self.available()
    }
}

impl Debug for ConnectionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("options", &self.inner.options)
            .field("available", &self.available())
            .finish_non_exhaustive()
    }
}

/// A connection checked out of a [`ConnectionPool`].
///
/// A guard starts out busy. Once the caller's statements have completed it calls
/// [`PooledConnection::finish`], and dropping the guard then returns the connection
/// and releases its slot. A guard dropped while still busy (the statement future was
/// cancelled or panicked) closes its connection instead, so a half-finished statement
/// never reaches the next caller.
pub struct PooledConnection {
    conn: Option<Connection>,
    busy: bool,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    /// Marks the caller's statements as finished, successfully or not, so the
    /// connection can be reused.
    pub fn finish(&mut self) {
        self.busy = false;
    }
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        // `conn` is only taken in `drop`.
        self.conn
            .as_ref()
            .unwrap_or_else(|| unreachable!("pooled connection used after release"))
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        if self.busy {
            warn!("Discarding a connection released in the middle of a statement.");
            return;
        }
        if self.pool.permits.is_closed() {
            return;
        }
        self.pool.idle().push(conn);
    }
}
