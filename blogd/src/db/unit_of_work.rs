//! Transaction boundary for check-then-write use cases.

use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use crate::db::errors::DbError;
use crate::db::handlers::Store;
use crate::errors::{Error, Result};

/// Runs closures inside a single database transaction.
///
/// The closure gets a locking [`Store`]: every row it reads stays locked until the transaction
/// ends, so a check made early in the closure still holds when it writes. The outcome is:
///
/// - closure succeeds: commit. A failing commit is [`Error::Commit`].
/// - closure fails: roll back and return its error. A failing rollback is
///   [`Error::RollbackFailed`], carrying both errors.
/// - deadline passes: [`Error::TransactionTimeout`] is returned at once. The closure and the
///   transaction are dropped without waiting, and the pool rolls the transaction back.
///
/// Dropping the future returned by [`UnitOfWork::run`] drops the transaction, which rolls it
/// back. Nothing is committed unless the closure ran to completion.
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    pool: PgPool,
    timeout: Duration,
}

impl UnitOfWork {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[instrument(skip_all, fields(timeout = ?self.timeout), err)]
    pub async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: for<'s> FnOnce(&'s mut Store<'_>) -> BoxFuture<'s, Result<T>> + Send,
        T: Send,
    {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let deadline = {
            let mut store = Store::locking(&mut tx);
            tokio::time::timeout(self.timeout, f(&mut store)).await
        };

        let outcome = match deadline {
            Ok(outcome) => outcome,
            Err(_) => {
                // The abandoned query may still be queued behind a row lock, and an awaited
                // rollback would queue behind it. Dropping the transaction leaves the rollback
                // to the pool when the connection is released.
                warn!(after = ?self.timeout, "Transaction deadline elapsed, abandoning transaction");
                drop(tx);
                return Err(Error::TransactionTimeout { after: self.timeout });
            }
        };

        match outcome {
            Ok(value) => {
                tx.commit().await.map_err(|e| Error::Commit(DbError::from(e)))?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => match tx.rollback().await {
                Ok(()) => {
                    debug!(error = %err, "Transaction rolled back");
                    Err(err)
                }
                Err(rollback) => {
                    warn!(error = %err, rollback_error = %rollback, "Rollback failed");
                    Err(Error::RollbackFailed {
                        source: Box::new(err),
                        rollback: DbError::from(rollback),
                    })
                }
            },
        }
    }
}
