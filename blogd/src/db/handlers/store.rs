//! A bundle of repositories sharing one database handle.

use super::{Comments, Posts, Users};
use sqlx::PgConnection;

/// Entry point to every repository over a single `PgConnection`.
///
/// The handle is either a pooled connection or an open transaction; both deref to
/// `PgConnection`. A store built with [`Store::locking`] makes every read take a `FOR UPDATE`
/// row lock, which only makes sense inside a transaction.
pub struct Store<'c> {
    db: &'c mut PgConnection,
    for_update: bool,
}

impl<'c> Store<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db, for_update: false }
    }

    pub fn locking(db: &'c mut PgConnection) -> Self {
        Self { db, for_update: true }
    }

    pub fn is_locking(&self) -> bool {
        self.for_update
    }

    pub fn users(&mut self) -> Users<'_> {
        Users::new(&mut *self.db).with_lock(self.for_update)
    }

    pub fn posts(&mut self) -> Posts<'_> {
        Posts::new(&mut *self.db).with_lock(self.for_update)
    }

    pub fn comments(&mut self) -> Comments<'_> {
        Comments::new(&mut *self.db).with_lock(self.for_update)
    }
}
