//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Services   │  (use cases, ownership and existence checks)
//! └──────┬───────┘
//!        │
//!        ↓
//! ┌──────────────┐
//! │ Unit of work │  (db::unit_of_work - one transaction per use case)
//! └──────┬───────┘
//!        │
//!        ↓
//! ┌──────────────┐
//! │ Repositories │  (db::handlers - queries over one connection)
//! └──────┬───────┘
//!        │
//!        ↓
//! ┌──────────────┐
//! │  PostgreSQL  │
//! └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations and the [`handlers::Store`] bundle
//! - [`models`]: Database record structures matching table schemas
//! - [`query`]: SQL composition for locking, counting and pagination
//! - [`unit_of_work`]: Transaction boundary with commit/rollback handling
//! - [`errors`]: Database-specific error types
//!
//! # Transactions
//!
//! Reads that need no consistency with a later write use a plain pooled connection:
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let post = Store::new(&mut conn).posts().get_by_id(id).await?;
//! ```
//!
//! Check-then-write sequences run in a [`unit_of_work::UnitOfWork`], whose store locks every row
//! it reads until the transaction ends:
//!
//! ```ignore
//! uow.run(move |store| Box::pin(async move {
//!     let post = store.posts().get_by_id(id).await?;
//!     // ... decide, then write through the same store
//!     Ok(post)
//! }))
//! .await?;
//! ```
//!
//! # Migrations
//!
//! The baseline schema lives in `migrations/` and is applied at start-up through
//! [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
pub mod query;
pub mod unit_of_work;
