//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection` and provides strongly-typed operations for one
//! table, returning models from [`crate::db::models`]. A pooled connection and an open
//! transaction both deref to `PgConnection`, so the same repository code runs either way; only
//! the caller that opened a transaction commits or rolls it back.
//!
//! # Available Repositories
//!
//! - [`Users`]: User accounts, looked up by id or email
//! - [`Posts`]: Posts, including the paginated and counted listing
//! - [`Comments`]: Comments on a post
//! - [`Store`]: All of the above over one handle, optionally locking every read
//!
//! # Common Pattern
//!
//! ```ignore
//! use blogd::db::handlers::{Posts, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!
//!     let mut repo = Posts::new(&mut tx).with_lock(true);
//!     if let Some(post) = repo.get_by_id(1).await? {
//!         println!("locked post {}", post.id);
//!     }
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```
//!
//! Transactional use cases should go through [`crate::db::unit_of_work::UnitOfWork`] rather than
//! opening transactions by hand.

pub mod comments;
pub mod posts;
pub mod repository;
pub mod store;
pub mod users;

pub use comments::Comments;
pub use posts::Posts;
pub use repository::Repository;
pub use store::Store;
pub use users::Users;
