//! Domain services.
//!
//! Each service owns the use cases for one entity. Anything that checks state and then writes
//! runs inside a [`UnitOfWork`](crate::db::unit_of_work::UnitOfWork), so the check and the write
//! see the same locked rows and commit or roll back together. Plain reads take a pooled
//! connection and skip the transaction.
//!
//! Repositories report absence as `None`; services are where that becomes
//! [`Error::NotFound`](crate::errors::Error::NotFound), because only they know an entity was
//! expected to exist.

pub mod comments;
pub mod posts;
pub mod users;

pub use comments::CommentService;
pub use posts::PostService;
pub use users::UserService;
