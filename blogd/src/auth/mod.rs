//! Authentication.
//!
//! - [`password`]: the Argon2id password capability used at registration and login
//! - [`session`]: in-process session tokens handed out at login
//! - [`current_user`]: the [`AuthenticatedUser`](current_user::AuthenticatedUser) extractor that
//!   turns an `Authorization: Bearer <token>` header into a user id
//!
//! Authorization (only the author may change a post) is not decided here; the post service
//! checks ownership inside the same transaction that performs the change.

pub mod current_user;
pub mod password;
pub mod session;
