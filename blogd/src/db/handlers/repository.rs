//! Base repository trait for database operations.

use crate::db::errors::Result;

/// Base repository trait providing the operations every entity table supports.
///
/// A repository is a stateless gateway over one table. It runs against whatever
/// `PgConnection` it was built from and does not know whether that connection is inside a
/// transaction.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID, `None` when it does not exist
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;
}
