//! Database repository for users.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::users::{UserCreateDBRequest, UserDBResponse},
    query::select_query,
};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
    for_update: bool,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!("INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&request.name)
            .bind(&request.email)
            .bind(&request.password_hash)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(UserDBResponse::from(user))
    }

    #[instrument(skip(self), fields(for_update = self.for_update), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let sql = select_query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"), self.for_update);
        let user = sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&mut *self.db).await?;

        Ok(user.map(UserDBResponse::from))
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db, for_update: false }
    }

    /// Make every read lock the rows it returns until the enclosing transaction ends.
    pub fn with_lock(mut self, for_update: bool) -> Self {
        self.for_update = for_update;
        self
    }

    #[instrument(skip(self, email), fields(for_update = self.for_update), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let sql = select_query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"), self.for_update);
        let user = sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&mut *self.db).await?;

        Ok(user.map(UserDBResponse::from))
    }
}
