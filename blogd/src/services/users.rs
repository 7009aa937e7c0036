//! Registration, login and session resolution.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::auth::{
    password::Passwords,
    session::{SessionStore, is_well_formed},
};
use crate::db::{
    errors::DbError,
    handlers::{Repository, Store},
    models::users::{UserCreateDBRequest, UserDBResponse},
    unit_of_work::UnitOfWork,
};
use crate::errors::{Error, Result};
use crate::types::UserId;

#[derive(Debug, Clone)]
pub struct UserService {
    uow: UnitOfWork,
    passwords: Passwords,
    sessions: Arc<SessionStore>,
}

impl UserService {
    pub fn new(uow: UnitOfWork, passwords: Passwords, sessions: Arc<SessionStore>) -> Self {
        Self { uow, passwords, sessions }
    }

    /// Create an account.
    ///
    /// Fails with [`Error::AlreadyRegistered`] when the email is taken, whether that is seen by
    /// the lookup or by the unique constraint when two registrations race.
    #[instrument(skip(self, name, email, password), err)]
    pub async fn register(&self, name: String, email: String, password: String) -> Result<UserDBResponse> {
        let requested = email.clone();
        let passwords = self.passwords;

        let result = self
            .uow
            .run(move |store| {
                Box::pin(async move {
                    if store.users().get_user_by_email(&email).await?.is_some() {
                        return Err(Error::AlreadyRegistered { email });
                    }

                    let password_hash = passwords.hash_blocking(password).await?;
                    let request = UserCreateDBRequest {
                        name,
                        email,
                        password_hash,
                    };
                    Ok(store.users().create(&request).await?)
                })
            })
            .await;

        match result {
            Err(Error::Database(err)) if err.is_email_conflict() => Err(Error::AlreadyRegistered { email: requested }),
            other => other,
        }
    }

    /// Check credentials and open a session, returning its token.
    ///
    /// An unknown email is [`Error::NotFound`]; a wrong password is
    /// [`Error::InvalidCredentials`].
    #[instrument(skip(self, email, password), err)]
    pub async fn login(&self, email: String, password: String) -> Result<String> {
        let mut conn = self.uow.pool().acquire().await.map_err(DbError::from)?;
        let user = Store::new(&mut conn).users().get_user_by_email(&email).await?;
        // Hand the connection back before the slow password check
        drop(conn);

        let user = user.ok_or_else(|| Error::NotFound {
            resource: "User".to_string(),
            id: email,
        })?;

        if !self.passwords.verify_blocking(user.password_hash, password).await? {
            return Err(Error::InvalidCredentials);
        }

        debug!(user_id = user.id, "Login succeeded");
        Ok(self.sessions.create(user.id))
    }

    /// The user a session token belongs to.
    pub fn authenticate(&self, token: &str) -> Result<UserId> {
        if !is_well_formed(token) {
            return Err(Error::Unauthenticated);
        }
        self.sessions.lookup(token).ok_or(Error::Unauthenticated)
    }
}
