use thiserror::Error;

/// Name of the unique constraint guarding user emails.
pub const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

/// Unified error type for database operations that application code can handle.
///
/// A row that does not exist is not an error: repositories return `Option` for lookups.
#[derive(Error, Debug)]
pub enum DbError {
    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Check constraint violation
    #[error("Check constraint violation")]
    CheckViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Connectivity faults, malformed queries and everything else
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    /// True when this is the email uniqueness constraint on `users` firing.
    pub fn is_email_conflict(&self) -> bool {
        matches!(
            self,
            DbError::UniqueViolation { constraint: Some(c), .. } if c == USERS_EMAIL_CONSTRAINT
        )
    }
}

/// Convert from sqlx::Error using sqlx's error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            return DbError::Other(anyhow::Error::from(err));
        };

        let constraint = db_err.constraint().map(|s| s.to_string());
        let table = db_err.table().map(|s| s.to_string());
        let message = db_err.message().to_string();

        if db_err.is_unique_violation() {
            DbError::UniqueViolation { constraint, table, message }
        } else if db_err.is_foreign_key_violation() {
            DbError::ForeignKeyViolation { constraint, table, message }
        } else if db_err.is_check_violation() {
            DbError::CheckViolation { constraint, table, message }
        } else {
            DbError::Other(anyhow::Error::from(err))
        }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
