pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),
}

impl Error {
    /// Maps a failed write: unique constraint violations become [`Error::AlreadyExists`].
    pub(crate) fn from_write(entity: &str, error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                Error::AlreadyExists(entity.to_string())
            }
            _ => Error::DatabaseError(error),
        }
    }
}
