pub mod announcement;
pub mod error;
pub mod schema;

pub use error::Error;
pub use sqlx::Error as SqlxError;
use sqlx::pool::PoolOptions;

use crate::error::Result;

#[cfg(not(feature = "postgres"))]
pub type ChosenDB = sqlx::Sqlite;
#[cfg(feature = "postgres")]
pub type ChosenDB = sqlx::Postgres;

pub type Pool = sqlx::Pool<ChosenDB>;
pub type Connection = <ChosenDB as sqlx::Database>::Connection;
pub type PooledConnection = sqlx::pool::PoolConnection<ChosenDB>;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 50;

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    new_pool_with_size(database_url, DEFAULT_MAX_CONNECTIONS).await
}

pub async fn new_pool_with_size(database_url: &str, max_connections: u32) -> Result<Pool, Error> {
    let pool = PoolOptions::<ChosenDB>::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Creates tables, which are not yet present in the database.
pub async fn migrate(pool: &Pool) -> Result<()> {
    #[cfg(not(feature = "postgres"))]
    let migrator = sqlx::migrate!("../../migrations/sqlite");
    #[cfg(feature = "postgres")]
    let migrator = sqlx::migrate!("../../migrations/postgres");

    migrator.run(pool).await?;
    Ok(())
}
