use bb8_postgres::PostgresConnectionManager;
use failure::Error as FailureError;
use tokio_postgres::NoTls;

use crate::config::Database;

pub type DbPool = bb8::Pool<PostgresConnectionManager<NoTls>>;

pub async fn create_db_pool(config: &Database) -> Result<DbPool, FailureError> {
    let manager = PostgresConnectionManager::new_from_stringlike(config.dsn.as_str(), NoTls)?;
    let pool = bb8::Pool::builder().max_size(config.pool_size).build(manager).await?;

    Ok(pool)
}
