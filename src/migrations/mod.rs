use failure::Error as FailureError;

use crate::types::DbPool;

pub async fn run(db_pool: &DbPool) -> Result<(), FailureError> {
    let conn = db_pool.get().await?;
    conn.batch_execute(
        "
        CREATE TABLE IF NOT EXISTS orders (
            id         UUID PRIMARY KEY,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            data       JSONB NOT NULL DEFAULT '{}'::jsonb
        );

        CREATE INDEX IF NOT EXISTS orders_created_at_idx ON orders (created_at);
        ",
    )
    .await?;

    info!("Migrations applied");
    Ok(())
}
