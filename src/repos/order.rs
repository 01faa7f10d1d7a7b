use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tokio_postgres::Row;

use crate::errors::RepoError;
use crate::models::*;
use crate::types::DbPool;

const TABLE: &str = "orders";

pub type RepoFuture<T> = Pin<Box<dyn Future<Output = Result<T, RepoError>> + Send>>;

/// Document store holding every order in one collection.
pub trait OrderRepo: Send + Sync {
    fn insert(&self, inserter: OrderDocumentInserter) -> RepoFuture<OrderDocument>;
    fn select(&self, filter: OrderDocumentFilter) -> RepoFuture<Vec<OrderDocument>>;
    /// Returns the documents after the patch is applied.
    fn update(&self, updater: OrderDocumentUpdater) -> RepoFuture<Vec<OrderDocument>>;
    /// Returns the deleted documents.
    fn delete(&self, filter: OrderDocumentFilter) -> RepoFuture<Vec<OrderDocument>>;
}

#[derive(Clone)]
pub struct OrderRepoImpl {
    db_pool: DbPool,
}

impl OrderRepoImpl {
    pub fn new(db_pool: DbPool) -> Self {
        Self { db_pool }
    }
}

fn returning() -> String {
    format!("RETURNING {}, {}, {}", ID_COLUMN, CREATED_AT_COLUMN, DATA_COLUMN)
}

fn rows_to_documents(rows: Vec<Row>) -> Result<Vec<OrderDocument>, RepoError> {
    rows.iter()
        .map(|row| OrderDocument::from_row(row).map_err(RepoError::from))
        .collect()
}

impl OrderRepo for OrderRepoImpl {
    fn insert(&self, inserter: OrderDocumentInserter) -> RepoFuture<OrderDocument> {
        let db_pool = self.db_pool.clone();

        Box::pin(async move {
            let conn = db_pool.get().await?;
            let query = format!(
                "INSERT INTO {} ({}, {}, {}) VALUES ($1, $2, $3) {};",
                TABLE,
                ID_COLUMN,
                CREATED_AT_COLUMN,
                DATA_COLUMN,
                returning()
            );
            let row = conn
                .query_one(query.as_str(), &[&inserter.id.0, &inserter.created_at, &inserter.data])
                .await?;

            Ok(OrderDocument::from_row(&row)?)
        })
    }

    fn select(&self, filter: OrderDocumentFilter) -> RepoFuture<Vec<OrderDocument>> {
        let db_pool = self.db_pool.clone();

        Box::pin(async move {
            let conn = db_pool.get().await?;
            let columns = format!("{}, {}, {}", ID_COLUMN, CREATED_AT_COLUMN, DATA_COLUMN);
            let rows = match filter.id {
                Some(id) => {
                    let query = format!("SELECT {} FROM {} WHERE {} = $1;", columns, TABLE, ID_COLUMN);
                    conn.query(query.as_str(), &[&id.0]).await?
                }
                None => {
                    let query = format!("SELECT {} FROM {} ORDER BY {};", columns, TABLE, CREATED_AT_COLUMN);
                    conn.query(query.as_str(), &[]).await?
                }
            };

            rows_to_documents(rows)
        })
    }

    fn update(&self, updater: OrderDocumentUpdater) -> RepoFuture<Vec<OrderDocument>> {
        let db_pool = self.db_pool.clone();

        Box::pin(async move {
            let conn = db_pool.get().await?;
            let OrderDocumentUpdater { filter, patch } = updater;
            let patch = Value::Object(patch);
            let rows = match filter.id {
                Some(id) => {
                    let query = format!(
                        "UPDATE {} SET {} = {} || $1 WHERE {} = $2 {};",
                        TABLE,
                        DATA_COLUMN,
                        DATA_COLUMN,
                        ID_COLUMN,
                        returning()
                    );
                    conn.query(query.as_str(), &[&patch, &id.0]).await?
                }
                None => {
                    let query = format!("UPDATE {} SET {} = {} || $1 {};", TABLE, DATA_COLUMN, DATA_COLUMN, returning());
                    conn.query(query.as_str(), &[&patch]).await?
                }
            };

            rows_to_documents(rows)
        })
    }

    fn delete(&self, filter: OrderDocumentFilter) -> RepoFuture<Vec<OrderDocument>> {
        let db_pool = self.db_pool.clone();

        Box::pin(async move {
            let conn = db_pool.get().await?;
            let rows = match filter.id {
                Some(id) => {
                    let query = format!("DELETE FROM {} WHERE {} = $1 {};", TABLE, ID_COLUMN, returning());
                    conn.query(query.as_str(), &[&id.0]).await?
                }
                None => {
                    let query = format!("DELETE FROM {} {};", TABLE, returning());
                    conn.query(query.as_str(), &[]).await?
                }
            };

            rows_to_documents(rows)
        })
    }
}
