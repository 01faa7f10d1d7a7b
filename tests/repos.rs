extern crate kura_lib as lib;
#[macro_use]
extern crate serde_json;

use std::env;
use std::time::Duration;

use bb8_postgres::PostgresConnectionManager;
use chrono::prelude::*;
use tokio_postgres::NoTls;

use lib::config::Config;
use lib::migrations;
use lib::models::*;
use lib::repos::*;
use lib::types::DbPool;

/// Connects to the `test` database, or returns `None` when no server is listening.
async fn prepare_db() -> Option<DbPool> {
    if env::var("RUN_MODE").is_err() {
        env::set_var("RUN_MODE", "test");
    }
    let config = Config::new().unwrap();
    let manager = PostgresConnectionManager::new_from_stringlike(config.db.dsn.as_str(), NoTls).unwrap();
    let pool = bb8::Pool::builder()
        .max_size(config.db.pool_size)
        .connection_timeout(Duration::from_secs(3))
        .build(manager)
        .await
        .unwrap();

    if let Err(e) = pool.get().await {
        eprintln!("Skipping database test, no connection to {}: {}", config.db.dsn, e);
        return None;
    }
    migrations::run(&pool).await.unwrap();

    Some(pool)
}

fn inserter(data: serde_json::Value) -> OrderDocumentInserter {
    OrderDocumentInserter {
        id: OrderId::new(),
        created_at: Utc::now().trunc_subsecs(6),
        data,
    }
}

#[tokio::test]
async fn test_order_repo() {
    let pool = match prepare_db().await {
        Some(pool) => pool,
        None => return,
    };
    let repo = OrderRepoImpl::new(pool);

    let new_order = inserter(json!({
        "date": "2025-10-05",
        "trader": "山田商店",
        "polishedKg": 10,
        "polishedCount": 3,
        "status": "open",
    }));
    let id = new_order.id;

    // Insert
    let inserted = repo.insert(new_order.clone()).await.unwrap();
    assert_eq!(inserted.id, id);
    assert_eq!(inserted.created_at, new_order.created_at);
    assert_eq!(inserted.data, new_order.data);

    // Check DB contents
    let selected = repo.select(OrderDocumentFilter::by_id(id)).await.unwrap();
    assert_eq!(selected, vec![inserted.clone()]);
    let all = repo.select(OrderDocumentFilter::default()).await.unwrap();
    assert!(all.iter().any(|doc| doc.id == id));

    // Status patch keeps the other fields
    let updated = repo.update(OrderDocumentUpdater::status(id, OrderStatus::Completed)).await.unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].data["status"], json!("completed"));
    assert_eq!(updated[0].data["trader"], json!("山田商店"));

    // Manual amount overrides the computed price
    let updated = repo.update(OrderDocumentUpdater::amount(id, Some(Yen(11000)))).await.unwrap();
    assert_eq!(updated[0].data["amount"], json!(11000));
    let order = Order::from_document(&updated[0], &Pricing::default());
    assert_eq!(order.amount, Yen(11000));
    assert_eq!(order.status, OrderStatus::Completed);

    // Clearing it brings the computed price back
    let updated = repo.update(OrderDocumentUpdater::amount(id, None)).await.unwrap();
    assert_eq!(updated[0].data["amount"], serde_json::Value::Null);
    let order = Order::from_document(&updated[0], &Pricing::default());
    assert_eq!(order.amount, Yen(18000));

    // Delete
    let deleted = repo.delete(OrderDocumentFilter::by_id(id)).await.unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].id, id);
    assert!(repo.select(OrderDocumentFilter::by_id(id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_order_is_untouched() {
    let pool = match prepare_db().await {
        Some(pool) => pool,
        None => return,
    };
    let repo = OrderRepoImpl::new(pool);
    let id = OrderId::new();

    assert!(repo.select(OrderDocumentFilter::by_id(id)).await.unwrap().is_empty());
    assert!(repo
        .update(OrderDocumentUpdater::status(id, OrderStatus::Completed))
        .await
        .unwrap()
        .is_empty());
    assert!(repo.delete(OrderDocumentFilter::by_id(id)).await.unwrap().is_empty());
}
