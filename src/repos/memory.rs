use std::sync::{Arc, Mutex, MutexGuard};

use futures::future;
use serde_json::Value;

use super::order::{OrderRepo, RepoFuture};
use crate::errors::RepoError;
use crate::models::*;

pub type OrderRepoMemoryStorage = Arc<Mutex<Vec<OrderDocument>>>;

/// Process-local document store backing the controller and service tests.
#[derive(Clone, Default)]
pub struct OrderRepoMemory {
    pub inner: OrderRepoMemoryStorage,
}

impl OrderRepoMemory {
    pub fn with_documents(documents: Vec<OrderDocument>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(documents)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<Vec<OrderDocument>>, RepoError> {
        self.inner.lock().map_err(|_| RepoError::Connection {
            reason: "memory storage mutex poisoned".to_string(),
        })
    }

    fn run<T, F>(&self, f: F) -> RepoFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Vec<OrderDocument>) -> T,
    {
        let res = self.lock().map(|mut documents| f(&mut *documents));
        Box::pin(future::ready(res))
    }
}

fn matches(filter: &OrderDocumentFilter, document: &OrderDocument) -> bool {
    filter.id.map_or(true, |id| id == document.id)
}

impl OrderRepo for OrderRepoMemory {
    fn insert(&self, inserter: OrderDocumentInserter) -> RepoFuture<OrderDocument> {
        self.run(move |documents| {
            let document = OrderDocument {
                id: inserter.id,
                created_at: inserter.created_at,
                data: inserter.data,
            };
            documents.push(document.clone());
            document
        })
    }

    fn select(&self, filter: OrderDocumentFilter) -> RepoFuture<Vec<OrderDocument>> {
        self.run(move |documents| {
            let mut out = documents
                .iter()
                .filter(|document| matches(&filter, document))
                .cloned()
                .collect::<Vec<_>>();
            out.sort_by_key(|document| document.created_at);
            out
        })
    }

    fn update(&self, updater: OrderDocumentUpdater) -> RepoFuture<Vec<OrderDocument>> {
        self.run(move |documents| {
            let OrderDocumentUpdater { filter, patch } = updater;
            let mut out = vec![];
            for document in documents.iter_mut().filter(|document| matches(&filter, document)) {
                if !document.data.is_object() {
                    document.data = Value::Object(Default::default());
                }
                if let Some(data) = document.data.as_object_mut() {
                    for (k, v) in &patch {
                        data.insert(k.clone(), v.clone());
                    }
                }
                out.push(document.clone());
            }
            out
        })
    }

    fn delete(&self, filter: OrderDocumentFilter) -> RepoFuture<Vec<OrderDocument>> {
        self.run(move |documents| {
            let (deleted, kept): (Vec<_>, Vec<_>) = documents.drain(..).partition(|document| matches(&filter, document));
            *documents = kept;
            deleted
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::prelude::*;

    fn inserter(data: Value) -> OrderDocumentInserter {
        OrderDocumentInserter {
            id: OrderId::new(),
            created_at: Utc::now(),
            data,
        }
    }

    #[tokio::test]
    async fn test_patch_merges_top_level_fields() {
        let repo = OrderRepoMemory::default();
        let doc = repo.insert(inserter(json!({ "trader": "山田", "status": "open" }))).await.unwrap();

        let updated = repo
            .update(OrderDocumentUpdater::status(doc.id, OrderStatus::Completed))
            .await
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].data, json!({ "trader": "山田", "status": "completed" }));
    }

    #[tokio::test]
    async fn test_delete_only_matching() {
        let repo = OrderRepoMemory::default();
        let a = repo.insert(inserter(json!({}))).await.unwrap();
        let b = repo.insert(inserter(json!({}))).await.unwrap();

        let deleted = repo.delete(OrderDocumentFilter::by_id(a.id)).await.unwrap();
        assert_eq!(deleted, vec![a]);

        let left = repo.select(OrderDocumentFilter::default()).await.unwrap();
        assert_eq!(left, vec![b]);

        assert!(repo.delete(OrderDocumentFilter::by_id(OrderId::new())).await.unwrap().is_empty());
    }
}
