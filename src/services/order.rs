use std::sync::Arc;

use chrono::prelude::*;
use failure::{Error as FailureError, Fail};
use futures::future;
use validator::Validate;

use super::types::ServiceFuture;
use crate::config::Inventory;
use crate::errors::Error;
use crate::models::*;
use crate::repos::OrderRepo;

pub trait OrderService: Send + Sync {
    /// Prices a storefront order without storing it.
    fn quote(&self, order: NewStorefrontOrder) -> ServiceFuture<Quote>;
    fn create_storefront_order(&self, order: NewStorefrontOrder) -> ServiceFuture<OrderReceipt>;
    fn create_ledger_order(&self, order: NewLedgerOrder) -> ServiceFuture<Order>;
    fn create_special_order(&self, order: NewSpecialOrder) -> ServiceFuture<Order>;
    fn get_order(&self, order_id: OrderId) -> ServiceFuture<Option<Order>>;
    /// Reads the whole collection and filters it in memory.
    fn list_orders(&self, filter: OrderListFilter) -> ServiceFuture<OrderList>;
    fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> ServiceFuture<Option<Order>>;
    /// `None` clears the manual amount.
    fn set_order_amount(&self, order_id: OrderId, amount: Option<Yen>) -> ServiceFuture<Option<Order>>;
    fn delete_order(&self, order_id: OrderId) -> ServiceFuture<Option<Order>>;
    fn dashboard(&self) -> ServiceFuture<Dashboard>;
}

pub struct OrderServiceImpl {
    pub repo: Arc<dyn OrderRepo>,
    pub pricing: Pricing,
    pub inventory: Inventory,
}

impl OrderServiceImpl {
    pub fn new(repo: Arc<dyn OrderRepo>, pricing: Pricing, inventory: Inventory) -> Self {
        Self { repo, pricing, inventory }
    }
}

fn validate<T: Validate>(payload: &T) -> Result<(), FailureError> {
    payload.validate().map_err(|e| FailureError::from(Error::Validate(e)))
}

/// Fetches every document and normalizes it.
pub async fn fetch_orders(repo: &dyn OrderRepo, pricing: &Pricing) -> Result<Vec<Order>, FailureError> {
    let documents = repo
        .select(OrderDocumentFilter::default())
        .await
        .map_err(|e| e.context("Failed to fetch order documents"))?;

    Ok(documents
        .iter()
        .map(|document| Order::from_document(document, pricing))
        .collect())
}

async fn insert_order(repo: Arc<dyn OrderRepo>, pricing: &Pricing, data: serde_json::Value, created_at: DateTime<Utc>) -> Result<Order, FailureError> {
    let document = repo
        .insert(OrderDocumentInserter {
            id: OrderId::new(),
            created_at,
            data,
        })
        .await
        .map_err(|e| e.context("Failed to insert order document"))?;

    let order = Order::from_document(&document, pricing);
    info!("Created {} order {} for {}", order.kind.as_str(), order.id, order.customer_name);
    Ok(order)
}

impl OrderService for OrderServiceImpl {
    fn quote(&self, order: NewStorefrontOrder) -> ServiceFuture<Quote> {
        Box::pin(future::ready(validate(&order).map(|_| Quote::new(&order, &self.pricing))))
    }

    fn create_storefront_order(&self, order: NewStorefrontOrder) -> ServiceFuture<OrderReceipt> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();

        Box::pin(async move {
            validate(&order)?;
            let quote = Quote::new(&order, &pricing);
            let now = Utc::now();
            let order = insert_order(repo, &pricing, order.into_document_data(now), now).await?;

            Ok(OrderReceipt::new(order, quote))
        })
    }

    fn create_ledger_order(&self, order: NewLedgerOrder) -> ServiceFuture<Order> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();

        Box::pin(async move {
            validate(&order)?;
            let now = Utc::now();
            insert_order(repo, &pricing, order.into_document_data(now), now).await
        })
    }

    fn create_special_order(&self, order: NewSpecialOrder) -> ServiceFuture<Order> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();

        Box::pin(async move {
            validate(&order)?;
            let now = Utc::now();
            insert_order(repo, &pricing, order.into_document_data(now), now).await
        })
    }

    fn get_order(&self, order_id: OrderId) -> ServiceFuture<Option<Order>> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();

        Box::pin(async move {
            let documents = repo
                .select(OrderDocumentFilter::by_id(order_id))
                .await
                .map_err(|e| e.context(format!("Failed to fetch order {}", order_id)))?;

            Ok(documents.first().map(|document| Order::from_document(document, &pricing)))
        })
    }

    fn list_orders(&self, filter: OrderListFilter) -> ServiceFuture<OrderList> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();

        Box::pin(async move {
            let orders = fetch_orders(&*repo, &pricing).await?;
            Ok(OrderList::build(orders, &filter))
        })
    }

    fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> ServiceFuture<Option<Order>> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();

        Box::pin(async move {
            let documents = repo
                .update(OrderDocumentUpdater::status(order_id, status))
                .await
                .map_err(|e| e.context(format!("Failed to set status of order {}", order_id)))?;

            let order = documents.first().map(|document| Order::from_document(document, &pricing));
            match &order {
                Some(_) => info!("Order {} is now {}", order_id, status),
                None => warn!("Tried to set status of missing order {}", order_id),
            }
            Ok(order)
        })
    }

    fn set_order_amount(&self, order_id: OrderId, amount: Option<Yen>) -> ServiceFuture<Option<Order>> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();

        Box::pin(async move {
            let documents = repo
                .update(OrderDocumentUpdater::amount(order_id, amount))
                .await
                .map_err(|e| e.context(format!("Failed to set amount of order {}", order_id)))?;

            let order = documents.first().map(|document| Order::from_document(document, &pricing));
            if order.is_some() {
                info!("Amount of order {} set to {:?}", order_id, amount);
            }
            Ok(order)
        })
    }

    fn delete_order(&self, order_id: OrderId) -> ServiceFuture<Option<Order>> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();

        Box::pin(async move {
            let documents = repo
                .delete(OrderDocumentFilter::by_id(order_id))
                .await
                .map_err(|e| e.context(format!("Failed to delete order {}", order_id)))?;

            let order = documents.first().map(|document| Order::from_document(document, &pricing));
            if order.is_some() {
                info!("Deleted order {}", order_id);
            }
            Ok(order)
        })
    }

    fn dashboard(&self) -> ServiceFuture<Dashboard> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();
        let max_kg = self.inventory.max_kg;

        Box::pin(async move {
            let orders = fetch_orders(&*repo, &pricing).await?;
            Ok(Dashboard::new(&orders, max_kg))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::OrderRepoMemory;

    fn service(repo: OrderRepoMemory) -> OrderServiceImpl {
        OrderServiceImpl::new(Arc::new(repo), Pricing::default(), Inventory::default())
    }

    fn special() -> NewSpecialOrder {
        NewSpecialOrder {
            date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            trader: "餅屋".to_string(),
            item: SpecialItem::Glutinous,
            weight: 25.0,
            amount: 12_800,
        }
    }

    #[tokio::test]
    async fn test_invalid_order_is_not_stored() {
        let repo = OrderRepoMemory::default();
        let service = service(repo.clone());

        let e = service
            .create_special_order(NewSpecialOrder {
                trader: String::new(),
                ..special()
            })
            .await
            .unwrap_err();

        match crate::errors::find_error(&e) {
            Some(Error::Validate(_)) => {}
            other => panic!("Invalid error: {:?}", other),
        }
        assert!(repo.inner.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reservation_becomes_history() {
        let service = service(OrderRepoMemory::default());
        let order = service.create_special_order(special()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Open);

        let completed = service
            .set_order_status(order.id, OrderStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);

        let history = service
            .list_orders(OrderListFilter {
                view: OrderView::History,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(history.orders, vec![completed]);

        let dashboard = service.dashboard().await.unwrap();
        assert_eq!(dashboard.reservations, 0);
        assert_eq!(dashboard.history, 1);
        assert_eq!(dashboard.inventory.total_kg, Kg(25.0));
    }

    #[tokio::test]
    async fn test_missing_order_mutations_return_none() {
        let service = service(OrderRepoMemory::default());
        let id = OrderId::new();

        assert_eq!(service.set_order_status(id, OrderStatus::Completed).await.unwrap(), None);
        assert_eq!(service.set_order_amount(id, Some(Yen(1))).await.unwrap(), None);
        assert_eq!(service.delete_order(id).await.unwrap(), None);
        assert_eq!(service.get_order(id).await.unwrap(), None);
    }
}
