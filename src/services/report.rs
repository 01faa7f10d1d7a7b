use std::sync::Arc;

use csv::Writer;
use failure::Error as FailureError;

use super::order::fetch_orders;
use super::types::ServiceFuture;
use crate::models::*;
use crate::repos::OrderRepo;

pub trait ReportService: Send + Sync {
    /// One CSV row per matching order, newest first.
    fn history_csv(&self, filter: OrderListFilter) -> ServiceFuture<String>;
}

pub struct ReportServiceImpl {
    pub repo: Arc<dyn OrderRepo>,
    pub pricing: Pricing,
}

impl ReportServiceImpl {
    pub fn new(repo: Arc<dyn OrderRepo>, pricing: Pricing) -> Self {
        Self { repo, pricing }
    }
}

impl ReportService for ReportServiceImpl {
    fn history_csv(&self, filter: OrderListFilter) -> ServiceFuture<String> {
        let repo = self.repo.clone();
        let pricing = self.pricing.clone();

        Box::pin(async move {
            let orders = fetch_orders(&*repo, &pricing).await?;
            let orders = filter_orders(orders, &filter);
            debug!("Writing {} orders to csv", orders.len());
            into_csv(orders)
        })
    }
}

#[derive(Debug, Serialize)]
struct CsvOrder {
    id: OrderId,
    date: String,
    kind: &'static str,
    status: &'static str,
    customer_name: String,
    polished_kg: f64,
    polished_count: u32,
    polished_amount: i64,
    brown_kg: f64,
    brown_count: u32,
    brown_amount: i64,
    glutinous_kg: f64,
    shipping_fee: i64,
    amount: i64,
}

impl From<Order> for CsvOrder {
    fn from(order: Order) -> CsvOrder {
        let (polished_kg, polished_count, polished_amount) = line_columns(&order, Grade::Polished);
        let (brown_kg, brown_count, brown_amount) = line_columns(&order, Grade::Brown);

        CsvOrder {
            id: order.id,
            date: order.local_date().format("%Y-%m-%d").to_string(),
            kind: order.kind.as_str(),
            status: order.status.as_str(),
            glutinous_kg: order.consumed_kg_of(Grade::Glutinous).0,
            shipping_fee: order.shipping_fee.0,
            amount: order.amount.0,
            customer_name: order.customer_name,
            polished_kg,
            polished_count,
            polished_amount,
            brown_kg,
            brown_count,
            brown_amount,
        }
    }
}

fn line_columns(order: &Order, grade: Grade) -> (f64, u32, i64) {
    order
        .line(grade)
        .map(|line| (line.kg.0, line.count, line.amount.0))
        .unwrap_or((0.0, 0, 0))
}

fn into_csv(orders: Vec<Order>) -> Result<String, FailureError> {
    let mut writer = Writer::from_writer(Vec::new());
    for order in orders {
        writer.serialize(CsvOrder::from(order))?;
    }
    let bytes = writer.into_inner().map_err(|e| format_err!("{}", e).context("Failed to flush csv writer"))?;
    let res = String::from_utf8(bytes)?;
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::OrderRepoMemory;
    use chrono::prelude::*;

    fn document(data: serde_json::Value) -> OrderDocument {
        OrderDocument {
            id: OrderId::new(),
            created_at: Utc::now(),
            data,
        }
    }

    #[tokio::test]
    async fn test_history_csv() {
        let repo = OrderRepoMemory::with_documents(vec![
            document(json!({
                "date": "2025-10-05",
                "trader": "山田商店",
                "polishedKg": 10,
                "polishedCount": 3,
                "status": "completed",
            })),
            document(json!({
                "type": "special",
                "date": "2025-12-20",
                "trader": "餅屋",
                "item": "もち米",
                "weight": 25,
                "amount": 12800,
                "status": "completed",
            })),
            document(json!({ "date": "2025-11-01", "trader": "未完了", "brownKg": 30, "brownCount": 1 })),
        ]);
        let service = ReportServiceImpl::new(Arc::new(repo), Pricing::default());

        let csv = service
            .history_csv(OrderListFilter {
                view: OrderView::History,
                ..Default::default()
            })
            .await
            .unwrap();

        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(
            lines[0],
            "id,date,kind,status,customer_name,polished_kg,polished_count,polished_amount,\
             brown_kg,brown_count,brown_amount,glutinous_kg,shipping_fee,amount"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains(",2025-12-20,special,completed,餅屋,0.0,0,0,0.0,0,0,25.0,0,12800"));
        assert!(lines[2].contains(",2025-10-05,ledger,completed,山田商店,10.0,3,18000,0.0,0,0,0.0,0,18000"));
    }

    #[tokio::test]
    async fn test_empty_history_has_no_rows() {
        let service = ReportServiceImpl::new(Arc::new(OrderRepoMemory::default()), Pricing::default());
        let csv = service.history_csv(OrderListFilter::default()).await.unwrap();
        assert!(csv.is_empty());
    }
}
