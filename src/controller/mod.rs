pub mod routing;

use std::sync::Arc;

use hyper::{Body, Method, Request};

use self::routing::*;
use crate::config::Inventory;
use crate::http::request_util::{parse_body, parse_query, serialize_future, text_future};
use crate::http::{Controller, ControllerError, ControllerFuture};
use crate::models::*;
use crate::repos::OrderRepo;
use crate::router::RouteParser;
use crate::services::*;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub struct ServiceFactory {
    pub system_factory: Arc<dyn Fn() -> Box<dyn SystemService> + Send + Sync>,
    pub order_factory: Arc<dyn Fn() -> Box<dyn OrderService> + Send + Sync>,
    pub report_factory: Arc<dyn Fn() -> Box<dyn ReportService> + Send + Sync>,
}

pub struct ControllerImpl {
    route_parser: Arc<RouteParser<Route>>,
    service_factory: Arc<ServiceFactory>,
}

impl ControllerImpl {
    pub fn new(repo: Arc<dyn OrderRepo>, pricing: Pricing, inventory: Inventory) -> Self {
        ControllerImpl {
            service_factory: Arc::new(ServiceFactory {
                system_factory: Arc::new(|| Box::new(SystemServiceImpl::default()) as Box<dyn SystemService>),
                order_factory: Arc::new({
                    let repo = repo.clone();
                    let pricing = pricing.clone();
                    move || {
                        Box::new(OrderServiceImpl::new(repo.clone(), pricing.clone(), inventory.clone()))
                            as Box<dyn OrderService>
                    }
                }),
                report_factory: Arc::new(move || {
                    Box::new(ReportServiceImpl::new(repo.clone(), pricing.clone())) as Box<dyn ReportService>
                }),
            }),
            route_parser: Arc::new(routing::make_router()),
        }
    }
}

fn list_filter(query: Option<&str>) -> Result<OrderListFilter, ControllerError> {
    OrderListFilter::from_query(&parse_query(query.unwrap_or_default())).map_err(ControllerError::UnprocessableEntity)
}

fn found<T>(value: Option<T>) -> Result<T, ControllerError> {
    value.ok_or(ControllerError::NotFound)
}

impl Controller for ControllerImpl {
    fn call(&self, request: Request<Body>) -> ControllerFuture {
        let (parts, payload) = request.into_parts();
        let method = parts.method;
        let uri = parts.uri;

        let service_factory = self.service_factory.clone();
        let route = self.route_parser.test(uri.path());

        match (&method, route) {
            // GET /healthcheck
            (&Method::GET, Some(Route::Healthcheck)) => serialize_future(async move {
                (service_factory.system_factory)()
                    .healthcheck()
                    .await
                    .map_err(ControllerError::from)
            }),
            // GET /dashboard
            (&Method::GET, Some(Route::Dashboard)) => serialize_future(async move {
                debug!("Received request to get dashboard");
                (service_factory.order_factory)()
                    .dashboard()
                    .await
                    .map_err(ControllerError::from)
            }),
            // GET /orders?view=&year=&month=
            (&Method::GET, Some(Route::Orders)) => {
                let filter = list_filter(uri.query());
                serialize_future(async move {
                    let filter = filter?;
                    debug!("Received request to list orders with filter {:?}", filter);
                    (service_factory.order_factory)()
                        .list_orders(filter)
                        .await
                        .map_err(ControllerError::from)
                })
            }
            // POST /orders
            (&Method::POST, Some(Route::Orders)) => serialize_future(async move {
                let order = parse_body::<NewStorefrontOrder>(payload).await?;
                debug!("Received request to create {} order for {}", order.method.as_str(), order.name);
                (service_factory.order_factory)()
                    .create_storefront_order(order)
                    .await
                    .map_err(ControllerError::from)
            }),
            // POST /orders/quote
            (&Method::POST, Some(Route::OrderQuote)) => serialize_future(async move {
                let order = parse_body::<NewStorefrontOrder>(payload).await?;
                debug!("Received request to quote {}kg of {}", order.kg, order.product.label());
                (service_factory.order_factory)()
                    .quote(order)
                    .await
                    .map_err(ControllerError::from)
            }),
            // POST /orders/ledger
            (&Method::POST, Some(Route::LedgerOrders)) => serialize_future(async move {
                let order = parse_body::<NewLedgerOrder>(payload).await?;
                debug!("Received request to record trade of {}", order.date);
                (service_factory.order_factory)()
                    .create_ledger_order(order)
                    .await
                    .map_err(ControllerError::from)
            }),
            // POST /special-orders
            (&Method::POST, Some(Route::SpecialOrders)) => serialize_future(async move {
                let order = parse_body::<NewSpecialOrder>(payload).await?;
                debug!("Received request to record special order for {}", order.trader);
                (service_factory.order_factory)()
                    .create_special_order(order)
                    .await
                    .map_err(ControllerError::from)
            }),
            // GET /orders/export?view=&year=&month=
            (&Method::GET, Some(Route::OrdersExport)) => {
                let filter = list_filter(uri.query());
                text_future(
                    async move {
                        let filter = filter?;
                        debug!("Received request to export orders with filter {:?}", filter);
                        (service_factory.report_factory)()
                            .history_csv(filter)
                            .await
                            .map_err(ControllerError::from)
                    },
                    CSV_CONTENT_TYPE,
                )
            }
            // GET /orders/by-id/<order_id>
            (&Method::GET, Some(Route::Order { order_id })) => serialize_future(async move {
                debug!("Received request to get order {}", order_id);
                let order = (service_factory.order_factory)()
                    .get_order(order_id)
                    .await
                    .map_err(ControllerError::from)?;
                found(order)
            }),
            // DELETE /orders/by-id/<order_id>
            (&Method::DELETE, Some(Route::Order { order_id })) => serialize_future(async move {
                debug!("Received request to delete order {}", order_id);
                let order = (service_factory.order_factory)()
                    .delete_order(order_id)
                    .await
                    .map_err(ControllerError::from)?;
                found(order)
            }),
            // PUT /orders/by-id/<order_id>/status
            (&Method::PUT, Some(Route::OrderStatus { order_id })) => serialize_future(async move {
                let payload = parse_body::<SetterPayload<OrderStatus>>(payload).await?;
                debug!("Received request to set order {} status to {}", order_id, payload.value);
                let order = (service_factory.order_factory)()
                    .set_order_status(order_id, payload.value)
                    .await
                    .map_err(ControllerError::from)?;
                found(order)
            }),
            // PUT /orders/by-id/<order_id>/amount
            (&Method::PUT, Some(Route::OrderAmount { order_id })) => serialize_future(async move {
                let payload = parse_body::<SetterPayload<Option<Yen>>>(payload).await?;
                debug!("Received request to set order {} amount to {:?}", order_id, payload.value);
                if let Some(amount) = payload.value.filter(|amount| amount.0 < 0 || amount.0 > MAX_AMOUNT) {
                    return Err(ControllerError::BadRequest(format_err!(
                        "Amount must be between 0 and {}, got {}",
                        MAX_AMOUNT,
                        amount
                    )));
                }
                let order = (service_factory.order_factory)()
                    .set_order_amount(order_id, payload.value)
                    .await
                    .map_err(ControllerError::from)?;
                found(order)
            }),

            // Fallback
            (method, route) => {
                debug!("Unmatched request {} {} ({:?})", method, uri.path(), route);
                Box::pin(futures::future::err(ControllerError::NotFound))
            }
        }
    }
}
