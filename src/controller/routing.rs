use crate::models::OrderId;
use crate::router::RouteParser;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Route {
    Healthcheck,
    Dashboard,
    Orders,
    OrderQuote,
    LedgerOrders,
    SpecialOrders,
    OrdersExport,
    Order { order_id: OrderId },
    OrderStatus { order_id: OrderId },
    OrderAmount { order_id: OrderId },
}

fn order_id_route(params: Vec<&str>, f: fn(OrderId) -> Route) -> Option<Route> {
    params
        .get(0)
        .and_then(|string_id| string_id.parse().ok())
        .map(f)
}

pub fn make_router() -> RouteParser<Route> {
    let mut route_parser: RouteParser<Route> = Default::default();
    route_parser.add_route(r"^/healthcheck$", || Route::Healthcheck);
    route_parser.add_route(r"^/dashboard$", || Route::Dashboard);
    route_parser.add_route(r"^/orders$", || Route::Orders);
    route_parser.add_route(r"^/orders/quote$", || Route::OrderQuote);
    route_parser.add_route(r"^/orders/ledger$", || Route::LedgerOrders);
    route_parser.add_route(r"^/orders/export$", || Route::OrdersExport);
    route_parser.add_route(r"^/special-orders$", || Route::SpecialOrders);
    route_parser.add_route_with_params(r"^/orders/by-id/([a-zA-Z0-9-]+)$", |params| {
        order_id_route(params, |order_id| Route::Order { order_id })
    });
    route_parser.add_route_with_params(r"^/orders/by-id/([a-zA-Z0-9-]+)/status$", |params| {
        order_id_route(params, |order_id| Route::OrderStatus { order_id })
    });
    route_parser.add_route_with_params(r"^/orders/by-id/([a-zA-Z0-9-]+)/amount$", |params| {
        order_id_route(params, |order_id| Route::OrderAmount { order_id })
    });

    route_parser
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_routes() {
        let router = make_router();

        assert_eq!(router.test("/healthcheck"), Some(Route::Healthcheck));
        assert_eq!(router.test("/orders"), Some(Route::Orders));
        assert_eq!(router.test("/orders/quote"), Some(Route::OrderQuote));
        assert_eq!(router.test("/orders/export"), Some(Route::OrdersExport));
        assert_eq!(router.test("/special-orders"), Some(Route::SpecialOrders));
        assert_eq!(router.test("/orders/"), None);
    }

    #[test]
    fn test_order_routes() {
        let router = make_router();
        let order_id = OrderId::new();

        assert_eq!(
            router.test(&format!("/orders/by-id/{}", order_id)),
            Some(Route::Order { order_id })
        );
        assert_eq!(
            router.test(&format!("/orders/by-id/{}/status", order_id)),
            Some(Route::OrderStatus { order_id })
        );
        assert_eq!(
            router.test(&format!("/orders/by-id/{}/amount", order_id)),
            Some(Route::OrderAmount { order_id })
        );
        assert_eq!(router.test("/orders/by-id/not-a-uuid"), None);
    }
}
