use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use chrono::prelude::*;
use failure::Error as FailureError;

use super::common::*;
use super::order::{Grade, Order, OrderStatus};
use crate::errors::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderView {
    All,
    /// Open orders only
    Reservations,
    /// Completed orders only
    History,
}

impl Default for OrderView {
    fn default() -> Self {
        OrderView::All
    }
}

impl OrderView {
    pub fn includes(self, status: OrderStatus) -> bool {
        match self {
            OrderView::All => true,
            OrderView::Reservations => status == OrderStatus::Open,
            OrderView::History => status == OrderStatus::Completed,
        }
    }
}

impl FromStr for OrderView {
    type Err = FailureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(OrderView::All),
            "reservations" => Ok(OrderView::Reservations),
            "history" => Ok(OrderView::History),
            other => Err(format_err!("Unknown view {}", other).context(Error::Parse).into()),
        }
    }
}

/// Year and month are matched against the local calendar date; `None` means any.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderListFilter {
    pub view: OrderView,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "all")
}

impl OrderListFilter {
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, FailureError> {
        let view = match param(params, "view") {
            Some(v) => v.parse()?,
            None => OrderView::All,
        };
        let year = match param(params, "year") {
            Some(v) => Some(
                v.parse::<i32>()
                    .map_err(|e| format_err!("Invalid year {}: {}", v, e).context(Error::Parse))?,
            ),
            None => None,
        };
        let month = match param(params, "month") {
            Some(v) => match v.parse::<u32>() {
                Ok(month) if (1..=12).contains(&month) => Some(month),
                _ => return Err(format_err!("Invalid month {}", v).context(Error::Parse).into()),
            },
            None => None,
        };

        Ok(Self { view, year, month })
    }

    pub fn matches(&self, order: &Order) -> bool {
        let date = order.local_date();

        self.view.includes(order.status)
            && self.year.map_or(true, |year| date.year() == year)
            && self.month.map_or(true, |month| date.month() == month)
    }
}

/// Sums over one filtered list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub polished_kg: Kg,
    pub brown_kg: Kg,
    pub glutinous_kg: Kg,
    pub total_kg: Kg,
    pub total_amount: Yen,
}

impl OrderTotals {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut totals = Self::default();
        for order in orders {
            totals.polished_kg += order.consumed_kg_of(Grade::Polished);
            totals.brown_kg += order.consumed_kg_of(Grade::Brown);
            totals.glutinous_kg += order.consumed_kg_of(Grade::Glutinous);
            totals.total_kg += order.consumed_kg();
            totals.total_amount += order.amount;
        }
        totals
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderList {
    /// Newest first
    pub orders: Vec<Order>,
    pub totals: OrderTotals,
    /// Years present in the whole collection, newest first
    pub years: Vec<i32>,
}

impl OrderList {
    pub fn build(orders: Vec<Order>, filter: &OrderListFilter) -> Self {
        let years = orders
            .iter()
            .map(|order| order.local_date().year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .collect();

        let orders = filter_orders(orders, filter);
        let totals = OrderTotals::from_orders(&orders);

        Self { orders, totals, years }
    }
}

/// Applies the filter and sorts by date, newest first.
pub fn filter_orders(orders: Vec<Order>, filter: &OrderListFilter) -> Vec<Order> {
    let mut orders = orders.into_iter().filter(|order| filter.matches(order)).collect::<Vec<_>>();
    orders.sort_by(|a, b| b.date.cmp(&a.date));
    orders
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryStatus {
    pub total_kg: Kg,
    pub max_kg: Kg,
    /// Capped at 100
    pub percentage: f64,
    pub remaining_kg: Kg,
}

impl InventoryStatus {
    pub fn new(orders: &[Order], max_kg: Kg) -> Self {
        // Bag counts are multiplied in: 3 bags of 10kg consume 30kg
        let total_kg = orders.iter().map(Order::consumed_kg).sum::<Kg>();
        let percentage = if max_kg.0 > 0.0 {
            (total_kg.0 / max_kg.0 * 100.0).min(100.0)
        } else {
            0.0
        };

        Self {
            total_kg,
            max_kg,
            percentage,
            remaining_kg: Kg((max_kg.0 - total_kg.0).max(0.0)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub inventory: InventoryStatus,
    pub reservations: usize,
    pub history: usize,
}

impl Dashboard {
    pub fn new(orders: &[Order], max_kg: Kg) -> Self {
        let reservations = orders.iter().filter(|o| o.status == OrderStatus::Open).count();

        Self {
            inventory: InventoryStatus::new(orders, max_kg),
            reservations,
            history: orders.len() - reservations,
        }
    }
}
