use std::fmt;
use std::str::FromStr;

use chrono::prelude::*;
use failure::Error as FailureError;
use serde_json::{Map, Value};
use tokio_postgres::Row;
use uuid::Uuid;

use super::common::*;
use super::pricing::Pricing;
use crate::errors::Error;

/// Shown for documents without any customer name.
pub const NAMELESS_CUSTOMER: &str = "名無し";

pub const ID_COLUMN: &str = "id";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const DATA_COLUMN: &str = "data";

const TYPE_FIELD: &str = "type";
const STATUS_FIELD: &str = "status";
const AMOUNT_FIELD: &str = "amount";

#[derive(Clone, Copy, Debug, Display, Eq, FromStr, PartialEq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        OrderId(Uuid::new_v4())
    }
}

/// An open order is a reservation; once completed it becomes a history entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Completed,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Open
    }
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Completed => "completed",
        }
    }

    /// Unknown or missing values read as open.
    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = FailureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(OrderStatus::Open),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(format_err!("Unknown order status {}", other).context(Error::Parse).into()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Placed by a customer through the order form
    Storefront,
    /// Trade entered by the farm with polished/brown bag counts
    Ledger,
    /// Manually priced entry
    Special,
}

impl OrderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::Storefront => "storefront",
            OrderKind::Ledger => "ledger",
            OrderKind::Special => "special",
        }
    }

    pub fn detect(data: &Value) -> Self {
        if data.get(TYPE_FIELD).and_then(Value::as_str) == Some("special") {
            OrderKind::Special
        } else if data.get("product").is_some() || data.get("method").is_some() {
            OrderKind::Storefront
        } else {
            OrderKind::Ledger
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// 精米
    Polished,
    /// 玄米
    Brown,
    /// もち米
    Glutinous,
}

impl Grade {
    pub fn label(self) -> &'static str {
        match self {
            Grade::Polished => "精米",
            Grade::Brown => "玄米",
            Grade::Glutinous => "もち米",
        }
    }

    /// Grade named by a product or item label, polished unless stated otherwise.
    pub fn from_label(label: &str) -> Self {
        if label.contains("もち米") {
            Grade::Glutinous
        } else if label.contains("玄米") {
            Grade::Brown
        } else {
            Grade::Polished
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub grade: Grade,
    /// Weight of one bag
    pub kg: Kg,
    pub count: u32,
    pub amount: Yen,
}

impl OrderLine {
    pub fn consumed_kg(&self) -> Kg {
        Kg(self.kg.0 * f64::from(self.count))
    }
}

/// Stored document as the database returns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderDocument {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub data: Value,
}

impl OrderDocument {
    pub fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: OrderId(row.try_get(ID_COLUMN)?),
            created_at: row.try_get(CREATED_AT_COLUMN)?,
            data: row.try_get(DATA_COLUMN)?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct OrderDocumentInserter {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub data: Value,
}

#[derive(Clone, Debug, Default)]
pub struct OrderDocumentFilter {
    pub id: Option<OrderId>,
}

impl OrderDocumentFilter {
    pub fn by_id(id: OrderId) -> Self {
        Self { id: Some(id) }
    }
}

/// Top-level fields merged into the matching documents.
#[derive(Clone, Debug)]
pub struct OrderDocumentUpdater {
    pub filter: OrderDocumentFilter,
    pub patch: Map<String, Value>,
}

impl OrderDocumentUpdater {
    pub fn status(id: OrderId, status: OrderStatus) -> Self {
        let mut patch = Map::new();
        patch.insert(STATUS_FIELD.to_string(), Value::from(status.as_str()));
        Self {
            filter: OrderDocumentFilter::by_id(id),
            patch,
        }
    }

    /// `None` clears the manual amount.
    pub fn amount(id: OrderId, amount: Option<Yen>) -> Self {
        let mut patch = Map::new();
        patch.insert(AMOUNT_FIELD.to_string(), amount.map(|v| Value::from(v.0)).unwrap_or(Value::Null));
        Self {
            filter: OrderDocumentFilter::by_id(id),
            patch,
        }
    }
}

/// Normalized view of any order document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub date: DateTime<Utc>,
    pub customer_name: String,
    pub lines: Vec<OrderLine>,
    pub shipping_fee: Yen,
    /// Price computed from the lines and shipping
    pub derived_amount: Yen,
    pub amount_override: Option<Yen>,
    /// What the order is billed for
    pub amount: Yen,
}

impl Order {
    pub fn from_document(doc: &OrderDocument, pricing: &Pricing) -> Self {
        let data = &doc.data;
        let field = |name: &str| data.get(name);

        let kind = OrderKind::detect(data);
        let date = coerce_timestamp(field("date"))
            .or_else(|| coerce_timestamp(field("createdAt")))
            .unwrap_or(doc.created_at);
        let customer_name = coerce_text(field("trader"))
            .or_else(|| coerce_text(field("customerName")))
            .or_else(|| coerce_text(field("name")))
            .unwrap_or_else(|| NAMELESS_CUSTOMER.to_string());

        let mut lines = Vec::new();
        let mut shipping_fee = Yen(0);
        let mut amount_override = None;

        match kind {
            OrderKind::Storefront => {
                let grade = Grade::from_label(field("product").and_then(Value::as_str).unwrap_or_default());
                let kg = Kg(coerce_number(field("kg")));
                if kg.0 > 0.0 {
                    lines.push(OrderLine {
                        grade,
                        kg,
                        count: 1,
                        amount: pricing.storefront_subtotal(kg),
                    });
                }
                shipping_fee = pricing.shipping(field("method").and_then(Value::as_str) == Some("delivery"));
                amount_override = coerce_amount(field(AMOUNT_FIELD));
            }
            OrderKind::Ledger => {
                let polished_kg = Kg(coerce_number(field("polishedKg")));
                let polished_count = coerce_count(field("polishedCount"));
                let brown_kg = Kg(coerce_number(field("brownKg")));
                let brown_count = coerce_count(field("brownCount"));

                if polished_kg.0 > 0.0 || polished_count > 0 {
                    lines.push(OrderLine {
                        grade: Grade::Polished,
                        kg: polished_kg,
                        count: polished_count,
                        amount: pricing.polished_amount(polished_kg, polished_count),
                    });
                }
                if brown_kg.0 > 0.0 || brown_count > 0 {
                    lines.push(OrderLine {
                        grade: Grade::Brown,
                        kg: brown_kg,
                        count: brown_count,
                        amount: pricing.brown_amount(brown_kg, brown_count),
                    });
                }
                amount_override = coerce_amount(field(AMOUNT_FIELD));
            }
            OrderKind::Special => {
                // The entered amount is the price itself
                lines.push(OrderLine {
                    grade: Grade::from_label(field("item").and_then(Value::as_str).unwrap_or_default()),
                    kg: Kg(coerce_number(field("weight"))),
                    count: 1,
                    amount: coerce_amount(field(AMOUNT_FIELD)).unwrap_or_default(),
                });
            }
        }

        let derived_amount = lines.iter().map(|line| line.amount).sum::<Yen>() + shipping_fee;

        Self {
            id: doc.id,
            kind,
            status: OrderStatus::from_value(field(STATUS_FIELD)),
            date,
            customer_name,
            lines,
            shipping_fee,
            derived_amount,
            amount_override,
            amount: amount_override.unwrap_or(derived_amount),
        }
    }

    pub fn line(&self, grade: Grade) -> Option<&OrderLine> {
        self.lines.iter().find(|line| line.grade == grade)
    }

    pub fn consumed_kg(&self) -> Kg {
        self.lines.iter().map(OrderLine::consumed_kg).sum()
    }

    pub fn consumed_kg_of(&self, grade: Grade) -> Kg {
        self.lines
            .iter()
            .filter(|line| line.grade == grade)
            .map(OrderLine::consumed_kg)
            .sum()
    }

    pub fn local_date(&self) -> DateTime<FixedOffset> {
        self.date.with_timezone(&local_offset())
    }
}
