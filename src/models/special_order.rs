use chrono::prelude::*;
use serde_json::Value;
use validator::{Validate, ValidationError};

use super::common::MAX_KG;
use super::order::{Grade, OrderStatus};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SpecialItem {
    #[serde(rename = "精米")]
    Polished,
    #[serde(rename = "玄米")]
    Brown,
    #[serde(rename = "もち米")]
    Glutinous,
}

impl SpecialItem {
    pub fn grade(self) -> Grade {
        match self {
            SpecialItem::Polished => Grade::Polished,
            SpecialItem::Brown => Grade::Brown,
            SpecialItem::Glutinous => Grade::Glutinous,
        }
    }
}

fn validate_weight(weight: f64) -> Result<(), ValidationError> {
    if weight.is_finite() && weight > 0.0 && weight <= MAX_KG {
        Ok(())
    } else {
        Err(ValidationError::new("weight"))
    }
}

fn validate_special_order(order: &NewSpecialOrder) -> Result<(), ValidationError> {
    validate_weight(order.weight)
}

/// Manually priced order, recorded outside the two-step order flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_special_order"))]
pub struct NewSpecialOrder {
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 12))]
    pub trader: String,
    pub item: SpecialItem,
    pub weight: f64,
    #[validate(range(min = 0, max = 1000000000))]
    pub amount: i64,
}

impl NewSpecialOrder {
    pub fn into_document_data(self, created_at: DateTime<Utc>) -> Value {
        json!({
            "date": self.date.format("%Y-%m-%d").to_string(),
            "trader": self.trader,
            "item": self.item.grade().label(),
            "weight": self.weight,
            "amount": self.amount,
            "type": "special",
            "createdAt": created_at.to_rfc3339(),
            "status": OrderStatus::Open.as_str(),
        })
    }
}
