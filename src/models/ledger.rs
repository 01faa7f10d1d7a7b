use chrono::prelude::*;
use serde_json::Value;
use validator::{Validate, ValidationError};

use super::order::OrderStatus;

fn validate_ledger_order(order: &NewLedgerOrder) -> Result<(), ValidationError> {
    let polished = order.polished_kg > 0.0 && order.polished_count > 0;
    let brown = order.brown_kg > 0.0 && order.brown_count > 0;

    if polished || brown {
        Ok(())
    } else {
        Err(ValidationError::new("empty_trade"))
    }
}

/// Trade entered from the admin screen: polished and brown rice in bags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_ledger_order"))]
pub struct NewLedgerOrder {
    pub date: NaiveDate,
    /// May be left blank
    #[serde(default)]
    #[validate(length(max = 12))]
    pub trader: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100000.0))]
    pub polished_kg: f64,
    #[serde(default)]
    #[validate(range(max = 100000))]
    pub polished_count: u32,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100000.0))]
    pub brown_kg: f64,
    #[serde(default)]
    #[validate(range(max = 100000))]
    pub brown_count: u32,
    /// Replaces the computed price
    #[serde(default)]
    #[validate(range(min = 0, max = 1000000000))]
    pub amount: Option<i64>,
}

impl NewLedgerOrder {
    pub fn into_document_data(self, created_at: DateTime<Utc>) -> Value {
        let mut data = json!({
            "date": self.date.format("%Y-%m-%d").to_string(),
            "trader": self.trader,
            "polishedKg": self.polished_kg,
            "polishedCount": self.polished_count,
            "brownKg": self.brown_kg,
            "brownCount": self.brown_count,
            "createdAt": created_at.to_rfc3339(),
            "status": OrderStatus::Open.as_str(),
        });
        if let (Some(amount), Some(map)) = (self.amount, data.as_object_mut()) {
            map.insert("amount".to_string(), Value::from(amount));
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;

    fn trade() -> NewLedgerOrder {
        NewLedgerOrder {
            date: NaiveDate::from_ymd_opt(2025, 10, 5).unwrap(),
            trader: "山田商店".to_string(),
            polished_kg: 10.0,
            polished_count: 2,
            brown_kg: 0.0,
            brown_count: 0,
            amount: None,
        }
    }

    #[test]
    fn test_trade_needs_a_line() {
        assert!(trade().validate().is_ok());

        let empty = NewLedgerOrder {
            polished_count: 0,
            ..trade()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_oversized_trade_is_rejected() {
        let heavy = NewLedgerOrder {
            polished_kg: 1e16,
            ..trade()
        };
        assert!(heavy.validate().unwrap_err().field_errors().contains_key("polished_kg"));

        let many = NewLedgerOrder {
            brown_kg: 30.0,
            brown_count: MAX_COUNT + 1,
            ..trade()
        };
        assert!(many.validate().unwrap_err().field_errors().contains_key("brown_count"));

        let pricey = NewLedgerOrder {
            amount: Some(MAX_AMOUNT + 1),
            ..trade()
        };
        assert!(pricey.validate().unwrap_err().field_errors().contains_key("amount"));
    }

    #[test]
    fn test_trader_limit() {
        let order = NewLedgerOrder {
            trader: "あいうえおかきくけこさしす".to_string(),
            ..trade()
        };
        assert!(order.validate().unwrap_err().field_errors().contains_key("trader"));

        let blank = NewLedgerOrder {
            trader: String::new(),
            ..trade()
        };
        assert!(blank.validate().is_ok());
    }

    #[test]
    fn test_document_is_read_as_ledger() {
        let doc = OrderDocument {
            id: OrderId::new(),
            created_at: Utc::now(),
            data: NewLedgerOrder {
                amount: Some(10_000),
                ..trade()
            }
            .into_document_data(Utc::now()),
        };

        let order = Order::from_document(&doc, &Pricing::default());
        assert_eq!(order.kind, OrderKind::Ledger);
        assert_eq!(order.derived_amount, Yen(12_000));
        assert_eq!(order.amount, Yen(10_000));
    }
}
