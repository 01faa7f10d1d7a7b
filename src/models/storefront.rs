use std::borrow::Cow;

use chrono::prelude::*;
use regex::Regex;
use serde_json::Value;
use validator::{Validate, ValidationError};

use super::common::*;
use super::order::{Grade, Order, OrderStatus};
use super::pricing::Pricing;

/// Bag sizes offered on the order form.
pub const ALLOWED_KG: [u32; 5] = [1, 5, 10, 20, 30];

lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^0\d{1,4}\d{1,4}\d{3,4}$").expect("Invalid phone regex");
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "新米 こしひかり")]
    NewKoshihikari,
    #[serde(rename = "玄米 こしひかり")]
    BrownKoshihikari,
}

impl Product {
    pub fn label(self) -> &'static str {
        match self {
            Product::NewKoshihikari => "新米 こしひかり",
            Product::BrownKoshihikari => "玄米 こしひかり",
        }
    }

    pub fn grade(self) -> Grade {
        Grade::from_label(self.label())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiveMethod {
    /// Shipped to the customer's address
    Delivery,
    /// Collected at the farm on one of three requested days
    Pickup,
}

impl ReceiveMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ReceiveMethod::Delivery => "delivery",
            ReceiveMethod::Pickup => "pickup",
        }
    }
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// Hyphens are accepted as separators.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.replace('-', "");
    if PHONE_REGEX.is_match(&digits) {
        Ok(())
    } else {
        Err(error_with_message("phone", "有効な電話番号を入力してください。例: 09012345678"))
    }
}

fn validate_storefront_order(order: &NewStorefrontOrder) -> Result<(), ValidationError> {
    if !ALLOWED_KG.contains(&order.kg) {
        return Err(error_with_message("kg", "数量は 1, 5, 10, 20, 30kg から選択してください。"));
    }

    match order.method {
        ReceiveMethod::Delivery => {
            if order.address.trim().is_empty() {
                return Err(error_with_message("address", "配送先住所を入力してください。"));
            }
        }
        ReceiveMethod::Pickup => {
            let all_dates_valid = order.pickup_dates.len() == 3
                && order
                    .pickup_dates
                    .iter()
                    .all(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").is_ok());
            if !all_dates_valid {
                return Err(error_with_message(
                    "pickup_dates",
                    "第1〜第3希望の受け取り日をすべて入力してください。",
                ));
            }
        }
    }

    Ok(())
}

/// Customer order as submitted from the order form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_storefront_order", skip_on_field_errors = false))]
pub struct NewStorefrontOrder {
    pub product: Product,
    pub kg: u32,
    pub method: ReceiveMethod,
    #[serde(default)]
    pub address: String,
    #[validate(length(min = 1, message = "お名前を入力してください。"))]
    pub name: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[serde(default)]
    pub pickup_dates: Vec<String>,
    #[serde(default)]
    pub confirmed_pickup_date: Option<String>,
}

impl NewStorefrontOrder {
    pub fn into_document_data(self, created_at: DateTime<Utc>) -> Value {
        json!({
            "product": self.product.label(),
            "kg": self.kg,
            "method": self.method.as_str(),
            "address": self.address,
            "name": self.name,
            "phone": self.phone,
            "pickupDates": self.pickup_dates,
            "confirmedPickupDate": self.confirmed_pickup_date.unwrap_or_default(),
            "createdAt": created_at.to_rfc3339(),
            "status": OrderStatus::Open.as_str(),
        })
    }
}

/// Price breakdown shown before the customer confirms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub product: Product,
    pub kg: u32,
    pub method: ReceiveMethod,
    pub subtotal: Yen,
    pub shipping_fee: Yen,
    pub total: Yen,
}

impl Quote {
    pub fn new(order: &NewStorefrontOrder, pricing: &Pricing) -> Self {
        let subtotal = pricing.storefront_subtotal(Kg(f64::from(order.kg)));
        let shipping_fee = pricing.shipping(order.method == ReceiveMethod::Delivery);

        Self {
            product: order.product,
            kg: order.kg,
            method: order.method,
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        }
    }
}

/// Returned once the order is stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order: Order,
    pub quote: Quote,
    pub message: String,
}

impl OrderReceipt {
    pub fn new(order: Order, quote: Quote) -> Self {
        let message = match quote.method {
            ReceiveMethod::Delivery => "ご注文ありがとうございます。ご指定の住所へお届けします。",
            ReceiveMethod::Pickup => "ご注文ありがとうございます。受け取り日が決まりましたらご連絡いたします。",
        };

        Self {
            order,
            quote,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery_order() -> NewStorefrontOrder {
        NewStorefrontOrder {
            product: Product::NewKoshihikari,
            kg: 10,
            method: ReceiveMethod::Delivery,
            address: "新潟県南魚沼市1-2-3".to_string(),
            name: "佐藤".to_string(),
            phone: "090-1234-5678".to_string(),
            pickup_dates: vec![],
            confirmed_pickup_date: None,
        }
    }

    #[test]
    fn test_valid_delivery_order() {
        assert!(delivery_order().validate().is_ok());
    }

    #[test]
    fn test_delivery_requires_address() {
        let order = NewStorefrontOrder {
            address: "  ".to_string(),
            ..delivery_order()
        };

        let errors = order.validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn test_pickup_requires_three_dates() {
        let mut order = NewStorefrontOrder {
            method: ReceiveMethod::Pickup,
            address: String::new(),
            pickup_dates: vec!["2025-11-01".to_string(), "2025-11-02".to_string(), String::new()],
            ..delivery_order()
        };
        assert!(order.validate().is_err());

        order.pickup_dates[2] = "2025-11-03".to_string();
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_name_phone_and_kg() {
        let order = NewStorefrontOrder {
            name: String::new(),
            phone: "12345".to_string(),
            ..delivery_order()
        };
        let errors = order.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("phone"));

        let order = NewStorefrontOrder { kg: 7, ..delivery_order() };
        assert!(order.validate().is_err());
    }

    #[test]
    fn test_product_labels_deserialize() {
        let order: NewStorefrontOrder = serde_json::from_value(json!({
            "product": "玄米 こしひかり",
            "kg": 5,
            "method": "pickup",
            "name": "田中",
            "phone": "0255551234",
            "pickup_dates": ["2025-11-01", "2025-11-02", "2025-11-03"],
        }))
        .unwrap();

        assert_eq!(order.product, Product::BrownKoshihikari);
        assert_eq!(order.product.grade(), Grade::Brown);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_quote() {
        let quote = Quote::new(&delivery_order(), &Pricing::default());
        assert_eq!(quote.subtotal, Yen(5000));
        assert_eq!(quote.shipping_fee, Yen(500));
        assert_eq!(quote.total, Yen(5500));

        let pickup = NewStorefrontOrder {
            method: ReceiveMethod::Pickup,
            ..delivery_order()
        };
        assert_eq!(Quote::new(&pickup, &Pricing::default()).total, Yen(5000));
    }

    #[test]
    fn test_document_reads_back_with_same_total() {
        let order = delivery_order();
        let quote = Quote::new(&order, &Pricing::default());
        let doc = super::super::order::OrderDocument {
            id: super::super::order::OrderId::new(),
            created_at: Utc::now(),
            data: order.into_document_data(Utc::now()),
        };

        let stored = Order::from_document(&doc, &Pricing::default());
        assert_eq!(stored.amount, quote.total);
        assert_eq!(stored.status, OrderStatus::Open);
    }
}
