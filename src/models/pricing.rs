use super::common::{Kg, Yen};

/// Unit prices in yen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pricing {
    pub price_per_kg: i64,
    /// Charged once per polished bag on trade entries
    pub polished_bag_fee: i64,
    pub shipping_fee: i64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            price_per_kg: 500,
            polished_bag_fee: 1000,
            shipping_fee: 500,
        }
    }
}

fn to_yen(v: f64) -> Yen {
    Yen(v.round() as i64)
}

impl Pricing {
    /// `kg × count × price + count × bag fee`
    pub fn polished_amount(&self, kg: Kg, count: u32) -> Yen {
        let count = f64::from(count);
        to_yen(kg.0 * count * self.price_per_kg as f64 + count * self.polished_bag_fee as f64)
    }

    /// `kg × count × price`
    pub fn brown_amount(&self, kg: Kg, count: u32) -> Yen {
        to_yen(kg.0 * f64::from(count) * self.price_per_kg as f64)
    }

    pub fn storefront_subtotal(&self, kg: Kg) -> Yen {
        to_yen(kg.0 * self.price_per_kg as f64)
    }

    pub fn shipping(&self, delivery: bool) -> Yen {
        if delivery {
            Yen(self.shipping_fee)
        } else {
            Yen(0)
        }
    }
}
