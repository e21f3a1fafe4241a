//! Types shared by the Checkout and Headless APIs
//!
//! Tebex mixes `camelCase` and `snake_case` field names, sometimes within one
//! object; serde renames follow the wire format exactly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Price breakdown of a basket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDetails {
    /// Price before discounts and tax
    pub sub_total: f64,
    /// Price before discounts
    pub full_price: f64,
    /// Applied discounts; the object shape is undocumented upstream
    #[serde(default)]
    pub discounts: Vec<Value>,
    /// Tax amount
    pub tax: f64,
    /// Amount to pay
    pub total: f64,
    /// Surcharges; the object shape is undocumented upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharges: Option<Vec<Value>>,
    /// Remaining wallet balance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    /// Sales applied to the basket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales: Option<Vec<Sale>>,
    /// Gift cards applied to the basket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub giftcards: Option<Vec<GiftCard>>,
    /// Whether round-up donations are enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_up: Option<bool>,
}

/// Coupon applied to a basket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Coupon code as typed by the customer
    pub coupon_code: String,
}

/// Gift card applied to a basket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCard {
    /// Gift card number
    pub card_number: String,
}

/// Billing address of a basket
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(rename = "postalCode", default)]
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    /// Free-form address line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// One line of a checkout basket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketRow {
    /// Row id, used to remove the row
    pub id: u64,
    /// Package name
    pub name: String,
    /// Quantity
    pub quantity: u32,
    /// Unit price
    pub price: f64,
    /// Row total
    pub total: f64,
}

/// Links returned with a checkout basket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketLinks {
    /// API URL of the basket itself
    #[serde(rename = "self")]
    pub self_link: String,
    /// Customer-facing checkout page
    pub checkout: String,
    /// Cancel URL
    #[serde(default)]
    pub cancel: String,
    /// Payment URL, once a payment exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
}

/// Share of a package's revenue paid out to a partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueShare {
    /// Partner account id
    pub partner_id: String,
    /// Percentage of revenue, 0 to 100
    pub percentage: f64,
}

/// Ad-hoc package definition sent with a checkout basket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Package id, or 0 for an ad-hoc package
    pub id: u64,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Description shown at checkout
    pub description: String,
}

/// How a sale reduces the price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `amount` is a percentage
    Percentage,
    /// `amount` is an absolute value in basket currency
    Amount,
}

/// Sale applied to a basket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Sale id
    pub id: u64,
    /// Display name
    pub name: String,
    /// How `amount` is applied
    pub discount_type: DiscountType,
    /// Discount value
    pub amount: f64,
}

/// Package and quantity pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    /// Package id
    pub package_id: u64,
    /// Quantity
    pub quantity: u32,
}

impl CheckoutItem {
    /// One unit of a package
    pub fn new(package_id: u64) -> Self {
        Self {
            package_id,
            quantity: 1,
        }
    }

    /// Set the quantity
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_price_details_camel_case() {
        let details: PriceDetails = serde_json::from_value(json!({
            "subTotal": 1.27,
            "fullPrice": 1.4,
            "discounts": [],
            "tax": 0.13,
            "total": 1.4,
            "roundUp": null
        }))
        .unwrap();

        assert_eq!(details.sub_total, 1.27);
        assert_eq!(details.round_up, None);
        assert!(details.sales.is_none());
    }

    #[test]
    fn test_address_mixed_naming() {
        let address: Address = serde_json::from_value(json!({
            "street": "1 Main St",
            "city": "Bath",
            "state": "",
            "postalCode": "BA1 1AA",
            "country": "GB",
            "first_name": "Neil",
            "state_id": null
        }))
        .unwrap();

        assert_eq!(address.postal_code, "BA1 1AA");
        assert_eq!(address.first_name.as_deref(), Some("Neil"));
        assert_eq!(address.state_id, None);
    }

    #[test]
    fn test_basket_links_self_rename() {
        let links: BasketLinks = serde_json::from_value(json!({
            "self": "https://checkout.tebex.io/api/baskets/1a-abc",
            "checkout": "https://pay.tebex.io/1a-abc",
            "cancel": "https://example.com/cancel"
        }))
        .unwrap();

        assert_eq!(links.self_link, "https://checkout.tebex.io/api/baskets/1a-abc");
        let back = serde_json::to_value(&links).unwrap();
        assert_eq!(back["self"], "https://checkout.tebex.io/api/baskets/1a-abc");
        assert!(back.get("payment").is_none());
    }

    #[test]
    fn test_sale_discount_type() {
        let sale = Sale {
            id: 1,
            name: "Summer".to_string(),
            discount_type: DiscountType::Percentage,
            amount: 10.0,
        };
        let value = serde_json::to_value(&sale).unwrap();
        assert_eq!(value["discountType"], "percentage");
    }

    #[test]
    fn test_checkout_item_builder() {
        let item = CheckoutItem::new(6276316).with_quantity(2);
        assert_eq!(
            serde_json::to_value(item).unwrap(),
            json!({"packageId": 6276316, "quantity": 2})
        );
    }
}
