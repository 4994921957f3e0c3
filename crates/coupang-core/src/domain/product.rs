use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Product entry as the gateway sends it.
///
/// Every field is optional on the wire; absent values default to empty, zero
/// or false. Numeric fields accept either JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub product_id: Option<u64>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub product_price: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub original_price: Option<u64>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub product_url: String,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_rocket: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_free_shipping: bool,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub discount_rate: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rank: Option<u64>,
}

impl RawProduct {
    pub fn price(&self) -> u64 {
        self.product_price.unwrap_or(0)
    }

    pub fn discount_rate(&self) -> u64 {
        self.discount_rate.unwrap_or(0)
    }
}

/// Shipping badge shown next to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryBadge {
    /// Rocket delivery: free shipping and free returns under the loyalty program.
    RocketFreeReturn,
    FreeShipping,
    Paid,
}

impl DeliveryBadge {
    /// Rocket delivery overrides the free-shipping flag.
    pub const fn from_flags(is_rocket: bool, is_free_shipping: bool) -> Self {
        if is_rocket {
            Self::RocketFreeReturn
        } else if is_free_shipping {
            Self::FreeShipping
        } else {
            Self::Paid
        }
    }
}

/// Discount classification derived from `discountRate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountTier {
    None,
    Standard,
    /// 30% or more.
    Hot,
}

impl DiscountTier {
    pub const HOT_THRESHOLD: u64 = 30;

    pub const fn from_rate(rate: u64) -> Self {
        if rate >= Self::HOT_THRESHOLD {
            Self::Hot
        } else if rate > 0 {
            Self::Standard
        } else {
            Self::None
        }
    }
}

/// Display-ready product record.
///
/// `has_variable_pricing` comes from a keyword heuristic: it flags listings
/// whose price probably depends on the chosen option, and is wrong in both
/// directions for some products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedProduct {
    pub product_id: Option<u64>,
    pub name: String,
    pub price: u64,
    pub price_bucket_label: String,
    pub delivery_badge: DeliveryBadge,
    pub discount_rate: u64,
    pub discount_tier: DiscountTier,
    pub has_variable_pricing: bool,
    pub image_url: Option<String>,
    pub category_name: Option<String>,
    pub rank: Option<u64>,
    pub resolved_link: String,
}

impl NormalizedProduct {
    /// Returns the record with `resolved_link` replaced.
    pub fn with_resolved_link(self, resolved_link: impl Into<String>) -> Self {
        Self {
            resolved_link: resolved_link.into(),
            ..self
        }
    }
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u64(&value))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::String(text) => matches!(text.trim(), "true" | "TRUE" | "Y" | "1"),
        Value::Number(number) => number.as_u64().is_some_and(|n| n != 0),
        _ => false,
    })
}

fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.round() as u64)
        }),
        Value::String(text) => {
            let cleaned = text.trim().trim_end_matches('%').replace(',', "");
            cleaned.parse::<u64>().ok().or_else(|| {
                cleaned
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.round() as u64)
            })
        }
        _ => None,
    }
}
