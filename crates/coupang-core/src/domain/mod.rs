//! Product records and the facts derived from them.

pub mod price;
pub mod product;

pub use price::{price_bucket_label, PriceBucket};
pub use product::{DeliveryBadge, DiscountTier, NormalizedProduct, RawProduct};
