use crate::domain::{
    price_bucket_label, DeliveryBadge, DiscountTier, NormalizedProduct, RawProduct,
};
use crate::heuristics::VariantPricing;

/// Turns raw gateway products into display records. Pure; performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct ResultNormalizer {
    variant_pricing: VariantPricing,
}

impl ResultNormalizer {
    pub fn new(variant_pricing: VariantPricing) -> Self {
        Self { variant_pricing }
    }

    /// The record's `resolved_link` starts out as the product URL; link
    /// resolution replaces it later.
    pub fn normalize(&self, raw: RawProduct) -> NormalizedProduct {
        let price = raw.price();
        let discount_rate = raw.discount_rate().min(100);
        let has_variable_pricing = self.variant_pricing.is_variable(&raw.product_name, price);

        NormalizedProduct {
            product_id: raw.product_id,
            price,
            price_bucket_label: price_bucket_label(price),
            delivery_badge: DeliveryBadge::from_flags(raw.is_rocket, raw.is_free_shipping),
            discount_rate,
            discount_tier: DiscountTier::from_rate(discount_rate),
            has_variable_pricing,
            image_url: raw.product_image.filter(|url| !url.is_empty()),
            category_name: raw.category_name,
            rank: raw.rank,
            resolved_link: raw.product_url,
            name: raw.product_name,
        }
    }

    pub fn normalize_all(&self, products: Vec<RawProduct>) -> Vec<NormalizedProduct> {
        products
            .into_iter()
            .map(|raw| self.normalize(raw))
            .collect()
    }
}
