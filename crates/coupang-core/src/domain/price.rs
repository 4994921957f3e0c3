//! Price buckets.
//!
//! Search-time prices drift from live prices, so listings show a coarse band
//! instead of the exact amount. Every band floors the price to its unit.

const UNDER_LABEL_LIMIT: u64 = 5_000;
const THOUSANDS_LIMIT: u64 = 10_000;
const RANGE_START: u64 = 50_000;
const TEN_THOUSANDS_LIMIT: u64 = 1_000_000;

/// Band a price falls into, before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBucket {
    /// Below 5,000.
    Under5k,
    /// [5,000, 10,000): floored thousand, in thousands.
    Thousands(u64),
    /// [10,000, 50,000): floored ten-thousand, in thousands.
    TenThousands(u64),
    /// [50,000, 1,000,000): `[low, low + 10k)` range, `low` in thousands.
    TenThousandRange(u64),
    /// 1,000,000 and above: floored million, in thousands.
    Millions(u64),
}

impl PriceBucket {
    pub const fn from_price(price: u64) -> Self {
        if price < UNDER_LABEL_LIMIT {
            Self::Under5k
        } else if price < THOUSANDS_LIMIT {
            Self::Thousands(price / 1_000)
        } else if price < RANGE_START {
            Self::TenThousands(price / 10_000 * 10)
        } else if price < TEN_THOUSANDS_LIMIT {
            Self::TenThousandRange(price / 10_000 * 10)
        } else {
            Self::Millions(price / 1_000_000 * 1_000)
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Under5k => String::from("under 5K"),
            Self::Thousands(k) | Self::TenThousands(k) | Self::Millions(k) => {
                format!("about {}k-level", group_thousands(k))
            }
            Self::TenThousandRange(low) => format!("{low}k-level–{}k-level", low + 10),
        }
    }
}

/// Human-scale label for a price in minor currency units.
pub fn price_bucket_label(price: u64) -> String {
    PriceBucket::from_price(price).label()
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
