//! Keyword tables behind the "price may vary by option" flag.
//!
//! The tables are plain data so they can be replaced or localized without
//! touching the normalizer: deserialize a [`VariantPricingRules`] from JSON and
//! compile it with [`VariantPricing::compile`].

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Uncompiled rule tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantPricingRules {
    /// Regex patterns for storage, screen-size, dimension and tier qualifiers.
    pub spec_patterns: Vec<String>,
    /// Product categories whose listings usually bundle several price points.
    pub category_keywords: Vec<String>,
    /// Words announcing a color/size/option picker.
    pub variant_keywords: Vec<String>,
    /// Prices at or above this are flagged regardless of name.
    pub price_threshold: u64,
}

impl Default for VariantPricingRules {
    fn default() -> Self {
        Self {
            spec_patterns: strings(&[
                r"(?i)\d+(?:\.\d+)?\s*(?:gb|tb|mb|mah|ml|kg|g|l)\b",
                r"(?i)\d+(?:\.\d+)?\s*(?:inch|인치|형)\b",
                r#"\d+(?:\.\d+)?\s*(?:"|″)"#,
                r"(?i)\d+(?:\.\d+)?\s*(?:mm|cm|m)\b",
                r"(?i)\d+\s*[x×*]\s*\d+",
                r"(?i)\b(?:pro|max|plus|ultra|mini|lite)\b",
                r"(?:^|\s)(?:프로|맥스|플러스|울트라|미니|라이트)(?:$|\s|\d)",
            ]),
            category_keywords: strings(&[
                "laptop",
                "notebook",
                "macbook",
                "iphone",
                "ipad",
                "galaxy",
                "tablet",
                "monitor",
                "television",
                "camera",
                "refrigerator",
                "washer",
                "노트북",
                "맥북",
                "아이폰",
                "아이패드",
                "갤럭시",
                "태블릿",
                "모니터",
                "티비",
                "카메라",
                "냉장고",
                "세탁기",
                "건조기",
                "에어컨",
            ]),
            variant_keywords: strings(&[
                "color", "colour", "size", "option", "options", "variant", "색상", "컬러", "사이즈",
                "옵션", "택1", "선택",
            ]),
            price_threshold: 1_000_000,
        }
    }
}

impl VariantPricingRules {
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Compiled form of [`VariantPricingRules`].
#[derive(Debug, Clone)]
pub struct VariantPricing {
    spec_patterns: RegexSet,
    keywords: Vec<Regex>,
    price_threshold: u64,
}

impl VariantPricing {
    pub fn compile(rules: &VariantPricingRules) -> Result<Self, ConfigError> {
        for pattern in &rules.spec_patterns {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        let spec_patterns =
            RegexSet::new(&rules.spec_patterns).map_err(|source| ConfigError::InvalidPattern {
                pattern: rules.spec_patterns.join(" | "),
                source,
            })?;

        let keywords = rules
            .category_keywords
            .iter()
            .chain(&rules.variant_keywords)
            .filter(|keyword| !keyword.trim().is_empty())
            .map(|keyword| keyword_regex(keyword))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            spec_patterns,
            keywords,
            price_threshold: rules.price_threshold,
        })
    }

    /// Heuristic only: a `true` means "likely", never "certain".
    pub fn is_variable(&self, name: &str, price: u64) -> bool {
        price >= self.price_threshold
            || self.spec_patterns.is_match(name)
            || self.keywords.iter().any(|keyword| keyword.is_match(name))
    }
}

impl Default for VariantPricing {
    fn default() -> Self {
        Self::compile(&VariantPricingRules::default())
            .expect("built-in variant pricing rules must compile")
    }
}

/// ASCII keywords match whole words case-insensitively; Hangul keywords match
/// as substrings since Korean product names glue particles onto nouns.
fn keyword_regex(keyword: &str) -> Result<Regex, ConfigError> {
    let escaped = regex::escape(keyword.trim());
    let pattern = if keyword.is_ascii() {
        format!(r"(?i)\b{escaped}\b")
    } else {
        format!("(?i){escaped}")
    };
    Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern { pattern, source })
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}
