//! # Coupang Core
//!
//! Signed client for the Coupang Partners affiliate gateway.
//!
//! ## Overview
//!
//! - **Request signing**: canonical `method + path + query` messages signed
//!   with HMAC-SHA256 into the `CEA` Authorization header
//! - **Gateway client** for keyword search, category best sellers, today's
//!   deals (goldbox) and deep-link creation
//! - **Result normalization** into display records with price buckets,
//!   delivery badges, discount tiers and a variable-pricing flag
//! - **Link resolution** from tracking URLs to cached short links, falling
//!   back to the original URL on any failure
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | TTL short-link cache |
//! | [`canonical`] | Query encoding and canonical request messages |
//! | [`clock`] | Clock abstraction and signed-date format |
//! | [`config`] | Client configuration and `COUPANG_*` variables |
//! | [`domain`] | Raw and normalized product records, price buckets |
//! | [`envelope`] | Gateway response envelope |
//! | [`error`] | Client and configuration errors |
//! | [`feed`] | Fetch, normalize and shorten pipeline |
//! | [`gateway`] | Signed gateway client and endpoint paths |
//! | [`heuristics`] | Variable-pricing keyword tables |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`link`] | Product-key extraction and short-link resolution |
//! | [`normalize`] | Raw-to-display product normalization |
//! | [`retry`] | Caller-side retry with backoff |
//! | [`signer`] | Credentials and HMAC signing |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coupang_core::{ClientConfig, GatewayClient, LinkResolver, ProductFeed, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let gateway = GatewayClient::new(&config);
//!     let feed = ProductFeed::new(gateway.clone(), LinkResolver::from_config(gateway, &config));
//!
//!     let list = feed.search_products(&SearchRequest::new("텀블러", 10)?).await?;
//!     for product in list.products {
//!         println!("{} {} {}", product.name, product.price_bucket_label, product.resolved_link);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Nothing in this crate retries on its own. Callers decide from the error:
//!
//! ```rust
//! use coupang_core::{ClientError, ErrorKind};
//!
//! fn should_retry(error: &ClientError) -> bool {
//!     match error.kind() {
//!         ErrorKind::Transport => true,
//!         ErrorKind::Http => error.retryable(),
//!         _ => false,
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - The secret key never appears in `Debug` output or logs
//! - Signatures are computed per request and never logged

pub mod cache;
pub mod canonical;
pub mod clock;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod heuristics;
pub mod http_client;
pub mod link;
pub mod normalize;
pub mod retry;
pub mod signer;

// Caching
pub use cache::{ShortLinkCache, ShortLinkCacheEntry};

// Canonical requests
pub use canonical::{canonicalize, CanonicalRequest, QueryParams};

// Clock
pub use clock::{ClockSource, FixedClock, SignedDate, SystemClock};

// Configuration
pub use config::ClientConfig;

// Domain models
pub use domain::{
    price_bucket_label, DeliveryBadge, DiscountTier, NormalizedProduct, PriceBucket, RawProduct,
};

// Envelope types
pub use envelope::{DeepLink, GatewayResponse, ProductListing, ProductPayload};

// Error types
pub use error::{ClientError, ConfigError, ErrorKind};

// Pipeline
pub use feed::{ProductFeed, ProductList};

// Gateway
pub use gateway::{clamp_limit, GatewayClient, GatewayRequest, SearchRequest, SortOrder};

// Heuristics
pub use heuristics::{VariantPricing, VariantPricingRules};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    StaticHttpClient,
};

// Link resolution
pub use link::{canonical_product_url, extract_product_key, LinkResolver};

// Normalization
pub use normalize::ResultNormalizer;

// Retry logic
pub use retry::{retry_with_backoff, Backoff, RetryConfig};

// Signing
pub use signer::{sign, AuthHeader, Credentials, Signer};
