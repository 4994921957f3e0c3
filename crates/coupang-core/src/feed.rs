//! End-to-end product queries: fetch, normalize, shorten.

use futures::future::join_all;
use serde::Serialize;

use crate::domain::NormalizedProduct;
use crate::envelope::{GatewayResponse, ProductPayload};
use crate::error::ClientError;
use crate::gateway::{clamp_limit, GatewayClient, SearchRequest};
use crate::link::LinkResolver;
use crate::normalize::ResultNormalizer;

/// Normalized listing returned by every [`ProductFeed`] query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductList {
    /// Search-result landing page, present for keyword searches only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_url: Option<String>,
    pub products: Vec<NormalizedProduct>,
}

impl ProductList {
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Query pipeline over a [`GatewayClient`].
///
/// Without a [`LinkResolver`] products keep the URL the gateway returned.
#[derive(Clone)]
pub struct ProductFeed {
    gateway: GatewayClient,
    resolver: Option<LinkResolver>,
    normalizer: ResultNormalizer,
}

impl ProductFeed {
    pub fn new(gateway: GatewayClient, resolver: LinkResolver) -> Self {
        Self {
            gateway,
            resolver: Some(resolver),
            normalizer: ResultNormalizer::default(),
        }
    }

    pub fn without_link_resolution(gateway: GatewayClient) -> Self {
        Self {
            gateway,
            resolver: None,
            normalizer: ResultNormalizer::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: ResultNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub async fn search_products(
        &self,
        request: &SearchRequest,
    ) -> Result<ProductList, ClientError> {
        let response = self.gateway.search_with(request).await?;
        Ok(self.finish(response, request.limit).await)
    }

    pub async fn best_products(
        &self,
        category_id: u32,
        limit: u32,
    ) -> Result<ProductList, ClientError> {
        let response = self.gateway.best_in_category(category_id, limit).await?;
        Ok(self.finish(response, limit).await)
    }

    pub async fn todays_deals(&self, limit: u32) -> Result<ProductList, ClientError> {
        let response = self.gateway.todays_deals(limit).await?;
        Ok(self.finish(response, limit).await)
    }

    /// Shortens one URL and surfaces every failure, unlike link resolution.
    pub async fn deep_link(&self, original_url: &str) -> Result<String, ClientError> {
        self.gateway
            .create_deep_link(original_url)
            .await?
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|link| link.shorten_url)
            .find(|short_url| !short_url.trim().is_empty())
            .ok_or_else(|| ClientError::Decode(String::from("deep link response had no links")))
    }

    async fn finish(&self, response: GatewayResponse<ProductPayload>, limit: u32) -> ProductList {
        let (landing_url, mut raw) = match response.data {
            Some(payload) => (payload.landing_url().map(str::to_owned), payload.into_products()),
            None => (None, Vec::new()),
        };
        raw.truncate(usize::try_from(clamp_limit(limit)).unwrap_or(usize::MAX));

        let products = self.normalizer.normalize_all(raw);
        let products = match &self.resolver {
            Some(resolver) => {
                join_all(products.into_iter().map(|product| async move {
                    let link = resolver.resolve(&product.resolved_link).await;
                    product.with_resolved_link(link)
                }))
                .await
            }
            None => products,
        };

        ProductList {
            landing_url,
            products,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::cache::ShortLinkCache;
    use crate::http_client::{HttpError, StaticHttpClient};
    use crate::signer::Credentials;

    fn gateway(http: Arc<StaticHttpClient>) -> GatewayClient {
        let credentials = Credentials::new("access", "secret").expect("valid credentials");
        GatewayClient::with_http_client(credentials, http).with_base_url("https://gateway.test")
    }

    fn goldbox_json(count: usize) -> String {
        let items = (1..=count)
            .map(|index| {
                format!(
                    r#"{{"productId":{index},"productName":"Deal {index}","productPrice":{price},"productUrl":"https://link.coupang.com/re/AFFSDP?pageKey={index}","isRocket":true}}"#,
                    price = index * 1_000
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        format!(r#"{{"rCode":"0","rMessage":"","data":[{items}]}}"#)
    }

    #[tokio::test]
    async fn listing_is_truncated_to_limit_without_resolution() {
        let http = Arc::new(StaticHttpClient::new().with_json(goldbox_json(5)));
        let feed = ProductFeed::without_link_resolution(gateway(Arc::clone(&http)));

        let list = feed.todays_deals(3).await.expect("success");

        assert_eq!(list.len(), 3);
        assert_eq!(list.landing_url, None);
        assert_eq!(list.products[0].name, "Deal 1");
        assert_eq!(
            list.products[2].resolved_link,
            "https://link.coupang.com/re/AFFSDP?pageKey=3"
        );
        assert_eq!(http.call_count(), 1);
    }

    #[tokio::test]
    async fn resolved_links_keep_product_order() {
        let http = Arc::new(
            StaticHttpClient::new()
                .with_json(goldbox_json(2))
                .with_reply(Err(HttpError::new("connection reset")))
                .with_reply(Err(HttpError::new("connection reset"))),
        );
        let gateway = gateway(Arc::clone(&http));
        let resolver = LinkResolver::new(
            gateway.clone(),
            ShortLinkCache::new(Duration::from_secs(60), 8),
        );
        let feed = ProductFeed::new(gateway, resolver);

        let list = feed.todays_deals(10).await.expect("success");

        let names: Vec<_> = list.products.iter().map(|product| product.name.as_str()).collect();
        assert_eq!(names, ["Deal 1", "Deal 2"]);
        // Shortening failed, so each product keeps its own URL.
        assert_eq!(
            list.products[1].resolved_link,
            "https://link.coupang.com/re/AFFSDP?pageKey=2"
        );
        assert_eq!(http.call_count(), 3);
    }

    #[tokio::test]
    async fn strict_deep_link_surfaces_gateway_errors() {
        let http = Arc::new(StaticHttpClient::new().with_json(
            r#"{"rCode":"400","rMessage":"not a coupang url"}"#,
        ));
        let feed = ProductFeed::without_link_resolution(gateway(http));

        let error = feed
            .deep_link("https://example.com/item")
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), "client.gateway");
    }
}
