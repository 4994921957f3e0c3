//! Signed client for the partner REST gateway.
//!
//! # Endpoints
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | [`GatewayClient::search`] | GET | `…/v1/products/search?keyword=&limit=` |
//! | [`GatewayClient::best_in_category`] | GET | `…/products/bestcategories/{id}?limit=` |
//! | [`GatewayClient::todays_deals`] | GET | `…/products/goldbox?limit=` |
//! | [`GatewayClient::create_deep_link`] | POST | `…/v1/deeplink` |
//!
//! GET requests are signed over `method + path + query`. POST requests are
//! signed over `method + path` only; the JSON body is never part of the
//! signed message.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::canonical::{canonicalize, QueryParams};
use crate::clock::{ClockSource, SystemClock};
use crate::config::ClientConfig;
use crate::envelope::{DeepLink, GatewayResponse, ProductPayload};
use crate::error::ClientError;
use crate::http_client::{HttpClient, HttpMethod, HttpRequest, ReqwestHttpClient};
use crate::signer::{Credentials, Signer};

pub const DEFAULT_BASE_URL: &str = "https://api-gateway.coupang.com";
pub const API_PREFIX: &str = "/v2/providers/affiliate_open_api/apis/openapi";
pub const CONTENT_TYPE: &str = "application/json;charset=UTF-8";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 100;

/// Clamps a requested result count into `[1, 100]`.
pub const fn clamp_limit(limit: u32) -> u32 {
    if limit < MIN_LIMIT {
        MIN_LIMIT
    } else if limit > MAX_LIMIT {
        MAX_LIMIT
    } else {
        limit
    }
}

pub fn search_path() -> String {
    format!("{API_PREFIX}/v1/products/search")
}

pub fn best_category_path(category_id: u32) -> String {
    format!("{API_PREFIX}/products/bestcategories/{category_id}")
}

pub fn goldbox_path() -> String {
    format!("{API_PREFIX}/products/goldbox")
}

pub fn deep_link_path() -> String {
    format!("{API_PREFIX}/v1/deeplink")
}

/// Search ranking requested from the gateway (`sortType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Relevance (`SIM`), the gateway default.
    #[serde(rename = "SIM")]
    Relevance,
    #[serde(rename = "SALE")]
    Sales,
    #[serde(rename = "LOW")]
    LowestPrice,
    #[serde(rename = "HIGH")]
    HighestPrice,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "SIM",
            Self::Sales => "SALE",
            Self::LowestPrice => "LOW",
            Self::HighestPrice => "HIGH",
        }
    }
}

/// Keyword search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub keyword: String,
    pub limit: u32,
    pub sort: Option<SortOrder>,
}

impl SearchRequest {
    /// Rejects blank keywords; the limit is clamped, never rejected.
    pub fn new(keyword: impl Into<String>, limit: u32) -> Result<Self, ClientError> {
        let keyword = keyword.into();
        if keyword.trim().is_empty() {
            return Err(ClientError::InvalidRequest(String::from(
                "search keyword must not be empty",
            )));
        }

        Ok(Self {
            keyword,
            limit: clamp_limit(limit),
            sort: None,
        })
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    fn query(&self) -> QueryParams {
        let mut query = QueryParams::new()
            .with("keyword", &self.keyword)
            .with("limit", clamp_limit(self.limit));
        if let Some(sort) = self.sort {
            query.push("sortType", sort.as_str());
        }
        query
    }
}

/// A logical gateway call before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: QueryParams,
    pub body: Option<String>,
}

impl GatewayRequest {
    pub fn get(path: impl Into<String>, query: QueryParams) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query,
            body: None,
        }
    }

    pub fn post_json(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            query: QueryParams::new(),
            body: Some(body.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct DeepLinkBody<'a> {
    #[serde(rename = "coupangUrls")]
    coupang_urls: &'a [String],
}

/// Issues signed calls and classifies their outcome.
///
/// Holds no mutable state, so one instance can serve any number of concurrent
/// calls. Every call runs under the configured deadline, and dropping a
/// returned future abandons the request.
#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    signer: Signer,
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn ClockSource>,
    timeout: Duration,
}

impl GatewayClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http_client(config.credentials.clone(), Arc::new(ReqwestHttpClient::new()))
            .with_base_url(&config.base_url)
            .with_timeout(config.timeout)
    }

    pub fn with_http_client(credentials: Credentials, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            signer: Signer::new(credentials),
            http_client,
            clock: Arc::new(SystemClock),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn search(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<GatewayResponse<ProductPayload>, ClientError> {
        let request = SearchRequest::new(keyword, limit)?;
        self.search_with(&request).await
    }

    pub async fn search_with(
        &self,
        request: &SearchRequest,
    ) -> Result<GatewayResponse<ProductPayload>, ClientError> {
        self.execute(GatewayRequest::get(search_path(), request.query()))
            .await
    }

    /// Best sellers of one category. The id is part of the signed path.
    pub async fn best_in_category(
        &self,
        category_id: u32,
        limit: u32,
    ) -> Result<GatewayResponse<ProductPayload>, ClientError> {
        let query = QueryParams::new().with("limit", clamp_limit(limit));
        self.execute(GatewayRequest::get(best_category_path(category_id), query))
            .await
    }

    /// Today's time-limited deals (goldbox).
    pub async fn todays_deals(
        &self,
        limit: u32,
    ) -> Result<GatewayResponse<ProductPayload>, ClientError> {
        let query = QueryParams::new().with("limit", clamp_limit(limit));
        self.execute(GatewayRequest::get(goldbox_path(), query))
            .await
    }

    pub async fn create_deep_link(
        &self,
        original_url: &str,
    ) -> Result<GatewayResponse<Vec<DeepLink>>, ClientError> {
        self.create_deep_links(&[original_url.to_owned()]).await
    }

    pub async fn create_deep_links(
        &self,
        original_urls: &[String],
    ) -> Result<GatewayResponse<Vec<DeepLink>>, ClientError> {
        if original_urls.is_empty() || original_urls.iter().any(|url| url.trim().is_empty()) {
            return Err(ClientError::InvalidRequest(String::from(
                "deep link request needs at least one non-empty URL",
            )));
        }

        let body = serde_json::to_string(&DeepLinkBody {
            coupang_urls: original_urls,
        })
        .map_err(|error| ClientError::Encoding(format!("deep link body: {error}")))?;

        self.execute(GatewayRequest::post_json(deep_link_path(), body))
            .await
    }

    /// Signs, sends and decodes one request. Never retries.
    pub async fn execute<T>(
        &self,
        request: GatewayRequest,
    ) -> Result<GatewayResponse<T>, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let canonical = canonicalize(request.method, &request.path, &request.query)?;
        // Fresh timestamp per call; the gateway rejects stale signed dates.
        let auth = self.signer.sign_request(&canonical, self.clock.now())?;

        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let mut http_request = HttpRequest::new(
            request.method,
            format!("{}{}", self.base_url, canonical.path_and_query()),
        )
        .with_header("Authorization", auth.header_value())
        .with_header("Content-Type", CONTENT_TYPE)
        .with_timeout_ms(timeout_ms);

        if let Some(body) = request.body {
            http_request = http_request.with_body(body);
        }

        let started = Instant::now();
        let outcome =
            tokio::time::timeout(self.timeout, self.http_client.execute(http_request)).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response = match outcome {
            Err(_) => {
                tracing::debug!(
                    method = %request.method,
                    path = %request.path,
                    elapsed_ms,
                    "gateway call timed out"
                );
                return Err(ClientError::timeout(format!(
                    "{} {} exceeded {timeout_ms} ms",
                    request.method, request.path
                )));
            }
            Ok(Err(error)) => {
                tracing::debug!(
                    method = %request.method,
                    path = %request.path,
                    %error,
                    "gateway transport failure"
                );
                return Err(if error.timed_out() {
                    ClientError::timeout(error.message())
                } else {
                    ClientError::transport(error.message())
                });
            }
            Ok(Ok(response)) => response,
        };

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            elapsed_ms,
            "gateway call completed"
        );

        if !response.is_success() {
            return Err(ClientError::Http {
                status: response.status,
                body: response.body,
            });
        }

        GatewayResponse::from_json(&response.body)?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::clock::FixedClock;
    use crate::http_client::{HttpError, HttpResponse, StaticHttpClient};
    use crate::signer::sign;

    fn credentials() -> Credentials {
        Credentials::new("access", "secret").expect("valid credentials")
    }

    fn client(http: Arc<StaticHttpClient>) -> GatewayClient {
        GatewayClient::with_http_client(credentials(), http)
            .with_base_url("https://gateway.test/")
            .with_clock(Arc::new(FixedClock::new(datetime!(2024-06-01 09:30:00 UTC))))
    }

    const EMPTY_LIST: &str = r#"{"rCode":"0","rMessage":"","data":[]}"#;

    #[test]
    fn limit_is_clamped_into_range() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(1), 1);
        assert_eq!(clamp_limit(42), 42);
        assert_eq!(clamp_limit(100), 100);
        assert_eq!(clamp_limit(500), 100);
    }

    #[test]
    fn blank_keyword_is_rejected_before_any_call() {
        let error = SearchRequest::new("   ", 5).expect_err("blank keyword");
        assert!(matches!(error, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn search_signs_the_exact_wire_query() {
        let http = Arc::new(StaticHttpClient::new().with_json(
            r#"{"rCode":"0","rMessage":"","data":{"productData":[]}}"#,
        ));
        let request = SearchRequest::new("usb c", 500)
            .expect("valid")
            .with_sort(SortOrder::LowestPrice);

        client(Arc::clone(&http))
            .search_with(&request)
            .await
            .expect("success");

        let sent = &http.requests()[0];
        let query = "keyword=usb%20c&limit=100&sortType=LOW";
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(sent.url, format!("https://gateway.test{}?{query}", search_path()));
        assert_eq!(sent.header("content-type"), Some(CONTENT_TYPE));

        let expected = sign(
            HttpMethod::Get,
            &search_path(),
            query,
            &credentials(),
            datetime!(2024-06-01 09:30:00 UTC),
        )
        .expect("sign");
        assert_eq!(sent.header("authorization"), Some(expected.header_value().as_str()));
    }

    #[tokio::test]
    async fn category_id_is_part_of_the_path() {
        let http = Arc::new(StaticHttpClient::new().with_json(EMPTY_LIST));
        client(Arc::clone(&http))
            .best_in_category(1016, 0)
            .await
            .expect("success");

        let sent = &http.requests()[0];
        assert_eq!(
            sent.url,
            format!("https://gateway.test{API_PREFIX}/products/bestcategories/1016?limit=1")
        );
    }

    #[tokio::test]
    async fn deep_link_posts_json_body_signed_without_query() {
        let http = Arc::new(StaticHttpClient::new().with_json(
            r#"{"rCode":"0","rMessage":"","data":[{"originalUrl":"https://www.coupang.com/vp/products/1","shortenUrl":"https://link.coupang.com/a/abc","landingUrl":""}]}"#,
        ));

        let response = client(Arc::clone(&http))
            .create_deep_link("https://www.coupang.com/vp/products/1")
            .await
            .expect("success");

        assert_eq!(
            response.data.expect("links")[0].shorten_url,
            "https://link.coupang.com/a/abc"
        );

        let sent = &http.requests()[0];
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, format!("https://gateway.test{}", deep_link_path()));
        assert_eq!(
            sent.body.as_deref(),
            Some(r#"{"coupangUrls":["https://www.coupang.com/vp/products/1"]}"#)
        );
        let expected = sign(
            HttpMethod::Post,
            &deep_link_path(),
            "",
            &credentials(),
            datetime!(2024-06-01 09:30:00 UTC),
        )
        .expect("sign");
        assert_eq!(sent.header("authorization"), Some(expected.header_value().as_str()));
    }

    #[tokio::test]
    async fn failures_are_classified() {
        let transport = client(Arc::new(StaticHttpClient::always(Err(HttpError::new(
            "connection refused",
        )))));
        let error = transport.todays_deals(5).await.expect_err("transport");
        assert!(matches!(error, ClientError::Transport { timed_out: false, .. }));
        assert!(error.retryable());

        let http = client(Arc::new(StaticHttpClient::always(Ok(HttpResponse::new(
            401,
            "unauthorized",
        )))));
        let error = http.todays_deals(5).await.expect_err("http");
        assert_eq!(
            error,
            ClientError::Http {
                status: 401,
                body: String::from("unauthorized")
            }
        );
        assert!(!error.retryable());

        let gateway = client(Arc::new(StaticHttpClient::new().with_json(
            r#"{"rCode":"500","rMessage":"quota exceeded"}"#,
        )));
        let error = gateway.todays_deals(5).await.expect_err("gateway");
        assert_eq!(
            error,
            ClientError::Gateway {
                code: String::from("500"),
                message: String::from("quota exceeded")
            }
        );
    }

    #[tokio::test]
    async fn slow_transport_hits_the_deadline() {
        let http = Arc::new(
            StaticHttpClient::always(Ok(HttpResponse::ok_json(EMPTY_LIST)))
                .with_delay(Duration::from_secs(5)),
        );
        let error = client(http)
            .with_timeout(Duration::from_millis(20))
            .todays_deals(3)
            .await
            .expect_err("deadline");

        assert!(matches!(error, ClientError::Transport { timed_out: true, .. }));
    }

    #[tokio::test]
    async fn empty_deep_link_input_is_rejected_without_network() {
        let http = Arc::new(StaticHttpClient::new());
        let error = client(Arc::clone(&http))
            .create_deep_link("")
            .await
            .expect_err("empty url");
        assert!(matches!(error, ClientError::InvalidRequest(_)));
        assert_eq!(http.call_count(), 0);
    }
}
