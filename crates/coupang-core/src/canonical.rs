//! Canonical request construction.
//!
//! The gateway recomputes the signature from the request line it receives, so
//! the query string that is signed must be the exact string that goes on the
//! wire. [`CanonicalRequest`] owns that string and hands the same value to both
//! the signer and the URL builder.

use crate::clock::SignedDate;
use crate::error::ClientError;
use crate::http_client::HttpMethod;

/// Ordered query parameters. Insertion order is preserved in the encoded form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Builds parameters from raw byte pairs, rejecting anything that is not
    /// valid UTF-8.
    pub fn from_raw_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, ClientError>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            let key = std::str::from_utf8(key.as_ref()).map_err(|error| {
                ClientError::Encoding(format!("query key is not valid UTF-8: {error}"))
            })?;
            let value = std::str::from_utf8(value.as_ref()).map_err(|error| {
                ClientError::Encoding(format!(
                    "query value for '{key}' is not valid UTF-8: {error}"
                ))
            })?;
            params.push(key, value);
        }
        Ok(params)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// `k1=v1&k2=v2` with RFC 3986 percent-encoding and no leading `?`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A request line frozen for signing: method, resource path and encoded query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: HttpMethod,
    path: String,
    query: String,
}

impl CanonicalRequest {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Encoded query, empty when the request has none.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// `method ++ path ++ query`, the part of the signed message that does not
    /// depend on time.
    pub fn canonical_string(&self) -> String {
        canonical_message("", self.method, &self.path, &self.query)
    }

    /// Full message fed to the HMAC: `timestamp ++ method ++ path ++ query`.
    pub fn message(&self, signed_date: &SignedDate) -> String {
        canonical_message(signed_date.as_str(), self.method, &self.path, &self.query)
    }

    /// The request target appended to the base URL.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// The one place the signed message layout is defined. The signer and
/// [`CanonicalRequest::message`] both go through here.
pub(crate) fn canonical_message(
    signed_date: &str,
    method: HttpMethod,
    path: &str,
    query: &str,
) -> String {
    let method = method.as_str();
    let mut message =
        String::with_capacity(signed_date.len() + method.len() + path.len() + query.len());
    message.push_str(signed_date);
    message.push_str(method);
    message.push_str(path);
    message.push_str(query);
    message
}

/// Builds the canonical form of a request.
///
/// The path must be absolute and must not carry its own query, fragment or
/// whitespace, otherwise the signed path would differ from the one the gateway
/// parses.
pub fn canonicalize(
    method: HttpMethod,
    path: &str,
    query: &QueryParams,
) -> Result<CanonicalRequest, ClientError> {
    validate_path(path)?;

    Ok(CanonicalRequest {
        method,
        path: path.to_owned(),
        query: query.encode(),
    })
}

fn validate_path(path: &str) -> Result<(), ClientError> {
    if !path.starts_with('/') {
        return Err(ClientError::Encoding(format!(
            "resource path must start with '/': '{path}'"
        )));
    }

    if let Some(ch) = path
        .chars()
        .find(|ch| matches!(ch, '?' | '#') || ch.is_whitespace() || ch.is_control())
    {
        return Err(ClientError::Encoding(format!(
            "resource path contains forbidden character {ch:?}: '{path}'"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PATH: &str = "/v2/providers/affiliate_open_api/apis/openapi/v1/products/search";

    #[test]
    fn query_preserves_insertion_order() {
        let query = QueryParams::new().with("keyword", "ipad").with("limit", 5);
        assert_eq!(query.encode(), "keyword=ipad&limit=5");

        let reversed = QueryParams::new().with("limit", 5).with("keyword", "ipad");
        assert_eq!(reversed.encode(), "limit=5&keyword=ipad");
    }

    #[test]
    fn query_percent_encodes_reserved_and_non_ascii() {
        let query = QueryParams::new().with("keyword", "에어팟 프로&case=1");
        assert_eq!(
            query.encode(),
            "keyword=%EC%97%90%EC%96%B4%ED%8C%9F%20%ED%94%84%EB%A1%9C%26case%3D1"
        );
    }

    #[test]
    fn signed_query_matches_wire_query() {
        let query = QueryParams::new().with("keyword", "galaxy s24").with("limit", 10);
        let request = canonicalize(HttpMethod::Get, SEARCH_PATH, &query).expect("valid path");

        let target = request.path_and_query();
        let (_, wire_query) = target.split_once('?').expect("query present");
        assert_eq!(wire_query, request.query());
        assert_eq!(
            request.canonical_string(),
            format!("GET{SEARCH_PATH}keyword=galaxy%20s24&limit=10")
        );
    }

    #[test]
    fn empty_query_has_no_question_mark() {
        let request = canonicalize(HttpMethod::Post, "/v1/deeplink", &QueryParams::new())
            .expect("valid path");
        assert_eq!(request.query(), "");
        assert_eq!(request.path_and_query(), "/v1/deeplink");
        assert_eq!(request.canonical_string(), "POST/v1/deeplink");
    }

    #[test]
    fn rejects_paths_that_would_split_the_signature() {
        for path in ["relative/path", "/search?limit=5", "/a#frag", "/with space"] {
            let error = canonicalize(HttpMethod::Get, path, &QueryParams::new())
                .expect_err("path must be rejected");
            assert!(matches!(error, ClientError::Encoding(_)), "{path}: {error}");
        }
    }

    #[test]
    fn raw_pairs_reject_invalid_utf8() {
        let pairs: [(&[u8], &[u8]); 1] = [(b"keyword", &[0xff, 0xfe])];
        let error = QueryParams::from_raw_pairs(&pairs).expect_err("invalid utf-8");
        assert!(matches!(error, ClientError::Encoding(_)));

        let ok: [(&[u8], &[u8]); 1] = [(b"limit", b"3")];
        let params = QueryParams::from_raw_pairs(&ok).expect("valid utf-8");
        assert_eq!(params.get("limit"), Some("3"));
    }
}
