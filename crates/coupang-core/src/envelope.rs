//! Gateway response envelope: `{"rCode", "rMessage", "data"}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::RawProduct;
use crate::error::ClientError;

pub const SUCCESS_CODE: &str = "0";

/// Decoded envelope. `data` is only meaningful when `result_code` is `"0"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse<T> {
    pub result_code: String,
    pub result_message: String,
    pub data: Option<T>,
}

impl<T> GatewayResponse<T> {
    pub fn is_success(&self) -> bool {
        self.result_code == SUCCESS_CODE
    }

    /// Converts a non-success code into [`ClientError::Gateway`].
    pub fn into_result(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Gateway {
                code: self.result_code,
                message: self.result_message,
            })
        }
    }
}

impl<T: DeserializeOwned> GatewayResponse<T> {
    pub fn from_json(body: &str) -> Result<Self, ClientError> {
        let raw: RawEnvelope = serde_json::from_str(body)
            .map_err(|error| ClientError::Decode(format!("invalid envelope: {error}")))?;

        let result_code = raw.r_code.map(code_to_string).unwrap_or_default();
        let result_message = raw.r_message.unwrap_or_default();

        // Rejected requests often carry a stale or mismatched `data`; only the
        // success payload is decoded strictly.
        let data = match raw.data {
            None | Some(serde_json::Value::Null) => None,
            Some(value) if result_code == SUCCESS_CODE => {
                Some(serde_json::from_value(value).map_err(|error| {
                    ClientError::Decode(format!("unexpected payload shape: {error}"))
                })?)
            }
            Some(value) => serde_json::from_value(value).ok(),
        };

        Ok(Self {
            result_code,
            result_message,
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "rCode")]
    r_code: Option<serde_json::Value>,
    #[serde(rename = "rMessage")]
    r_message: Option<String>,
    data: Option<serde_json::Value>,
}

fn code_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(code) => code,
        other => other.to_string(),
    }
}

/// Product payload: a bare list (best-sellers, goldbox) or a listing object
/// (search).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProductPayload {
    List(Vec<RawProduct>),
    Listing(ProductListing),
}

impl ProductPayload {
    pub fn into_products(self) -> Vec<RawProduct> {
        match self {
            Self::List(products) => products,
            Self::Listing(listing) => listing.product_data,
        }
    }

    pub fn landing_url(&self) -> Option<&str> {
        match self {
            Self::List(_) => None,
            Self::Listing(listing) => listing.landing_url.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(default)]
    pub landing_url: Option<String>,
    #[serde(default)]
    pub product_data: Vec<RawProduct>,
}

/// One converted URL returned by the deep-link endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepLink {
    #[serde(default)]
    pub original_url: String,
    #[serde(default)]
    pub shorten_url: String,
    #[serde(default)]
    pub landing_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_nested_search_listing() {
        let response: GatewayResponse<ProductPayload> = GatewayResponse::from_json(
            r#"{"rCode":"0","rMessage":"","data":{"landingUrl":"https://link.coupang.com/a/x",
                "productData":[{"productName":"Tumbler","productPrice":12900}]}}"#,
        )
        .expect("valid envelope");

        assert!(response.is_success());
        let payload = response.data.expect("payload");
        assert_eq!(payload.landing_url(), Some("https://link.coupang.com/a/x"));
        let products = payload.into_products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_name, "Tumbler");
    }

    #[test]
    fn decodes_bare_product_list() {
        let response: GatewayResponse<ProductPayload> = GatewayResponse::from_json(
            r#"{"rCode":"0","rMessage":"OK","data":[{"productName":"A","rank":1},{"productName":"B","rank":2}]}"#,
        )
        .expect("valid envelope");

        let products = response.data.expect("payload").into_products();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].rank, Some(2));
    }

    #[test]
    fn rejected_envelope_becomes_gateway_error() {
        let response: GatewayResponse<ProductPayload> = GatewayResponse::from_json(
            r#"{"rCode":"400","rMessage":"Invalid keyword","data":"garbage"}"#,
        )
        .expect("envelope decodes even when rejected");

        assert!(!response.is_success());
        assert_eq!(response.data, None);
        assert_eq!(
            response.into_result().expect_err("non-zero code"),
            ClientError::Gateway {
                code: String::from("400"),
                message: String::from("Invalid keyword"),
            }
        );
    }

    #[test]
    fn numeric_result_code_is_accepted() {
        let response: GatewayResponse<Vec<DeepLink>> =
            GatewayResponse::from_json(r#"{"rCode":0,"rMessage":"","data":[]}"#).expect("valid");
        assert!(response.is_success());
        assert_eq!(response.data, Some(Vec::new()));
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let error = GatewayResponse::<ProductPayload>::from_json("<html>bad gateway</html>")
            .expect_err("not json");
        assert!(matches!(error, ClientError::Decode(_)));
    }
}
