//! Contract tests for request signing.
//!
//! These pin the exact Authorization header the gateway expects, so any change
//! to timestamp format, message layout or query encoding shows up here first.

use coupang_core::{
    canonicalize, gateway::deep_link_path, gateway::search_path, sign, ClientError, Credentials,
    HttpMethod, QueryParams, Signer,
};
use time::macros::datetime;
use time::OffsetDateTime;

const NOW: OffsetDateTime = datetime!(2024-06-01 09:30:00 UTC);

fn credentials() -> Credentials {
    Credentials::new("partner-access", "partner-secret").expect("valid credentials")
}

// =============================================================================
// Header format
// =============================================================================

#[test]
fn get_request_produces_reference_header() {
    // Given: a search request with a space in the keyword
    let query = QueryParams::new().with("keyword", "usb c").with("limit", 5);
    let request =
        canonicalize(HttpMethod::Get, &search_path(), &query).expect("valid request");

    // When: it is signed at a fixed instant
    let header = Signer::new(credentials())
        .sign_request(&request, NOW)
        .expect("signature");

    // Then: the header matches the reference value byte for byte
    assert_eq!(request.query(), "keyword=usb%20c&limit=5");
    assert_eq!(
        header.header_value(),
        "CEA algorithm=HmacSHA256, access-key=partner-access, signed-date=240601T093000Z, \
         signature=f7650ee525eb271bcb7e014ab4f5e20706fce256446c57be84a5a9776afe232d"
    );
}

#[test]
fn post_request_is_signed_over_method_and_path_only() {
    // Given: the deep-link endpoint, which carries its input in the body
    let header = sign(HttpMethod::Post, &deep_link_path(), "", &credentials(), NOW)
        .expect("signature");

    // Then: the signature covers timestamp, method and path
    assert_eq!(
        header.signature,
        "ac3f1336538949d398ec97c1aeebc9f06cebdd8140d864c9356158201d31db4f"
    );
}

#[test]
fn timestamp_is_rendered_in_utc() {
    // Given: the same instant expressed with a +09:00 offset
    let seoul = NOW.to_offset(time::macros::offset!(+9));

    // When: signing at both representations
    let utc = sign(HttpMethod::Get, &search_path(), "limit=1", &credentials(), NOW)
        .expect("signature");
    let local = sign(HttpMethod::Get, &search_path(), "limit=1", &credentials(), seoul)
        .expect("signature");

    // Then: the signed date and signature are identical
    assert_eq!(local.signed_date.as_str(), "240601T093000Z");
    assert_eq!(utc, local);
}

// =============================================================================
// Sensitivity
// =============================================================================

#[test]
fn signing_is_deterministic() {
    let first = sign(HttpMethod::Get, &search_path(), "keyword=a&limit=5", &credentials(), NOW)
        .expect("signature");
    let second = sign(HttpMethod::Get, &search_path(), "keyword=a&limit=5", &credentials(), NOW)
        .expect("signature");

    assert_eq!(first, second);
}

#[test]
fn one_character_change_alters_the_signature() {
    let base = sign(HttpMethod::Get, &search_path(), "keyword=a&limit=5", &credentials(), NOW)
        .expect("signature");

    let query_changed =
        sign(HttpMethod::Get, &search_path(), "keyword=b&limit=5", &credentials(), NOW)
            .expect("signature");
    let path_changed = sign(
        HttpMethod::Get,
        &search_path().replace("search", "searcH"),
        "keyword=a&limit=5",
        &credentials(),
        NOW,
    )
    .expect("signature");
    let method_changed =
        sign(HttpMethod::Post, &search_path(), "keyword=a&limit=5", &credentials(), NOW)
            .expect("signature");
    let second_later = sign(
        HttpMethod::Get,
        &search_path(),
        "keyword=a&limit=5",
        &credentials(),
        datetime!(2024-06-01 09:30:01 UTC),
    )
    .expect("signature");

    for other in [&query_changed, &path_changed, &method_changed, &second_later] {
        assert_ne!(base.signature, other.signature);
    }
}

// =============================================================================
// Failure modes
// =============================================================================

#[test]
fn empty_keys_fail_at_construction() {
    assert_eq!(
        Credentials::new("", "secret").expect_err("empty access key"),
        ClientError::MissingCredentials { field: "access_key" }
    );
    assert_eq!(
        Credentials::new("access", "").expect_err("empty secret key"),
        ClientError::MissingCredentials { field: "secret_key" }
    );
}

#[test]
fn secret_never_appears_in_debug_output() {
    let rendered = format!("{:?}", credentials());
    assert!(rendered.contains("partner-access"));
    assert!(!rendered.contains("partner-secret"));
}

#[test]
fn path_with_embedded_query_is_an_encoding_error() {
    let error = canonicalize(
        HttpMethod::Get,
        &format!("{}?limit=5", search_path()),
        &QueryParams::new(),
    )
    .expect_err("query in path");

    assert!(matches!(error, ClientError::Encoding(_)));
}

#[test]
fn invalid_utf8_query_input_is_an_encoding_error() {
    let pairs: [(&[u8], &[u8]); 1] = [(b"keyword", &[0xff, 0xfe])];
    let error = QueryParams::from_raw_pairs(&pairs).expect_err("invalid utf-8");
    assert!(matches!(error, ClientError::Encoding(_)));
}
