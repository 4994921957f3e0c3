//! HMAC-SHA256 request signing for the `CEA` authorization scheme.

use std::fmt::{Debug, Display, Formatter};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::OffsetDateTime;

use crate::canonical::{canonical_message, CanonicalRequest};
use crate::clock::SignedDate;
use crate::error::ClientError;
use crate::http_client::HttpMethod;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNING_ALGORITHM: &str = "HmacSHA256";

/// Access/secret key pair issued by the partner program.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: Vec<u8>,
}

impl Credentials {
    /// Fails fast when either key is blank.
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl AsRef<[u8]>,
    ) -> Result<Self, ClientError> {
        let access_key = access_key.into();
        let secret_key = secret_key.as_ref();

        if access_key.trim().is_empty() {
            return Err(ClientError::MissingCredentials { field: "access_key" });
        }
        if secret_key.iter().all(u8::is_ascii_whitespace) {
            return Err(ClientError::MissingCredentials { field: "secret_key" });
        }

        Ok(Self {
            access_key,
            secret_key: secret_key.to_vec(),
        })
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Value of the `Authorization` header for one outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    pub algorithm: &'static str,
    pub access_key: String,
    pub signed_date: SignedDate,
    pub signature: String,
}

impl AuthHeader {
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl Display for AuthHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CEA algorithm={}, access-key={}, signed-date={}, signature={}",
            self.algorithm, self.access_key, self.signed_date, self.signature
        )
    }
}

/// Signs canonical requests with a fixed credential pair.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn access_key(&self) -> &str {
        self.credentials.access_key()
    }

    pub fn sign_request(
        &self,
        request: &CanonicalRequest,
        now: OffsetDateTime,
    ) -> Result<AuthHeader, ClientError> {
        sign(
            request.method(),
            request.path(),
            request.query(),
            &self.credentials,
            now,
        )
    }
}

/// Computes the authorization header for `method path query` at `now`.
///
/// POST requests are signed with an empty `query`; the request body never
/// participates in the message.
pub fn sign(
    method: HttpMethod,
    path: &str,
    query: &str,
    credentials: &Credentials,
    now: OffsetDateTime,
) -> Result<AuthHeader, ClientError> {
    let signed_date = SignedDate::from_datetime(now)?;
    let message = canonical_message(signed_date.as_str(), method, path, query);

    let signature = hmac_hex(&credentials.secret_key, &message)?;

    Ok(AuthHeader {
        algorithm: SIGNING_ALGORITHM,
        access_key: credentials.access_key.clone(),
        signed_date,
        signature,
    })
}

fn hmac_hex(secret_key: &[u8], message: &str) -> Result<String, ClientError> {
    let mut mac = HmacSha256::new_from_slice(secret_key)
        .map_err(|error| ClientError::Encoding(format!("invalid signing key: {error}")))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
