use thiserror::Error;

/// Coarse classification used by callers to pick a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredentials,
    Encoding,
    InvalidRequest,
    Transport,
    Http,
    Gateway,
    Decode,
}

/// Error returned by every gateway-facing operation.
///
/// The signer and canonicalizer produce `MissingCredentials` and `Encoding`;
/// everything else is produced by [`crate::GatewayClient`] after translating
/// lower-level failures. Nothing in this crate retries on its own, callers
/// consult [`ClientError::retryable`] instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("missing credentials: {field} must not be empty")]
    MissingCredentials { field: &'static str },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {message}")]
    Transport { message: String, timed_out: bool },

    #[error("gateway returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("gateway rejected request (rCode {code}): {message}")]
    Gateway { code: String, message: String },

    #[error("failed to decode gateway response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: true,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredentials { .. } => ErrorKind::MissingCredentials,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Http { .. } => ErrorKind::Http,
            Self::Gateway { .. } => ErrorKind::Gateway,
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    /// Transport failures are always safe to retry with backoff; HTTP failures
    /// only when the gateway itself failed (5xx).
    pub const fn retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Http { status, .. } => *status >= 500 && *status < 600,
            _ => false,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::MissingCredentials => "client.missing_credentials",
            ErrorKind::Encoding => "client.encoding",
            ErrorKind::InvalidRequest => "client.invalid_request",
            ErrorKind::Transport => "client.transport",
            ErrorKind::Http => "client.http",
            ErrorKind::Gateway => "client.gateway",
            ErrorKind::Decode => "client.decode",
        }
    }
}

/// Errors raised while assembling a [`crate::ClientConfig`] or heuristic rules.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} is not set")]
    MissingVar { name: &'static str },

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("invalid heuristic pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to parse rules: {0}")]
    Rules(#[from] serde_json::Error),
}
