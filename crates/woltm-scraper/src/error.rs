use thiserror::Error;

/// Classified failure of a single platform request or record.
///
/// Every variant is recoverable at the boundary of the entity it concerns
/// (one city, one market, one venue); none of them aborts a crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure, timeout, or a body that could not be read.
    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Http { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{entity} record is missing required field \"{field}\"")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid request URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failure categories reported in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Http,
    Parse,
    MissingField,
}

impl FetchError {
    /// The summary category for this error. A malformed request URL can
    /// only come from a bad base-URL setting and is reported with
    /// transport failures.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Network { .. } | FetchError::InvalidUrl { .. } => FailureKind::Network,
            FetchError::Http { .. } => FailureKind::Http,
            FetchError::Parse { .. } => FailureKind::Parse,
            FetchError::MissingField { .. } => FailureKind::MissingField,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network"),
            FailureKind::Http => write!(f, "http"),
            FailureKind::Parse => write!(f, "parse"),
            FailureKind::MissingField => write!(f, "missing_field"),
        }
    }
}
