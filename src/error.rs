//! Error types returned by the client.
//!
//! Parsing problems in headers or error bodies never show up here; they
//! degrade to empty values. Everything else reaches the caller unchanged.

use crate::http::{clean_url, Response};
use crate::types::Rate;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid client configuration: {0}")]
    Validation(String),

    #[error(transparent)]
    RateLimit(Box<RateLimitError>),

    #[error(transparent)]
    Api(Box<ErrorResponse>),

    #[error("{method} {url}: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Decode(Box<DecodeError>),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Response metadata gathered before the error was raised.
    ///
    /// Present for rate-limit, API and decode errors so callers can still
    /// read the rate snapshot, pagination and request id of a failed call.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::RateLimit(e) => Some(&e.response),
            Error::Api(e) => Some(&e.response),
            Error::Decode(e) => Some(&e.response),
            _ => None,
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimit(_))
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    /// Short machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::RateLimit(_) => "rate_limited",
            Error::Api(_) => "api",
            Error::Transport { .. } => "transport",
            Error::Cancelled => "cancelled",
            Error::DeadlineExceeded => "deadline_exceeded",
            Error::InvalidUrl(_) => "invalid_url",
            Error::Encode(_) => "encode",
            Error::Decode(_) => "decode",
        }
    }
}

/// Body of an Okta error response.
///
/// Every field defaults to empty: a missing or unparsable body still yields
/// a usable value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(rename = "errorCode", default)]
    pub code: String,
    #[serde(rename = "errorSummary", default)]
    pub summary: String,
    #[serde(rename = "errorLink", default)]
    pub link: String,
    #[serde(rename = "errorId", default)]
    pub id: String,
    #[serde(rename = "errorCauses", default)]
    pub causes: Vec<ErrorCause>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCause {
    #[serde(rename = "errorSummary", default)]
    pub summary: String,
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// A non-2xx answer from the API that is not a rate-limit rejection.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub response: Response,
    pub body: ErrorBody,
}

impl ErrorResponse {
    pub fn code(&self) -> &str {
        &self.body.code
    }

    pub fn summary(&self) -> &str {
        &self.body.summary
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let causes = self
            .body
            .causes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(
            f,
            "{} {}: ({}) {} - {} - {} [{}]",
            self.response.method,
            clean_url(&self.response.url),
            self.response.status.as_u16(),
            self.body.code,
            self.body.summary,
            self.body.id,
            causes
        )
    }
}

impl std::error::Error for ErrorResponse {}

/// The rate limit of a category is exhausted.
#[derive(Debug, Clone)]
pub struct RateLimitError {
    /// Last known rate for the category of the call.
    pub rate: Rate,
    pub response: Response,
    pub message: String,
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}",
            self.response.method,
            clean_url(&self.response.url),
            self.response.status.as_u16(),
            self.message
        )?;
        if !self.message.is_empty() {
            f.write_str(" ")?;
        }
        f.write_str(&format_rate_reset(self.rate.reset, Utc::now()))
    }
}

impl std::error::Error for RateLimitError {}

/// A 2xx body that is not valid JSON for the requested type.
#[derive(Debug)]
pub struct DecodeError {
    pub response: Response,
    pub source: serde_json::Error,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: failed to decode response body: {}",
            self.response.method,
            clean_url(&self.response.url),
            self.source
        )
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Renders the distance to `reset` as `[rate reset in 1m05s]`, or
/// `[rate limit was reset 3s ago]` once it has passed.
pub fn format_rate_reset(reset: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let millis = reset
        .map(|r| r.signed_duration_since(now).num_milliseconds())
        .unwrap_or(0);
    let negative = millis < 0;
    let total_secs = (millis.unsigned_abs() + 500) / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let time = if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    };
    if negative {
        format!("[rate limit was reset {} ago]", time)
    } else {
        format!("[rate reset in {}]", time)
    }
}
