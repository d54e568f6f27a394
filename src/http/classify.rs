use super::Response;
use crate::error::{Error, ErrorBody, ErrorResponse, RateLimitError};
use crate::types::Rate;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

pub const HEADER_RATE_LIMIT: &str = "x-rate-limit-limit";
pub const HEADER_RATE_REMAINING: &str = "x-rate-limit-remaining";
pub const HEADER_RATE_RESET: &str = "x-rate-limit-reset";
pub const HEADER_REQUEST_ID: &str = "x-okta-request-id";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Reads the `X-Rate-Limit-*` headers. Missing or unparsable counters read
/// as zero and a reset of `0` means no reset is known.
pub fn parse_rate(headers: &HeaderMap) -> Rate {
    let int = |name: &str| {
        header_str(headers, name)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0)
    };
    let reset = match int(HEADER_RATE_RESET) {
        0 => None,
        epoch => DateTime::<Utc>::from_timestamp(epoch, 0),
    };
    Rate {
        limit: int(HEADER_RATE_LIMIT),
        remaining: int(HEADER_RATE_REMAINING),
        reset,
    }
}

pub fn request_id(headers: &HeaderMap) -> Option<String> {
    header_str(headers, HEADER_REQUEST_ID)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Maps a finished response to `Ok` for 2xx, or to a typed error carrying
/// the response metadata. Never fails because of the body itself.
pub fn check_response(response: Response, body: &[u8]) -> Result<Response, Error> {
    if response.status.is_success() {
        return Ok(response);
    }
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let exhausted = header_str(&response.headers, HEADER_RATE_REMAINING) == Some("0");
    if response.status == StatusCode::FORBIDDEN && exhausted {
        return Err(Error::RateLimit(Box::new(RateLimitError {
            rate: parse_rate(&response.headers),
            message: "API rate limit exceeded".to_string(),
            response,
        })));
    }
    Err(Error::Api(Box::new(ErrorResponse {
        response,
        body: parsed,
    })))
}
