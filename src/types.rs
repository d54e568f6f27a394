use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Last known state of one rate-limit bucket.
///
/// The zero value (`Rate::default()`) means nothing is known yet: no limit,
/// nothing remaining and no reset time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rate {
    pub limit: i64,
    pub remaining: i64,
    pub reset: Option<DateTime<Utc>>,
}

impl Rate {
    /// True when the bucket is exhausted and its reset lies after `now`.
    pub fn is_exhausted_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining == 0 && self.reset.is_some_and(|reset| now < reset)
    }
}

// Cursor URLs are only meaningful for the response that produced them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub prev: Option<Url>,
    pub next: Option<Url>,
    #[serde(rename = "self")]
    pub self_: Option<Url>,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn zero_rate_is_never_exhausted() {
        assert!(!Rate::default().is_exhausted_at(Utc::now()));
    }

    #[test]
    fn exhausted_until_reset() {
        let now = Utc::now();
        let rate = Rate {
            limit: 600,
            remaining: 0,
            reset: Some(now + Duration::seconds(30)),
        };
        assert!(rate.is_exhausted_at(now));
        assert!(!rate.is_exhausted_at(now + Duration::seconds(31)));

        let with_budget = Rate {
            remaining: 1,
            ..rate
        };
        assert!(!with_budget.is_exhausted_at(now));
    }
}
