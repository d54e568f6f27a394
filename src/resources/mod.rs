//! Thin resource callers over [`Client::execute`](crate::http::Client::execute).
//!
//! Each method supplies a method, a path and an optional body, and tags the
//! call with the rate-limit category Okta applies to that endpoint.

pub mod apps;
pub mod groups;
pub mod users;

pub use apps::{
    App, AppAccessibility, AppAuthenticationScheme, AppCredential, AppSignOnMode, AppVisibility,
    AppsService,
};
pub use groups::{Group, GroupProfile, GroupsService};
pub use users::{User, UserCredentials, UserProfile, UsersService};

/// Percent-encodes a single path segment (ids, logins).
pub fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Query options shared by the list endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Simple search (`q`).
    pub q: Option<String>,
    /// Filter expression (`filter`).
    pub filter: Option<String>,
    /// Cursor from a previous page (`after`).
    pub after: Option<String>,
    pub limit: Option<u32>,
}

impl ListOptions {
    pub(crate) fn to_path(&self, base: &str) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(q) = &self.q {
            query.append_pair("q", q);
        }
        if let Some(filter) = &self.filter {
            query.append_pair("filter", filter);
        }
        if let Some(after) = &self.after {
            query.append_pair("after", after);
        }
        if let Some(limit) = self.limit {
            query.append_pair("limit", &limit.to_string());
        }
        let query = query.finish();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, query)
        }
    }
}
