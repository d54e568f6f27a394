use super::{encode_path_segment, ListOptions};
use crate::error::Result;
use crate::http::{CallContext, Client, Response, NO_BODY};
use crate::rate::Category;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An Okta user.
///
/// https://developer.okta.com/docs/api/resources/users#user-model
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status_changed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub password_changed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub credentials: UserCredentials,
    /// `_links` keyed by relation (`resetPassword`, `deactivate`, ...).
    #[serde(rename = "_links", default)]
    pub links: HashMap<String, LinkRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkRef {
    #[serde(default)]
    pub href: String,
}

// Okta sends null for every unset profile attribute.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub login: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nick_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub second_email: Option<String>,
    pub profile_url: Option<String>,
    pub preferred_language: Option<String>,
    pub user_type: Option<String>,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub division: Option<String>,
    pub department: Option<String>,
    pub cost_center: Option<String>,
    pub employee_number: Option<String>,
    pub mobile_phone: Option<String>,
    pub primary_phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserCredentials {
    pub password: Option<serde_json::Value>,
    pub recovery_question: Option<RecoveryQuestion>,
    pub provider: Option<CredentialProvider>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecoveryQuestion {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialProvider {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
}

pub struct UsersService<'a> {
    client: &'a Client,
}

impl<'a> UsersService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<(User, Response)> {
        self.get(ctx, id, Category::UsersGetById).await
    }

    /// Looks a user up by login (short name or full login).
    pub async fn get_by_login(&self, ctx: &CallContext, login: &str) -> Result<(User, Response)> {
        self.get(ctx, login, Category::UsersGetByLoginName).await
    }

    async fn get(&self, ctx: &CallContext, key: &str, category: Category) -> Result<(User, Response)> {
        let path = format!("users/{}", encode_path_segment(key));
        let (user, resp) = self
            .client
            .execute::<User, _>(Method::GET, &path, NO_BODY, category, ctx)
            .await?;
        Ok((user.unwrap_or_default(), resp))
    }

    pub async fn list(&self, ctx: &CallContext, opts: &ListOptions) -> Result<(Vec<User>, Response)> {
        let (users, resp) = self
            .client
            .execute::<Vec<User>, _>(
                Method::GET,
                &opts.to_path("users"),
                NO_BODY,
                Category::UsersCreateList,
                ctx,
            )
            .await?;
        Ok((users.unwrap_or_default(), resp))
    }

    /// Follows `resp.pagination.next` of a previous [`UsersService::list`].
    pub async fn list_next(
        &self,
        ctx: &CallContext,
        previous: &Response,
    ) -> Result<Option<(Vec<User>, Response)>> {
        let page = self
            .client
            .next_page::<Vec<User>>(&previous.pagination, Category::UsersCreateList, ctx)
            .await?;
        Ok(page.map(|(users, resp)| (users.unwrap_or_default(), resp)))
    }

    /// Deletes a user. Okta only deletes deactivated users; a first call on an
    /// active user deactivates it.
    pub async fn remove(&self, ctx: &CallContext, id: &str) -> Result<Response> {
        let path = format!("users/{}", encode_path_segment(id));
        let (_, resp) = self
            .client
            .execute::<serde_json::Value, _>(
                Method::DELETE,
                &path,
                NO_BODY,
                Category::UsersCreateUpdateDeleteById,
                ctx,
            )
            .await?;
        Ok(resp)
    }
}
