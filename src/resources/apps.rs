use super::{encode_path_segment, ListOptions};
use crate::error::Result;
use crate::http::{CallContext, Client, Response, NO_BODY};
use crate::rate::Category;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub const APP_NAME_BOOKMARK: &str = "bookmark";

/// An application in Okta.
///
/// https://developer.okta.com/docs/api/resources/apps#application-model
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct App {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_on_mode: Option<AppSignOnMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<AppAccessibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<AppVisibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AppCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppSignOnMode {
    #[serde(rename = "BOOKMARK")]
    Bookmark,
    #[serde(rename = "BASIC_AUTH")]
    BasicAuth,
    #[serde(rename = "BROWSER_PLUGIN")]
    BrowserPlugin,
    #[serde(rename = "SECURE_PASSWORD_STORE")]
    SecurePasswordStore,
    #[serde(rename = "SAML_2_0")]
    Saml2,
    #[serde(rename = "WS_FEDERATION")]
    WsFederation,
    #[serde(rename = "AUTO_LOGIN")]
    AutoLogin,
    #[serde(rename = "OPENID_CONNECT")]
    OpenIdConnect,
    #[serde(rename = "Custom")]
    Custom,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppAccessibility {
    #[serde(default)]
    pub self_service: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_redirect_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppVisibility {
    #[serde(default)]
    pub auto_submit_toolbar: bool,
    #[serde(default)]
    pub hide: AppVisibilityHide,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppVisibilityHide {
    #[serde(rename = "iOS", default)]
    pub ios: bool,
    #[serde(default)]
    pub web: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppAuthenticationScheme {
    SharedUsernameAndPassword,
    ExternalPasswordSync,
    EditUsernameAndPassword,
    EditPasswordOnly,
    AdminSetsCredentials,
    #[serde(other)]
    Unknown,
}

/// Credentials and scheme for the application's sign-on mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppCredential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<AppAuthenticationScheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name_template: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing: Option<Value>,
    #[serde(rename = "userName", default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Write only; an empty object on read means a password exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_client: Option<Value>,
}

pub struct AppsService<'a> {
    client: &'a Client,
}

impl<'a> AppsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<(App, Response)> {
        let path = format!("apps/{}", encode_path_segment(id));
        let (app, resp) = self
            .client
            .execute::<App, _>(Method::GET, &path, NO_BODY, Category::AppsGetUpdateDelete, ctx)
            .await?;
        Ok((app.unwrap_or_default(), resp))
    }

    pub async fn list(&self, ctx: &CallContext, opts: &ListOptions) -> Result<(Vec<App>, Response)> {
        let (apps, resp) = self
            .client
            .execute::<Vec<App>, _>(
                Method::GET,
                &opts.to_path("apps"),
                NO_BODY,
                Category::AppsCreateList,
                ctx,
            )
            .await?;
        Ok((apps.unwrap_or_default(), resp))
    }

    /// Creates an application. The helpers below cover the common kinds.
    pub async fn add(&self, ctx: &CallContext, app: &App, activate: bool) -> Result<(App, Response)> {
        let path = format!("apps?activate={}", activate);
        let (app, resp) = self
            .client
            .execute::<App, _>(Method::POST, &path, Some(app), Category::AppsCreateList, ctx)
            .await?;
        Ok((app.unwrap_or_default(), resp))
    }

    pub async fn add_bookmark_app(
        &self,
        ctx: &CallContext,
        label: &str,
        activate: bool,
        url: &Url,
    ) -> Result<(App, Response)> {
        let app = bookmark_app(label, url);
        self.add(ctx, &app, activate).await
    }

    pub async fn update(&self, ctx: &CallContext, id: &str, app: &App) -> Result<(App, Response)> {
        let path = format!("apps/{}", encode_path_segment(id));
        let (app, resp) = self
            .client
            .execute::<App, _>(Method::PUT, &path, Some(app), Category::AppsGetUpdateDelete, ctx)
            .await?;
        Ok((app.unwrap_or_default(), resp))
    }

    pub async fn remove(&self, ctx: &CallContext, id: &str) -> Result<Response> {
        let path = format!("apps/{}", encode_path_segment(id));
        let (_, resp) = self
            .client
            .execute::<Value, _>(Method::DELETE, &path, NO_BODY, Category::AppsGetUpdateDelete, ctx)
            .await?;
        Ok(resp)
    }
}

fn bookmark_app(label: &str, url: &Url) -> App {
    App {
        name: APP_NAME_BOOKMARK.to_string(),
        label: label.to_string(),
        sign_on_mode: Some(AppSignOnMode::Bookmark),
        settings: Some(serde_json::json!({
            "app": {
                "requestIntegration": false,
                "url": url.as_str(),
            }
        })),
        ..Default::default()
    }
}
