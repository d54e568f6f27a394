use super::{encode_path_segment, ListOptions};
use crate::error::Result;
use crate::http::{CallContext, Client, Response, NO_BODY};
use crate::rate::Category;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// An Okta group.
///
/// https://developer.okta.com/docs/api/resources/groups#group-model
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_membership_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_class: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub profile: GroupProfile,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupProfile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sam_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_domain_qualified_name: Option<String>,
    #[serde(rename = "externalId", default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

pub struct GroupsService<'a> {
    client: &'a Client,
}

impl<'a> GroupsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get_by_id(&self, ctx: &CallContext, id: &str) -> Result<(Group, Response)> {
        let path = format!("groups/{}", encode_path_segment(id));
        let (group, resp) = self
            .client
            .execute::<Group, _>(Method::GET, &path, NO_BODY, Category::GroupsGetUpdateDelete, ctx)
            .await?;
        Ok((group.unwrap_or_default(), resp))
    }

    pub async fn list(&self, ctx: &CallContext, opts: &ListOptions) -> Result<(Vec<Group>, Response)> {
        let (groups, resp) = self
            .client
            .execute::<Vec<Group>, _>(
                Method::GET,
                &opts.to_path("groups"),
                NO_BODY,
                Category::GroupsCreateList,
                ctx,
            )
            .await?;
        Ok((groups.unwrap_or_default(), resp))
    }

    /// Creates a group; only the profile is sent.
    pub async fn add(&self, ctx: &CallContext, profile: &GroupProfile) -> Result<(Group, Response)> {
        let body = serde_json::json!({ "profile": profile });
        let (group, resp) = self
            .client
            .execute::<Group, _>(Method::POST, "groups", Some(&body), Category::GroupsCreateList, ctx)
            .await?;
        Ok((group.unwrap_or_default(), resp))
    }

    pub async fn update(
        &self,
        ctx: &CallContext,
        id: &str,
        profile: &GroupProfile,
    ) -> Result<(Group, Response)> {
        let path = format!("groups/{}", encode_path_segment(id));
        let body = serde_json::json!({ "profile": profile });
        let (group, resp) = self
            .client
            .execute::<Group, _>(Method::PUT, &path, Some(&body), Category::GroupsGetUpdateDelete, ctx)
            .await?;
        Ok((group.unwrap_or_default(), resp))
    }

    pub async fn remove(&self, ctx: &CallContext, id: &str) -> Result<Response> {
        let path = format!("groups/{}", encode_path_segment(id));
        let (_, resp) = self
            .client
            .execute::<serde_json::Value, _>(
                Method::DELETE,
                &path,
                NO_BODY,
                Category::GroupsGetUpdateDelete,
                ctx,
            )
            .await?;
        Ok(resp)
    }
}
