//! Directory API HTTP client with pagination.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::AccessTokenProvider;
use crate::error::{GoogleError, GoogleResult};
use crate::types::{
    DirectoryGroup, DirectoryMember, DirectoryUser, GroupsPage, MembersPage, UsersPage,
};

const DEFAULT_BASE_URL: &str = "https://admin.googleapis.com/admin/directory/v1";
const PAGE_SIZE: &str = "200";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Read surface of the Directory API the identity-provider port consumes.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// List groups, one pass per provider query string; no queries lists all.
    async fn list_groups(&self, queries: &[String]) -> GoogleResult<Vec<DirectoryGroup>>;

    /// List users, one pass per provider query string; no queries lists all.
    async fn list_users(&self, queries: &[String]) -> GoogleResult<Vec<DirectoryUser>>;

    /// List a group's members with derived-membership expansion, so users of
    /// nested groups appear as direct entries.
    async fn list_group_members(&self, group_id: &str) -> GoogleResult<Vec<DirectoryMember>>;

    /// Fetch one user by id or primary email.
    async fn get_user(&self, user_key: &str) -> GoogleResult<DirectoryUser>;
}

/// Directory API client: bearer auth, `my_customer` scope, `pageToken`
/// pagination.
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl DirectoryClient {
    /// Build a client against the production Directory endpoint.
    pub fn new(tokens: Arc<dyn AccessTokenProvider>) -> GoogleResult<Self> {
        Self::with_base_url(tokens, DEFAULT_BASE_URL)
    }

    /// Build a client against an explicit endpoint (tests point this at a
    /// local mock server).
    pub fn with_base_url(
        tokens: Arc<dyn AccessTokenProvider>,
        base_url: impl Into<String>,
    ) -> GoogleResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(GoogleError::Transport)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> GoogleResult<T> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}{path}", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GoogleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl DirectoryService for DirectoryClient {
    async fn list_groups(&self, queries: &[String]) -> GoogleResult<Vec<DirectoryGroup>> {
        let mut groups = Vec::new();

        // one list pass per query; an empty filter means a single unfiltered pass
        let passes: Vec<Option<&str>> = if queries.is_empty() {
            vec![None]
        } else {
            queries.iter().map(|q| Some(q.as_str())).collect()
        };

        for query in passes {
            let mut page_token: Option<String> = None;
            loop {
                let mut params = vec![("customer", "my_customer"), ("maxResults", PAGE_SIZE)];
                if let Some(q) = query {
                    params.push(("query", q));
                }
                if let Some(token) = page_token.as_deref() {
                    params.push(("pageToken", token));
                }

                let page: GroupsPage = self.get_page("/groups", &params).await?;
                groups.extend(page.groups);

                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }
        }

        debug!(groups = groups.len(), "listed directory groups");
        Ok(groups)
    }

    async fn list_users(&self, queries: &[String]) -> GoogleResult<Vec<DirectoryUser>> {
        let mut users = Vec::new();

        let passes: Vec<Option<&str>> = if queries.is_empty() {
            vec![None]
        } else {
            queries.iter().map(|q| Some(q.as_str())).collect()
        };

        for query in passes {
            let mut page_token: Option<String> = None;
            loop {
                let mut params = vec![("customer", "my_customer"), ("maxResults", PAGE_SIZE)];
                if let Some(q) = query {
                    params.push(("query", q));
                }
                if let Some(token) = page_token.as_deref() {
                    params.push(("pageToken", token));
                }

                let page: UsersPage = self.get_page("/users", &params).await?;
                users.extend(page.users);

                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }
        }

        debug!(users = users.len(), "listed directory users");
        Ok(users)
    }

    async fn list_group_members(&self, group_id: &str) -> GoogleResult<Vec<DirectoryMember>> {
        let mut members = Vec::new();
        let path = format!("/groups/{group_id}/members");

        let mut page_token: Option<String> = None;
        loop {
            let mut params = vec![
                ("includeDerivedMembership", "true"),
                ("maxResults", PAGE_SIZE),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let page: MembersPage = self.get_page(&path, &params).await?;
            members.extend(page.members);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(
            group_id,
            members = members.len(),
            "listed directory group members"
        );
        Ok(members)
    }

    async fn get_user(&self, user_key: &str) -> GoogleResult<DirectoryUser> {
        self.get_page(&format!("/users/{user_key}"), &[]).await
    }
}
