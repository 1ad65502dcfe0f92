//! SCIM HTTP client: bearer auth, `startIndex` pagination, create-or-get
//! conflict resolution.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ScimError, ScimResult};
use crate::types::{ListResponse, PatchOp, ScimGroup, ScimUser};

const PAGE_SIZE: usize = 100;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for one SCIM endpoint.
pub struct ScimClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl ScimClient {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> ScimResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ScimError::Transport)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        })
    }

    /// List users, following `startIndex` pages until exhaustion.
    pub async fn list_users(&self, filter: Option<&str>) -> ScimResult<ListResponse<ScimUser>> {
        self.list("/Users", filter).await
    }

    /// List groups, following `startIndex` pages until exhaustion.
    pub async fn list_groups(&self, filter: Option<&str>) -> ScimResult<ListResponse<ScimGroup>> {
        self.list("/Groups", filter).await
    }

    /// Create a user, resolving a uniqueness conflict to the existing record.
    pub async fn create_or_get_user(&self, user: &ScimUser) -> ScimResult<ScimUser> {
        match self.post("/Users", user).await {
            Ok(created) => Ok(created),
            Err(ScimError::Conflict { .. }) => {
                debug!(user_name = %user.user_name, "user already exists, fetching it");
                self.get_user_by_user_name(&user.user_name).await
            }
            Err(err) => Err(err),
        }
    }

    /// Look a user up by `userName`.
    pub async fn get_user_by_user_name(&self, user_name: &str) -> ScimResult<ScimUser> {
        let filter = format!("userName eq \"{user_name}\"");
        let response = self.list_users(Some(&filter)).await?;
        response
            .resources
            .into_iter()
            .next()
            .ok_or_else(|| ScimError::NotFound(format!("user with userName {user_name}")))
    }

    /// Replace a user record.
    pub async fn put_user(&self, id: &str, user: &ScimUser) -> ScimResult<ScimUser> {
        let url = format!("{}/Users/{id}", self.base_url);
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.bearer_token)
            .json(user)
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_user(&self, id: &str) -> ScimResult<()> {
        self.delete(&format!("/Users/{id}")).await
    }

    /// Create a group, resolving a uniqueness conflict to the existing record.
    pub async fn create_or_get_group(&self, group: &ScimGroup) -> ScimResult<ScimGroup> {
        match self.post("/Groups", group).await {
            Ok(created) => Ok(created),
            Err(ScimError::Conflict { .. }) => {
                debug!(display_name = %group.display_name, "group already exists, fetching it");
                let filter = format!("displayName eq \"{}\"", group.display_name);
                let response = self.list_groups(Some(&filter)).await?;
                response.resources.into_iter().next().ok_or_else(|| {
                    ScimError::NotFound(format!("group with displayName {}", group.display_name))
                })
            }
            Err(err) => Err(err),
        }
    }

    pub async fn delete_group(&self, id: &str) -> ScimResult<()> {
        self.delete(&format!("/Groups/{id}")).await
    }

    /// Apply one patch message to a group.
    pub async fn patch_group(&self, id: &str, patch: &PatchOp) -> ScimResult<()> {
        let url = format!("{}/Groups/{id}", self.base_url);
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.bearer_token)
            .json(patch)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn list<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        filter: Option<&str>,
    ) -> ScimResult<ListResponse<T>> {
        let url = format!("{}{path}", self.base_url);
        let mut resources = Vec::new();
        let mut start_index = 1usize;
        let mut total_results = 0usize;

        loop {
            let count = PAGE_SIZE.to_string();
            let start = start_index.to_string();
            let mut params = vec![("count", count.as_str()), ("startIndex", start.as_str())];
            if let Some(f) = filter {
                params.push(("filter", f));
            }

            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.bearer_token)
                .query(&params)
                .send()
                .await?;
            let response = check(response).await?;
            let page: ListResponse<T> = response.json().await?;

            total_results = page.total_results;
            let fetched = page.resources.len();
            resources.extend(page.resources);

            if fetched == 0 || resources.len() >= total_results {
                break;
            }
            start_index += fetched;
        }

        Ok(ListResponse {
            total_results: total_results.max(resources.len()),
            items_per_page: resources.len(),
            start_index: 1,
            resources,
        })
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ScimResult<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(body)
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> ScimResult<()> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Map a non-success response into the error taxonomy.
async fn check(response: reqwest::Response) -> ScimResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    if status.as_u16() == 409 {
        return Err(ScimError::Conflict { message });
    }

    if status.as_u16() == 429 || status.is_server_error() {
        warn!(status = status.as_u16(), "scim endpoint unavailable");
    }
    Err(ScimError::Api {
        status: status.as_u16(),
        message,
    })
}
