//! reqwest-backed implementation of the backend traits.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use suds_common::{Customer, KanbanData, LoyaltyAccount, Reward, Task, TaskDraft, TaskId};
use tracing::{debug, warn};

use super::{ApiSettings, BoardApi, CustomerApi};
use crate::errors::ApiError;

const USER_AGENT: &str = concat!("suds/", env!("CARGO_PKG_VERSION"));

/// Validate a server root and strip trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ApiError::InvalidUrl(raw.to_string())),
    }
}

/// `{base}/api{path}`; `path` starts with `/`.
pub fn api_url(base: &str, path: &str) -> String {
    format!("{}/api{}", base, path)
}

/// HTTP client for the shop backend.
///
/// Attaches `Authorization: Bearer <token>` when a token is configured and
/// logs every request and response at debug level.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&settings.base_url)?;
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url,
            token: settings.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        api_url(&self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.http.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute(&self, method: Method, url: String, req: RequestBuilder) -> Result<String, ApiError> {
        debug!(method = %method, url = %url, token = self.token.is_some(), "API request");

        let resp = req.send().await.map_err(|source| {
            warn!(method = %method, url = %url, error = %source, "API request failed");
            ApiError::Transport {
                method: method.to_string(),
                url: url.clone(),
                source,
            }
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| ApiError::Transport {
            method: method.to_string(),
            url: url.clone(),
            source,
        })?;

        if !status.is_success() {
            warn!(method = %method, url = %url, status = status.as_u16(), "API response error");
            return Err(ApiError::Rejected {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                body,
            });
        }

        debug!(method = %method, url = %url, status = status.as_u16(), "API response");
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let req = self.request(method.clone(), &url);
        let body = self.execute(method, url.clone(), req).await?;
        decode(&url, &body)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let req = self.request(method.clone(), &url).json(payload);
        let body = self.execute(method, url.clone(), req).await?;
        decode(&url, &body)
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

#[async_trait]
impl BoardApi for RestClient {
    async fn fetch_board(&self) -> Result<KanbanData, ApiError> {
        self.send(Method::GET, "/kanban").await
    }

    async fn move_task(&self, task_id: &TaskId, new_status: &str) -> Result<Task, ApiError> {
        let payload = json!({ "taskId": task_id, "newStatus": new_status });
        self.send_json(Method::PATCH, "/kanban/move", &payload).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.send_json(Method::POST, "/tasks", draft).await
    }

    async fn update_task(&self, task_id: &TaskId, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.send_json(Method::PUT, &format!("/tasks/{}", task_id), draft)
            .await
    }

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), ApiError> {
        let url = self.url(&format!("/tasks/{}", task_id));
        let req = self.request(Method::DELETE, &url);
        self.execute(Method::DELETE, url, req).await?;
        Ok(())
    }
}

#[async_trait]
impl CustomerApi for RestClient {
    async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.send(Method::GET, "/customers").await
    }

    async fn get_customer(&self, id: &str) -> Result<Customer, ApiError> {
        self.send(Method::GET, &format!("/customers/{}", id)).await
    }

    async fn get_loyalty(&self, customer_id: &str) -> Result<LoyaltyAccount, ApiError> {
        self.send(Method::GET, &format!("/loyalty/{}", customer_id))
            .await
    }

    async fn list_rewards(&self) -> Result<Vec<Reward>, ApiError> {
        self.send(Method::GET, "/loyalty/rewards").await
    }

    async fn redeem(&self, customer_id: &str, reward: &Reward) -> Result<LoyaltyAccount, ApiError> {
        let payload = json!({ "rewardId": reward.id, "pointsCost": reward.points_cost });
        self.send_json(
            Method::POST,
            &format!("/loyalty/{}/redeem", customer_id),
            &payload,
        )
        .await
    }
}
