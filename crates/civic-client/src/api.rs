//! Remote complaints API.
//!
//! # Purpose
//! Typed access to the two complaint endpoints the dashboard list uses:
//! - `GET /complaints-client/complaints-with-status` for a filtered page.
//! - `DELETE /complaints-client/complaints-refused/{id}` to refuse one complaint.
//!
//! # Key invariants
//! - Empty `name`/`date` filters are sent as empty strings, meaning "no filter".
//! - Non-2xx responses surface as [`ApiError::Status`] with the response body.
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One complaint row. Fields the list does not model are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Complaint {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            status: None,
            created_at: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Query string for the filtered list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRequest {
    pub name: String,
    pub date: String,
    pub status: String,
    pub skip: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub data: Vec<Complaint>,
    pub total: u64,
    #[serde(default)]
    pub total_waiting: u64,
}

#[async_trait]
pub trait ComplaintsApi: Send + Sync {
    async fn list_with_status(&self, request: &ListRequest) -> ApiResult<ListResponse>;
    async fn refuse(&self, id: &str) -> ApiResult<()>;
}

#[derive(Clone)]
pub struct HttpComplaintsApi {
    base_url: String,
    client: reqwest::Client,
    access_token: Option<String>,
}

impl HttpComplaintsApi {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client,
            access_token: config.access_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // The id is one path segment whatever it contains.
    fn refuse_url(&self, id: &str) -> ApiResult<reqwest::Url> {
        let base = format!("{}/complaints-client/complaints-refused", self.base_url);
        let mut url =
            reqwest::Url::parse(&base).map_err(|err| ApiError::InvalidUrl(format!("{base}: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(base.clone()))?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ComplaintsApi for HttpComplaintsApi {
    async fn list_with_status(&self, request: &ListRequest) -> ApiResult<ListResponse> {
        let url = format!(
            "{}/complaints-client/complaints-with-status",
            self.base_url
        );
        let response = self
            .authorize(self.client.get(url).query(request))
            .send()
            .await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn refuse(&self, id: &str) -> ApiResult<()> {
        let url = self.refuse_url(id)?;
        let response = self.authorize(self.client.delete(url)).send().await?;
        read_success_body(response).await?;
        Ok(())
    }
}

async fn read_success_body(response: reqwest::Response) -> ApiResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
