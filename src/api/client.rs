use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::criteria::SearchCriteria;
use crate::state::data::{Fields, RecordKey};

/// Body of `POST /api/login`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Answer of `POST /api/login`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Thin wrapper over `reqwest` for the ERP REST API.
///
/// Cheap to clone: every page task gets its own copy. Requests carry the
/// bearer token if one was attached. There is no timeout, retry or
/// cancellation; a stale token is used until a request fails.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token: None,
        })
    }

    /// Same client, authenticated with `token`
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// `<base>/api/<segments...>`, each segment percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let builder = self.http.request(method, url.clone());
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, method: &'static str, url: &Url) -> Result<Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(method, %url, status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn fetch_rows(&self, url: Url, criteria: Option<&SearchCriteria>) -> Result<Vec<Fields>, ApiError> {
        let mut builder = self.request(Method::GET, &url);
        if let Some(criteria) = criteria.filter(|c| !c.is_empty()) {
            builder = builder.query(criteria.pairs());
        }

        let rows = self
            .send(builder, "GET", &url)
            .await?
            .json::<Vec<Fields>>()
            .await
            .map_err(|e| ApiError::decode(&url, e))?;

        tracing::debug!(%url, rows = rows.len(), "rows fetched");
        Ok(rows)
    }

    /// `POST /api/login`. Non-2xx answers are `ApiError::Status`;
    /// `success:false` comes back as a normal response.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint(&["login"]);
        let builder = self.request(Method::POST, &url).json(credentials);

        self.send(builder, "POST", &url)
            .await?
            .json::<LoginResponse>()
            .await
            .map_err(|e| ApiError::decode(&url, e))
    }

    /// `GET /api/<resource>?<filters>`
    pub async fn list(&self, resource: &str, criteria: &SearchCriteria) -> Result<Vec<Fields>, ApiError> {
        self.fetch_rows(self.endpoint(&[resource]), Some(criteria)).await
    }

    /// `GET /api/<resource>/{id}/<segment>`
    pub async fn list_children(&self, resource: &str, id: &RecordKey, segment: &str) -> Result<Vec<Fields>, ApiError> {
        self.fetch_rows(self.endpoint(&[resource, id.as_str(), segment]), None)
            .await
    }

    /// `POST /api/<resource>`
    pub async fn create(&self, resource: &str, fields: &Fields) -> Result<(), ApiError> {
        let url = self.endpoint(&[resource]);
        let builder = self.request(Method::POST, &url).json(fields);
        self.send(builder, "POST", &url).await.map(|_| ())
    }

    /// `POST /api/<resource>/<bulk|saveAll>` with an array body
    pub async fn create_many(&self, resource: &str, segment: &str, rows: &[Fields]) -> Result<(), ApiError> {
        let url = self.endpoint(&[resource, segment]);
        let builder = self.request(Method::POST, &url).json(rows);
        self.send(builder, "POST", &url).await.map(|_| ())
    }

    /// `PUT /api/<resource>/{id}`
    pub async fn update(&self, resource: &str, id: &RecordKey, fields: &Fields) -> Result<(), ApiError> {
        let url = self.endpoint(&[resource, id.as_str()]);
        let builder = self.request(Method::PUT, &url).json(fields);
        self.send(builder, "PUT", &url).await.map(|_| ())
    }

    /// `DELETE /api/<resource>/{id}`
    pub async fn delete(&self, resource: &str, id: &RecordKey) -> Result<(), ApiError> {
        let url = self.endpoint(&[resource, id.as_str()]);
        let builder = self.request(Method::DELETE, &url);
        self.send(builder, "DELETE", &url).await.map(|_| ())
    }

    /// `GET /api/images/{id}`, raw bytes
    pub async fn image(&self, image_id: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&["images", image_id]);
        let builder = self.request(Method::GET, &url);

        let bytes = self
            .send(builder, "GET", &url)
            .await?
            .bytes()
            .await
            .map_err(|e| ApiError::transport(&url, e))?;
        Ok(bytes.to_vec())
    }

    /// `DELETE /api/images/{id}`
    pub async fn delete_image(&self, image_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["images", image_id]);
        let builder = self.request(Method::DELETE, &url);
        self.send(builder, "DELETE", &url).await.map(|_| ())
    }
}
