//! REST API client for the student records backend

use crate::error::{ClientError, Result};
use crate::models::{CountDto, MonthlyTrend, Page, Student, StudentDraft, StudentPatch, StudentQuery};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// HTTP accessor shared by every controller.
///
/// Failures are returned to the caller as-is; nothing is retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Option<String>,
}

/// Error body shape used by the backend (`{"message": "..."}`), with `error` as
/// a secondary spelling.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// A missing base URL is accepted; every request then fails with
    /// [`ClientError::NotConfigured`]. A malformed one is rejected here.
    pub fn new(base_url: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = match base_url.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let parsed = Url::parse(raw)
                    .map_err(|e| ClientError::Config(format!("Invalid API URL '{}': {}", raw, e)))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ClientError::Config(format!(
                        "Unsupported API URL scheme: {}",
                        parsed.scheme()
                    )));
                }
                Some(raw.trim_end_matches('/').to_string())
            }
            None => None,
        };

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn url(&self, path: &str) -> Result<String> {
        let base = self.base_url.as_deref().ok_or(ClientError::NotConfigured)?;
        Ok(format!("{}/{}", base, path.trim_start_matches('/')))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        log::debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    /// GET `path` with query parameters and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)?.query(query)).await?;
        decode(response).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, path)?.json(body)).await?;
        decode(response).await
    }

    /// PATCH a JSON body and decode the JSON response.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::PATCH, path)?.json(body)).await?;
        decode(response).await
    }

    /// DELETE `path`. Any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error));
        log::warn!("Request failed with {}: {:?}", status, message);
        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Typed wrappers over the backend's endpoints.
impl ApiClient {
    pub async fn total_students(&self) -> Result<u64> {
        self.get("/dashboard/total-students", &[]).await
    }

    pub async fn gender_count(&self) -> Result<Vec<CountDto>> {
        self.get("/dashboard/gender-count", &[]).await
    }

    pub async fn category_count(&self) -> Result<Vec<CountDto>> {
        self.get("/dashboard/category-count", &[]).await
    }

    pub async fn institute_count(&self) -> Result<Vec<CountDto>> {
        self.get("/dashboard/institute-count", &[]).await
    }

    pub async fn registration_trend(&self, year: i32) -> Result<Vec<MonthlyTrend>> {
        self.get("/dashboard/registration-trend", &[("year", year.to_string())])
            .await
    }

    pub async fn list_students(&self, query: &StudentQuery) -> Result<Page<Student>> {
        self.get(&query.path(), &query.params()).await
    }

    pub async fn create_student(&self, draft: &StudentDraft) -> Result<Student> {
        self.post("/students", draft).await
    }

    pub async fn patch_student(&self, id: i64, patch: &StudentPatch) -> Result<Student> {
        self.patch(&format!("/students/{}", id), patch).await
    }

    pub async fn delete_student(&self, id: i64) -> Result<()> {
        self.delete(&format!("/students/{}", id)).await
    }
}
