//! HTTP implementation of `QuizService` against the platform REST API.

use async_trait::async_trait;
use tracing::instrument;

use quizdrill_core::error::ServiceError;
use quizdrill_core::model::{Quiz, ScoredAttempt};
use quizdrill_core::traits::{AttemptSubmission, QuizService};

/// Remote quiz platform over HTTP.
///
/// Endpoints:
/// - `GET  /api/quizzes/{quiz_id}`
/// - `POST /api/quizzes/{quiz_id}/attempts`
/// - `GET  /api/quizzes/{quiz_id}/attempts/{attempt_id}`
pub struct HttpQuizService {
    base_url: String,
    api_token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpQuizService {
    pub fn new(base_url: &str, api_token: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            timeout_secs,
            client,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.api_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }

    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout_secs)
        } else {
            ServiceError::Network(e.to_string())
        }
    }

    /// Map a non-success status to the matching `ServiceError`.
    async fn check_status(
        response: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response, ServiceError> {
        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            404 => ServiceError::NotFound(what.to_string()),
            400 | 422 => ServiceError::Validation(body),
            401 => ServiceError::AuthFailed(body),
            _ => ServiceError::ApiError {
                status,
                message: body,
            },
        })
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        response.json().await.map_err(|e| ServiceError::ApiError {
            status: 0,
            message: format!("failed to parse response: {e}"),
        })
    }
}

#[async_trait]
impl QuizService for HttpQuizService {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(quiz = %quiz_id))]
    async fn fetch_quiz(&self, quiz_id: &str) -> anyhow::Result<Quiz> {
        let response = self
            .request(reqwest::Method::GET, &format!("/api/quizzes/{quiz_id}"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = Self::check_status(response, quiz_id).await?;
        Ok(Self::parse_json(response).await?)
    }

    #[instrument(skip(self, submission), fields(quiz = %quiz_id))]
    async fn submit_attempt(
        &self,
        quiz_id: &str,
        submission: &AttemptSubmission,
    ) -> anyhow::Result<ScoredAttempt> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/api/quizzes/{quiz_id}/attempts"),
            )
            .json(submission)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = Self::check_status(response, quiz_id).await?;
        Ok(Self::parse_json(response).await?)
    }

    #[instrument(skip(self), fields(quiz = %quiz_id, attempt = %attempt_id))]
    async fn fetch_attempt(
        &self,
        quiz_id: &str,
        attempt_id: &str,
    ) -> anyhow::Result<ScoredAttempt> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/api/quizzes/{quiz_id}/attempts/{attempt_id}"),
            )
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = Self::check_status(response, attempt_id).await?;
        Ok(Self::parse_json(response).await?)
    }
}
