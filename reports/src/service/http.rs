//! HTTP implementation of the Report Service.

use super::{CreatedReport, NewReport, ReportService, ServiceFuture, ServiceResult};
use crate::error::ServiceError;
use crate::types::{Report, ReportChanges, ReportId, ReportStatus, UserId};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Deserialize)]
struct ReportsEnvelope {
    reports: Vec<Report>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    new_report: CreatedReport,
}

#[derive(Serialize)]
struct StatusBody {
    status: ReportStatus,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Build the HTTP client, honouring an optional request timeout
pub(crate) fn build_client(timeout: Option<Duration>) -> ServiceResult<Client> {
    let builder = Client::builder();
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    builder
        .build()
        .map_err(|e| ServiceError::Transport(e.to_string()))
}

/// Message carried by an error response
///
/// The body's `message` field, else its `error` field, else the raw body,
/// else `fallback`.
async fn error_message(response: Response, fallback: &str) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .or_else(|| (!body.trim().is_empty()).then(|| body.clone()))
        .unwrap_or_else(|| fallback.to_string())
}

/// Turn a non-success response into a [`ServiceError::Rejected`]
pub(crate) async fn rejection(status: StatusCode, response: Response, fallback: &str) -> ServiceError {
    ServiceError::Rejected {
        status: status.as_u16(),
        message: error_message(response, fallback).await,
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Send `request`, accepting only `expected` as success
async fn send_expecting(request: RequestBuilder, expected: StatusCode) -> ServiceResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ServiceError::Transport(e.to_string()))?;
    metrics::counter!("reports.http.responses", "status" => response.status().as_u16().to_string())
        .increment(1);

    match response.status() {
        status if status == expected => Ok(response),
        StatusCode::UNAUTHORIZED => {
            let message = error_message(response, "Unauthorized").await;
            tracing::warn!(%message, "Report Service refused the session token");
            Err(ServiceError::Unauthorized { message })
        },
        status => {
            let error = rejection(status, response, status.canonical_reason().unwrap_or("Request failed")).await;
            tracing::warn!(status = status.as_u16(), error = %error, "Report Service rejected request");
            Err(error)
        },
    }
}

/// Report Service client over HTTP
///
/// Paths follow the service's routes: `/reports` for the full collection,
/// `/report/{userId}` for one submitter's reports and `/report/{id}` for
/// single-report mutations.
#[derive(Clone, Debug)]
pub struct HttpReportService {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl HttpReportService {
    /// Create a client with the transport's default timeout
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Create a client with an optional request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if the HTTP client cannot be built
    pub fn with_timeout(api_url: impl Into<String>, timeout: Option<Duration>) -> ServiceResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            ..Self::new(api_url)
        })
    }

    /// Attach a bearer token to every request
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL extended with `segments`, each percent-encoded as one path segment
    fn endpoint(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| ServiceError::Transport(format!("Invalid API URL {}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|()| ServiceError::Transport(format!("API URL {} cannot carry a path", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ServiceResult<RequestBuilder> {
        let request = self.client.request(method, self.endpoint(segments)?);
        Ok(match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    fn fetch(&self, segments: &[&str]) -> ServiceFuture<Vec<Report>> {
        let request = self.request(Method::GET, segments);
        Box::pin(async move {
            let response = send_expecting(request?, StatusCode::OK).await?;
            let envelope: ReportsEnvelope = decode(response).await?;
            tracing::debug!(count = envelope.reports.len(), "Fetched reports");
            Ok(envelope.reports)
        })
    }
}

impl ReportService for HttpReportService {
    fn fetch_all(&self) -> ServiceFuture<Vec<Report>> {
        self.fetch(&["reports"])
    }

    fn fetch_for_user(&self, user_id: &UserId) -> ServiceFuture<Vec<Report>> {
        self.fetch(&["report", user_id.as_str()])
    }

    fn create(&self, report: &NewReport) -> ServiceFuture<CreatedReport> {
        let request = self.request(Method::POST, &["report"]).map(|r| r.json(report));
        Box::pin(async move {
            let response = send_expecting(request?, StatusCode::CREATED).await?;
            let created: CreateResponse = decode(response).await?;
            tracing::debug!(report_id = %created.new_report.id, "Report created");
            Ok(created.new_report)
        })
    }

    fn update(&self, id: &ReportId, changes: &ReportChanges) -> ServiceFuture<()> {
        let request = self
            .request(Method::PATCH, &["report", id.as_str()])
            .map(|r| r.json(changes));
        Box::pin(async move {
            send_expecting(request?, StatusCode::OK).await?;
            Ok(())
        })
    }

    fn set_status(&self, id: &ReportId, status: ReportStatus) -> ServiceFuture<()> {
        let request = self
            .request(Method::PUT, &["report", id.as_str()])
            .map(|r| r.json(&StatusBody { status }));
        Box::pin(async move {
            send_expecting(request?, StatusCode::OK).await?;
            Ok(())
        })
    }

    fn delete(&self, id: &ReportId) -> ServiceFuture<()> {
        let request = self.request(Method::DELETE, &["report", id.as_str()]);
        Box::pin(async move {
            send_expecting(request?, StatusCode::OK).await?;
            Ok(())
        })
    }
}
