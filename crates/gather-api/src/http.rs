//! Reqwest implementation of [`ApiClient`].
//!
//! All endpoints speak JSON. Non-success statuses are parsed as `{message}`
//! bodies (with an optional `pricing` payload on 402) and mapped to the
//! [`ApiError`] taxonomy in one place.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use gather_core::record::{FeedKind, Pricing};
use gather_core::wire::{
    AttendResponse, BulkCheckInResponse, EventFilters, FeedPage, PaymentProof,
};

use crate::client::ApiClient;
use crate::error::{ApiError, Result};

/// Error body the server sends on non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct WireError {
    message: Option<String>,
    pricing: Option<Pricing>,
}

/// HTTP client for the Gather API.
pub struct HttpApiClient {
    base_url: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl HttpApiClient {
    /// Create a client for `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Create a client reusing a shared reqwest client.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            client,
        }
    }

    /// Attach a bearer token to every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Network(format!("invalid bearer token: {e}")))?;
            let _ = headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Map a non-success response to the error taxonomy.
    async fn classify_failure(resp: Response) -> ApiError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let wire: WireError = serde_json::from_str(&body).unwrap_or_default();
        let message = wire.message.unwrap_or(body);
        match status {
            StatusCode::PAYMENT_REQUIRED => ApiError::PaymentRequired {
                pricing: wire.pricing,
            },
            StatusCode::FORBIDDEN => ApiError::PermissionDenied { message },
            s if s.is_client_error() => ApiError::Validation { message },
            s => ApiError::Http {
                status: s.as_u16(),
                message,
            },
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T> {
        if !resp.status().is_success() {
            return Err(Self::classify_failure(resp).await);
        }
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Network(format!("malformed response body: {e}")))
    }

    /// Like [`Self::parse`] but discards any success body.
    async fn expect_success(resp: Response) -> Result<()> {
        if !resp.status().is_success() {
            return Err(Self::classify_failure(resp).await);
        }
        Ok(())
    }

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<Response> {
        let resp = self
            .client
            .post(self.url(path))
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    #[instrument(skip(self))]
    async fn attend(&self, event_id: &str) -> Result<AttendResponse> {
        let resp = self
            .post_json(&format!("/events/attend/{event_id}"), &json!({}))
            .await?;
        Self::parse(resp).await
    }

    #[instrument(skip(self))]
    async fn leave(&self, event_id: &str) -> Result<AttendResponse> {
        let resp = self
            .client
            .delete(self.url(&format!("/events/attend/{event_id}")))
            .headers(self.headers()?)
            .send()
            .await?;
        Self::parse(resp).await
    }

    #[instrument(skip(self))]
    async fn request_join(&self, event_id: &str, message: Option<&str>) -> Result<()> {
        let resp = self
            .post_json(
                &format!("/events/request-join/{event_id}"),
                &json!({ "message": message }),
            )
            .await?;
        Self::expect_success(resp).await
    }

    #[instrument(skip(self, proof))]
    async fn confirm_attendance(
        &self,
        event_id: &str,
        proof: &PaymentProof,
    ) -> Result<AttendResponse> {
        let resp = self
            .post_json(
                &format!("/events/attend/{event_id}"),
                &json!({ "paymentConfirmed": true, "proof": proof }),
            )
            .await?;
        Self::parse(resp).await
    }

    #[instrument(skip(self))]
    async fn remove_attendee(&self, event_id: &str, user_id: &str) -> Result<()> {
        let resp = self
            .post_json(
                &format!("/events/{event_id}/remove-attendee"),
                &json!({ "userId": user_id }),
            )
            .await?;
        Self::expect_success(resp).await
    }

    #[instrument(skip(self, attendee_ids), fields(count = attendee_ids.len()))]
    async fn bulk_check_in(
        &self,
        event_id: &str,
        attendee_ids: &[String],
    ) -> Result<BulkCheckInResponse> {
        let resp = self
            .post_json(
                &format!("/events/{event_id}/bulk-checkin"),
                &json!({ "attendeeIds": attendee_ids }),
            )
            .await?;
        Self::parse(resp).await
    }

    #[instrument(skip(self))]
    async fn fetch_feed(&self, kind: FeedKind, page: u32, limit: u32) -> Result<FeedPage> {
        debug!(feed = kind.as_str(), page, limit, "fetching feed page");
        let resp = self
            .client
            .get(self.url("/feed/events"))
            .headers(self.headers()?)
            .query(&[
                ("feed", kind.as_str().to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;
        Self::parse(resp).await
    }

    #[instrument(skip(self, filters))]
    async fn fetch_events(&self, filters: &EventFilters) -> Result<FeedPage> {
        let mut query: Vec<(&str, String)> = vec![("page", filters.page.to_string())];
        if let Some(q) = &filters.query {
            query.push(("q", q.clone()));
        }
        if let Some(host_id) = &filters.host_id {
            query.push(("hostId", host_id.clone()));
        }
        if let Some(starts_after) = filters.starts_after {
            query.push(("startsAfter", starts_after.to_rfc3339()));
        }
        if let Some(limit) = filters.limit {
            query.push(("limit", limit.to_string()));
        }
        let resp = self
            .client
            .get(self.url("/events"))
            .headers(self.headers()?)
            .query(&query)
            .send()
            .await?;
        Self::parse(resp).await
    }
}
