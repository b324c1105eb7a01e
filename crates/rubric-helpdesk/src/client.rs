// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gorgias helpdesk REST API.
//!
//! Authenticates with HTTP Basic (account email + API key). All requests
//! share one pooled connection with a 30 second timeout.

use std::time::Duration;

use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue};
use rubric_core::RubricError;
use tracing::debug;

use crate::types::{Page, Tag, Ticket, TicketMessage};

const GRADED_TAG: &str = "qa-graded";

/// Most messages a single conversation fetch will return.
const MESSAGE_FETCH_CAP: usize = 100;

/// Client for one helpdesk account.
#[derive(Debug, Clone)]
pub struct HelpdeskClient {
    client: reqwest::Client,
    base_url: String,
}

impl HelpdeskClient {
    /// Creates a client for `https://{domain}/api` with Basic auth derived
    /// from the account email and API key.
    pub fn new(domain: &str, email: &str, api_key: &str) -> Result<Self, RubricError> {
        let credentials =
            base64::engine::general_purpose::STANDARD.encode(format!("{email}:{api_key}"));
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|e| {
                RubricError::Config(format!("invalid helpdesk credentials header: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RubricError::Helpdesk {
                message: format!("failed to build HTTP client: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: format!("https://{domain}/api"),
        })
    }

    /// Overrides the base URL. Intended for pointing the client at a local
    /// mock server.
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch a single ticket.
    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, RubricError> {
        let url = format!("{}/tickets/{ticket_id}", self.base_url);
        let response = self.get(&url).await?;
        Self::parse_json(response, "ticket").await
    }

    /// Fetch the conversation for a ticket, following pagination cursors
    /// until the helpdesk reports no more pages or 100 messages have been
    /// collected.
    pub async fn list_messages(&self, ticket_id: &str) -> Result<Vec<TicketMessage>, RubricError> {
        let mut messages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = format!("{}/tickets/{ticket_id}/messages?limit=100", self.base_url);
            if let Some(c) = &cursor {
                url.push_str("&cursor=");
                url.push_str(c);
            }
            let response = self.get(&url).await?;
            let page: Page<TicketMessage> = Self::parse_json(response, "messages").await?;
            let next = page.next_cursor().map(str::to_string);
            messages.extend(page.data);
            if messages.len() >= MESSAGE_FETCH_CAP {
                messages.truncate(MESSAGE_FETCH_CAP);
                break;
            }
            match next {
                Some(n) => cursor = Some(n),
                None => break,
            }
        }

        debug!(ticket_id, count = messages.len(), "fetched ticket messages");
        Ok(messages)
    }

    /// Fetch one page of tickets, most recently updated first. Used by the
    /// backfill scan; pass the previous page's cursor to advance.
    pub async fn list_tickets(&self, cursor: Option<&str>) -> Result<Page<Ticket>, RubricError> {
        let mut url = format!(
            "{}/tickets?limit=100&order_by=updated_datetime:desc",
            self.base_url
        );
        if let Some(c) = cursor {
            url.push_str("&cursor=");
            url.push_str(c);
        }
        let response = self.get(&url).await?;
        Self::parse_json(response, "tickets").await
    }

    /// Post an internal note on a ticket, authored by `author`.
    pub async fn post_internal_note(
        &self,
        ticket_id: &str,
        author: &str,
        body_text: &str,
    ) -> Result<(), RubricError> {
        let url = format!("{}/tickets/{ticket_id}/messages", self.base_url);
        let payload = serde_json::json!({
            "channel": "internal-note",
            "via": "api",
            "source": {
                "type": "internal-note",
                "from": { "name": author }
            },
            "body_text": body_text,
            "from_agent": true,
            "receiver": null
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(request_error)?;
        Self::check_status(response, "posting internal note").await?;
        debug!(ticket_id, "internal note posted");
        Ok(())
    }

    /// Add the graded marker tag to a ticket, preserving its existing tags.
    ///
    /// Read-append-write against the ticket's tag list; the PUT fires the
    /// helpdesk's ticket-updated event, which refreshes any sidebar widget.
    pub async fn tag_ticket_graded(&self, ticket_id: &str) -> Result<(), RubricError> {
        let ticket = self.get_ticket(ticket_id).await?;
        let mut tags = ticket.tags;
        if !tags.iter().any(|t| t.name == GRADED_TAG) {
            tags.push(Tag {
                name: GRADED_TAG.to_string(),
            });
        }

        let url = format!("{}/tickets/{ticket_id}", self.base_url);
        let payload = serde_json::json!({ "tags": tags });
        let response = self
            .client
            .put(&url)
            .json(&payload)
            .send()
            .await
            .map_err(request_error)?;
        Self::check_status(response, "tagging ticket").await?;
        debug!(ticket_id, tag = GRADED_TAG, "ticket tagged");
        Ok(())
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, RubricError> {
        self.client.get(url).send().await.map_err(request_error)
    }

    async fn check_status(
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, RubricError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RubricError::Helpdesk {
            message: format!("helpdesk returned {status} while {context}: {body}"),
            status: Some(status.as_u16()),
            source: None,
        })
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, RubricError> {
        let response = Self::check_status(response, context).await?;
        let body = response.text().await.map_err(|e| RubricError::Helpdesk {
            message: format!("failed to read {context} response body: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| RubricError::Helpdesk {
            message: format!("failed to parse {context} response: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })
    }
}

fn request_error(e: reqwest::Error) -> RubricError {
    RubricError::Helpdesk {
        message: format!("HTTP request failed: {e}"),
        status: e.status().map(|s| s.as_u16()),
        source: Some(Box::new(e)),
    }
}
