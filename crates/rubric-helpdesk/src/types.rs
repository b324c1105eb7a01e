// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Gorgias REST API.
//!
//! Only the fields the grading pipeline reads are modelled; everything else
//! in the helpdesk's responses is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// A helpdesk ticket as returned by `GET /api/tickets/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub customer: Option<serde_json::Value>,
    #[serde(default)]
    pub created_datetime: Option<String>,
    #[serde(default)]
    pub updated_datetime: Option<String>,
    #[serde(default)]
    pub closed_datetime: Option<String>,
}

impl Ticket {
    /// Ticket id as a string, the form used everywhere downstream.
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    /// Compact JSON snapshot stored alongside the queue row.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id_string(),
            "subject": self.subject,
            "status": self.status,
            "customer": self.customer,
            "closed_datetime": self.closed_datetime,
        })
    }
}

/// A tag attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// One message in a ticket's conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketMessage {
    #[serde(default)]
    pub sender: Option<Sender>,
    #[serde(default)]
    pub from_agent: Option<bool>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub stripped_text: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub created_datetime: Option<String>,
}

impl TicketMessage {
    /// Display name for the sender: name, falling back to email, then empty.
    pub fn sender_name(&self) -> &str {
        match &self.sender {
            Some(s) => s
                .name
                .as_deref()
                .or(s.email.as_deref())
                .unwrap_or(""),
            None => "",
        }
    }

    /// Whether the sender is classified as an agent by the helpdesk.
    pub fn is_from_agent(&self) -> bool {
        self.sender
            .as_ref()
            .and_then(|s| s.kind.as_deref())
            .map(|k| k == "agent")
            .unwrap_or(false)
            || self.from_agent.unwrap_or(false)
    }

    /// Whether the sender is the customer side of the conversation.
    pub fn is_from_customer(&self) -> bool {
        self.sender
            .as_ref()
            .and_then(|s| s.kind.as_deref())
            .map(|k| k == "customer")
            .unwrap_or(false)
    }
}

/// The sender block on a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sender {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Cursor-paginated list response.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl<T> Page<T> {
    /// The cursor for the next page, when the helpdesk reports one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.next_cursor.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub next_cursor: Option<String>,
}
