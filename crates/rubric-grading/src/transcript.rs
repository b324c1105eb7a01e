// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation transcript assembly.
//!
//! Turns the helpdesk's message list into the plain-text transcript the
//! model is scored against, with automated senders removed and agent
//! identities extracted.

use rubric_helpdesk::TicketMessage;

use crate::bots::is_bot;

/// Separator between messages in the rendered transcript.
const MESSAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Render the conversation as plain text.
///
/// Messages from bot agents are dropped entirely. Customer messages are
/// labelled "Customer"; agent messages carry the agent's name so the model
/// can attribute behavior per agent.
pub fn build_transcript(messages: &[TicketMessage]) -> String {
    messages
        .iter()
        .filter(|msg| !(msg.is_from_agent() && is_bot(msg.sender_name())))
        .map(render_message)
        .collect::<Vec<_>>()
        .join(MESSAGE_SEPARATOR)
}

fn render_message(msg: &TicketMessage) -> String {
    let sender = if msg.is_from_customer() {
        "Customer"
    } else {
        let name = msg.sender_name();
        if name.is_empty() { "Agent" } else { name }
    };
    let date = msg.created_datetime.as_deref().unwrap_or("");
    format!("[{date}] {sender}:\n{}", message_body(msg))
}

/// The displayable body of a message: plain text, falling back to the
/// stripped variant, then to tag-stripped HTML.
pub fn message_body(msg: &TicketMessage) -> String {
    if let Some(text) = msg.body_text.as_deref().filter(|t| !t.is_empty()) {
        return text.to_string();
    }
    if let Some(text) = msg.stripped_text.as_deref().filter(|t| !t.is_empty()) {
        return text.to_string();
    }
    msg.body_html
        .as_deref()
        .map(strip_html)
        .unwrap_or_default()
}

/// Remove HTML tags, keeping text content. Not a sanitizer; only used to
/// make HTML-only bodies readable in the transcript.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Distinct human agent names in the conversation, in order of first
/// appearance. Bots and unnamed senders are excluded.
pub fn extract_agents(messages: &[TicketMessage]) -> Vec<String> {
    let mut agents: Vec<String> = Vec::new();
    for msg in messages {
        if !msg.is_from_agent() {
            continue;
        }
        let name = msg.sender_name();
        if name.is_empty() || is_bot(name) {
            continue;
        }
        if !agents.iter().any(|a| a == name) {
            agents.push(name.to_string());
        }
    }
    agents
}
