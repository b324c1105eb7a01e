// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot and automation sender detection.
//!
//! Automated senders must never be evaluated: their messages are dropped
//! from the transcript and any agent rows the model invents for them are
//! discarded before persistence.

/// Name fragments that mark a sender as automated.
///
/// Matching is case-insensitive substring, which is intentionally broad: a
/// human agent named "Noreply Smith" would be excluded too. False positives
/// cost a skipped evaluation; false negatives grade a machine.
const BOT_NAMES: [&str; 10] = [
    "gorgias bot",
    "bot",
    "ai agent",
    "auto-reply",
    "autoreply",
    "noreply",
    "no-reply",
    "system",
    "seth ai-qa",
    "automation",
];

/// Whether `name` identifies a bot or automated sender.
pub fn is_bot(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    BOT_NAMES.iter().any(|bot| lower.contains(bot)) || lower.ends_with("(bot)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_bot_names_match() {
        assert!(is_bot("Gorgias Bot"));
        assert!(is_bot("AI Agent"));
        assert!(is_bot("noreply@example.com"));
        assert!(is_bot("System"));
        assert!(is_bot("Automation Helper"));
    }

    #[test]
    fn bot_suffix_matches() {
        assert!(is_bot("Helper (bot)"));
        assert!(is_bot("  Helper (BOT) "));
    }

    #[test]
    fn substring_match_is_deliberately_broad() {
        // A human with an unlucky name is excluded rather than risking a
        // graded bot.
        assert!(is_bot("Noreply Smith"));
        assert!(is_bot("Robotics Support"));
    }

    #[test]
    fn regular_names_pass() {
        assert!(!is_bot("Alice"));
        assert!(!is_bot("JB"));
        assert!(!is_bot("alice@example.com"));
        assert!(!is_bot(""));
    }
}
