// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation trigger detection.
//!
//! The trigger scan runs over the full transcript before the model sees it,
//! and the hits are fed into the prompt so scoring of escalation handling
//! does not depend on the model spotting the phrases itself.

/// Phrases that require immediate escalation when a customer uses them.
pub const TRIGGER_PHRASES: [&str; 42] = [
    // Legal / threat language
    "legal",
    "lawyer",
    "attorney",
    "lawsuit",
    "sue",
    "court",
    "legal action",
    // Fraud / regulators
    "fraud",
    "police",
    "regulators",
    "consumer affairs",
    "consumer protection",
    "consumer agency",
    "ftc",
    "federal trade",
    "bbb",
    "better business bureau",
    "attorney general",
    // Chargebacks / payment disputes
    "chargeback",
    "dispute charge",
    "unauthorized charge",
    "payment dispute",
    // Safety / hazard
    "fire",
    "smoke",
    "overheating",
    "injury",
    "property damage",
    "hazard",
    "electric shock",
    "sparks",
    // Public exposure threats
    "going public",
    "social media",
    "influencer",
    "media mention",
    "leave a review",
    "post online",
    // Manager / beyond policy
    "manager",
    "supervisor",
    "speak to someone else",
    // Aggressive / ultimatums
    "ultimatum",
    "final warning",
    "last chance",
];

/// Members of the escalation team. Their tickets are scored on resolution
/// quality rather than escalation compliance.
pub const ESCALATION_AGENTS: [&str; 7] = [
    "JB", "Arche", "Princess", "Cess", "Analie", "Randel", "Ardylyn",
];

/// Scan `text` for escalation trigger phrases. Returns the matching
/// phrases in list order; case-insensitive substring matching.
pub fn detect_triggers(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TRIGGER_PHRASES
        .iter()
        .filter(|phrase| lower.contains(*phrase))
        .map(|phrase| phrase.to_string())
        .collect()
}

/// Whether `name` belongs to the escalation team (case-insensitive
/// substring, so "Princess M." matches).
pub fn is_escalation_agent(name: &str) -> bool {
    let lower = name.to_lowercase();
    ESCALATION_AGENTS
        .iter()
        .any(|agent| lower.contains(&agent.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_phrases_case_insensitively() {
        let hits = detect_triggers("I will file a CHARGEBACK and talk to my Lawyer");
        assert!(hits.contains(&"chargeback".to_string()));
        assert!(hits.contains(&"lawyer".to_string()));
    }

    #[test]
    fn returns_hits_in_list_order() {
        let hits = detect_triggers("there was smoke and i want a manager, this is fraud");
        assert_eq!(hits, vec!["fraud", "smoke", "manager"]);
    }

    #[test]
    fn clean_text_has_no_hits() {
        assert!(detect_triggers("thanks for the quick replacement!").is_empty());
    }

    #[test]
    fn substring_hits_are_accepted() {
        // "sue" inside "issue" is a known over-match; the model sees the
        // phrase list and the transcript and weighs the context itself.
        assert_eq!(detect_triggers("there is an issue"), vec!["sue"]);
    }

    #[test]
    fn escalation_team_membership() {
        assert!(is_escalation_agent("JB"));
        assert!(is_escalation_agent("princess m."));
        assert!(!is_escalation_agent("Alice"));
    }
}
