// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model output parsing.
//!
//! The model is told to answer with bare JSON, but in practice it sometimes
//! wraps the document in markdown fences or surrounds it with prose. The
//! extractor tolerates both; anything that still fails to parse becomes a
//! [`RubricError::MalformedOutput`] with a snippet for the log.

use std::collections::BTreeMap;

use rubric_core::RubricError;
use rubric_core::types::{CategoryBreakdown, CriterionScore, ScoreCard};
use serde::Deserialize;

use crate::scoring::category_score;

/// Canonical criterion keys per category. A criterion the model omits is
/// scored at the neutral midpoint of 3.
pub const SOFT_SKILLS_CRITERIA: [&str; 4] = ["tone", "empathy", "professionalism", "clarity"];
pub const ISSUE_UNDERSTANDING_CRITERIA: [&str; 4] = [
    "correctIdentification",
    "rootCauseAnalysis",
    "customerContext",
    "escalationRecognition",
];
pub const PRODUCT_PROCESS_CRITERIA: [&str; 4] = [
    "policyAccuracy",
    "sopAdherence",
    "solutionCorrectness",
    "escalationProcess",
];
pub const TOOLS_UTILIZATION_CRITERIA: [&str; 3] =
    ["gorgiasUsage", "internalNotes", "shopifyUsage"];

const DEFAULT_SCORE: u8 = 3;

/// The model's full answer for one ticket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedAnalysis {
    #[serde(default)]
    pub agents: Vec<ParsedAgent>,
}

/// The model's assessment of a single agent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAgent {
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub is_escalation_agent: bool,
    #[serde(default)]
    pub zero_tolerance_violation: bool,
    #[serde(default)]
    pub violation_notes: String,
    #[serde(default)]
    pub scores: ParsedScores,
    #[serde(default)]
    pub overall_analysis: String,
    #[serde(default)]
    pub suggested_feedback: String,
}

/// Raw per-category criterion maps as the model emitted them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedScores {
    #[serde(default)]
    pub soft_skills: BTreeMap<String, ParsedCriterion>,
    #[serde(default)]
    pub issue_understanding: BTreeMap<String, ParsedCriterion>,
    #[serde(default)]
    pub product_process: BTreeMap<String, ParsedCriterion>,
    #[serde(default)]
    pub tools_utilization: BTreeMap<String, ParsedCriterion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedCriterion {
    #[serde(default = "default_score")]
    pub score: u8,
    #[serde(default)]
    pub explanation: String,
}

fn default_score() -> u8 {
    DEFAULT_SCORE
}

/// Pull the JSON document out of the model's raw answer.
///
/// Strips markdown code fences, then takes the span from the first `{` to
/// the last `}` so leading or trailing prose is ignored.
pub fn extract_json(text: &str) -> Result<String, RubricError> {
    let mut cleaned = text.replace("```json", "").replace("```JSON", "");
    cleaned = cleaned.replace("```", "");
    let cleaned = cleaned.trim();

    let start = cleaned.find('{');
    let end = cleaned.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(cleaned[s..=e].to_string()),
        _ => Err(malformed("no JSON object found in model output", text)),
    }
}

/// Parse the model's raw answer into a [`ParsedAnalysis`].
pub fn parse_analysis(text: &str) -> Result<ParsedAnalysis, RubricError> {
    let json = extract_json(text)?;
    serde_json::from_str(&json)
        .map_err(|e| malformed(&format!("model output is not valid analysis JSON: {e}"), text))
}

/// Convert the model's raw criterion maps into the persisted score card,
/// filling in missing criteria at the neutral default and computing each
/// category score.
pub fn score_card(scores: &ParsedScores) -> ScoreCard {
    ScoreCard {
        soft_skills: breakdown(&scores.soft_skills, &SOFT_SKILLS_CRITERIA),
        issue_understanding: breakdown(&scores.issue_understanding, &ISSUE_UNDERSTANDING_CRITERIA),
        product_process: breakdown(&scores.product_process, &PRODUCT_PROCESS_CRITERIA),
        tools_utilization: breakdown(&scores.tools_utilization, &TOOLS_UTILIZATION_CRITERIA),
    }
}

fn breakdown(raw: &BTreeMap<String, ParsedCriterion>, keys: &[&str]) -> CategoryBreakdown {
    let criteria: BTreeMap<String, CriterionScore> = keys
        .iter()
        .map(|key| {
            let entry = raw.get(*key);
            (
                key.to_string(),
                CriterionScore {
                    score: entry.map(|c| c.score).unwrap_or(DEFAULT_SCORE),
                    explanation: entry.map(|c| c.explanation.clone()).unwrap_or_default(),
                },
            )
        })
        .collect();
    let mut b = CategoryBreakdown {
        criteria,
        category_score: 0.0,
    };
    b.category_score = category_score(&b);
    b
}

fn malformed(reason: &str, text: &str) -> RubricError {
    let snippet: String = text.chars().take(200).collect();
    RubricError::MalformedOutput {
        reason: reason.to_string(),
        snippet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_json(score: u8) -> serde_json::Value {
        let criterion = serde_json::json!({ "score": score, "explanation": "why" });
        serde_json::json!({
            "agentName": "Alice",
            "isEscalationAgent": false,
            "zeroToleranceViolation": false,
            "violationNotes": "",
            "scores": {
                "softSkills": {
                    "tone": criterion, "empathy": criterion,
                    "professionalism": criterion, "clarity": criterion
                },
                "issueUnderstanding": {
                    "correctIdentification": criterion, "rootCauseAnalysis": criterion,
                    "customerContext": criterion, "escalationRecognition": criterion
                },
                "productProcess": {
                    "policyAccuracy": criterion, "sopAdherence": criterion,
                    "solutionCorrectness": criterion, "escalationProcess": criterion
                },
                "toolsUtilization": {
                    "gorgiasUsage": criterion, "internalNotes": criterion,
                    "shopifyUsage": criterion
                }
            },
            "overallAnalysis": "analysis",
            "suggestedFeedback": "coaching"
        })
    }

    #[test]
    fn parses_bare_json() {
        let doc = serde_json::json!({ "ticketId": "5001", "agents": [agent_json(4)] });
        let analysis = parse_analysis(&doc.to_string()).unwrap();
        assert_eq!(analysis.agents.len(), 1);
        assert_eq!(analysis.agents[0].agent_name, "Alice");
    }

    #[test]
    fn strips_markdown_fences() {
        let doc = serde_json::json!({ "agents": [agent_json(4)] });
        let fenced = format!("```json\n{doc}\n```");
        let analysis = parse_analysis(&fenced).unwrap();
        assert_eq!(analysis.agents.len(), 1);
    }

    #[test]
    fn ignores_surrounding_prose() {
        let doc = serde_json::json!({ "agents": [agent_json(2)] });
        let wrapped = format!("Here is the evaluation you asked for:\n{doc}\nLet me know!");
        let analysis = parse_analysis(&wrapped).unwrap();
        assert_eq!(analysis.agents.len(), 1);
    }

    #[test]
    fn rejects_output_without_json() {
        let err = parse_analysis("I cannot evaluate this conversation.").unwrap_err();
        match err {
            RubricError::MalformedOutput { snippet, .. } => {
                assert!(snippet.contains("cannot evaluate"));
            }
            other => panic!("expected MalformedOutput, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_json_document() {
        let err = parse_analysis(r#"{"agents": [{"agentName": }"#).unwrap_err();
        assert!(matches!(err, RubricError::MalformedOutput { .. }));
    }

    #[test]
    fn missing_criteria_default_to_neutral() {
        let parsed = ParsedScores {
            soft_skills: BTreeMap::from([(
                "tone".to_string(),
                ParsedCriterion {
                    score: 5,
                    explanation: "warm".to_string(),
                },
            )]),
            ..Default::default()
        };
        let card = score_card(&parsed);

        assert_eq!(card.soft_skills.criteria["tone"].score, 5);
        assert_eq!(card.soft_skills.criteria["empathy"].score, 3);
        assert_eq!(card.soft_skills.criteria.len(), 4);
        // (5 + 3 + 3 + 3) / 20 * 100
        assert!((card.soft_skills.category_score - 70.0).abs() < 1e-9);

        // Entirely absent category: all criteria at 3, score 60.
        assert_eq!(card.tools_utilization.criteria.len(), 3);
        assert!((card.tools_utilization.category_score - 60.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_extra_criteria_are_dropped() {
        let parsed = ParsedScores {
            tools_utilization: BTreeMap::from([
                (
                    "gorgiasUsage".to_string(),
                    ParsedCriterion {
                        score: 4,
                        explanation: String::new(),
                    },
                ),
                (
                    "madeUpCriterion".to_string(),
                    ParsedCriterion {
                        score: 1,
                        explanation: String::new(),
                    },
                ),
            ]),
            ..Default::default()
        };
        let card = score_card(&parsed);
        assert!(!card.tools_utilization.criteria.contains_key("madeUpCriterion"));
        assert_eq!(card.tools_utilization.criteria.len(), 3);
    }

    #[test]
    fn criterion_missing_score_field_defaults() {
        let c: ParsedCriterion =
            serde_json::from_value(serde_json::json!({ "explanation": "only text" })).unwrap();
        assert_eq!(c.score, 3);
    }
}
