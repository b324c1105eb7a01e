// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rubric prompt construction.
//!
//! One prompt per ticket. The escalation policy, SOPs, and scoring rubric
//! are fixed text; the ticket id, detected agents, trigger hits, and the
//! transcript are interpolated per run. The model is instructed to answer
//! with bare JSON whose shape matches [`crate::parse`].

use crate::triggers::ESCALATION_AGENTS;

/// Build the evaluation prompt for one ticket.
pub fn build_prompt(
    ticket_id: &str,
    agents: &[String],
    detected_triggers: &[String],
    transcript: &str,
) -> String {
    let escalation_team = ESCALATION_AGENTS.join(", ");
    let agent_list = if agents.is_empty() {
        "Unknown".to_string()
    } else {
        agents.join(", ")
    };
    let trigger_list = if detected_triggers.is_empty() {
        "None".to_string()
    } else {
        detected_triggers.join(", ")
    };

    format!(
        r#"You are a QA analyst evaluating a customer support ticket for an e-commerce company selling electronic products (dashcams, cleaning robots, vacuum cleaners, WiFi equipment). This ticket may have been handled by MULTIPLE agents. Evaluate each human agent separately.

=== ESCALATION POLICY (ZERO TOLERANCE) ===
Agents MUST immediately escalate when ANY of these triggers appear at ANY point in the conversation:
- Legal/Threat Language: customer mentions or implies legal action, chargebacks, fraud, police, regulators
- Safety/Hazard Issues: fire, smoke, overheating, electric shock, sparks, injury, property damage
- Public Exposure Threats: threatens reviews, social media, "going public," influencer or media mention
- Payment Risk: chargeback filed, unauthorized charge, payment dispute
- Manager/Beyond Policy: customer pushes beyond policy, asks for supervisor, refuses standard resolution
- Repeated Aggressive Behavior: multiple contacts for same issue, abusive tone, threats, ultimatums

When an escalation trigger is detected, the agent MUST:
1. Stop standard handling immediately
2. Reassign the ticket to the Escalation Team
3. Add an internal note with the reason for escalation and key customer wording
4. NOT continue the conversation, troubleshoot, negotiate, or promise outcomes

ESCALATION TEAM MEMBERS: {escalation_team} -- evaluate their resolution quality, NOT escalation compliance.

=== RETURN REQUEST SOP ===

REASON: Change of Mind
1. Acknowledge request, ask for return reason if not provided
2. Request product photo if applicable
3. Review photo, verify the order, confirm if returnable
4. If returnable: highlight product features, offer 15% partial refund to keep product
5. If 15% declined calmly -> offer 30% partial refund
6. If 15% declined and customer is upset/angry -> SKIP 30%, offer 40% + return instructions
7. If 30% declined -> offer 50% partial refund + return instructions
8. If all declined -> send return form, ask for tracking number
9. On valid tracking received -> process full refund

REASON: Item Not As Described
1. Acknowledge, ask for return reason if not provided
2. Request clear photo of product (and packaging if relevant)
3. Review photo, match scenario: same product different packaging / functionality issue / missing features / completely different from listing
4. Use appropriate macro, offer 15% partial refund
5. If 15% declined -> offer free reshipment of upgraded version (if available)
6. If reshipment declined -> offer 30% partial refund
7. If 30% declined -> offer 50% partial refund
8. Final resolution based on customer decision

REASON: Received Damaged Product / Product Does Not Work
1. Acknowledge, ask for photo showing damage
2. Review photo carefully
3. If NOT visibly defective: ask probing questions, provide troubleshooting steps, setup instructions, usage guidelines
4. If resolved through troubleshooting -> close ticket
5. If DEFECTIVE confirmed: offer free replacement with tracking details
6. If customer declines replacement -> process full refund

REASON: Did Not Order This
- SUBSCRIPTION ORDER: confirm subscription details, offer partial refund, manage subscription (pause/cancel)
- ONE-TIME PURCHASE: verify payment/billing/shipping details, offer 15% partial refund, escalate if declined

REASON: Found Cheaper Item Elsewhere
1. Acknowledge, state price matching is NOT supported
2. Offer 40% partial refund to keep the product
3. If declined -> follow standard return eligibility flow

=== CANCELLATION REQUEST SOP ===
Follow the standard cancellation process based on order status and fulfillment stage.

=== RETURN SHIPPING POLICY ===
We NEVER offer free return labels. Return shipping cost is ALWAYS shouldered by the customer. If an agent offers a free return label or promises to cover return shipping, this is a policy violation.

=== EVALUATION CRITERIA ===

AGENTS DETECTED: {agent_list}
DETECTED ESCALATION BUZZWORDS: {trigger_list}

TICKET CONVERSATION:
{transcript}

Score each agent on these categories (1-5 per subcriteria):

1. SOFT SKILLS (20% weight):
   - Tone: Professional, warm, appropriate for situation
   - Empathy: Acknowledges customer feelings and frustration
   - Professionalism: Maintains composure, no defensive or dismissive language
   - Clarity: Clear, concise communication without jargon

2. ISSUE UNDERSTANDING (30% weight):
   - Correct Identification: Accurately identifies the customer's issue type and return reason
   - Root Cause Analysis: Understands underlying problem, asks the right probing questions
   - Customer Context: Reviews order history, checks order details, considers full picture
   - Escalation Recognition: Identifies escalation triggers promptly when they appear

3. PRODUCT & PROCESS (30% weight):
   - Policy Accuracy: Follows correct SOP for the specific return reason / issue type
   - SOP Adherence: Follows the step-by-step process in order (e.g., 15% -> 30% -> 50% for change of mind, NOT skipping steps or offering wrong percentages)
   - Solution Correctness: Offers the right resolution at the right time (e.g., replacement for defective, partial refund tiers for change of mind)
   - Escalation Process: When triggers present, properly reassigns to escalation team with internal note (or correctly does NOT escalate when triggers are absent)

4. TOOLS UTILIZATION (20% weight):
   - Helpdesk Usage: Proper use of macros, tags, ticket status management
   - Internal Notes: Quality of internal documentation and notes for team context
   - Store Admin Usage: Correctly performs refunds, replacements, and order verification in the store backend

CRITICAL EVALUATION RULES:
- If an escalation trigger was present and the agent did NOT escalate -> score Escalation Recognition and Escalation Process as 1/5 each
- If the agent skipped partial refund steps (e.g., jumped from 15% to 50%) -> score SOP Adherence as 2/5 or lower
- If the agent offered the wrong resolution for the return reason -> score Solution Correctness as 2/5 or lower
- If the customer was clearly upset and the agent offered 30% instead of skipping to 40% -> note this in feedback
- If the agent offered a free return label or promised to cover return shipping -> score Policy Accuracy as 1/5 and flag it as a policy violation in violationNotes. Return shipping is ALWAYS at the customer's expense.

Respond ONLY with valid JSON (no markdown, no code blocks):
{{"ticketId":"{ticket_id}","agents":[{{"agentName":"Name","isEscalationAgent":false,"zeroToleranceViolation":false,"violationNotes":"","scores":{{"softSkills":{{"tone":{{"score":1,"explanation":"why"}},"empathy":{{"score":1,"explanation":"why"}},"professionalism":{{"score":1,"explanation":"why"}},"clarity":{{"score":1,"explanation":"why"}}}},"issueUnderstanding":{{"correctIdentification":{{"score":1,"explanation":"why"}},"rootCauseAnalysis":{{"score":1,"explanation":"why"}},"customerContext":{{"score":1,"explanation":"why"}},"escalationRecognition":{{"score":1,"explanation":"why"}}}},"productProcess":{{"policyAccuracy":{{"score":1,"explanation":"why"}},"sopAdherence":{{"score":1,"explanation":"why"}},"solutionCorrectness":{{"score":1,"explanation":"why"}},"escalationProcess":{{"score":1,"explanation":"why"}}}},"toolsUtilization":{{"gorgiasUsage":{{"score":1,"explanation":"why"}},"internalNotes":{{"score":1,"explanation":"why"}},"shopifyUsage":{{"score":1,"explanation":"why"}}}}}},"overallAnalysis":"analysis","suggestedFeedback":"coaching"}}]}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_interpolates_ticket_context() {
        let prompt = build_prompt(
            "5001",
            &["Alice".to_string(), "Bob".to_string()],
            &["chargeback".to_string()],
            "[date] Customer:\nwhere is my refund",
        );
        assert!(prompt.contains("AGENTS DETECTED: Alice, Bob"));
        assert!(prompt.contains("DETECTED ESCALATION BUZZWORDS: chargeback"));
        assert!(prompt.contains("where is my refund"));
        assert!(prompt.contains(r#""ticketId":"5001""#));
        assert!(prompt.contains("JB, Arche, Princess"));
    }

    #[test]
    fn prompt_uses_placeholders_when_context_is_empty() {
        let prompt = build_prompt("5001", &[], &[], "");
        assert!(prompt.contains("AGENTS DETECTED: Unknown"));
        assert!(prompt.contains("DETECTED ESCALATION BUZZWORDS: None"));
    }

    #[test]
    fn prompt_names_every_rubric_criterion() {
        let prompt = build_prompt("1", &[], &[], "");
        for key in [
            "tone",
            "empathy",
            "professionalism",
            "clarity",
            "correctIdentification",
            "rootCauseAnalysis",
            "customerContext",
            "escalationRecognition",
            "policyAccuracy",
            "sopAdherence",
            "solutionCorrectness",
            "escalationProcess",
            "gorgiasUsage",
            "internalNotes",
            "shopifyUsage",
        ] {
            assert!(prompt.contains(key), "missing criterion {key}");
        }
    }
}
