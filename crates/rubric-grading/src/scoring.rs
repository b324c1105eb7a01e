// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic score arithmetic.
//!
//! The model produces 1-5 ratings per criterion; everything from there to
//! the final percentage and letter grade is computed here, never by the
//! model.

use rubric_core::types::{CategoryBreakdown, Grade, ScoreCard};

/// Category weights: soft skills, issue understanding, product & process,
/// tools utilization.
pub const WEIGHT_SOFT_SKILLS: f64 = 0.2;
pub const WEIGHT_ISSUE_UNDERSTANDING: f64 = 0.3;
pub const WEIGHT_PRODUCT_PROCESS: f64 = 0.3;
pub const WEIGHT_TOOLS_UTILIZATION: f64 = 0.2;

/// Mean of the criterion ratings scaled to 0-100. Empty input scores 0.
pub fn category_score(breakdown: &CategoryBreakdown) -> f64 {
    if breakdown.criteria.is_empty() {
        return 0.0;
    }
    let sum: f64 = breakdown
        .criteria
        .values()
        .map(|c| f64::from(c.score))
        .sum();
    sum / (breakdown.criteria.len() as f64 * 5.0) * 100.0
}

/// Weighted average of the four category scores, 0-100.
///
/// Assumes each category's `category_score` has already been filled in.
pub fn final_score(card: &ScoreCard) -> f64 {
    card.soft_skills.category_score * WEIGHT_SOFT_SKILLS
        + card.issue_understanding.category_score * WEIGHT_ISSUE_UNDERSTANDING
        + card.product_process.category_score * WEIGHT_PRODUCT_PROCESS
        + card.tools_utilization.category_score * WEIGHT_TOOLS_UTILIZATION
}

/// Letter grade for a 0-100 score.
pub fn grade_for(score: f64) -> Grade {
    if score >= 95.0 {
        Grade::APlus
    } else if score >= 90.0 {
        Grade::A
    } else if score >= 85.0 {
        Grade::BPlus
    } else if score >= 80.0 {
        Grade::B
    } else if score >= 75.0 {
        Grade::CPlus
    } else if score >= 70.0 {
        Grade::C
    } else if score >= 60.0 {
        Grade::D
    } else {
        Grade::F
    }
}
