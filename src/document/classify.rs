//! Keyword-driven section classification.
//!
//! Each paragraph or header is tagged with a coarse [`SectionCategory`] that
//! picks its visual style. The rules are an ordered list of
//! `(category, keywords)` pairs tested top to bottom; the first pair with a
//! keyword contained in the lower-cased text wins.
//!
//! This is a substring heuristic: a paragraph that mentions "budget" in
//! passing is tagged [`SectionCategory::Investment`], and "summary" anywhere
//! makes a paragraph an executive summary. Those false positives are accepted.

use serde::{Deserialize, Serialize};

/// Semantic tag attached to every paragraph and header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    ExecutiveSummary,
    Background,
    Objective,
    Methodology,
    ResearchAreas,
    Timeline,
    Investment,
    Deliverable,
    ResearchQuestions,
    Participants,
    #[default]
    General,
}

/// Priority-ordered keyword table. Order is significant.
const RULES: &[(SectionCategory, &[&str])] = &[
    (
        SectionCategory::ExecutiveSummary,
        &["executive summary", "executive overview", "summary"],
    ),
    (
        SectionCategory::Background,
        &["background", "opportunity", "context", "overview"],
    ),
    (
        SectionCategory::Objective,
        &[
            "objectives",
            "goals",
            "aims",
            "targets",
            "primary objective",
            "secondary objective",
        ],
    ),
    (
        SectionCategory::Methodology,
        &["methodology", "approach", "methods", "process", "phases", "phase"],
    ),
    (
        SectionCategory::ResearchAreas,
        &["research areas", "focus areas", "key areas", "research focus"],
    ),
    (
        SectionCategory::Timeline,
        &["timeline", "schedule", "milestones", "deadlines"],
    ),
    (
        SectionCategory::Investment,
        &["investment", "budget", "cost", "funding", "financial"],
    ),
    (
        SectionCategory::Deliverable,
        &["deliverables", "outputs", "results", "outcomes", "deliverable"],
    ),
    (
        SectionCategory::ResearchQuestions,
        &["research questions", "questions", "key questions"],
    ),
    (
        SectionCategory::Participants,
        &["participants", "target", "audience", "users", "segments"],
    ),
];

/// Assign a category to a paragraph or header text.
pub fn classify(text: &str) -> SectionCategory {
    let lowered = text.trim().to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

impl SectionCategory {
    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionCategory::ExecutiveSummary => "executive_summary",
            SectionCategory::Background => "background",
            SectionCategory::Objective => "objective",
            SectionCategory::Methodology => "methodology",
            SectionCategory::ResearchAreas => "research_areas",
            SectionCategory::Timeline => "timeline",
            SectionCategory::Investment => "investment",
            SectionCategory::Deliverable => "deliverable",
            SectionCategory::ResearchQuestions => "research_questions",
            SectionCategory::Participants => "participants",
            SectionCategory::General => "general",
        }
    }
}
