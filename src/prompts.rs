//! Prompts for research-proposal generation.
//!
//! Every prompt the pipeline sends lives here, so unit tests can inspect
//! them without a live model. Callers can override the system prompt via
//! [`crate::pipeline::enrich::LlmProposalGenerator::with_system_prompt`].

/// System message framing the model as a user-research agency.
pub const PROPOSAL_SYSTEM_PROMPT: &str =
    "You are a research agency experienced in user research for blockchain and web3 products. \
     Answer in Markdown: use # and ## headers for sections such as Executive Summary, \
     Objectives, Methodology, Timeline, Investment and Deliverables, and use bullet lists \
     where they help.";

/// Literal text substituted for a proposal the model could not produce.
pub const PROPOSAL_PLACEHOLDER: &str = "Error generating proposal";

/// User message asking for a research proposal built on `summary`.
pub fn proposal_prompt(summary: &str) -> String {
    format!(
        "As a research agency experienced in user research, can you take the content of this \
         article and generate a proposal idea to perform user research?: {summary}"
    )
}
