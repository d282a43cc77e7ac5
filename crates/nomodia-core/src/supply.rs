//! Refreshing the general pool from a generative question supply.
//!
//! A refresh never fails outright. The adapter reports either a fresh list or
//! a fallback with the reason, and the engine keeps its previous general
//! statements in the fallback case.

use serde::{Deserialize, Serialize};

use crate::error::SupplyError;
use crate::traits::QuestionSupply;

/// Result of asking the supply for new general statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SupplyOutcome {
    /// The supply produced a usable list.
    Fresh { questions: Vec<String> },
    /// The supply failed; previous statements stay in place.
    Fallback { reason: String },
}

impl SupplyOutcome {
    pub fn is_fresh(&self) -> bool {
        matches!(self, SupplyOutcome::Fresh { .. })
    }
}

/// Prompt asking for `count` yes/no statements spanning both scales.
pub fn general_questions_prompt(count: usize) -> String {
    format!(
        "Based on the Nomodia assessment methodology, generate {count} questions that help diagnose a person's position on both the spiral dynamics model and the 22-point emotional scale.

The questions should be in a yes/no format and should help determine:
1. The user's spiral dynamics level (Beige, Purple, Red, Blue, Orange, Green, Yellow, Turquoise)
2. The user's emotional scale position (1-22, where 1 is Fear/Grief/Depression/Despair and 22 is Joy/Knowledge/Empowerment/Freedom/Love/Appreciation)

Format each question as a direct question that can be answered with yes or no. Do not include any explanations or labels with the questions. Return ONLY an array of {count} questions in JSON format."
    )
}

/// Ask `supply` for new statements, converting any failure into a fallback.
pub async fn fetch_general_questions(supply: &dyn QuestionSupply, prompt: &str) -> SupplyOutcome {
    match supply.request_questions(prompt).await {
        Ok(questions) if !questions.is_empty() => {
            tracing::info!(count = questions.len(), "received fresh general questions");
            SupplyOutcome::Fresh { questions }
        }
        Ok(_) => {
            tracing::warn!("question supply returned an empty list, keeping previous questions");
            SupplyOutcome::Fallback {
                reason: SupplyError::Empty.to_string(),
            }
        }
        Err(e) => {
            tracing::warn!("question supply failed, keeping previous questions: {e}");
            SupplyOutcome::Fallback {
                reason: e.to_string(),
            }
        }
    }
}

/// Extract a list of statements from a model response.
///
/// Handles:
/// - ```json fenced blocks (preferred)
/// - Generic ``` fenced blocks
/// - A bare `[ ... ]` array embedded in prose
///
/// Entries are trimmed and blank entries dropped.
pub fn parse_question_list(response: &str) -> Result<Vec<String>, SupplyError> {
    let candidates = fenced_blocks(response)
        .into_iter()
        .chain(bracketed_span(response).map(str::to_string));

    let mut last_error = None;
    for candidate in candidates {
        match serde_json::from_str::<Vec<String>>(candidate.trim()) {
            Ok(list) => {
                let questions: Vec<String> = list
                    .into_iter()
                    .map(|q| q.trim().to_string())
                    .filter(|q| !q.is_empty())
                    .collect();
                if questions.is_empty() {
                    return Err(SupplyError::Empty);
                }
                return Ok(questions);
            }
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(SupplyError::Parse(
        last_error.unwrap_or_else(|| "no JSON array found in response".to_string()),
    ))
}

/// Contents of fenced blocks, ```json blocks first.
fn fenced_blocks(response: &str) -> Vec<String> {
    let mut json_blocks = Vec::new();
    let mut generic_blocks = Vec::new();
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_blocks.push(current_block.clone());
            } else {
                generic_blocks.push(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    json_blocks.extend(generic_blocks);
    json_blocks
}

/// From the first `[` to the last `]`, if both exist in that order.
fn bracketed_span(response: &str) -> Option<&str> {
    let start = response.find('[')?;
    let end = response.rfind(']')?;
    (end > start).then(|| &response[start..=end])
}
