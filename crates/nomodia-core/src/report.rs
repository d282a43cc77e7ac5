//! Assessment report types with JSON persistence and text rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Progress, SessionState, SessionStatus, SetKind};
use crate::palette::color_for;
use crate::scoring::Interpretation;

/// A snapshot of one session: progress, readings, and every answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub progress: Progress,
    pub interpretation: Interpretation,
    /// One section per pool, in spiral, emotional, general order.
    pub sections: Vec<PoolSection>,
}

/// Answers for one pool, in pool order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSection {
    pub kind: SetKind,
    pub entries: Vec<AnswerEntry>,
}

impl PoolSection {
    pub fn yes_count(&self) -> usize {
        self.entries.iter().filter(|e| e.answer == Some(true)).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub index: usize,
    pub text: String,
    /// `None` until the question has been shown and answered.
    pub answer: Option<bool>,
    /// Display colour as `#rrggbb`.
    pub color: String,
}

impl AssessmentReport {
    /// Build a report from a session.
    pub fn from_session(session: &SessionState) -> Self {
        // Positions before the cursor, or all of them once complete, have been answered.
        let answered_upto = if session.completed {
            session.shuffled_order.len()
        } else {
            session.current_position
        };

        let sections = SetKind::ALL
            .iter()
            .map(|&kind| {
                let answers = session.answers.for_kind(kind);
                let mut entries: Vec<AnswerEntry> = session
                    .shuffled_order
                    .iter()
                    .enumerate()
                    .filter(|(_, q)| q.set_kind == kind)
                    .map(|(position, q)| AnswerEntry {
                        index: q.index_in_set,
                        text: q.text.clone(),
                        answer: (position < answered_upto)
                            .then(|| answers.get(q.index_in_set).copied().unwrap_or(false)),
                        color: color_for(kind, q.index_in_set, answers.len()).to_hex(),
                    })
                    .collect();
                entries.sort_by_key(|e| e.index);
                PoolSection { kind, entries }
            })
            .collect();

        Self {
            session_id: session.session_id,
            started_at: session.started_at,
            updated_at: session.updated_at,
            generated_at: Utc::now(),
            status: session.status(),
            progress: session.progress(),
            interpretation: Interpretation::from_answers(&session.answers),
            sections,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AssessmentReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Plain-text summary of the readings.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Assessment {} ({}, {}/{} answered)\n\n",
            self.session_id, self.status, self.progress.answered, self.progress.total
        ));
        out.push_str(&format!("Spiral dynamics: {}\n", self.interpretation.spiral));
        out.push_str(&format!("Emotional scale: {}\n", self.interpretation.emotional));
        out.push_str(&format!("General outlook: {}\n", self.interpretation.general));
        out
    }

    /// Render the report as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# Nomodia Comprehensive Assessment\n\n");
        md.push_str(&format!(
            "Session `{}`: {}, {}/{} answered, started {}\n\n",
            self.session_id,
            self.status,
            self.progress.answered,
            self.progress.total,
            self.started_at.format("%Y-%m-%d %H:%M UTC")
        ));

        md.push_str("## Results\n\n");
        md.push_str(&format!(
            "- **Spiral dynamics:** {}\n",
            self.interpretation.spiral
        ));
        md.push_str(&format!(
            "- **Emotional scale:** {}\n",
            self.interpretation.emotional
        ));
        md.push_str(&format!(
            "- **General outlook:** {}\n\n",
            self.interpretation.general
        ));

        for section in &self.sections {
            md.push_str(&format!(
                "## {} questions ({} yes)\n\n",
                capitalize(&section.kind.to_string()),
                section.yes_count()
            ));
            md.push_str("| # | Question | Answer |\n|---|----------|--------|\n");
            for entry in &section.entries {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    entry.index + 1,
                    entry.text.replace('|', "\\|"),
                    answer_label(entry.answer)
                ));
            }
            md.push('\n');
        }

        md
    }
}

/// "Yes", "No", or "-" for unanswered.
pub fn answer_label(answer: Option<bool>) -> &'static str {
    match answer {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "-",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::QuestionPools;
    use crate::shuffle::build_shuffled_order;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session_with_first_answers(answers: &[bool]) -> SessionState {
        let order = build_shuffled_order(&QuestionPools::default(), &mut StdRng::seed_from_u64(3));
        let mut session = SessionState::new(order);
        for &answer in answers {
            let q = session.shuffled_order[session.current_position].clone();
            session.answers.set(q.set_kind, q.index_in_set, answer);
            session.current_position += 1;
            session.answered += 1;
        }
        session
    }

    #[test]
    fn sections_follow_pool_order_and_mark_unanswered() {
        let session = session_with_first_answers(&[true, false]);
        let report = AssessmentReport::from_session(&session);

        assert_eq!(report.sections.len(), 3);
        assert_eq!(report.sections[0].kind, SetKind::Spiral);
        assert_eq!(report.sections[1].entries.len(), 22);
        for section in &report.sections {
            let indices: Vec<usize> = section.entries.iter().map(|e| e.index).collect();
            assert_eq!(indices, (0..section.entries.len()).collect::<Vec<_>>());
        }

        let answered: usize = report
            .sections
            .iter()
            .flat_map(|s| &s.entries)
            .filter(|e| e.answer.is_some())
            .count();
        assert_eq!(answered, 2);
        assert_eq!(report.status, SessionStatus::InProgress);
    }

    #[test]
    fn first_answer_lands_in_report() {
        let session = session_with_first_answers(&[true]);
        let first = session.shuffled_order[0].clone();
        let report = AssessmentReport::from_session(&session);
        let section = report
            .sections
            .iter()
            .find(|s| s.kind == first.set_kind)
            .unwrap();
        assert_eq!(section.entries[first.index_in_set].answer, Some(true));
        assert_eq!(section.yes_count(), 1);
    }

    #[test]
    fn markdown_and_text_rendering() {
        let report = AssessmentReport::from_session(&session_with_first_answers(&[]));
        let md = report.to_markdown();
        assert!(md.contains("# Nomodia Comprehensive Assessment"));
        assert!(md.contains("## Spiral questions (0 yes)"));
        assert!(md.contains("No clear spiral level identified"));

        let text = report.to_text();
        assert!(text.contains("not started"));
        assert!(text.contains("0/40 answered"));
        assert!(text.contains("(Positivity score: 0%)"));
    }

    #[test]
    fn json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.json");
        let report = AssessmentReport::from_session(&session_with_first_answers(&[true; 3]));
        report.save_json(&path).unwrap();

        let loaded = AssessmentReport::load_json(&path).unwrap();
        assert_eq!(loaded.session_id, report.session_id);
        assert_eq!(loaded.interpretation, report.interpretation);
        assert_eq!(loaded.progress, report.progress);
    }

    #[test]
    fn answer_labels() {
        assert_eq!(answer_label(Some(true)), "Yes");
        assert_eq!(answer_label(Some(false)), "No");
        assert_eq!(answer_label(None), "-");
    }
}
