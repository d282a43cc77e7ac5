//! Core data model types for nomodia.
//!
//! A session is one pass through a shuffled mix of three question pools.
//! Every question keeps a tag pointing back at its pool and position, so
//! answers land in the right slot no matter how the order was shuffled.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which pool a question was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    /// Spiral dynamics statements, one per colour level.
    Spiral,
    /// Statements bound to levels 1..=22 of the emotional scale.
    Emotional,
    /// Free-form yes/no statements, replaceable between sessions.
    General,
}

impl SetKind {
    pub const ALL: [SetKind; 3] = [SetKind::Spiral, SetKind::Emotional, SetKind::General];
}

impl fmt::Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetKind::Spiral => write!(f, "spiral"),
            SetKind::Emotional => write!(f, "emotional"),
            SetKind::General => write!(f, "general"),
        }
    }
}

impl FromStr for SetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spiral" => Ok(SetKind::Spiral),
            "emotional" => Ok(SetKind::Emotional),
            "general" => Ok(SetKind::General),
            other => Err(format!("unknown question set: {other}")),
        }
    }
}

/// A pool entry tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The statement shown to the user.
    pub text: String,
    /// Pool the statement came from.
    pub set_kind: SetKind,
    /// Position of the statement inside its pool.
    pub index_in_set: usize,
}

/// Recorded yes/no answers, one slot per pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Answers {
    pub spiral: Vec<bool>,
    pub emotional: Vec<bool>,
    pub general: Vec<bool>,
}

impl Answers {
    /// All-`false` answers sized to the given pool lengths.
    pub fn unanswered(spiral: usize, emotional: usize, general: usize) -> Self {
        Self {
            spiral: vec![false; spiral],
            emotional: vec![false; emotional],
            general: vec![false; general],
        }
    }

    pub fn for_kind(&self, kind: SetKind) -> &[bool] {
        match kind {
            SetKind::Spiral => &self.spiral,
            SetKind::Emotional => &self.emotional,
            SetKind::General => &self.general,
        }
    }

    fn for_kind_mut(&mut self, kind: SetKind) -> &mut Vec<bool> {
        match kind {
            SetKind::Spiral => &mut self.spiral,
            SetKind::Emotional => &mut self.emotional,
            SetKind::General => &mut self.general,
        }
    }

    /// Write an answer, overwriting whatever the slot held.
    ///
    /// Returns `false` when the slot does not exist.
    pub fn set(&mut self, kind: SetKind, index: usize, value: bool) -> bool {
        match self.for_kind_mut(kind).get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// Where a session sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::NotStarted => write!(f, "not started"),
            SessionStatus::InProgress => write!(f, "in progress"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Aggregated view of session progress, useful for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    /// 1-based number of the question currently shown, if any.
    pub current_number: Option<usize>,
    pub is_complete: bool,
}

/// The unit of persisted progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// One permutation of every pool entry, fixed for the whole pass.
    pub shuffled_order: Vec<Question>,
    pub current_position: usize,
    pub answers: Answers,
    /// Number of answers recorded so far in this pass.
    #[serde(default)]
    pub answered: usize,
    pub completed: bool,
}

impl SessionState {
    /// A fresh, unanswered session over an already shuffled order.
    pub fn new(shuffled_order: Vec<Question>) -> Self {
        let count = |kind| {
            shuffled_order
                .iter()
                .filter(|q| q.set_kind == kind)
                .count()
        };
        let answers = Answers::unanswered(
            count(SetKind::Spiral),
            count(SetKind::Emotional),
            count(SetKind::General),
        );
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            started_at: now,
            updated_at: now,
            shuffled_order,
            current_position: 0,
            answers,
            answered: 0,
            completed: false,
        }
    }

    /// The question awaiting an answer, or `None` once the pass is done.
    pub fn current_question(&self) -> Option<&Question> {
        if self.completed {
            return None;
        }
        self.shuffled_order.get(self.current_position)
    }

    pub fn status(&self) -> SessionStatus {
        if self.completed {
            SessionStatus::Completed
        } else if self.answered == 0 {
            SessionStatus::NotStarted
        } else {
            SessionStatus::InProgress
        }
    }

    pub fn progress(&self) -> Progress {
        let total = self.shuffled_order.len();
        let answered = if self.completed {
            total
        } else {
            self.current_position.min(total)
        };
        Progress {
            total,
            answered,
            remaining: total - answered,
            current_number: self.current_question().map(|_| self.current_position + 1),
            is_complete: self.completed,
        }
    }

    /// General statements in pool order, recovered from the shuffled order.
    pub fn general_statements(&self) -> Vec<String> {
        let mut general: Vec<&Question> = self
            .shuffled_order
            .iter()
            .filter(|q| q.set_kind == SetKind::General)
            .collect();
        general.sort_by_key(|q| q.index_in_set);
        general.into_iter().map(|q| q.text.clone()).collect()
    }

    /// Check the structural invariants of a session, typically one loaded
    /// from storage.
    ///
    /// Every pool index must appear exactly once, answer arrays must match
    /// the pool sizes, and the position must stay in bounds.
    pub fn check_consistency(&self) -> Result<(), String> {
        for kind in SetKind::ALL {
            let slots = self.answers.for_kind(kind).len();
            let mut seen = vec![false; slots];
            for q in self.shuffled_order.iter().filter(|q| q.set_kind == kind) {
                match seen.get_mut(q.index_in_set) {
                    Some(flag) if !*flag => *flag = true,
                    Some(_) => {
                        return Err(format!("{kind} question {} appears twice", q.index_in_set))
                    }
                    None => {
                        return Err(format!(
                            "{kind} question {} is outside the {slots} answer slots",
                            q.index_in_set
                        ))
                    }
                }
            }
            if let Some(missing) = seen.iter().position(|flag| !flag) {
                return Err(format!("{kind} question {missing} is missing"));
            }
        }

        let total = self.shuffled_order.len();
        if self.current_position > total {
            return Err(format!(
                "position {} is past the end of {total} questions",
                self.current_position
            ));
        }
        if self.completed && total > 0 && self.current_position != total - 1 {
            return Err(format!(
                "completed session should rest on the last question, found position {}",
                self.current_position
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(kind: SetKind, index: usize) -> Question {
        Question {
            text: format!("{kind} #{index}"),
            set_kind: kind,
            index_in_set: index,
        }
    }

    #[test]
    fn set_kind_display_and_parse() {
        assert_eq!(SetKind::Spiral.to_string(), "spiral");
        assert_eq!("Emotional".parse::<SetKind>().unwrap(), SetKind::Emotional);
        assert_eq!("general".parse::<SetKind>().unwrap(), SetKind::General);
        assert!("gemini".parse::<SetKind>().is_err());
    }

    #[test]
    fn answers_overwrite_and_reject_out_of_range() {
        let mut answers = Answers::unanswered(2, 1, 0);
        assert!(answers.set(SetKind::Spiral, 1, true));
        assert!(answers.set(SetKind::Spiral, 1, false));
        assert_eq!(answers.spiral, vec![false, false]);
        assert!(!answers.set(SetKind::General, 0, true));
        assert!(!answers.set(SetKind::Emotional, 3, true));
    }

    #[test]
    fn new_session_sizes_answers_from_order() {
        let state = SessionState::new(vec![
            q(SetKind::General, 0),
            q(SetKind::Spiral, 1),
            q(SetKind::Spiral, 0),
        ]);
        assert_eq!(state.answers.spiral.len(), 2);
        assert_eq!(state.answers.emotional.len(), 0);
        assert_eq!(state.answers.general.len(), 1);
        assert_eq!(state.status(), SessionStatus::NotStarted);
        assert_eq!(state.current_question(), Some(&q(SetKind::General, 0)));
        assert!(state.check_consistency().is_ok());
    }

    #[test]
    fn progress_counts() {
        let mut state = SessionState::new(vec![q(SetKind::Spiral, 0), q(SetKind::Spiral, 1)]);
        state.current_position = 1;
        state.answered = 1;
        let progress = state.progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 1);
        assert_eq!(progress.current_number, Some(2));

        state.completed = true;
        let progress = state.progress();
        assert_eq!(progress.answered, 2);
        assert_eq!(progress.current_number, None);
        assert!(progress.is_complete);
    }

    #[test]
    fn consistency_detects_duplicates_and_gaps() {
        let mut state = SessionState::new(vec![q(SetKind::Spiral, 0), q(SetKind::Spiral, 1)]);
        state.shuffled_order[1] = q(SetKind::Spiral, 0);
        let err = state.check_consistency().unwrap_err();
        assert!(err.contains("appears twice"), "got: {err}");

        let mut state = SessionState::new(vec![q(SetKind::Spiral, 0)]);
        state.answers.spiral.push(false);
        let err = state.check_consistency().unwrap_err();
        assert!(err.contains("missing"), "got: {err}");
    }

    #[test]
    fn consistency_rejects_bad_position() {
        let mut state = SessionState::new(vec![q(SetKind::Emotional, 0)]);
        state.current_position = 2;
        assert!(state.check_consistency().is_err());
    }

    #[test]
    fn general_statements_follow_pool_order() {
        let state = SessionState::new(vec![
            q(SetKind::General, 1),
            q(SetKind::Spiral, 0),
            q(SetKind::General, 0),
        ]);
        assert_eq!(
            state.general_statements(),
            vec!["general #0".to_string(), "general #1".to_string()]
        );
    }

    #[test]
    fn session_serde_roundtrip() {
        let mut state = SessionState::new(vec![q(SetKind::Spiral, 0), q(SetKind::General, 0)]);
        state.answers.set(SetKind::Spiral, 0, true);
        state.current_position = 1;
        state.answered = 1;
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"set_kind\":\"spiral\""));
        let restored: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
