//! The assessment engine.
//!
//! Owns one session over the three question pools: it resumes or builds the
//! shuffled order, routes each answer back to its pool slot, persists after
//! every transition, and refreshes the general pool through a question
//! supply.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::model::{Progress, Question, SessionState, SessionStatus, SetKind};
use crate::pools::QuestionPools;
use crate::scoring::Interpretation;
use crate::shuffle::build_shuffled_order;
use crate::store::SessionStore;
use crate::supply::{fetch_general_questions, SupplyOutcome};
use crate::traits::QuestionSupply;

/// Store key used when none is configured.
pub const DEFAULT_SESSION_KEY: &str = "assessment-progress";

/// What happened to a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Recorded; the next question is at `position`.
    Advanced { position: usize },
    /// Recorded the final answer; the session is now complete.
    Completed,
    /// Nothing to answer (already complete or empty order).
    Ignored,
}

/// The central assessment engine.
pub struct AssessmentEngine {
    pools: QuestionPools,
    store: Arc<dyn SessionStore>,
    session_key: String,
    session: SessionState,
    resumed: bool,
}

impl AssessmentEngine {
    /// Resume the session stored under `session_key`, or start a fresh one.
    ///
    /// A stored session is only resumed when it is well formed and its spiral
    /// and emotional statements match `pools`. On resume, the general pool is
    /// taken from the stored session, since it may have been refreshed.
    pub fn start<R: Rng>(
        pools: QuestionPools,
        store: Arc<dyn SessionStore>,
        session_key: impl Into<String>,
        rng: &mut R,
    ) -> Self {
        let session_key = session_key.into();

        if let Some(session) = load_session(store.as_ref(), &session_key, &pools) {
            tracing::info!(
                session_id = %session.session_id,
                position = session.current_position,
                completed = session.completed,
                "resuming assessment"
            );
            let pools = pools.with_general(session.general_statements());
            return Self {
                pools,
                store,
                session_key,
                session,
                resumed: true,
            };
        }

        let session = SessionState::new(build_shuffled_order(&pools, rng));
        tracing::info!(
            session_id = %session.session_id,
            questions = session.shuffled_order.len(),
            "starting new assessment"
        );
        let engine = Self {
            pools,
            store,
            session_key,
            session,
            resumed: false,
        };
        engine.save();
        engine
    }

    /// Whether the current session was loaded from the store.
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn pools(&self) -> &QuestionPools {
        &self.pools
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn progress(&self) -> Progress {
        self.session.progress()
    }

    /// Readings over the answers recorded so far.
    pub fn interpretation(&self) -> Interpretation {
        Interpretation::from_answers(&self.session.answers)
    }

    /// Record a yes/no answer for the current question and advance.
    ///
    /// A no-op once the session is complete, so duplicate submissions are
    /// harmless.
    pub fn record_answer(&mut self, answer: bool) -> AnswerOutcome {
        let total = self.session.shuffled_order.len();
        let position = self.session.current_position;
        if self.session.completed || position >= total {
            tracing::debug!(position, total, "ignoring answer with no current question");
            return AnswerOutcome::Ignored;
        }

        let (kind, index): (SetKind, usize) = {
            let q = &self.session.shuffled_order[position];
            (q.set_kind, q.index_in_set)
        };
        self.session.answers.set(kind, index, answer);
        self.session.answered += 1;
        self.session.updated_at = Utc::now();

        let outcome = if position + 1 < total {
            self.session.current_position = position + 1;
            AnswerOutcome::Advanced {
                position: position + 1,
            }
        } else {
            self.session.completed = true;
            tracing::info!(session_id = %self.session.session_id, "assessment completed");
            AnswerOutcome::Completed
        };

        self.save();
        outcome
    }

    /// Persist the session. Failures are logged and reported as `false`;
    /// the session keeps working in memory either way.
    pub fn save(&self) -> bool {
        let text = match serde_json::to_string(&self.session) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("failed to serialize session: {e}");
                return false;
            }
        };
        match self.store.save(&self.session_key, &text) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to persist session progress: {e}");
                false
            }
        }
    }

    /// Discard stored progress and start a freshly shuffled session over
    /// the current pools.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        if let Err(e) = self.store.remove(&self.session_key) {
            tracing::warn!("failed to clear stored session: {e}");
        }
        self.session = SessionState::new(build_shuffled_order(&self.pools, rng));
        self.resumed = false;
        tracing::info!(
            session_id = %self.session.session_id,
            questions = self.session.shuffled_order.len(),
            "assessment reset"
        );
        self.save();
    }

    /// Ask `supply` for new general statements.
    ///
    /// Fresh statements replace the general pool and take effect at the
    /// next reset; on fallback the pool is left untouched.
    pub async fn refresh_general(
        &mut self,
        supply: &dyn QuestionSupply,
        prompt: &str,
    ) -> SupplyOutcome {
        let outcome = fetch_general_questions(supply, prompt).await;
        if let SupplyOutcome::Fresh { questions } = &outcome {
            self.pools.general = questions.clone();
        }
        outcome
    }

    /// Refresh the general pool, then reset.
    pub async fn reset_with_refresh<R: Rng>(
        &mut self,
        supply: &dyn QuestionSupply,
        prompt: &str,
        rng: &mut R,
    ) -> SupplyOutcome {
        let outcome = self.refresh_general(supply, prompt).await;
        self.reset(rng);
        outcome
    }
}

/// Load and vet a stored session. Any problem is logged and treated as
/// "nothing stored".
fn load_session(
    store: &dyn SessionStore,
    key: &str,
    pools: &QuestionPools,
) -> Option<SessionState> {
    let text = match store.load(key) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("failed to load stored session: {e}");
            return None;
        }
    };

    let session: SessionState = match serde_json::from_str(&text) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("discarding unreadable stored session: {e}");
            return None;
        }
    };

    if let Err(reason) = session.check_consistency() {
        tracing::warn!("discarding inconsistent stored session: {reason}");
        return None;
    }

    for kind in [SetKind::Spiral, SetKind::Emotional] {
        let expected = pools.for_kind(kind);
        let mut stored: Vec<&Question> = session
            .shuffled_order
            .iter()
            .filter(|q| q.set_kind == kind)
            .collect();
        stored.sort_by_key(|q| q.index_in_set);
        let matches = stored.len() == expected.len()
            && stored.iter().zip(expected).all(|(q, text)| &q.text == text);
        if !matches {
            tracing::warn!("discarding stored session: {kind} statements no longer match the pools");
            return None;
        }
    }

    Some(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, SupplyError};
    use crate::scoring::{EmotionalBand, EmotionalReading, GeneralBand, SpiralLevel};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    fn fresh_engine(store: Arc<dyn SessionStore>) -> AssessmentEngine {
        AssessmentEngine::start(
            QuestionPools::default(),
            store,
            DEFAULT_SESSION_KEY,
            &mut rng(),
        )
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn save(&self, key: &str, _text: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk full"),
            })
        }
        fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Poisoned)
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    struct StaticSupply(Option<Vec<String>>);

    #[async_trait]
    impl QuestionSupply for StaticSupply {
        async fn request_questions(&self, _prompt: &str) -> Result<Vec<String>, SupplyError> {
            self.0
                .clone()
                .ok_or_else(|| SupplyError::Parse("offline".into()))
        }
    }

    #[test]
    fn fresh_start_persists_shuffled_session() {
        let store = Arc::new(MemoryStore::new());
        let engine = fresh_engine(store.clone());

        assert!(!engine.is_resumed());
        assert_eq!(engine.status(), SessionStatus::NotStarted);
        assert_eq!(engine.session().shuffled_order.len(), 40);
        assert_eq!(engine.session().answers.emotional, vec![false; 22]);
        assert!(store.load(DEFAULT_SESSION_KEY).unwrap().is_some());
    }

    #[test]
    fn answer_is_routed_to_its_pool_slot() {
        let mut engine = fresh_engine(Arc::new(MemoryStore::new()));
        let first = engine.current_question().cloned().unwrap();

        assert_eq!(
            engine.record_answer(true),
            AnswerOutcome::Advanced { position: 1 }
        );
        assert!(engine.session().answers.for_kind(first.set_kind)[first.index_in_set]);
        assert_eq!(engine.status(), SessionStatus::InProgress);
        assert_eq!(engine.session().answered, 1);
    }

    #[test]
    fn completion_boundary() {
        let mut engine = fresh_engine(Arc::new(MemoryStore::new()));
        let total = engine.session().shuffled_order.len();

        for _ in 0..total - 1 {
            assert!(matches!(
                engine.record_answer(false),
                AnswerOutcome::Advanced { .. }
            ));
        }
        assert_eq!(engine.record_answer(true), AnswerOutcome::Completed);
        assert!(engine.session().completed);
        assert_eq!(engine.session().current_position, total - 1);
        assert_eq!(engine.current_question(), None);

        let before = engine.session().answers.clone();
        assert_eq!(engine.record_answer(false), AnswerOutcome::Ignored);
        assert_eq!(engine.session().answers, before);
        assert_eq!(engine.session().current_position, total - 1);
        assert_eq!(engine.progress().answered, total);
    }

    #[test]
    fn resume_restores_identical_session() {
        let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
        let saved = {
            let mut engine = fresh_engine(store.clone());
            for answer in [true, false, true, true, false] {
                engine.record_answer(answer);
            }
            engine.session().clone()
        };

        // A different seed proves nothing was reshuffled.
        let engine = AssessmentEngine::start(
            QuestionPools::default(),
            store,
            DEFAULT_SESSION_KEY,
            &mut StdRng::seed_from_u64(99),
        );
        assert!(engine.is_resumed());
        assert_eq!(engine.session(), &saved);
        assert_eq!(engine.session().current_position, 5);
    }

    #[test]
    fn unreadable_stored_session_starts_fresh() {
        let store = Arc::new(MemoryStore::new());
        store.save(DEFAULT_SESSION_KEY, "{not json").unwrap();
        let engine = fresh_engine(store.clone());
        assert!(!engine.is_resumed());
        let text = store.load(DEFAULT_SESSION_KEY).unwrap().unwrap();
        assert!(serde_json::from_str::<SessionState>(&text).is_ok());
    }

    #[test]
    fn stored_session_with_other_pools_starts_fresh() {
        let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
        drop(fresh_engine(store.clone()));

        let mut pools = QuestionPools::default();
        pools.spiral[0] = "Do you mostly think about food?".into();
        let engine = AssessmentEngine::start(pools, store, DEFAULT_SESSION_KEY, &mut rng());
        assert!(!engine.is_resumed());
        assert!(engine
            .session()
            .shuffled_order
            .iter()
            .any(|q| q.text == "Do you mostly think about food?"));
    }

    #[test]
    fn resume_takes_general_pool_from_session() {
        let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
        let custom = QuestionPools::default().with_general(vec!["Do you swim?".into()]);
        drop(AssessmentEngine::start(
            custom,
            store.clone(),
            DEFAULT_SESSION_KEY,
            &mut rng(),
        ));

        let engine = fresh_engine(store);
        assert!(engine.is_resumed());
        assert_eq!(engine.pools().general, vec!["Do you swim?".to_string()]);
    }

    #[test]
    fn persistence_failures_do_not_block_progress() {
        let mut engine = fresh_engine(Arc::new(BrokenStore));
        assert!(!engine.is_resumed());
        assert!(!engine.save());
        assert!(matches!(
            engine.record_answer(true),
            AnswerOutcome::Advanced { .. }
        ));
        engine.reset(&mut rng());
        assert_eq!(engine.status(), SessionStatus::NotStarted);
    }

    #[test]
    fn reset_discards_progress() {
        let mut engine = fresh_engine(Arc::new(MemoryStore::new()));
        let old_id = engine.session().session_id;
        engine.record_answer(true);
        engine.record_answer(true);

        engine.reset(&mut StdRng::seed_from_u64(5));
        assert_ne!(engine.session().session_id, old_id);
        assert_eq!(engine.session().current_position, 0);
        assert_eq!(engine.session().answered, 0);
        assert!(engine.session().answers.spiral.iter().all(|a| !a));
        assert_eq!(engine.status(), SessionStatus::NotStarted);
    }

    #[test]
    fn all_yes_interpretation() {
        let mut engine = fresh_engine(Arc::new(MemoryStore::new()));
        while engine.record_answer(true) != AnswerOutcome::Completed {}

        let reading = engine.interpretation();
        assert_eq!(reading.spiral.levels, SpiralLevel::ALL.to_vec());
        // (1 + ... + 22) / 22 = 11.5, rounded up to 12
        assert_eq!(
            reading.emotional,
            EmotionalReading::Level {
                average: 12,
                scale_max: 22,
                band: EmotionalBand::Transitional
            }
        );
        assert_eq!(reading.general.positivity_score, 100);
        assert_eq!(reading.general.band, GeneralBand::Positive);
        assert_eq!(engine.interpretation(), reading);
    }

    #[tokio::test]
    async fn refresh_failure_keeps_general_pool() {
        let mut engine = fresh_engine(Arc::new(MemoryStore::new()));
        let before = engine.pools().general.clone();

        let outcome = engine
            .reset_with_refresh(&StaticSupply(None), "prompt", &mut rng())
            .await;
        assert!(!outcome.is_fresh());
        assert_eq!(engine.pools().general, before);
        assert_eq!(engine.session().answers.general.len(), before.len());
    }

    #[tokio::test]
    async fn refresh_success_replaces_general_pool() {
        let mut engine = fresh_engine(Arc::new(MemoryStore::new()));
        let fresh = vec!["Do you garden?".to_string(), "Do you cook?".to_string()];

        let outcome = engine
            .reset_with_refresh(&StaticSupply(Some(fresh.clone())), "prompt", &mut rng())
            .await;
        assert!(outcome.is_fresh());
        assert_eq!(engine.pools().general, fresh);
        assert_eq!(engine.session().shuffled_order.len(), 32);
        assert_eq!(engine.session().general_statements(), fresh);
    }
}
