//! Adapter from a generative provider to the engine's question supply.

use std::sync::Arc;

use async_trait::async_trait;

use nomodia_core::error::{ProviderError, SupplyError};
use nomodia_core::supply::parse_question_list;
use nomodia_core::traits::{GenerateRequest, LlmProvider, QuestionSupply};

const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Asks an [`LlmProvider`] for statements and parses the JSON list it returns.
pub struct ProviderQuestionSupply {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    /// Longer lists are cut down to this many statements.
    question_limit: Option<usize>,
}

impl ProviderQuestionSupply {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            question_limit: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Keep at most `limit` statements from each response.
    pub fn with_question_limit(mut self, limit: usize) -> Self {
        self.question_limit = Some(limit);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl QuestionSupply for ProviderQuestionSupply {
    async fn request_questions(&self, prompt: &str) -> Result<Vec<String>, SupplyError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system_prompt: None,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!(
            provider = self.provider.name(),
            model = %self.model,
            "requesting general questions"
        );

        let response = self
            .provider
            .generate(&request)
            .await
            .map_err(|e| SupplyError::Provider(classify(e)))?;

        let mut questions = parse_question_list(&response.content)?;
        if let Some(limit) = self.question_limit {
            if questions.len() > limit {
                tracing::warn!(
                    received = questions.len(),
                    limit,
                    "provider returned more questions than requested, truncating"
                );
                questions.truncate(limit);
            }
        }
        Ok(questions)
    }
}

/// Annotate provider failures that retrying soon will not fix.
fn classify(err: anyhow::Error) -> anyhow::Error {
    let note = match err.downcast_ref::<ProviderError>() {
        Some(e) if e.is_permanent() => {
            Some("permanent failure, check the provider configuration".to_string())
        }
        Some(e) => e
            .retry_after_ms()
            .map(|ms| format!("provider asked to wait {}s before retrying", ms.div_ceil(1000))),
        None => None,
    };
    match note {
        Some(note) => err.context(note),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiProvider;
    use crate::mock::MockProvider;
    use nomodia_core::supply::{fetch_general_questions, general_questions_prompt};
    use nomodia_core::SupplyOutcome;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_fenced_provider_output() {
        let mock = Arc::new(MockProvider::with_fixed_response(
            "```json\n[\"Do you value tradition?\", \"Do you seek adventure?\"]\n```",
        ));
        let supply = ProviderQuestionSupply::new(mock.clone(), "mock-model")
            .with_temperature(0.2)
            .with_max_tokens(256);

        let questions = supply.request_questions("prompt").await.unwrap();
        assert_eq!(
            questions,
            vec!["Do you value tradition?", "Do you seek adventure?"]
        );

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.model, "mock-model");
        assert_eq!(sent.max_tokens, 256);
        assert_eq!(sent.temperature, 0.2);
        assert_eq!(supply.provider_name(), "mock");
    }

    #[tokio::test]
    async fn provider_failure_is_supply_error() {
        let supply =
            ProviderQuestionSupply::new(Arc::new(MockProvider::failing("down")), "mock-model");
        let err = supply.request_questions("prompt").await.unwrap_err();
        assert!(matches!(err, SupplyError::Provider(_)));
        assert!(err.to_string().contains("down"));
    }

    #[tokio::test]
    async fn long_lists_are_truncated_to_limit() {
        let mock = Arc::new(MockProvider::with_fixed_response(
            "[\"One?\", \"Two?\", \"Three?\", \"Four?\"]",
        ));
        let supply = ProviderQuestionSupply::new(mock, "mock-model").with_question_limit(2);
        let questions = supply.request_questions("prompt").await.unwrap();
        assert_eq!(questions, vec!["One?", "Two?"]);
    }

    #[tokio::test]
    async fn short_lists_are_kept_under_limit() {
        let mock = Arc::new(MockProvider::with_fixed_response("[\"Only?\"]"));
        let supply = ProviderQuestionSupply::new(mock, "mock-model").with_question_limit(10);
        assert_eq!(supply.request_questions("prompt").await.unwrap(), vec!["Only?"]);
    }

    #[tokio::test]
    async fn rate_limit_reason_names_the_wait() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
            .mount(&server)
            .await;

        let provider = Arc::new(GeminiProvider::new("k", Some(server.uri())));
        let supply = ProviderQuestionSupply::new(provider, "gemini-2.0-flash");
        let outcome = fetch_general_questions(&supply, "prompt").await;
        match outcome {
            SupplyOutcome::Fallback { reason } => {
                assert!(reason.contains("wait 30s before retrying"), "{reason}");
                assert!(reason.contains("rate limited"), "{reason}");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_key_reason_is_marked_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let provider = Arc::new(GeminiProvider::new("k", Some(server.uri())));
        let supply = ProviderQuestionSupply::new(provider, "gemini-2.0-flash");
        let err = supply.request_questions("prompt").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("permanent failure"), "{message}");
        assert!(message.contains("authentication failed"), "{message}");
    }

    #[tokio::test]
    async fn transient_failure_is_not_annotated() {
        let supply =
            ProviderQuestionSupply::new(Arc::new(MockProvider::failing("busy")), "mock-model");
        let message = supply.request_questions("prompt").await.unwrap_err().to_string();
        assert!(!message.contains("permanent"), "{message}");
        assert!(!message.contains("before retrying"), "{message}");
    }

    #[tokio::test]
    async fn unparseable_output_is_parse_error() {
        let supply = ProviderQuestionSupply::new(
            Arc::new(MockProvider::with_fixed_response("I'd rather not.")),
            "mock-model",
        );
        let err = supply.request_questions("prompt").await.unwrap_err();
        assert!(matches!(err, SupplyError::Parse(_)));
    }

    #[tokio::test]
    async fn gemini_end_to_end_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "[\"Do you forgive easily?\"]"}]}}]
            })))
            .mount(&server)
            .await;

        let provider = Arc::new(GeminiProvider::new("k", Some(server.uri())));
        let supply = ProviderQuestionSupply::new(provider, "gemini-2.0-flash");
        let outcome = fetch_general_questions(&supply, &general_questions_prompt(1)).await;
        assert_eq!(
            outcome,
            SupplyOutcome::Fresh {
                questions: vec!["Do you forgive easily?".into()]
            }
        );
    }

    #[tokio::test]
    async fn gemini_outage_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = Arc::new(GeminiProvider::new("k", Some(server.uri())));
        let supply = ProviderQuestionSupply::new(provider, "gemini-2.0-flash");
        let outcome = fetch_general_questions(&supply, "prompt").await;
        match outcome {
            SupplyOutcome::Fallback { reason } => assert!(reason.contains("overloaded")),
            other => panic!("expected fallback, got {other:?}"),
        }
    }
}
