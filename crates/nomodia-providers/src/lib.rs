//! nomodia-providers: Generative question providers.
//!
//! Implements the `LlmProvider` trait for Gemini, Anthropic, and
//! OpenAI-compatible APIs, and adapts any provider into the engine's
//! `QuestionSupply` so the general pool can be refreshed.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod supply;

pub use config::{create_provider, load_config, load_config_from, NomodiaConfig, ProviderConfig};
pub use error::ProviderError;
pub use supply::ProviderQuestionSupply;
