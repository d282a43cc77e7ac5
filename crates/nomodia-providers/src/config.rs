//! Configuration loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use nomodia_core::traits::LlmProvider;
use nomodia_core::DEFAULT_SESSION_KEY;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single generative provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
}

impl ProviderConfig {
    pub fn api_key(&self) -> &str {
        match self {
            ProviderConfig::Gemini { api_key, .. }
            | ProviderConfig::Anthropic { api_key, .. }
            | ProviderConfig::OpenAI { api_key, .. } => api_key,
        }
    }

    fn api_key_mut(&mut self) -> &mut String {
        match self {
            ProviderConfig::Gemini { api_key, .. }
            | ProviderConfig::Anthropic { api_key, .. }
            | ProviderConfig::OpenAI { api_key, .. } => api_key,
        }
    }

    /// An entry of the given `type` with an empty key.
    fn empty(kind: &str) -> Option<Self> {
        match kind {
            "gemini" => Some(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            }),
            "anthropic" => Some(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            }),
            "openai" => Some(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            }),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::Gemini { .. } => "gemini",
            ProviderConfig::Anthropic { .. } => "anthropic",
            ProviderConfig::OpenAI { .. } => "openai",
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini { base_url, .. } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Anthropic { base_url, .. } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                base_url, org_id, ..
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
        }
    }
}

/// Top-level nomodia configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NomodiaConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used to refresh the general pool.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used to refresh the general pool.
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Number of general statements to request on refresh.
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    /// Directory holding persisted sessions.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Key the session is stored under.
    #[serde(default = "default_session_key")]
    pub session_key: String,
    /// Optional TOML pool file replacing the built-in statements.
    #[serde(default)]
    pub pools_file: Option<PathBuf>,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_question_count() -> usize {
    10
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("./nomodia-data")
}
fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

impl Default for NomodiaConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            question_count: default_question_count(),
            store_dir: default_store_dir(),
            session_key: default_session_key(),
            pools_file: None,
        }
    }
}

impl NomodiaConfig {
    /// Look up a provider by name, falling back to `default_provider`.
    pub fn provider(&self, name: Option<&str>) -> Result<(&str, &ProviderConfig)> {
        let name = name.unwrap_or(&self.default_provider);
        let (key, config) = self.providers.get_key_value(name).with_context(|| {
            format!("provider '{name}' is not configured (add a [providers.{name}] section)")
        })?;
        Ok((key.as_str(), config))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
    }
}

/// Environment variables that override provider keys, by provider type.
const KEY_OVERRIDES: [(&str, &str); 3] = [
    ("gemini", "NOMODIA_GEMINI_KEY"),
    ("anthropic", "NOMODIA_ANTHROPIC_KEY"),
    ("openai", "NOMODIA_OPENAI_KEY"),
];

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `nomodia.toml` in the current directory
/// 2. `~/.config/nomodia/config.toml`
///
/// Environment variable overrides: `NOMODIA_GEMINI_KEY`, `NOMODIA_ANTHROPIC_KEY`,
/// `NOMODIA_OPENAI_KEY`.
pub fn load_config() -> Result<NomodiaConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<NomodiaConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("nomodia.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => NomodiaConfig::default(),
    };

    Ok(apply_env(config, |var| std::env::var(var).ok()))
}

/// Parse a config document without touching the environment.
pub fn parse_config_str(content: &str) -> Result<NomodiaConfig> {
    Ok(toml::from_str::<NomodiaConfig>(content)?)
}

/// Apply key overrides and `${VAR}` expansion. `lookup` reads one variable.
fn apply_env(
    mut config: NomodiaConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> NomodiaConfig {
    for (kind, var) in KEY_OVERRIDES {
        let Some(key) = lookup(var) else {
            continue;
        };
        // Prefer an entry of this type under any name; otherwise create one named after the type.
        let existing = config
            .providers
            .iter()
            .find(|(_, p)| p.kind() == kind)
            .map(|(name, _)| name.clone());
        let name = existing.unwrap_or_else(|| kind.to_string());
        if !config.providers.contains_key(&name) {
            if let Some(empty) = ProviderConfig::empty(kind) {
                config.providers.insert(name.clone(), empty);
            }
        }
        if let Some(provider) = config.providers.get_mut(&name) {
            *provider.api_key_mut() = key;
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("nomodia"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    if config.api_key().trim().is_empty() {
        anyhow::bail!(
            "provider '{name}' has no API key; set it in nomodia.toml or via NOMODIA_{}_KEY",
            config.kind().to_uppercase()
        );
    }

    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Ok(Box::new(GeminiProvider::new(api_key, base_url.clone())))
        }
        ProviderConfig::Anthropic { api_key, base_url } => {
            Ok(Box::new(AnthropicProvider::new(api_key, base_url.clone())))
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_NOMODIA_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_NOMODIA_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_NOMODIA_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${UNTERMINATED"), "${UNTERMINATED");
        std::env::remove_var("_NOMODIA_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = NomodiaConfig::default();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.default_model, "gemini-2.0-flash");
        assert_eq!(config.question_count, 10);
        assert_eq!(config.session_key, "assessment-progress");
        assert_eq!(config.store_dir, PathBuf::from("./nomodia-data"));
        assert!(config.pools_file.is_none());
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "claude"
question_count = 5
pools_file = "pools/default.toml"

[providers.gemini]
type = "gemini"
api_key = "g-test"

[providers.claude]
type = "anthropic"
api_key = "sk-test"

[providers.openai]
type = "openai"
api_key = "sk-openai"
org_id = "org-1"
"#;
        let config = parse_config_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.question_count, 5);
        assert_eq!(config.pools_file, Some(PathBuf::from("pools/default.toml")));
        let (name, provider) = config.provider(None).unwrap();
        assert_eq!(name, "claude");
        assert!(matches!(provider, ProviderConfig::Anthropic { .. }));
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let config = NomodiaConfig::default();
        let err = config.provider(Some("nope")).unwrap_err();
        assert!(err.to_string().contains("provider 'nope' is not configured"));
    }

    #[test]
    fn debug_masks_keys() {
        let config = ProviderConfig::Gemini {
            api_key: "super-secret".into(),
            base_url: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn env_key_overrides_existing_entry_of_same_type() {
        let config = parse_config_str(
            r#"
[providers.google]
type = "gemini"
api_key = "from-file"
"#,
        )
        .unwrap();
        let config = apply_env(config, |var| {
            (var == "NOMODIA_GEMINI_KEY").then(|| "from-env".to_string())
        });
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers["google"].api_key(), "from-env");
    }

    #[test]
    fn env_key_creates_missing_entry() {
        let config = apply_env(NomodiaConfig::default(), |var| {
            (var == "NOMODIA_OPENAI_KEY").then(|| "sk-env".to_string())
        });
        assert!(matches!(
            config.providers.get("openai"),
            Some(ProviderConfig::OpenAI { api_key, .. }) if api_key == "sk-env"
        ));
    }

    #[test]
    fn create_provider_requires_key() {
        let config = ProviderConfig::Gemini {
            api_key: String::new(),
            base_url: None,
        };
        let err = create_provider("gemini", &config).err().unwrap();
        assert!(err.to_string().contains("NOMODIA_GEMINI_KEY"));

        let config = ProviderConfig::Gemini {
            api_key: "k".into(),
            base_url: None,
        };
        assert_eq!(create_provider("gemini", &config).unwrap().name(), "gemini");
    }
}
