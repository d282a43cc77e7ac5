//! Question pools: the built-in statements and TOML pool files.
//!
//! A pool file may override any of the three pools; pools it leaves out
//! fall back to the built-in statements.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PoolError;
use crate::model::SetKind;

/// Number of spiral statements, one per colour level.
pub const SPIRAL_POOL_LEN: usize = 8;

/// Number of emotional statements, one per scale level.
pub const EMOTIONAL_POOL_LEN: usize = 22;

/// Built-in spiral dynamics statements, Beige through Turquoise.
pub const SPIRAL_STATEMENTS: [&str; SPIRAL_POOL_LEN] = [
    "Do your daily actions mainly revolve around fulfilling basic survival needs (food, safety, shelter)?",
    "Do you rely on traditions, rituals, or group loyalty to maintain safety and belonging?",
    "Do you prioritize personal power and resist being controlled by others, even if it leads to conflict?",
    "Do you find purpose in adhering to a clear set of rules, traditions, or moral codes?",
    "Are achieving success, innovation, and efficiency your primary motivators?",
    "Do you prioritize community well-being, equality, and environmental sustainability over personal gain?",
    "Do you focus on understanding systems and adapting flexibly to complex challenges?",
    "Do you feel a holistic connection to all life and seek integrative solutions for global issues?",
];

/// Built-in emotional scale statements, level 1 through level 22.
pub const EMOTIONAL_STATEMENTS: [&str; EMOTIONAL_POOL_LEN] = [
    "Do you frequently experience feelings of fear, grief, depression, or despair?",
    "Do you often feel guilty about your actions or decisions?",
    "Do you struggle with feelings of insecurity in various aspects of your life?",
    "Do you find yourself feeling jealous of others' achievements or relationships?",
    "Do you experience intense feelings of hatred or rage toward certain people or situations?",
    "Do you have thoughts of revenge when someone wrongs you?",
    "Do you frequently feel angry about circumstances in your life?",
    "Do you often feel discouraged about your future prospects?",
    "Do you tend to blame others for problems in your life?",
    "Do you worry excessively about potential future problems?",
    "Do you frequently doubt your abilities or decisions?",
    "Do you often feel disappointed with outcomes in your life?",
    "Do you feel overwhelmed by responsibilities or expectations?",
    "Do you experience frequent frustration, irritation, or impatience?",
    "Do you tend to see the negative aspects of situations first?",
    "Do you often feel bored or disengaged with daily activities?",
    "Do you generally feel content with your current life situation?",
    "Do you maintain hope even during challenging circumstances?",
    "Do you typically maintain an optimistic outlook on life?",
    "Do you frequently experience enthusiasm, eagerness, or happiness?",
    "Do you feel passionate about your work, relationships, or interests?",
    "Do you regularly experience joy, empowerment, freedom, love, or appreciation?",
];

/// Built-in general statements, used until a provider refresh replaces them.
pub const GENERAL_STATEMENTS: [&str; 10] = [
    "Do you feel connected to a larger purpose in life?",
    "Do you often find yourself thinking about the future?",
    "Do you prioritize harmony in your relationships?",
    "Do you feel energized when solving complex problems?",
    "Do you often experience a sense of wonder about the world?",
    "Do you feel that your emotional state affects your daily decisions?",
    "Do you find it easy to adapt to new situations?",
    "Do you prefer structured environments with clear rules?",
    "Do you feel that your current life aligns with your values?",
    "Do you often feel a sense of gratitude for what you have?",
];

/// The three question pools an assessment draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPools {
    pub spiral: Vec<String>,
    pub emotional: Vec<String>,
    pub general: Vec<String>,
}

impl Default for QuestionPools {
    fn default() -> Self {
        Self {
            spiral: to_owned(&SPIRAL_STATEMENTS),
            emotional: to_owned(&EMOTIONAL_STATEMENTS),
            general: to_owned(&GENERAL_STATEMENTS),
        }
    }
}

fn to_owned(statements: &[&str]) -> Vec<String> {
    statements.iter().map(|s| s.to_string()).collect()
}

impl QuestionPools {
    /// Build pools, rejecting them if they break the pool shape rules.
    pub fn new(
        spiral: Vec<String>,
        emotional: Vec<String>,
        general: Vec<String>,
    ) -> Result<Self, PoolError> {
        let pools = Self {
            spiral,
            emotional,
            general,
        };
        match validate_pools(&pools).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(pools),
        }
    }

    pub fn for_kind(&self, kind: SetKind) -> &[String] {
        match kind {
            SetKind::Spiral => &self.spiral,
            SetKind::Emotional => &self.emotional,
            SetKind::General => &self.general,
        }
    }

    /// Total number of questions across all pools.
    pub fn total(&self) -> usize {
        self.spiral.len() + self.emotional.len() + self.general.len()
    }

    /// Replace the general pool wholesale.
    pub fn with_general(mut self, general: Vec<String>) -> Self {
        self.general = general;
        self
    }
}

/// Check pool shapes: 8 spiral, 22 emotional, at least one general
/// statement, and no blank statements anywhere.
pub fn validate_pools(pools: &QuestionPools) -> Vec<PoolError> {
    let mut errors = Vec::new();

    if pools.spiral.len() != SPIRAL_POOL_LEN {
        errors.push(PoolError::SpiralLength {
            expected: SPIRAL_POOL_LEN,
            found: pools.spiral.len(),
        });
    }
    if pools.emotional.len() != EMOTIONAL_POOL_LEN {
        errors.push(PoolError::EmotionalLength {
            expected: EMOTIONAL_POOL_LEN,
            found: pools.emotional.len(),
        });
    }
    if pools.general.is_empty() {
        errors.push(PoolError::EmptyGeneral);
    }

    for (pool, statements) in [
        ("spiral", &pools.spiral),
        ("emotional", &pools.emotional),
        ("general", &pools.general),
    ] {
        for (index, statement) in statements.iter().enumerate() {
            if statement.trim().is_empty() {
                errors.push(PoolError::BlankStatement { pool, index });
            }
        }
    }

    errors
}

/// Intermediate TOML structure for pool files.
#[derive(Debug, Deserialize)]
struct TomlPoolFile {
    pools: TomlPools,
}

#[derive(Debug, Deserialize)]
struct TomlPools {
    #[serde(default)]
    spiral: Option<Vec<String>>,
    #[serde(default)]
    emotional: Option<Vec<String>>,
    #[serde(default)]
    general: Option<Vec<String>>,
}

/// Parse a pool file from disk.
pub fn load_pools(path: &Path) -> Result<QuestionPools> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pool file: {}", path.display()))?;

    parse_pools_str(&content, path)
}

/// Parse a TOML string into pools (useful for testing).
pub fn parse_pools_str(content: &str, source_path: &Path) -> Result<QuestionPools> {
    let parsed: TomlPoolFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let defaults = QuestionPools::default();
    let trim_all = |statements: Vec<String>| -> Vec<String> {
        statements.into_iter().map(|s| s.trim().to_string()).collect()
    };

    QuestionPools::new(
        parsed.pools.spiral.map(trim_all).unwrap_or(defaults.spiral),
        parsed
            .pools
            .emotional
            .map(trim_all)
            .unwrap_or(defaults.emotional),
        parsed.pools.general.map(trim_all).unwrap_or(defaults.general),
    )
    .with_context(|| format!("invalid pools in {}", source_path.display()))
}

/// Load pools from an optional file, falling back to the built-ins.
pub fn load_pools_or_default(path: Option<&Path>) -> Result<QuestionPools> {
    match path {
        Some(p) => load_pools(p),
        None => Ok(QuestionPools::default()),
    }
}
