//! The `nomodia init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create nomodia.toml
    if std::path::Path::new("nomodia.toml").exists() {
        println!("nomodia.toml already exists, skipping.");
    } else {
        std::fs::write("nomodia.toml", SAMPLE_CONFIG)?;
        println!("Created nomodia.toml");
    }

    // Create starter pool file
    std::fs::create_dir_all("pools")?;
    let pools_path = std::path::Path::new("pools/default.toml");
    if pools_path.exists() {
        println!("pools/default.toml already exists, skipping.");
    } else {
        std::fs::write(pools_path, SAMPLE_POOLS)?;
        println!("Created pools/default.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set NOMODIA_GEMINI_KEY (or edit nomodia.toml) to enable question refresh");
    println!("  2. Run: nomodia validate --pools pools/default.toml");
    println!("  3. Run: nomodia take");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# nomodia configuration

default_provider = "gemini"
default_model = "gemini-2.0-flash"
default_temperature = 0.7
max_tokens = 1024
question_count = 10
store_dir = "./nomodia-data"
session_key = "assessment-progress"
pools_file = "pools/default.toml"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;

const SAMPLE_POOLS: &str = r#"# Question pools.
#
# `spiral` (exactly 8 statements, Beige through Turquoise) and `emotional`
# (exactly 22 statements, level 1 through 22) fall back to the built-in
# statements when omitted. `general` needs at least one statement and is
# replaced by `nomodia reset --refresh`.

[pools]
general = [
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
]
"#;
