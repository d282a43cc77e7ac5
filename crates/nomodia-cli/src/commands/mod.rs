//! Subcommand implementations and the setup they share.

pub mod answer;
pub mod init;
pub mod list_models;
pub mod reset;
pub mod results;
pub mod status;
pub mod take;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use nomodia_core::model::Question;
use nomodia_core::pools::load_pools_or_default;
use nomodia_core::store::JsonFileStore;
use nomodia_core::AssessmentEngine;
use nomodia_providers::config::load_config_from;
use nomodia_providers::NomodiaConfig;

/// Options accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file path (default: ./nomodia.toml, then ~/.config/nomodia/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding saved progress (overrides `store_dir`)
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Question pool file (overrides `pools_file`)
    #[arg(long, global = true)]
    pub pools: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> Result<NomodiaConfig> {
        load_config_from(self.config.as_deref())
    }
}

/// Load config and pools, then resume or start the stored session.
pub fn open_engine(global: &GlobalArgs) -> Result<(NomodiaConfig, AssessmentEngine)> {
    let config = global.load_config()?;

    let pools_path = global.pools.clone().or_else(|| config.pools_file.clone());
    let pools = load_pools_or_default(pools_path.as_deref())
        .context("failed to load question pools")?;

    let store_dir = global
        .store_dir
        .clone()
        .unwrap_or_else(|| config.store_dir.clone());
    tracing::debug!(store_dir = %store_dir.display(), pools = ?pools_path, "opening session");
    let store = Arc::new(JsonFileStore::new(store_dir));

    let engine = AssessmentEngine::start(pools, store, config.session_key.clone(), &mut rand::rng());
    Ok((config, engine))
}

/// "Question 3 of 40: Do you ...?"
pub fn describe_question(question: &Question, number: usize, total: usize) -> String {
    format!("Question {number} of {total}: {}", question.text)
}

/// Print the current question of `engine`, or a completion notice.
pub fn print_current(engine: &AssessmentEngine) {
    let progress = engine.progress();
    match (engine.current_question(), progress.current_number) {
        (Some(question), Some(number)) => {
            println!("{}", describe_question(question, number, progress.total))
        }
        _ => println!("Assessment complete. Run `nomodia results` to see your results."),
    }
}
