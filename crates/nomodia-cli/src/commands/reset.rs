//! The `nomodia reset` command.

use std::sync::Arc;

use anyhow::Result;

use nomodia_core::supply::general_questions_prompt;
use nomodia_core::SupplyOutcome;
use nomodia_providers::{create_provider, NomodiaConfig, ProviderQuestionSupply};

use super::{open_engine, print_current, GlobalArgs};

pub async fn execute(
    global: &GlobalArgs,
    refresh: bool,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let (config, mut engine) = open_engine(global)?;
    let mut rng = rand::rng();

    if !refresh {
        engine.reset(&mut rng);
        println!("Progress cleared. A new shuffled assessment is ready.");
        print_current(&engine);
        return Ok(());
    }

    match build_supply(&config, provider.as_deref(), model) {
        Ok(supply) => {
            println!(
                "Requesting {} general questions from {} ({})...",
                config.question_count,
                supply.provider_name(),
                supply.model()
            );
            let prompt = general_questions_prompt(config.question_count);
            match engine.reset_with_refresh(&supply, &prompt, &mut rng).await {
                SupplyOutcome::Fresh { questions } => {
                    println!("Loaded {} fresh general questions.", questions.len())
                }
                SupplyOutcome::Fallback { reason } => println!(
                    "Could not refresh general questions ({reason}); keeping the previous set."
                ),
            }
        }
        Err(e) => {
            println!("Could not refresh general questions ({e:#}); keeping the previous set.");
            engine.reset(&mut rng);
        }
    }

    println!("Progress cleared. A new shuffled assessment is ready.");
    print_current(&engine);
    Ok(())
}

fn build_supply(
    config: &NomodiaConfig,
    provider: Option<&str>,
    model: Option<String>,
) -> Result<ProviderQuestionSupply> {
    let (name, provider_config) = config.provider(provider)?;
    let provider = create_provider(name, provider_config)?;

    Ok(
        ProviderQuestionSupply::new(
            Arc::from(provider),
            model.unwrap_or_else(|| config.default_model.clone()),
        )
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.max_tokens)
        .with_question_limit(config.question_count),
    )
}
