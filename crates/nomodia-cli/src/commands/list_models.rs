//! The `nomodia list-models` command.

use anyhow::Result;

use nomodia_providers::create_provider;

use super::GlobalArgs;

pub fn execute(global: &GlobalArgs, provider_filter: Option<String>) -> Result<()> {
    let config = global.load_config()?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;

    for name in names {
        if let Some(filter) = &provider_filter {
            if name != filter {
                continue;
            }
        }

        let provider = match create_provider(name, &config.providers[name]) {
            Ok(provider) => provider,
            Err(e) => {
                println!("Provider: {name} (skipped: {e})\n");
                continue;
            }
        };
        let models = provider.available_models();

        if !models.is_empty() {
            found_any = true;
            let marker = if *name == config.default_provider { " (default)" } else { "" };
            println!("Provider: {name}{marker}");
            for model in &models {
                println!(
                    "  {} ({}, {}K context)",
                    model.id,
                    model.name,
                    model.max_context / 1000,
                );
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `nomodia init` to create a config file.");
    }

    Ok(())
}
