//! The `qadrill chat` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use qadrill_core::chat::{ChatSession, PromptCatalog};
use qadrill_providers::config::load_config_from;

pub async fn execute(
    category: Option<String>,
    email: String,
    model_override: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    super::login(&config, &email)?;

    let catalog = PromptCatalog::new(config.categories.clone());
    if catalog.categories().is_empty() {
        anyhow::bail!("chat unavailable: no categories configured");
    }

    let Some(category) = category else {
        println!("Available categories:");
        for name in catalog.categories() {
            println!("  {name}");
        }
        return Ok(());
    };

    let Some(system_prompt) = catalog.get(&category) else {
        anyhow::bail!(
            "unknown category '{}'. Available: {:?}",
            category,
            catalog.categories()
        );
    };

    let (model, client) = super::select_backend(&config, model_override.as_deref())?;
    let mut session = ChatSession::new(client, model, &category, system_prompt);

    println!("Chatting in category '{category}'. Empty line or 'exit' to quit.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() || input == "exit" || input == "quit" {
            break;
        }

        match session.ask(input).await {
            Ok(reply) => println!("{reply}\n"),
            Err(e) => eprintln!("chat request failed: {e:#}\n"),
        }
    }

    Ok(())
}
