use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::io::{self, Write};
use std::time::Duration;

use crate::cli::LlmProvider;
use crate::config::Config;

use super::init::write_default_config;

static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[X] ");
static ROBOT: Emoji<'_, '_> = Emoji("🤖 ", "");

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

pub async fn run(provider: Option<LlmProvider>, key: Option<String>, list: bool) -> Result<()> {
    println!();
    println!(
        "{}",
        style(" Article Analyzer - Authentication ").bold().reverse()
    );
    println!();

    if list {
        return list_providers().await;
    }

    let provider = match provider {
        Some(p) => p,
        None => select_provider()?,
    };

    let api_key = match key {
        Some(k) => k.trim().to_string(),
        None => prompt_api_key(provider)?,
    };

    if api_key.is_empty() {
        if provider.requires_api_key() {
            anyhow::bail!("API key cannot be empty");
        }
        return Ok(());
    }

    save_api_key(provider, &api_key)?;

    println!();
    println!(
        "{}API key for {} configured successfully!",
        CHECK,
        style(provider.display_name()).cyan().bold()
    );

    Ok(())
}

async fn list_providers() -> Result<()> {
    println!("{}Configured LLM Providers", ROBOT);
    println!();

    let config = Config::load_or_default()?;

    for provider in [
        LlmProvider::OpenAI,
        LlmProvider::Anthropic,
        LlmProvider::Google,
        LlmProvider::Ollama,
    ] {
        let (configured, detail) = if provider.requires_api_key() {
            check_provider_status(&config, provider)
        } else {
            check_ollama_status(&config).await
        };

        let status_icon = if configured { CHECK } else { CROSS };
        let status_text = if configured {
            style("Configured").green()
        } else {
            style("Not configured").red()
        };

        println!(
            "  {}{:<12} {} {}",
            status_icon,
            provider.display_name(),
            status_text,
            style(detail).dim()
        );
    }

    println!();
    println!("{}Set API keys with:", KEY);
    println!(
        "  {} article-analyzer auth --provider <name>",
        style("$").dim()
    );
    println!();
    println!("Or set environment variables:");
    println!("  {} export OPENAI_API_KEY=your-key", style("$").dim());
    println!("  {} export ANTHROPIC_API_KEY=your-key", style("$").dim());
    println!("  {} export GOOGLE_API_KEY=your-key", style("$").dim());

    Ok(())
}

fn check_provider_status(config: &Config, provider: LlmProvider) -> (bool, String) {
    let from_config = config
        .get_provider(provider)
        .is_some_and(|p| !p.api_key.trim().is_empty() && !p.api_key.starts_with("${"));
    if from_config {
        return (true, "(from config)".to_string());
    }

    let from_env = provider
        .env_vars()
        .iter()
        .find(|var| std::env::var(var).is_ok_and(|v| !v.trim().is_empty()));
    match from_env {
        Some(var) => (true, format!("(from {var})")),
        None => (false, String::new()),
    }
}

async fn check_ollama_status(config: &Config) -> (bool, String) {
    let base_url = config
        .base_url(LlmProvider::Ollama)
        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build();

    if let Ok(client) = client
        && let Ok(resp) = client.get(format!("{base_url}/api/tags")).send().await
        && resp.status().is_success()
    {
        return (true, format!("(running at {base_url})"));
    }

    (false, format!("(not running at {base_url})"))
}

fn select_provider() -> Result<LlmProvider> {
    println!("Select LLM Provider:");
    println!();
    println!("  {} OpenAI (GPT-4o)", style("1.").cyan());
    println!("  {} Anthropic (Claude)", style("2.").cyan());
    println!("  {} Google (Gemini)", style("3.").cyan());
    println!("  {} Ollama (Local - Free)", style("4.").cyan());
    println!();

    print!("{} Enter choice [1-4]: ", style("?").green().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    match input.trim() {
        "1" => Ok(LlmProvider::OpenAI),
        "2" => Ok(LlmProvider::Anthropic),
        "3" => Ok(LlmProvider::Google),
        "4" => Ok(LlmProvider::Ollama),
        other => anyhow::bail!("Invalid choice: {other:?}"),
    }
}

fn prompt_api_key(provider: LlmProvider) -> Result<String> {
    if !provider.requires_api_key() {
        println!();
        println!("  {} Ollama doesn't require an API key.", style("ℹ").blue());
        println!(
            "  Make sure Ollama is running: {} ollama serve",
            style("$").dim()
        );
        return Ok(String::new());
    }

    print!(
        "{} Enter your {} API key: ",
        style("?").green().bold(),
        provider.display_name()
    );
    io::stdout().flush()?;

    let mut api_key = String::new();
    io::stdin().read_line(&mut api_key)?;
    let api_key = api_key.trim().to_string();

    let expected_prefix = match provider {
        LlmProvider::Anthropic => Some("sk-ant-"),
        LlmProvider::OpenAI => Some("sk-"),
        _ => None,
    };
    if let Some(prefix) = expected_prefix
        && !api_key.is_empty()
        && !api_key.starts_with(prefix)
    {
        println!(
            "  {}",
            style(format!(
                "Warning: {} API keys typically start with '{prefix}'",
                provider.display_name()
            ))
            .yellow()
        );
    }

    Ok(api_key)
}

fn save_api_key(provider: LlmProvider, api_key: &str) -> Result<()> {
    let config_path = Config::config_path()?;
    if !config_path.exists() {
        write_default_config()?;
    }

    let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
    let updated = set_api_key(&content, provider, api_key);
    fs::write(&config_path, updated).context("Failed to write config file")?;

    tracing::info!("Stored {} API key in {}", provider, config_path.display());
    Ok(())
}

/// Set `api_key` inside `[providers.<provider>]`, adding the line or the
/// section when missing. Other lines are left untouched.
fn set_api_key(content: &str, provider: LlmProvider, api_key: &str) -> String {
    let header = format!("[providers.{provider}]");
    let key_line = format!("api_key = {}", toml::Value::String(api_key.to_string()));

    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    let mut in_section = false;
    let mut section_at = None;
    let mut key_updated = false;

    for (i, line) in lines.iter_mut().enumerate() {
        if line.trim_start().starts_with('[') {
            in_section = line.trim() == header;
            if in_section {
                section_at = Some(i);
            }
        } else if in_section && line.trim_start().starts_with("api_key") {
            *line = key_line.clone();
            key_updated = true;
        }
    }

    if !key_updated {
        match section_at {
            Some(i) => lines.insert(i + 1, key_line),
            None => {
                lines.push(String::new());
                lines.push(header);
                lines.push(key_line);
            }
        }
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    updated
}
