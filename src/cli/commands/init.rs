use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::path::PathBuf;

use crate::config::{Config, ProviderConfig, ProvidersConfig};

static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");

pub async fn run(force: bool) -> Result<()> {
    println!();
    println!(
        "{}",
        style(" Article Analyzer - Initialization ").bold().reverse()
    );
    println!();

    let config_path = Config::config_path()?;

    if config_path.exists() && !force {
        println!(
            "{}Configuration already exists at {}",
            WARN,
            style(config_path.display()).cyan()
        );
        println!("  Use {} to overwrite", style("--force").yellow());
        return Ok(());
    }

    write_default_config()?;

    println!(
        "{}Created configuration at {}",
        CHECK,
        style(config_path.display()).cyan()
    );

    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();
    println!("{}Next steps:", ROCKET);
    println!();
    println!("  {}Configure your LLM provider:", KEY);
    println!("    {} article-analyzer auth", style("$").dim());
    println!();
    println!("  {}Analyze your first article:", ROCKET);
    println!("    {} article-analyzer analyze paper.pdf", style("$").dim());
    println!();

    Ok(())
}

/// Configuration written by `init`, with keys left as environment placeholders
pub fn default_config() -> Config {
    Config {
        default_provider: "openai".to_string(),
        default_model: None,
        max_tokens: 1024,
        output_dir: Some(PathBuf::from("output")),
        providers: ProvidersConfig {
            openai: Some(ProviderConfig {
                api_key: "${OPENAI_API_KEY}".to_string(),
                base_url: None,
                model: Some("gpt-4o-2024-08-06".to_string()),
            }),
            anthropic: Some(ProviderConfig {
                api_key: "${ANTHROPIC_API_KEY}".to_string(),
                base_url: None,
                model: Some("claude-sonnet-4-20250514".to_string()),
            }),
            ollama: Some(ProviderConfig {
                api_key: String::new(),
                base_url: Some("http://localhost:11434".to_string()),
                model: Some("mistral".to_string()),
            }),
            google: Some(ProviderConfig {
                api_key: "${GOOGLE_API_KEY}".to_string(),
                base_url: None,
                model: Some("gemini-2.0-flash".to_string()),
            }),
        },
    }
}

/// Write the default configuration, creating the config directory
pub fn write_default_config() -> Result<PathBuf> {
    let config_dir = Config::config_dir()?;
    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    let config_path = Config::config_path()?;
    let content = toml::to_string_pretty(&default_config())?;
    fs::write(&config_path, content).context("Failed to write config file")?;

    tracing::info!("Wrote default configuration to {}", config_path.display());
    Ok(config_path)
}
