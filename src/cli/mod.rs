pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "article-analyzer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Structured LLM analysis of scientific articles from PDF", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Configure API keys for LLM providers
    #[command(long_about = "Configure API keys for LLM providers.\n\n\
        Supported providers: openai, anthropic, google, ollama.\n\
        The OpenAI provider works with any OpenAI-compatible API when a custom\n\
        base_url is set in the config file.\n\n\
        Keys may also come from the environment: OPENAI_API_KEY, ANTHROPIC_API_KEY,\n\
        GOOGLE_API_KEY (or GEMINI_API_KEY).")]
    Auth {
        /// Provider to configure (openai, anthropic, google, ollama)
        #[arg(short, long)]
        provider: Option<LlmProvider>,

        /// Set API key directly (alternative to interactive prompt)
        #[arg(short, long)]
        key: Option<String>,

        /// List configured providers and their status
        #[arg(long, default_value = "false")]
        list: bool,
    },

    /// Run the full ten-section analysis of a PDF article
    Analyze {
        /// Path to the PDF article
        #[arg(required = true)]
        path: PathBuf,

        #[command(flatten)]
        model: ModelArgs,

        /// Write the report to this file when the run finishes
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(short, long, default_value = "text")]
        format: ExportFormat,

        /// Print progress and results to the console instead of the interactive view
        #[arg(long, default_value = "false")]
        plain: bool,
    },

    /// Ask a single custom question about a PDF article
    Ask {
        /// Path to the PDF article
        #[arg(required = true)]
        path: PathBuf,

        /// Instruction sent to the model alongside the article text
        #[arg(required = true)]
        instruction: String,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// List the analysis sections and their instructions
    Sections,

    /// Show page count, size and extractable text of a PDF
    Info {
        /// Path to the PDF article
        #[arg(required = true)]
        path: PathBuf,
    },
}

/// Provider and model selection shared by commands that call the LLM
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// LLM provider (openai, anthropic, google, ollama)
    #[arg(short, long, env = "ANALYZER_PROVIDER")]
    pub provider: Option<LlmProvider>,

    /// Model name (provider-specific, e.g. gpt-4o-2024-08-06, claude-sonnet-4-20250514)
    #[arg(short, long, env = "ANALYZER_MODEL")]
    pub model: Option<String>,

    /// Maximum tokens per section response
    #[arg(long, env = "ANALYZER_MAX_TOKENS")]
    pub max_tokens: Option<u32>,

    /// API key for this run only (overrides config and environment)
    #[arg(long, hide_env_values = true, env = "ANALYZER_API_KEY")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LlmProvider {
    #[default]
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
    Google,
}

impl LlmProvider {
    /// Human-readable provider name used in messages
    pub fn display_name(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::Ollama => "Ollama",
            LlmProvider::Google => "Google",
        }
    }

    /// Environment variables that may hold this provider's key, in lookup order
    pub fn env_vars(self) -> &'static [&'static str] {
        match self {
            LlmProvider::OpenAI => &["OPENAI_API_KEY"],
            LlmProvider::Anthropic => &["ANTHROPIC_API_KEY"],
            LlmProvider::Google => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            LlmProvider::Ollama => &[],
        }
    }

    pub fn requires_api_key(self) -> bool {
        !matches!(self, LlmProvider::Ollama)
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "gpt-4o-2024-08-06",
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::Ollama => "mistral",
            LlmProvider::Google => "gemini-2.0-flash",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::OpenAI => write!(f, "openai"),
            LlmProvider::Anthropic => write!(f, "anthropic"),
            LlmProvider::Ollama => write!(f, "ollama"),
            LlmProvider::Google => write!(f, "google"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}
