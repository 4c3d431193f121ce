use std::path::PathBuf;

use thiserror::Error;

use crate::analysis::AnalysisReport;

/// Problems with the configuration of a run, detected before any work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{provider} API key is missing. Set {env_var} or run 'article-analyzer auth'.")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("max_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failures while turning a PDF into article text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a PDF file: {}", .0.display())]
    NotPdf(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse PDF {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("PDF contains no extractable text (it may be a scanned image): {}", .0.display())]
    NoText(PathBuf),
}

/// Failures talking to the completion endpoint.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Article text is empty")]
    EmptyText,

    #[error("{provider} rejected the credentials ({status}): {message}")]
    Unauthorized {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} rate limit or quota exceeded: {message}")]
    RateLimited {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to reach {provider} API: {source}")]
    Network {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {provider}: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },
}

impl AnalysisError {
    /// Map a non-success HTTP status onto the error taxonomy.
    pub fn from_status(provider: &'static str, status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized {
                provider,
                status,
                message,
            },
            429 => Self::RateLimited { provider, message },
            _ => Self::Api {
                provider,
                status,
                message,
            },
        }
    }
}

/// Everything that can stop an analysis run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Analysis stopped after {} of {} sections: {source}", partial.len(), crate::analysis::SECTION_COUNT)]
    Analysis {
        partial: AnalysisReport,
        #[source]
        source: AnalysisError,
    },

    #[error("Analysis task failed: {0}")]
    Task(String),
}

impl PipelineError {
    /// Results collected before the failure, if any.
    pub fn partial_report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Analysis { partial, .. } if !partial.is_empty() => Some(partial),
            _ => None,
        }
    }
}
