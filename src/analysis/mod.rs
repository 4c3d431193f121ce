//! Sequential section-by-section analysis of an article.
//!
//! Every section in [`ANALYSIS_STEPS`] becomes one completion request, sent
//! strictly in table order. The first failure stops the run; whatever was
//! collected up to that point travels back with the error.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, PipelineError};
use crate::llm::LlmClient;
use crate::llm::prompts::{ANALYSIS_STEPS, AnalysisStep};
use crate::parser::Article;

pub const SECTION_COUNT: usize = ANALYSIS_STEPS.len();

/// The model's answer for one analysis section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResult {
    pub key: String,
    pub title: String,
    pub content: String,
}

impl SectionResult {
    fn new(step: &AnalysisStep, content: String) -> Self {
        Self {
            key: step.key.to_string(),
            title: step.title.to_string(),
            content,
        }
    }
}

/// Ordered section results for one article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source: String,
    pub model: String,
    pub created_at: DateTime<Local>,
    sections: Vec<SectionResult>,
}

impl AnalysisReport {
    pub fn new(source: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            model: model.into(),
            created_at: Local::now(),
            sections: Vec::with_capacity(SECTION_COUNT),
        }
    }

    pub fn sections(&self) -> &[SectionResult] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn push(&mut self, result: SectionResult) {
        self.sections.push(result);
    }
}

/// Coarse progress for one section about to be requested (1-based index)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProgress {
    pub index: usize,
    pub total: usize,
    pub title: &'static str,
}

/// An analysis that stopped early, with the sections completed before the failure
#[derive(Debug)]
pub struct IncompleteAnalysis {
    pub partial: AnalysisReport,
    pub error: AnalysisError,
}

impl From<IncompleteAnalysis> for PipelineError {
    fn from(incomplete: IncompleteAnalysis) -> Self {
        PipelineError::Analysis {
            partial: incomplete.partial,
            source: incomplete.error,
        }
    }
}

pub struct Analyzer {
    client: LlmClient,
}

impl Analyzer {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Run every analysis step against the article, in order.
    ///
    /// `on_progress` is called right before each request.
    pub async fn analyze<F>(
        &self,
        article: &Article,
        mut on_progress: F,
    ) -> Result<AnalysisReport, IncompleteAnalysis>
    where
        F: FnMut(SectionProgress) + Send,
    {
        let mut report = AnalysisReport::new(article.file_name(), self.client.model());

        if article.text.trim().is_empty() {
            return Err(IncompleteAnalysis {
                partial: report,
                error: AnalysisError::EmptyText,
            });
        }

        tracing::info!(
            "Analyzing {} with {} ({} sections)",
            report.source,
            self.client.model(),
            SECTION_COUNT
        );

        for (i, step) in ANALYSIS_STEPS.iter().enumerate() {
            let index = i + 1;
            tracing::info!("Section {}/{}: {}", index, SECTION_COUNT, step.title);
            on_progress(SectionProgress {
                index,
                total: SECTION_COUNT,
                title: step.title,
            });

            match self.client.complete(step.instruction, &article.text).await {
                Ok(content) => {
                    tracing::debug!("Completed {} ({} chars)", step.key, content.len());
                    report.push(SectionResult::new(step, content));
                }
                Err(error) => {
                    tracing::error!("Section {} failed: {}", step.key, error);
                    return Err(IncompleteAnalysis {
                        partial: report,
                        error,
                    });
                }
            }
        }

        tracing::info!("Analysis complete");
        Ok(report)
    }

    /// Ask a single ad-hoc instruction about the article text
    pub async fn analyze_custom(&self, text: &str, instruction: &str) -> Result<String, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }
        tracing::info!("Custom analysis: {}", instruction);
        self.client.complete(instruction, text).await
    }
}


#[cfg(test)]
mod tests {
    use super::stub::StubProvider;
    use super::*;
    use std::sync::Arc;

    fn analyzer(provider: StubProvider) -> Analyzer {
        Analyzer::new(LlmClient::from_provider(Box::new(provider)))
    }

    fn article() -> Article {
        Article::from_text("paper.pdf", "We measure things and report results.").unwrap()
    }

    #[tokio::test]
    async fn test_report_has_all_sections_in_canonical_order() {
        let analyzer = analyzer(StubProvider::answering());
        let report = analyzer.analyze(&article(), |_| {}).await.unwrap();

        assert_eq!(report.len(), SECTION_COUNT);
        let keys: Vec<_> = report.sections().iter().map(|s| s.key.as_str()).collect();
        let expected: Vec<_> = ANALYSIS_STEPS.iter().map(|s| s.key).collect();
        assert_eq!(keys, expected);
        assert_eq!(report.sections()[0].content, "answer 1");
        assert_eq!(report.sections()[9].content, "answer 10");
        assert_eq!(report.source, "paper.pdf");
        assert_eq!(report.model, "stub-model");
    }

    #[tokio::test]
    async fn test_failure_on_fourth_call_keeps_three_sections() {
        let analyzer = analyzer(StubProvider::failing_on(4));
        let incomplete = analyzer.analyze(&article(), |_| {}).await.unwrap_err();

        assert_eq!(incomplete.partial.len(), 3);
        assert!(matches!(incomplete.error, AnalysisError::RateLimited { .. }));
        let keys: Vec<_> = incomplete
            .partial
            .sections()
            .iter()
            .map(|s| s.key.as_str())
            .collect();
        assert_eq!(keys, ["summary", "theoretical_basis", "methodology"]);
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_calls() {
        let provider = Arc::new(StubProvider::failing_on(2));

        let analyzer = Analyzer::new(LlmClient::from_provider(Box::new(provider.clone())));
        let _ = analyzer.analyze(&article(), |_| {}).await;

        assert_eq!(provider.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_each_request_carries_article_and_instruction() {
        let provider = Arc::new(StubProvider::answering());

        let analyzer = Analyzer::new(LlmClient::from_provider(Box::new(provider.clone())));
        let article = article();
        analyzer.analyze(&article, |_| {}).await.unwrap();

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), SECTION_COUNT);
        for (call, step) in calls.iter().zip(ANALYSIS_STEPS.iter()) {
            assert_eq!(call.0, step.instruction);
            assert_eq!(call.1, article.text);
        }
    }

    #[tokio::test]
    async fn test_progress_reported_before_each_section() {
        let analyzer = analyzer(StubProvider::failing_on(6));
        let mut seen = Vec::new();
        let _ = analyzer
            .analyze(&article(), |p| seen.push((p.index, p.total, p.title)))
            .await;

        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], (1, SECTION_COUNT, "Article Summary"));
        assert_eq!(seen[5].0, 6);
    }

    #[tokio::test]
    async fn test_blank_text_never_calls_endpoint() {
        let analyzer = analyzer(StubProvider::answering());
        let mut article = article();
        article.text = "   ".to_string();

        let incomplete = analyzer.analyze(&article, |_| {}).await.unwrap_err();
        assert!(incomplete.partial.is_empty());
        assert!(matches!(incomplete.error, AnalysisError::EmptyText));
    }

    #[tokio::test]
    async fn test_custom_instruction() {
        let analyzer = analyzer(StubProvider::answering());
        let reply = analyzer
            .analyze_custom("article text", "Which datasets are used?")
            .await
            .unwrap();
        assert_eq!(reply, "answer 1");
    }

    #[test]
    fn test_incomplete_analysis_converts_to_pipeline_error() {
        let mut partial = AnalysisReport::new("paper.pdf", "m");
        partial.push(SectionResult::new(&ANALYSIS_STEPS[0], "s".into()));
        let err: PipelineError = IncompleteAnalysis {
            partial,
            error: AnalysisError::EmptyText,
        }
        .into();

        assert_eq!(err.partial_report().map(AnalysisReport::len), Some(1));
        assert!(err.to_string().contains("1 of 10"));
    }
}
