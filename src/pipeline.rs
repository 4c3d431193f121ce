//! Background extract → analyze run, reporting progress over a channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::analysis::{AnalysisReport, Analyzer, SectionProgress};
use crate::cli::ModelArgs;
use crate::config::Config;
use crate::error::{ConfigError, PipelineError};
use crate::llm::LlmClient;
use crate::parser::Article;

/// Progress and outcome notifications from a running pipeline
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Extracting { file: String },
    Extracted { pages: usize, chars: usize },
    Section(SectionProgress),
    Completed(AnalysisReport),
    Failed {
        message: String,
        partial: Option<AnalysisReport>,
    },
}

pub struct Pipeline {
    analyzer: Arc<Analyzer>,
}

impl Pipeline {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }

    /// Build the LLM client up front so a missing key is reported before
    /// any file is touched.
    pub fn from_config(config: &Config, args: &ModelArgs) -> Result<Self, ConfigError> {
        let provider = args.provider.unwrap_or_else(|| config.default_llm_provider());
        let client = LlmClient::new(
            provider,
            config,
            args.model.as_deref(),
            args.max_tokens,
            args.api_key.as_deref(),
        )?;
        Ok(Self::new(Analyzer::new(client)))
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Extract the article text off the async runtime
    pub async fn extract(&self, path: &Path) -> Result<Article, PipelineError> {
        let path = path.to_path_buf();
        let article = tokio::task::spawn_blocking(move || Article::from_pdf(&path))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;
        Ok(article)
    }

    /// Extract then analyze, strictly in that order
    pub async fn run(
        &self,
        path: &Path,
        events: &UnboundedSender<PipelineEvent>,
    ) -> Result<AnalysisReport, PipelineError> {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let _ = events.send(PipelineEvent::Extracting { file });

        let article = self.extract(path).await?;
        self.analyze(&article, events).await
    }

    /// Analyze an article that has already been extracted
    pub async fn analyze(
        &self,
        article: &Article,
        events: &UnboundedSender<PipelineEvent>,
    ) -> Result<AnalysisReport, PipelineError> {
        let _ = events.send(PipelineEvent::Extracted {
            pages: article.pages,
            chars: article.text.chars().count(),
        });

        let progress = events.clone();
        let report = self
            .analyzer
            .analyze(article, move |p| {
                let _ = progress.send(PipelineEvent::Section(p));
            })
            .await?;

        Ok(report)
    }

    /// Run extraction and analysis on a background task. The final outcome
    /// is both returned from the handle and announced on the channel.
    pub fn spawn(
        self,
        path: PathBuf,
        events: UnboundedSender<PipelineEvent>,
    ) -> JoinHandle<Result<AnalysisReport, PipelineError>> {
        tokio::spawn(async move {
            let result = self.run(&path, &events).await;
            announce(&events, &result);
            result
        })
    }

    /// Like [`Pipeline::spawn`], for an article extracted up front
    pub fn spawn_analysis(
        self,
        article: Article,
        events: UnboundedSender<PipelineEvent>,
    ) -> JoinHandle<Result<AnalysisReport, PipelineError>> {
        tokio::spawn(async move {
            let result = self.analyze(&article, &events).await;
            announce(&events, &result);
            result
        })
    }
}

fn announce(events: &UnboundedSender<PipelineEvent>, result: &Result<AnalysisReport, PipelineError>) {
    let event = match result {
        Ok(report) => PipelineEvent::Completed(report.clone()),
        Err(e) => PipelineEvent::Failed {
            message: e.to_string(),
            partial: e.partial_report().cloned(),
        },
    };
    let _ = events.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SECTION_COUNT;
    use crate::analysis::stub::StubProvider;
    use crate::cli::LlmProvider;
    use crate::error::ExtractionError;
    use crate::parser::fixtures::write_pdf;
    use tempfile::tempdir;
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn stub_pipeline(provider: StubProvider) -> Pipeline {
        Pipeline::new(Analyzer::new(LlmClient::from_provider(Box::new(provider))))
    }

    fn drain(rx: &mut UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_full_run_reports_progress_and_result() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        write_pdf(&path, &[Some("Graph neural networks for chemistry")]);

        let (tx, mut rx) = unbounded_channel();
        let report = stub_pipeline(StubProvider::answering())
            .spawn(path, tx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.len(), SECTION_COUNT);

        let events = drain(&mut rx);
        assert!(matches!(events[0], PipelineEvent::Extracting { ref file } if file == "paper.pdf"));
        assert!(matches!(events[1], PipelineEvent::Extracted { pages: 1, .. }));
        let sections: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Section(p) => Some(p.index),
                _ => None,
            })
            .collect();
        assert_eq!(sections, (1..=SECTION_COUNT).collect::<Vec<_>>());
        assert!(matches!(events.last(), Some(PipelineEvent::Completed(r)) if r.len() == SECTION_COUNT));
    }

    #[tokio::test]
    async fn test_failed_section_keeps_partial_results() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        write_pdf(&path, &[Some("Graph neural networks for chemistry")]);

        let (tx, mut rx) = unbounded_channel();
        let err = stub_pipeline(StubProvider::failing_on(4))
            .spawn(path, tx)
            .await
            .unwrap()
            .unwrap_err();

        assert_eq!(err.partial_report().map(AnalysisReport::len), Some(3));
        assert!(matches!(err, PipelineError::Analysis { .. }));

        match drain(&mut rx).last() {
            Some(PipelineEvent::Failed { message, partial }) => {
                assert!(message.contains("rate limit"));
                assert_eq!(partial.as_ref().map(AnalysisReport::len), Some(3));
            }
            other => panic!("unexpected final event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scanned_pdf_stops_before_analysis() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        write_pdf(&path, &[None]);

        let (tx, mut rx) = unbounded_channel();
        let err = stub_pipeline(StubProvider::answering())
            .run(&path, &tx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Extraction(ExtractionError::NoText(_))
        ));
        assert!(err.partial_report().is_none());
        assert!(
            !drain(&mut rx)
                .iter()
                .any(|e| matches!(e, PipelineEvent::Section(_)))
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_extraction_error() {
        let dir = tempdir().unwrap();
        let (tx, _rx) = unbounded_channel();
        let err = stub_pipeline(StubProvider::answering())
            .run(&dir.path().join("nope.pdf"), &tx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extraction(ExtractionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_prepared_article_skips_extraction() {
        let article = Article::from_text("paper.pdf", "Graph neural networks for chemistry").unwrap();

        let (tx, mut rx) = unbounded_channel();
        let report = stub_pipeline(StubProvider::answering())
            .spawn_analysis(article, tx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.len(), SECTION_COUNT);

        let events = drain(&mut rx);
        assert!(matches!(events[0], PipelineEvent::Extracted { pages: 1, .. }));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, PipelineEvent::Extracting { .. }))
        );
        assert!(matches!(events.last(), Some(PipelineEvent::Completed(_))));
    }

    #[test]
    fn test_inline_key_satisfies_credential_check() {
        let args = ModelArgs {
            provider: Some(LlmProvider::Google),
            api_key: Some("inline-key".to_string()),
            ..Default::default()
        };
        let pipeline = Pipeline::from_config(&Config::default(), &args).unwrap();
        assert_eq!(pipeline.analyzer().provider_name(), "google");
    }
}
