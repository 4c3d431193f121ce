use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::task::JoinHandle;

use crate::analysis::{AnalysisReport, SECTION_COUNT};
use crate::cli::{ExportFormat, ModelArgs};
use crate::config::Config;
use crate::error::PipelineError;
use crate::export::export_report;
use crate::parser::Article;
use crate::pipeline::{Pipeline, PipelineEvent};
use crate::tui::{self, app::App};

static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");
static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static DISK: Emoji<'_, '_> = Emoji("💾 ", "");

type PipelineHandle = JoinHandle<Result<AnalysisReport, PipelineError>>;

pub async fn run(
    path: PathBuf,
    model: ModelArgs,
    output: Option<PathBuf>,
    format: ExportFormat,
    plain: bool,
) -> Result<()> {
    let config = Config::load_or_default()?;

    // Credentials are checked before the file is opened
    let pipeline = Pipeline::from_config(&config, &model)?;

    let (tx, rx) = unbounded_channel();
    let provider = pipeline.analyzer().provider_name();
    let model_name = pipeline.analyzer().model().to_string();

    if plain {
        let handle = pipeline.spawn(path.clone(), tx);
        run_plain(&path, provider, &model_name, rx, handle, output, format).await
    } else {
        // pdf-extract writes warnings straight to stdout/stderr, so it has to
        // finish before the view owns the terminal
        let article = extract_with_spinner(&pipeline, &path).await?;
        let handle = pipeline.spawn_analysis(article, tx);
        run_interactive(&path, &config, rx, handle, output, format).await
    }
}

async fn extract_with_spinner(pipeline: &Pipeline, path: &Path) -> Result<Article> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template(&format!("{}{{spinner:.green}} {{msg}}", PAPER))?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Extracting text from {}", style(path.display()).cyan()));

    let article = pipeline.extract(path).await;
    spinner.finish_and_clear();
    Ok(article?)
}

async fn run_plain(
    path: &Path,
    provider: &str,
    model: &str,
    mut events: UnboundedReceiver<PipelineEvent>,
    handle: PipelineHandle,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> Result<()> {
    let started = Instant::now();

    println!();
    println!(
        "{}",
        style(" Article Analyzer - Scientific Article Analysis ")
            .bold()
            .reverse()
    );
    println!();
    println!("{}Provider: {}", BRAIN, style(provider).cyan().bold());
    println!("{}Model: {}", BRAIN, style(model).cyan());
    println!("{}Source: {}", PAPER, style(path.display()).cyan());
    println!();

    let pb = ProgressBar::new(SECTION_COUNT as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{}{{spinner:.green}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {{msg}}",
                BRAIN
            ))?
            .progress_chars("━━╸━"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    // The channel closes once the pipeline task has finished
    while let Some(event) = events.recv().await {
        match event {
            PipelineEvent::Extracting { file } => {
                pb.set_message(format!("Extracting text from {}", style(file).dim()));
            }
            PipelineEvent::Extracted { pages, chars } => {
                pb.suspend(|| {
                    println!(
                        "{}Extracted {} characters from {} pages",
                        PAPER,
                        style(chars).cyan(),
                        style(pages).cyan()
                    )
                });
            }
            PipelineEvent::Section(progress) => {
                pb.set_position(progress.index.saturating_sub(1) as u64);
                pb.set_message(format!("{}", style(progress.title).dim()));
            }
            PipelineEvent::Completed(_) | PipelineEvent::Failed { .. } => {}
        }
    }

    let result = handle.await.context("Analysis task failed")?;
    match &result {
        Ok(_) => pb.finish_and_clear(),
        Err(_) => pb.abandon(),
    }

    let report = match &result {
        Ok(report) => Some(report),
        Err(e) => e.partial_report(),
    };

    if let Some(report) = report {
        print_report(report);
        if let Some(output) = &output {
            export_report(report, format, output)?;
            println!(
                "{}Saved report to {}",
                DISK,
                style(output.display()).cyan()
            );
        }
    }

    match result {
        Ok(report) => {
            println!();
            println!(
                "{}Analyzed {} sections in {}",
                SPARKLE,
                style(report.len()).green().bold(),
                style(HumanDuration(started.elapsed())).cyan()
            );
            Ok(())
        }
        Err(e) => {
            if let Some(partial) = e.partial_report() {
                println!();
                println!(
                    "{}Kept {} of {} sections",
                    WARN,
                    style(partial.len()).yellow(),
                    SECTION_COUNT
                );
            }
            Err(e.into())
        }
    }
}

fn print_report(report: &AnalysisReport) {
    for section in report.sections() {
        println!();
        println!("{}", style(section.title.to_uppercase()).bold().cyan());
        println!("{}", style("─".repeat(50)).dim());
        println!("{}", section.content);
    }
}

async fn run_interactive(
    path: &Path,
    config: &Config,
    events: UnboundedReceiver<PipelineEvent>,
    handle: PipelineHandle,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> Result<()> {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let app = App::new(file, config.output_dir(), format);

    // The terminal loop blocks, so keep it off the async worker's budget
    let app = tokio::task::block_in_place(|| tui::run(app, events, &handle))?;

    for saved in &app.saved_to {
        println!("{}Saved report to {}", DISK, style(saved.display()).cyan());
    }

    if let Some(output) = &output
        && let Some(report) = app.report.as_ref().filter(|r| !r.is_empty())
    {
        export_report(report, format, output)?;
        println!("{}Saved report to {}", DISK, style(output.display()).cyan());
    }

    match handle.await {
        Ok(Ok(report)) => {
            println!(
                "{}Analysis of {} completed ({} sections)",
                CHECK,
                style(&report.source).cyan(),
                report.len()
            );
            Ok(())
        }
        Ok(Err(e)) => Err(e.into()),
        Err(e) if e.is_cancelled() => {
            println!("{}Analysis cancelled", WARN);
            Ok(())
        }
        Err(e) => Err(e).context("Analysis task failed"),
    }
}
