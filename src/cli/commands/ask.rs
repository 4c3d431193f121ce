use anyhow::Result;
use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::ModelArgs;
use crate::config::Config;
use crate::pipeline::Pipeline;

static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");

pub async fn run(path: PathBuf, instruction: String, model: ModelArgs) -> Result<()> {
    let config = Config::load_or_default()?;
    let pipeline = Pipeline::from_config(&config, &model)?;

    println!();
    println!("{}", style(" Article Analyzer - Ask ").bold().reverse());
    println!();

    let article = pipeline.extract(&path).await?;
    println!(
        "{}{} ({} pages, {} characters)",
        PAPER,
        style(article.file_name()).cyan(),
        article.pages,
        article.text.chars().count()
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template(&format!("{}{{spinner:.green}} {{msg}}", BRAIN))?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!(
        "Asking {}...",
        style(pipeline.analyzer().model()).cyan()
    ));

    let answer = pipeline
        .analyzer()
        .analyze_custom(&article.text, &instruction)
        .await;
    spinner.finish_and_clear();

    println!();
    println!("{}", answer?);
    Ok(())
}
