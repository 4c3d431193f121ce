use anyhow::Result;
use console::style;

use crate::llm::prompts::ANALYSIS_STEPS;

pub async fn run() -> Result<()> {
    println!();
    println!(
        "{}",
        style(" Article Analyzer - Analysis Sections ").bold().reverse()
    );
    println!();

    for (i, step) in ANALYSIS_STEPS.iter().enumerate() {
        println!(
            "  {} {} {}",
            style(format!("{:>2}.", i + 1)).cyan(),
            style(step.title).bold(),
            style(format!("({})", step.key)).dim()
        );
        println!("      {}", style(step.instruction).dim());
    }
    println!();

    Ok(())
}
