use anyhow::Result;
use console::{Emoji, style};
use std::path::PathBuf;

use crate::parser::pdf_info;

static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

pub async fn run(path: PathBuf) -> Result<()> {
    let info = tokio::task::spawn_blocking({
        let path = path.clone();
        move || pdf_info(&path)
    })
    .await??;

    println!();
    println!("{}", style(" Article Analyzer - PDF Info ").bold().reverse());
    println!();
    println!("{}{}", PAPER, style(path.display()).cyan());
    println!();
    println!("  {:<12} {}", "Pages", style(info.pages).green());
    println!("  {:<12} {:.1} KB", "Size", info.size_kb());
    println!("  {:<12} {}", "Characters", style(info.text_chars).green());

    if info.text_chars == 0 {
        println!();
        println!(
            "{}No extractable text. The PDF may be scanned and need OCR first.",
            WARN
        );
    }
    println!();

    Ok(())
}
