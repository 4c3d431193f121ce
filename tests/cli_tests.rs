//! End-to-end CLI tests using `assert_cmd`.
//!
//! These tests invoke the compiled binary with an isolated config directory.
//! The LLM endpoint is replaced by a local mockito server where one is needed.

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

/// Binary with HOME and XDG_CONFIG_HOME pointed at `home` and no provider
/// credentials leaking in from the environment.
fn cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("article-analyzer").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("GOOGLE_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("ANALYZER_PROVIDER")
        .env_remove("ANALYZER_MODEL")
        .env_remove("ANALYZER_MAX_TOKENS")
        .env_remove("ANALYZER_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(home: &Path, content: &str) {
    let dir = home.join(".config").join("article-analyzer");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), content).unwrap();
}

fn write_pdf(path: &Path, text: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    let kids: Vec<Object> = vec![page_id.into()];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 1,
            "Resources" => resources_id,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn home() -> TempDir {
    tempdir().unwrap()
}

// ─── Help / version ─────────────────────────────────────────────────────

#[test]
fn test_help_shows_commands() {
    let home = home();
    cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("sections"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn test_version_shows_semver() {
    let home = home();
    cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("article-analyzer"));
}

// ─── Analyze argument validation ────────────────────────────────────────

#[test]
fn test_analyze_help() {
    let home = home();
    cmd(home.path())
        .args(["analyze", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PATH"))
        .stdout(predicate::str::contains("--provider"))
        .stdout(predicate::str::contains("--model"))
        .stdout(predicate::str::contains("--max-tokens"))
        .stdout(predicate::str::contains("--plain"));
}

#[test]
fn test_analyze_requires_path() {
    let home = home();
    cmd(home.path())
        .arg("analyze")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PATH"));
}

#[test]
fn test_analyze_rejects_invalid_provider() {
    let home = home();
    cmd(home.path())
        .args(["analyze", "paper.pdf", "--provider", "invalid_provider"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_analyze_rejects_invalid_format() {
    let home = home();
    cmd(home.path())
        .args(["analyze", "paper.pdf", "--format", "docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_missing_credential_reported_before_file_is_read() {
    let home = home();
    cmd(home.path())
        .args(["analyze", "/definitely/not/here.pdf", "--plain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OpenAI API key is missing"))
        .stderr(predicate::str::contains("File not found").not());
}

#[test]
fn test_missing_file_reported_once_credentials_exist() {
    let home = home();
    cmd(home.path())
        .args(["analyze", "/definitely/not/here.pdf", "--plain"])
        .env("OPENAI_API_KEY", "sk-test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_zero_max_tokens_rejected() {
    let home = home();
    cmd(home.path())
        .args(["analyze", "paper.pdf", "--plain", "--max-tokens", "0"])
        .env("OPENAI_API_KEY", "sk-test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_tokens"));
}

// ─── Full run against a stub endpoint ───────────────────────────────────

#[test]
fn test_plain_analysis_exports_every_section() {
    let home = home();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Stub section text."}}]}"#)
        .expect(10)
        .create();

    write_config(
        home.path(),
        &format!(
            "default_provider = \"openai\"\n\n[providers.openai]\napi_key = \"sk-test\"\nbase_url = \"{}\"\n",
            server.url()
        ),
    );

    let work = tempdir().unwrap();
    let pdf = work.path().join("paper.pdf");
    write_pdf(&pdf, "Protein folding with deep learning");
    let report = work.path().join("report.txt");

    cmd(home.path())
        .arg("analyze")
        .arg(&pdf)
        .arg("--plain")
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("ARTICLE SUMMARY"))
        .stdout(predicate::str::contains("Stub section text."));

    mock.assert();
    let text = fs::read_to_string(&report).unwrap();
    assert!(text.starts_with(&"=".repeat(80)));
    assert!(text.contains("File: paper.pdf"));
    assert_eq!(text.matches("Stub section text.").count(), 10);
}

#[test]
fn test_plain_analysis_failure_exports_completed_sections() {
    let home = home();
    let mut server = mockito::Server::new();
    let answered = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Stub section text."}}]}"#)
        .expect(3)
        .create();
    let limited = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"quota exceeded"}}"#)
        .expect(1)
        .create();

    write_config(
        home.path(),
        &format!(
            "[providers.openai]\napi_key = \"sk-test\"\nbase_url = \"{}\"\n",
            server.url()
        ),
    );

    let work = tempdir().unwrap();
    let pdf = work.path().join("paper.pdf");
    write_pdf(&pdf, "Protein folding with deep learning");
    let report = work.path().join("report.txt");

    cmd(home.path())
        .arg("analyze")
        .arg(&pdf)
        .arg("--plain")
        .arg("-o")
        .arg(&report)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Kept 3 of 10 sections"))
        .stderr(predicate::str::contains("rate limit"));

    answered.assert();
    limited.assert();

    let text = fs::read_to_string(&report).unwrap();
    let rule = "-".repeat(80);
    assert_eq!(text.lines().filter(|line| *line == rule).count(), 6);
    assert_eq!(text.matches("Stub section text.").count(), 3);
    assert!(text.contains("ARTICLE SUMMARY"));
    assert!(text.contains("METHODOLOGY"));
    assert!(!text.contains("KEY CONCEPTS"));
}

// ─── Other commands ─────────────────────────────────────────────────────

#[test]
fn test_sections_lists_all_ten() {
    let home = home();
    cmd(home.path())
        .arg("sections")
        .assert()
        .success()
        .stdout(predicate::str::contains("Article Summary"))
        .stdout(predicate::str::contains("Methodology"))
        .stdout(predicate::str::contains("10."));
}

#[test]
fn test_info_reports_pages() {
    let home = home();
    let work = tempdir().unwrap();
    let pdf = work.path().join("paper.pdf");
    write_pdf(&pdf, "Protein folding with deep learning");

    cmd(home.path())
        .arg("info")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pages"));
}

#[test]
fn test_info_missing_file_fails() {
    let home = home();
    cmd(home.path())
        .args(["info", "/definitely/not/here.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_info_rejects_non_pdf() {
    let home = home();
    let work = tempdir().unwrap();
    let notes = work.path().join("notes.txt");
    fs::write(&notes, "plain text").unwrap();

    cmd(home.path())
        .arg("info")
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a PDF"));
}

#[test]
fn test_init_creates_config_once() {
    let home = home();
    cmd(home.path()).arg("init").assert().success();

    let config = home
        .path()
        .join(".config")
        .join("article-analyzer")
        .join("config.toml");
    let content = fs::read_to_string(&config).unwrap();
    assert!(content.contains("${OPENAI_API_KEY}"));

    cmd(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_auth_with_key_writes_config() {
    let home = home();
    cmd(home.path())
        .args(["auth", "--provider", "anthropic", "--key", "sk-ant-test"])
        .assert()
        .success();

    let content = fs::read_to_string(
        home.path()
            .join(".config")
            .join("article-analyzer")
            .join("config.toml"),
    )
    .unwrap();
    assert!(content.contains("sk-ant-test"));
}
