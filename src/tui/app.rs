use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::analysis::{AnalysisReport, SECTION_COUNT};
use crate::cli::ExportFormat;
use crate::export::{default_export_path, export_report, render_text};
use crate::pipeline::PipelineEvent;

/// Title of the first tab, which shows the whole report
pub const FULL_REPORT_TAB: &str = "Full Report";

/// Extraction counts as one unit of work, then one per section
const TOTAL_UNITS: usize = SECTION_COUNT + 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Running,
    Done,
    Failed(String),
}

pub struct App {
    pub file: String,
    pub phase: Phase,
    pub report: Option<AnalysisReport>,
    pub selected_tab: usize,
    pub scroll: u16,
    pub progress_label: String,
    pub status: String,
    pub should_quit: bool,
    completed_units: usize,
    export_dir: PathBuf,
    export_format: ExportFormat,
    pub saved_to: Vec<PathBuf>,
}

impl App {
    pub fn new(file: impl Into<String>, export_dir: PathBuf, export_format: ExportFormat) -> Self {
        Self {
            file: file.into(),
            phase: Phase::Running,
            report: None,
            selected_tab: 0,
            scroll: 0,
            progress_label: "Waiting to start...".to_string(),
            status: "Ready".to_string(),
            should_quit: false,
            completed_units: 0,
            export_dir,
            export_format,
            saved_to: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Fraction of the run finished, for the progress gauge
    pub fn progress_ratio(&self) -> f64 {
        (self.completed_units as f64 / TOTAL_UNITS as f64).clamp(0.0, 1.0)
    }

    /// Tab titles: the full report first, then one per available section
    pub fn tab_titles(&self) -> Vec<String> {
        let mut titles = vec![FULL_REPORT_TAB.to_string()];
        if let Some(report) = &self.report {
            titles.extend(report.sections().iter().map(|s| s.title.clone()));
        }
        titles
    }

    /// Text shown in the selected tab
    pub fn tab_content(&self) -> String {
        let Some(report) = &self.report else {
            return String::new();
        };
        match self.selected_tab {
            0 => render_text(report),
            n => report
                .sections()
                .get(n - 1)
                .map(|s| s.content.clone())
                .unwrap_or_default(),
        }
    }

    pub fn apply(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Extracting { file } => {
                self.progress_label = "Extracting text...".to_string();
                self.status = format!("Extracting text from {file}");
            }
            PipelineEvent::Extracted { pages, chars } => {
                self.completed_units = 1;
                self.progress_label = "Text extracted".to_string();
                self.status = format!("Extracted {chars} characters from {pages} pages");
            }
            PipelineEvent::Section(progress) => {
                self.completed_units = progress.index;
                self.progress_label = format!(
                    "{} ({}/{})",
                    progress.title, progress.index, progress.total
                );
                self.status = "Analyzing article...".to_string();
            }
            PipelineEvent::Completed(report) => {
                self.completed_units = TOTAL_UNITS;
                self.progress_label = "Done".to_string();
                self.status = format!(
                    "Analysis completed: {} sections. Press s to save.",
                    report.len()
                );
                self.report = Some(report);
                self.phase = Phase::Done;
            }
            PipelineEvent::Failed { message, partial } => {
                self.status = match &partial {
                    Some(p) => format!("Error: {message} ({} sections kept)", p.len()),
                    None => format!("Error: {message}"),
                };
                self.progress_label = "Failed".to_string();
                self.report = partial;
                self.phase = Phase::Failed(message);
            }
        }
        self.clamp_tab();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => self.next_tab(),
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => self.previous_tab(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('c') => self.clear(),
            _ => {}
        }
    }

    fn next_tab(&mut self) {
        let count = self.tab_titles().len();
        self.selected_tab = (self.selected_tab + 1) % count;
        self.scroll = 0;
    }

    fn previous_tab(&mut self) {
        let count = self.tab_titles().len();
        self.selected_tab = (self.selected_tab + count - 1) % count;
        self.scroll = 0;
    }

    fn clamp_tab(&mut self) {
        if self.selected_tab >= self.tab_titles().len() {
            self.selected_tab = 0;
            self.scroll = 0;
        }
    }

    /// Write the current report to a timestamped file in the export directory
    pub fn save(&mut self) {
        let Some(report) = self.report.as_ref().filter(|r| !r.is_empty()) else {
            self.status = "No results to save".to_string();
            return;
        };

        let path = default_export_path(&self.export_dir, self.export_format);
        match export_report(report, self.export_format, &path) {
            Ok(()) => {
                self.status = format!("Saved to {}", path.display());
                self.saved_to.push(path);
            }
            Err(e) => {
                tracing::error!("Failed to save results: {:#}", e);
                self.status = format!("Error saving: {e:#}");
            }
        }
    }

    /// Discard the results on screen
    pub fn clear(&mut self) {
        if self.is_running() {
            self.status = "Analysis in progress".to_string();
            return;
        }
        self.report = None;
        self.selected_tab = 0;
        self.scroll = 0;
        self.status = "Results cleared".to_string();
    }
}
