use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Tabs, Wrap};

use super::app::{App, Phase};

const MAX_TAB_TITLE: usize = 20;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Progress
            Constraint::Length(3), // Tabs
            Constraint::Min(5),    // Results
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_progress(frame, app, chunks[1]);
    render_tabs(frame, app, chunks[2]);
    render_results(frame, app, chunks[3]);
    render_status(frame, app, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let content = Line::from(vec![
        Span::styled(
            " Scientific Article Analysis ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" › ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.file.as_str(), Style::default().fg(Color::Green)),
    ]);
    frame.render_widget(
        Paragraph::new(content).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_progress(frame: &mut Frame, app: &App, area: Rect) {
    let color = match app.phase {
        Phase::Running => Color::Cyan,
        Phase::Done => Color::Green,
        Phase::Failed(_) => Color::Red,
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(color))
        .ratio(app.progress_ratio())
        .label(app.progress_label.as_str());
    frame.render_widget(gauge, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app
        .tab_titles()
        .into_iter()
        .map(|t| Line::from(truncate(&t, MAX_TAB_TITLE)))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Sections "))
        .select(app.selected_tab)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let text = match (&app.report, &app.phase) {
        (Some(_), _) => app.tab_content(),
        (None, Phase::Running) => "Analysis in progress...".to_string(),
        (None, _) => "No results.".to_string(),
    };
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Results "))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status_style = match app.phase {
        Phase::Failed(_) => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let content = Line::from(vec![
        Span::styled(format!(" {} ", app.status), status_style),
        Span::styled(
            " ←/→ section  ↑/↓ scroll  s save  c clear  q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(content), area);
}

fn truncate(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    let mut short: String = title.chars().take(max.saturating_sub(3)).collect();
    short.push_str("...");
    short
}
