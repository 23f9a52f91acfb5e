//! UI rendering for the TUI.

use std::sync::Arc;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
};

use crate::core::boundary::{DiagnosticSink, ErrorBoundary, FALLBACK_HINT, FALLBACK_TITLE};
use crate::core::browser::PendingDelete;
use crate::core::view::{HEADERS, ReportRow};

use super::app::{Mode, TuiApp};

const UPLOAD_TIP: &str = "Tip: For huge artifacts, prefer CI → S3 multipart, then API completion.";

/// One boundary per independently failing region. Every region of the
/// frame is drawn through one of these.
pub struct Boundaries {
    pub header: ErrorBoundary,
    pub reports: ErrorBoundary,
    pub upload: ErrorBoundary,
    pub footer: ErrorBoundary,
    pub dialog: ErrorBoundary,
}

impl Boundaries {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            header: ErrorBoundary::new("header", sink.clone()),
            reports: ErrorBoundary::new("reports", sink.clone()),
            upload: ErrorBoundary::new("upload", sink.clone()),
            footer: ErrorBoundary::new("footer", sink.clone()),
            dialog: ErrorBoundary::new("dialog", sink),
        }
    }
}

/// Main render function.
pub fn render(frame: &mut Frame, app: &TuiApp, boundaries: &mut Boundaries) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/help
        ])
        .split(frame.area());

    guarded(frame, chunks[0], &mut boundaries.header, |f, area| {
        render_header(f, app, area)
    });

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(67), Constraint::Percentage(33)])
        .split(chunks[1]);

    guarded(frame, body[0], &mut boundaries.reports, |f, area| {
        render_reports(f, app, area)
    });
    guarded(frame, body[1], &mut boundaries.upload, |f, area| {
        render_upload(f, app, area)
    });

    guarded(frame, chunks[2], &mut boundaries.footer, |f, area| {
        render_footer(f, app, area)
    });

    if let Mode::ConfirmDelete(pending) = &app.mode {
        let area = centered(frame.area(), 44, 5);
        guarded(frame, area, &mut boundaries.dialog, |f, area| {
            render_confirm(f, pending, area)
        });
    }
}

/// Draw a region through its boundary, or the fallback panel once the
/// boundary has tripped.
pub fn guarded(
    frame: &mut Frame,
    area: Rect,
    boundary: &mut ErrorBoundary,
    draw: impl FnOnce(&mut Frame, Rect),
) {
    if boundary.guard(|| draw(frame, area)).is_none() {
        render_fallback(frame, area);
    }
}

fn render_header(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let block = Block::default()
        .title("Allure-Lite")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let projects = app.browser.projects();
    let active = projects
        .iter()
        .position(|p| p == app.browser.project())
        .unwrap_or(0);
    let tabs = Tabs::new(projects.iter().map(|p| Line::from(p.as_str())))
        .select(active)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, inner);
}

fn render_reports(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let title = if app.browser.is_loading() {
        "Reports (loading...)"
    } else {
        "Reports"
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.browser.reports().is_empty() {
        let text = Paragraph::new("  No reports")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let rows: Vec<Row> = app
        .browser
        .reports()
        .iter()
        .enumerate()
        .map(|(i, report)| {
            let status_style = status_style(&report.status);
            let [id, date, status, total, passed, failed] = ReportRow::from(report).into_cells();
            let style = if i == app.selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(id),
                Cell::from(date),
                Cell::from(status).style(status_style),
                Cell::from(total),
                Cell::from(passed),
                Cell::from(failed),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(HEADERS).style(Style::default().fg(Color::DarkGray));
    let widths = [
        Constraint::Length(10),
        Constraint::Length(20),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn status_style(status: &str) -> Style {
    match status {
        "passed" | "ready" => Style::default().fg(Color::Green),
        "failed" => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Yellow),
    }
}

fn render_upload(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let block = Block::default()
        .title("Upload")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let label = Style::default().fg(Color::Cyan);
    let file = match app.upload.file() {
        Some(path) => Span::raw(path.display().to_string()),
        None => Span::styled("none ([f] choose)", Style::default().fg(Color::DarkGray)),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Project: ", label),
            Span::raw(app.browser.project()),
        ]),
        Line::from(vec![Span::styled("File:    ", label), file]),
    ];

    if let Mode::ChooseFile { input } = &app.mode {
        lines.push(Line::from(vec![
            Span::styled("Path:    ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}█", input)),
        ]));
    }

    let button = if app.upload.can_submit() {
        Style::default()
            .fg(Color::White)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" [u] Upload ", button)));

    if let Some(msg) = app.upload.message() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::raw(msg)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        UPLOAD_TIP,
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let help_text = match &app.mode {
        Mode::Browse => {
            "[↑↓] Navigate  [o] Open  [d] Delete  [f] File  [u] Upload  [Tab] Project  [r] Refresh  [q] Quit"
        }
        Mode::ChooseFile { .. } => "[Enter] Accept  [Esc] Cancel",
        Mode::ConfirmDelete(_) => "[y] Delete  [any other key] Keep",
    };

    let mut spans = Vec::new();
    if let Some(status) = &app.status {
        let color = if status.is_error() {
            Color::Red
        } else {
            Color::Green
        };
        spans.push(Span::styled(
            format!("  {}", status.text()),
            Style::default().fg(color),
        ));
    }
    if let Some(error) = app.browser.last_error() {
        spans.push(Span::styled(
            format!("  {}", error),
            Style::default().fg(Color::Red),
        ));
    }
    spans.push(Span::raw(format!("  {}", help_text)));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_confirm(frame: &mut Frame, pending: &PendingDelete, area: Rect) {
    let short_id: String = pending.id().chars().take(8).collect();

    let block = Block::default()
        .title("Confirm")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let lines = vec![
        Line::from(format!(" {} {}", pending.prompt(), short_id)),
        Line::from(Span::styled(
            " [y] Yes   [any other key] No",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_fallback(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let lines = vec![
        Line::from(Span::styled(
            FALLBACK_TITLE,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(FALLBACK_HINT, Style::default().fg(Color::Red))),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
