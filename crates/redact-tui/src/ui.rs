use crate::app::{App, InputMode};
use redact_core::{ConfidenceLevel, ReviewStatus};
use redact_session::Marker;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_main(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    if app.input_mode == InputMode::ShowingHelp {
        draw_help(f);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let progress = app.session.progress();
    let dirty = if app.is_dirty() { " [modified]" } else { "" };
    let unredacted = match progress.unredacted {
        0 => String::new(),
        n => format!(", {} unredacted", n),
    };

    let title = format!(
        "redact - {}{}  |  {} groups, {} occurrences  |  {} accepted, {} skipped, {} pending{}",
        app.output_path.display(),
        dirty,
        progress.unique_groups,
        progress.occurrences,
        progress.accepted,
        progress.skipped,
        progress.pending,
        unredacted
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_main(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55), // Findings
            Constraint::Percentage(45), // Document
        ])
        .split(area);

    draw_findings(f, app, chunks[0]);
    draw_document(f, app, chunks[1]);
}

fn status_style(status: ReviewStatus) -> Style {
    match status {
        ReviewStatus::Accepted => Style::default().fg(Color::Green),
        ReviewStatus::Skipped => Style::default().fg(Color::DarkGray),
        ReviewStatus::Pending => Style::default().fg(Color::Yellow),
    }
}

fn cell_text(app: &App, column: &str, marker: &Marker, confidence: ConfidenceLevel) -> String {
    match column {
        "position" => marker.key.to_string(),
        "type" => marker.detected_type.clone(),
        "value" => app
            .session
            .occurrence(&marker.key)
            .map(|o| o.original_value.clone())
            .unwrap_or_default(),
        "replacement" => marker.effective_replacement.clone(),
        "status" => marker.status.label().to_string(),
        "confidence" => confidence.label().to_string(),
        other => other.to_string(),
    }
}

fn draw_findings(f: &mut Frame, app: &mut App, area: Rect) {
    let sort = app.session.sort();
    let title = format!(
        " Findings (sort: {} {}) ",
        sort.key.label(),
        match sort.direction {
            redact_session::SortDirection::Ascending => "asc",
            redact_session::SortDirection::Descending => "desc",
        }
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    let inner_width = u32::from(area.width.saturating_sub(2));
    let columns: Vec<(usize, String, u16)> = match app.columns_for(inner_width) {
        Ok(layout) => layout
            .visible()
            .map(|(i, name, width)| (i, name.to_string(), u16::try_from(width).unwrap_or(u16::MAX)))
            .collect(),
        Err(e) => {
            let message = Paragraph::new(format!("Layout unavailable: {}", e)).block(block);
            f.render_widget(message, area);
            return;
        }
    };

    let header = Row::new(columns.iter().map(|(i, name, _)| {
        let style = if *i == app.selected_column {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(name.clone()).style(style)
    }));

    let markers = app.view.borrow().markers.clone();
    let rows: Vec<Row> = markers
        .iter()
        .map(|marker| {
            let confidence = app
                .session
                .occurrence(&marker.key)
                .map(|o| o.confidence_level)
                .unwrap_or_default();
            Row::new(
                columns
                    .iter()
                    .map(|(_, name, _)| Cell::from(cell_text(app, name, marker, confidence))),
            )
            .style(status_style(marker.status))
        })
        .collect();

    if rows.is_empty() {
        let empty = Paragraph::new("Nothing to review.").block(block);
        f.render_widget(empty, area);
        return;
    }

    let widths: Vec<Constraint> = columns.iter().map(|(_, _, w)| Constraint::Length(*w)).collect();
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(0)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default().with_selected(app.session.cursor());
    f.render_stateful_widget(table, area, &mut state);
}

/// One document line with marker spans highlighted. Columns are 1-based
/// character positions, end exclusive.
fn highlight_line<'a>(text: &'a str, line: usize, markers: &[Marker], current: Option<&Marker>) -> Line<'a> {
    let mut spans = Vec::new();
    let mut on_line: Vec<&Marker> = markers.iter().filter(|m| m.line == line).collect();
    on_line.sort_by_key(|m| m.column_start);

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |column: usize| chars.get(column - 1).map_or(text.len(), |(b, _)| *b);

    let mut cursor = 0;
    for marker in on_line {
        let start = byte_at(marker.column_start);
        let end = byte_at(marker.column_end);
        if start < cursor {
            continue;
        }
        spans.push(Span::raw(&text[cursor..start]));

        let mut style = status_style(marker.status).add_modifier(Modifier::UNDERLINED);
        if current.is_some_and(|c| c.key == marker.key) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(&text[start..end], style));
        cursor = end;
    }
    spans.push(Span::raw(&text[cursor..]));

    Line::from(spans)
}

fn draw_document(f: &mut Frame, app: &App, area: Rect) {
    let view = app.view.borrow();
    let text = app.session.buffer().as_str();
    let current = view
        .revealed
        .as_ref()
        .and_then(|(key, _)| view.markers.iter().find(|m| &m.key == key));

    let lines: Vec<Line> = text
        .split('\n')
        .enumerate()
        .map(|(i, line)| highlight_line(line, i + 1, &view.markers, current))
        .collect();

    // keep the revealed line roughly centred
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = view
        .revealed
        .as_ref()
        .map_or(0, |(_, line)| line.saturating_sub(1).saturating_sub(visible / 2));

    let title = match current {
        Some(marker) if !marker.message.is_empty() => {
            format!(" Document - {}: {} ", marker.detected_type, marker.message)
        }
        Some(marker) => format!(" Document - {} ", marker.detected_type),
        None => " Document ".to_string(),
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(paragraph, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    if app.input_mode == InputMode::EditingReplacement {
        let input = Paragraph::new(format!("{}_", app.input_buffer))
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Replacement (Enter: save, Esc: cancel) "),
            );
        f.render_widget(input, area);
        return;
    }

    if app.input_mode == InputMode::ConfirmQuit {
        let prompt = Paragraph::new(
            "Unwritten changes. y: quit without writing, w: write and quit, n: stay",
        )
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title(" Quit? "));
        f.render_widget(prompt, area);
        return;
    }

    let status = app
        .status_message
        .clone()
        .unwrap_or_else(|| "Ready".to_string());

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let help_text = vec![
        Span::raw(status),
        Span::raw(" | "),
        key("q"),
        Span::raw(":quit "),
        key("j/k"),
        Span::raw(":move "),
        key("a/s/r"),
        Span::raw(":accept/skip/revert "),
        key("e"),
        Span::raw(":edit "),
        key("w"),
        Span::raw(":write "),
        key("?"),
        Span::raw(":help"),
    ];

    let footer = Paragraph::new(Line::from(help_text)).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn draw_help(f: &mut Frame) {
    let area = centered(f.area(), 60, 70);
    let text = "\
j/k, Up/Down    next / previous finding
g/G             first / last finding
Enter           accept if pending
a               accept group
s               skip group
r               revert group
e               edit replacement
A / S / R       apply all / skip all / revert all
o / O           cycle sort key / flip direction
h/l             select column
< / >           shrink / grow column
w               write output
q               quit, confirming first if changes are unwritten";

    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Keys "))
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
