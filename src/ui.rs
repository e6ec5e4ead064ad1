use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::game::{GamePhase, Snapshot};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const TITLE: &str = "keyrush";
const IDLE_LEGEND: &str = "(space/enter) start / (esc)ape";
const PLAYING_LEGEND: &str = "(tab) restart / (esc)ape";
const FINISHED_LEGEND: &str = "(r)eplay / (tab) restart / (esc)ape";

impl Widget for &Snapshot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width <= HORIZONTAL_MARGIN * 2 || area.height <= VERTICAL_MARGIN * 2 {
            return;
        }

        match self.phase {
            GamePhase::Idle => render_idle(self, area, buf),
            GamePhase::Playing => render_playing(self, area, buf),
            GamePhase::Finished => render_finished(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn warning_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::ITALIC)
}

/// Rows of vertical padding that center `content` lines in `area`.
fn centered(area: Rect, content: u16) -> [Constraint; 3] {
    let pad = area.height.saturating_sub(content) / 2;
    [
        Constraint::Length(pad),
        Constraint::Length(content),
        Constraint::Min(0),
    ]
}

fn render_idle(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled(TITLE, bold().fg(Color::Cyan))),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "type as many words as you can in {} seconds",
                snapshot.duration_secs
            ),
            dim_bold(),
        )),
        Line::from(Span::styled("press space or enter to start", bold())),
    ];

    if let Some(warning) = &snapshot.warning {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(warning.clone(), warning_style())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(IDLE_LEGEND, italic())));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(centered(area, lines.len() as u16))
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

fn render_playing(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // time left
            Constraint::Length(1), // score / misses
            Constraint::Min(1),    // padding
            Constraint::Length(1), // warning
            Constraint::Length(word_lines(snapshot, area)),
            Constraint::Min(1),    // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!("{}s left", snapshot.remaining_secs),
        dim_bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Line::from(vec![
        Span::styled(
            format!("score {}", snapshot.correct_count),
            bold().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("misses {}", snapshot.miss_count),
            bold().fg(Color::Red),
        ),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    if let Some(warning) = &snapshot.warning {
        Paragraph::new(Span::styled(warning.clone(), warning_style()))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }

    let word = if snapshot.loading {
        Line::from(Span::styled("loading words...", italic().fg(Color::Gray)))
    } else {
        let rest = snapshot
            .current_word
            .get(snapshot.typed_prefix.len()..)
            .unwrap_or("");
        Line::from(vec![
            Span::styled(snapshot.typed_prefix.clone(), bold().fg(Color::Green)),
            Span::styled(rest.to_string(), dim_bold()),
        ])
    };

    Paragraph::new(word)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);

    Paragraph::new(Span::styled(PLAYING_LEGEND, italic())).render(chunks[6], buf);
}

/// Long words wrap; give them as many rows as they need.
fn word_lines(snapshot: &Snapshot, area: Rect) -> u16 {
    let width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1) as usize;
    let word_width = snapshot.current_word.width().max(1);
    word_width.div_ceil(width) as u16
}

fn render_finished(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![Line::from(Span::styled(
        "game over",
        bold().fg(Color::Cyan),
    ))];

    if let Some(reason) = snapshot.end_reason {
        lines.push(Line::from(Span::styled(
            format!("{reason}!"),
            italic().fg(Color::Magenta),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "score {}   misses {}",
            snapshot.correct_count, snapshot.miss_count
        ),
        bold(),
    )));

    if let Some(metrics) = snapshot.final_metrics {
        lines.push(Line::from(Span::styled(
            format!(
                "{} cpm   {} wpm   {}% acc",
                metrics.cpm, metrics.wpm, metrics.accuracy
            ),
            bold().fg(Color::Green),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(FINISHED_LEGEND, italic())));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(centered(area, lines.len() as u16))
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}
