//! Frame rendering

use super::state::SurfaceState;
use crate::message::{Author, Message};
use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::time::Instant;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TITLE: &str = "AskMe Bot";
const SUBTITLE: &str = "Your AI Assistant";
const WELCOME_TITLE: &str = "Welcome to AskMe Bot";
const WELCOME_TEXT: &str =
    "I'm your helpful AI assistant. Ask me anything and I'll do my best to help you!";

fn user_style() -> Style {
    Style::default().fg(Color::Cyan)
}

fn assistant_style() -> Style {
    Style::default().fg(Color::Green)
}

fn muted_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Render the whole surface
pub fn render(frame: &mut Frame, surface: &SurfaceState, now: Instant) {
    let [header, body, toast, input] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    render_header(frame, surface, header);
    if surface.view.messages.is_empty() && !surface.view.is_loading {
        render_welcome(frame, body);
    } else {
        render_messages(frame, surface, body);
    }
    if let Some(text) = surface.active_toast(now) {
        let line = Line::from(Span::styled(
            text,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), toast);
    }
    render_input(frame, surface, input);
}

fn render_header(frame: &mut Frame, surface: &SurfaceState, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [title, badge] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(18)]).areas(inner);

    let title_line = Line::from(vec![
        Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(SUBTITLE, muted_style()),
    ]);
    frame.render_widget(Paragraph::new(title_line), title);

    let badge_line = Line::from(format!("{} queries left", surface.view.queries_left));
    frame.render_widget(Paragraph::new(badge_line).alignment(Alignment::Right), badge);
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines = vec![Line::from(Span::styled(
        WELCOME_TITLE,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(
        wrap_text(WELCOME_TEXT, width)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, muted_style()))),
    );

    // Vertically centred
    let top = (inner.height as usize).saturating_sub(lines.len()) / 2;
    let mut padded = vec![Line::from(""); top];
    padded.extend(lines);
    frame.render_widget(Paragraph::new(padded).alignment(Alignment::Center), inner);
}

fn message_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let (label, style, alignment) = match message.author() {
        Author::User => ("You", user_style(), Alignment::Right),
        Author::Assistant => ("AI", assistant_style(), Alignment::Left),
    };
    let time = message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string();

    let mut lines = vec![Line::from(vec![
        Span::styled(label, style.add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(time, muted_style()),
    ])
    .alignment(alignment)];

    for wrapped in wrap_text(&message.content, width.saturating_sub(2)) {
        lines.push(Line::from(format!("  {wrapped}")).alignment(alignment));
    }
    lines.push(Line::from(""));
    lines
}

fn render_messages(frame: &mut Frame, surface: &SurfaceState, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;
    let text_width = area.width.saturating_sub(2) as usize;

    let mut all_lines: Vec<Line> = surface
        .view
        .messages
        .iter()
        .flat_map(|m| message_lines(m, text_width))
        .collect();

    if surface.view.is_loading {
        all_lines.push(Line::from(Span::styled(
            "AI",
            assistant_style().add_modifier(Modifier::BOLD),
        )));
        all_lines.push(Line::from(Span::styled(
            "  typing...",
            muted_style().add_modifier(Modifier::ITALIC),
        )));
    }

    // Follow the bottom unless the user scrolled back
    let total_lines = all_lines.len();
    let max_scroll = total_lines.saturating_sub(visible_height);
    let offset = max_scroll - surface.scroll_back.min(max_scroll);

    let lines: Vec<Line> = all_lines
        .into_iter()
        .skip(offset)
        .take(visible_height)
        .collect();

    let title = if surface.scroll_back > 0 && max_scroll > 0 {
        format!(" Chat [{}/{}] ", offset + visible_height.min(total_lines), total_lines)
    } else {
        " Chat ".to_string()
    };

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, surface: &SurfaceState, area: Rect) {
    let enabled = surface.view.can_send;
    let border_style = if enabled {
        Style::default().fg(Color::Cyan)
    } else {
        muted_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Message ");

    let content = if surface.input.is_empty() {
        Line::from(Span::styled(surface.placeholder(), muted_style()))
    } else {
        Line::from(surface.input.as_str())
    };

    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(content).block(block), area);

    if enabled {
        let typed = u16::try_from(surface.input.width()).unwrap_or(u16::MAX);
        let x = inner
            .x
            .saturating_add(typed)
            .min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}

/// Greedy word wrap by display width. Words wider than `width` are
/// split; explicit newlines are kept.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for word in raw_line.split_whitespace() {
            let mut word = word.to_string();

            while word.width() > width {
                if current_width > 0 {
                    out.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                let (head, tail) = split_at_width(&word, width);
                out.push(head);
                word = tail;
            }
            if word.is_empty() {
                continue;
            }

            let word_width = word.width();
            let needed = if current_width == 0 { word_width } else { current_width + 1 + word_width };
            if needed > width {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(&word);
            current_width += word_width;
        }

        out.push(current);
    }
    out
}

/// Longest prefix fitting in `width` columns, and the rest. Always takes
/// at least one char so a wide glyph in a narrow column still advances.
fn split_at_width(word: &str, width: usize) -> (String, String) {
    let mut head = String::new();
    let mut used = 0;
    let mut chars = word.chars().peekable();

    while let Some(&c) = chars.peek() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !head.is_empty() {
            break;
        }
        head.push(c);
        used += w;
        chars.next();
    }
    (head, chars.collect())
}
