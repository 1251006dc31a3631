use crate::error::Error;
use crate::fonts::FontMetrics;

use super::cursor::{CursorPos, FlowCursor};
use super::surface::{DrawCommand, TextStyle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub width: f32,
}

pub fn line_height(metrics: &dyn FontMetrics, style: &TextStyle) -> f32 {
    style.size * metrics.line_height_ratio(style.font)
}

/// Distance from the top of a line box to the baseline, centering the glyph
/// box in the line pitch.
pub fn baseline_offset(metrics: &dyn FontMetrics, style: &TextStyle, line_h: f32) -> f32 {
    (line_h - style.size).max(0.0) / 2.0 + style.size * metrics.ascender_ratio(style.font)
}

/// Runs of whitespace (tabs included) become single spaces, as in wrapped
/// text, and the ends are trimmed.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Greedy word wrap. Words are joined by single spaces and a line grows while
/// its measured width stays within `max_width`. A word wider than
/// `max_width` gets a line of its own and is never split.
///
/// `\n` forces a line break; blank lines between text lines are kept as empty
/// lines. Whitespace-only input yields no lines.
pub fn wrap_text(
    metrics: &dyn FontMetrics,
    text: &str,
    style: &TextStyle,
    max_width: f32,
) -> Result<Vec<WrappedLine>, Error> {
    let mut lines = Vec::new();
    let paragraphs: Vec<&str> = text.lines().collect();
    let Some(first) = paragraphs.iter().position(|p| !p.trim().is_empty()) else {
        return Ok(lines);
    };
    let last = paragraphs
        .iter()
        .rposition(|p| !p.trim().is_empty())
        .unwrap_or(first);

    for para in &paragraphs[first..=last] {
        let mut words = para.split_whitespace();
        let Some(first_word) = words.next() else {
            lines.push(WrappedLine {
                text: String::new(),
                width: 0.0,
            });
            continue;
        };
        let mut current = first_word.to_string();
        let mut current_w = metrics.text_width(style.font, style.size, &current)?;

        for word in words {
            let candidate = format!("{current} {word}");
            let candidate_w = metrics.text_width(style.font, style.size, &candidate)?;
            if candidate_w <= max_width {
                current = candidate;
                current_w = candidate_w;
            } else {
                lines.push(WrappedLine {
                    text: std::mem::replace(&mut current, word.to_string()),
                    width: current_w,
                });
                current_w = metrics.text_width(style.font, style.size, word)?;
            }
        }
        lines.push(WrappedLine {
            text: current,
            width: current_w,
        });
    }
    Ok(lines)
}

/// Left edge for a line of `line_w` placed in the box `[x, x + box_w]`.
pub fn aligned_x(align: Align, x: f32, box_w: f32, line_w: f32) -> f32 {
    match align {
        Align::Left => x,
        Align::Center => x + (box_w - line_w) / 2.0,
        Align::Right => x + box_w - line_w,
    }
}

/// Draw one already measured line with its baseline at `baseline`.
pub fn draw_line(
    cursor: &mut FlowCursor,
    line: &WrappedLine,
    x: f32,
    box_w: f32,
    align: Align,
    baseline: f32,
    style: &TextStyle,
) {
    if line.text.is_empty() {
        return;
    }
    cursor.draw(DrawCommand::Text {
        x: aligned_x(align, x, box_w, line.width),
        baseline,
        text: line.text.clone(),
        style: *style,
    });
}

/// Measure and draw a single unwrapped string inside `[x, x + box_w]`.
/// Whitespace is collapsed first.
pub fn draw_text(
    cursor: &mut FlowCursor,
    metrics: &dyn FontMetrics,
    text: &str,
    x: f32,
    box_w: f32,
    align: Align,
    baseline: f32,
    style: &TextStyle,
) -> Result<(), Error> {
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return Ok(());
    }
    let width = metrics.text_width(style.font, style.size, &text)?;
    draw_line(
        cursor,
        &WrappedLine { text, width },
        x,
        box_w,
        align,
        baseline,
        style,
    );
    Ok(())
}

/// Lay out `text` from the cursor position down, wrapping at `max_width` and
/// breaking pages between lines. Returns the position after the last line;
/// empty text leaves the cursor where it was.
pub fn flow_text(
    cursor: &mut FlowCursor,
    metrics: &dyn FontMetrics,
    text: &str,
    x: f32,
    max_width: f32,
    style: &TextStyle,
) -> Result<CursorPos, Error> {
    flow_aligned(cursor, metrics, text, x, max_width, Align::Left, style)
}

pub fn flow_aligned(
    cursor: &mut FlowCursor,
    metrics: &dyn FontMetrics,
    text: &str,
    x: f32,
    max_width: f32,
    align: Align,
    style: &TextStyle,
) -> Result<CursorPos, Error> {
    let lines = wrap_text(metrics, text, style, max_width)?;
    let line_h = line_height(metrics, style);
    let ascent = baseline_offset(metrics, style, line_h);
    for line in &lines {
        cursor.ensure_space(line_h);
        let baseline = cursor.y() + ascent;
        draw_line(cursor, line, x, max_width, align, baseline, style);
        cursor.advance(line_h);
    }
    Ok(cursor.position())
}
