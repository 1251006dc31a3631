use crate::config::LayoutConfig;
use crate::error::Error;
use crate::fonts::{FontId, FontMetrics};
use crate::model::{Counterparty, DocumentMeta, Issuer};

use super::cursor::{CursorPos, FlowCursor};
use super::layout::{Align, baseline_offset, draw_text, flow_text, line_height};
use super::surface::{Color, DrawCommand, TextStyle};

const META_LABEL_WIDTH: f32 = 80.0;

/// Logo box and company block on page 1. The block has a fixed height and is
/// always the first thing drawn, so it skips overflow checks; lines that do
/// not fit the block are left out.
pub fn draw_issuer_header(
    cursor: &mut FlowCursor,
    metrics: &dyn FontMetrics,
    issuer: &Issuer,
    config: &LayoutConfig,
) -> Result<CursorPos, Error> {
    let geometry = *cursor.geometry();
    let top = cursor.y();
    let left = geometry.content_left();
    let right = geometry.content_right();
    let block_h = config.header_height;

    if let Some((px_w, px_h)) = issuer.logo.as_ref().and_then(|logo| logo.dimensions()) {
        let max_h = (block_h - 10.0).max(0.0);
        let scale = (config.logo_max_width / px_w as f32).min(max_h / px_h as f32);
        cursor.draw(DrawCommand::Image {
            x: left,
            y: top,
            width: px_w as f32 * scale,
            height: px_h as f32 * scale,
        });
    } else if issuer.logo.is_some() {
        log::warn!("Logo image could not be read, leaving it out");
    }

    let name_style = TextStyle::new(FontId::Bold, config.heading_size);
    let detail_style =
        TextStyle::new(FontId::Regular, config.small_size).with_color(Color::DARK_GRAY);
    let text_w = geometry.content_width() / 2.0;
    let text_x = right - text_w;

    let mut y = top;
    let lines = std::iter::once((issuer.name.as_str(), name_style)).chain(
        issuer
            .address_lines
            .iter()
            .chain(&issuer.contact_lines)
            .map(|l| (l.as_str(), detail_style)),
    );
    for (text, style) in lines {
        let line_h = line_height(metrics, &style);
        if y + line_h > top + block_h - 6.0 {
            log::debug!("header block full, dropping line {text:?}");
            break;
        }
        let baseline = y + baseline_offset(metrics, &style, line_h);
        draw_text(cursor, metrics, text, text_x, text_w, Align::Right, baseline, &style)?;
        y += line_h;
    }

    let rule_y = top + block_h - 3.0;
    cursor.draw(DrawCommand::Line {
        x1: left,
        y1: rule_y,
        x2: right,
        y2: rule_y,
        width: 1.0,
        color: Color::DARK_GRAY,
    });
    cursor.advance(block_h);
    Ok(cursor.position())
}

/// Document title followed by number, date and any extra label/value rows.
/// Empty values are skipped.
pub fn draw_metadata(
    cursor: &mut FlowCursor,
    metrics: &dyn FontMetrics,
    meta: &DocumentMeta,
    config: &LayoutConfig,
) -> Result<CursorPos, Error> {
    let left = cursor.geometry().content_left();
    let width = cursor.geometry().content_width();

    let title_style = TextStyle::new(FontId::Bold, config.title_size);
    flow_text(cursor, metrics, &config.document_title, left, width, &title_style)?;

    let label_style = TextStyle::new(FontId::Bold, config.body_size);
    let value_style = TextStyle::new(FontId::Regular, config.body_size);
    let pairs = [("Number", meta.number.as_str()), ("Date", meta.date.as_str())]
        .into_iter()
        .chain(meta.extra.iter().map(|f| (f.label.as_str(), f.value.as_str())))
        .filter(|(_, value)| !value.trim().is_empty());

    let line_h = line_height(metrics, &value_style);
    for (label, value) in pairs {
        cursor.ensure_space(line_h);
        let baseline = cursor.y() + baseline_offset(metrics, &value_style, line_h);
        draw_text(
            cursor,
            metrics,
            label,
            left,
            META_LABEL_WIDTH,
            Align::Left,
            baseline,
            &label_style,
        )?;
        let value_x = left + META_LABEL_WIDTH;
        flow_text(cursor, metrics, value, value_x, width - META_LABEL_WIDTH, &value_style)?;
    }

    cursor.advance(config.block_gap);
    Ok(cursor.position())
}

/// Customer/site block: optional heading, name, wrapped address and contact.
pub fn draw_counterparty(
    cursor: &mut FlowCursor,
    metrics: &dyn FontMetrics,
    party: &Counterparty,
    config: &LayoutConfig,
) -> Result<CursorPos, Error> {
    let address = party.address.as_deref().unwrap_or("");
    let contact = party.contact.as_deref().unwrap_or("");
    if party.name.trim().is_empty() && address.trim().is_empty() && contact.trim().is_empty() {
        return Ok(cursor.position());
    }

    let left = cursor.geometry().content_left();
    let width = cursor.geometry().content_width() / 2.0;
    let heading_style =
        TextStyle::new(FontId::Bold, config.small_size).with_color(Color::MID_GRAY);
    let name_style = TextStyle::new(FontId::Bold, config.body_size);
    let body_style = TextStyle::new(FontId::Regular, config.body_size);

    // Keep the heading with the name.
    cursor.ensure_space(line_height(metrics, &heading_style) + line_height(metrics, &name_style));
    if let Some(heading) = &party.heading {
        flow_text(cursor, metrics, &heading.to_uppercase(), left, width, &heading_style)?;
    }
    flow_text(cursor, metrics, &party.name, left, width, &name_style)?;
    flow_text(cursor, metrics, address, left, width, &body_style)?;
    flow_text(cursor, metrics, contact, left, width, &body_style)?;

    cursor.advance(config.block_gap);
    Ok(cursor.position())
}
