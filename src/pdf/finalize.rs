use crate::config::FOOTER_TEXT_OFFSET;
use crate::error::Error;
use crate::fonts::FontMetrics;

use super::layout::{Align, aligned_x, baseline_offset, collapse_whitespace, line_height};
use super::surface::{Color, DrawCommand, FinishedDocument, FooterStamp, Surface, TextStyle};

pub struct FooterStyle<'a> {
    pub notice: &'a str,
    pub label_style: TextStyle,
    pub notice_style: TextStyle,
}

impl FooterStyle<'_> {
    fn has_notice(&self) -> bool {
        !self.notice.trim().is_empty()
    }

    /// Height the stamp takes below the top of the footer band.
    pub fn height(&self, metrics: &dyn FontMetrics) -> f32 {
        let mut h = FOOTER_TEXT_OFFSET + line_height(metrics, &self.label_style);
        if self.has_notice() {
            h += line_height(metrics, &self.notice_style);
        }
        h
    }
}

fn centered_text(
    metrics: &dyn FontMetrics,
    text: &str,
    left: f32,
    width: f32,
    baseline: f32,
    style: &TextStyle,
) -> Result<DrawCommand, Error> {
    let text = collapse_whitespace(text);
    let w = metrics.text_width(style.font, style.size, &text)?;
    Ok(DrawCommand::Text {
        x: aligned_x(Align::Center, left, width, w),
        baseline,
        text,
        style: *style,
    })
}

/// Second pass: with the page count known, stamp every page's footer slot
/// with "Page i of N" and the notice line. The lines are centered in the
/// band below its rule and never overflow-checked; `layout` rejects bands
/// shorter than [`FooterStyle::height`]. Consumes the surface, so a document
/// is finalized exactly once.
pub fn finalize(
    surface: Surface,
    metrics: &dyn FontMetrics,
    footer: &FooterStyle<'_>,
    title: &str,
) -> Result<FinishedDocument, Error> {
    let (geometry, mut pages) = surface.into_pages();
    let total = pages.len();
    let band_top = geometry.content_bottom();
    let left = geometry.content_left();
    let width = geometry.content_width();
    let label_h = line_height(metrics, &footer.label_style);
    let notice_h = line_height(metrics, &footer.notice_style);
    let slack = (geometry.footer_band - footer.height(metrics)).max(0.0);
    let label_top = band_top + FOOTER_TEXT_OFFSET + slack / 2.0;
    let label_baseline = label_top + baseline_offset(metrics, &footer.label_style, label_h);
    let notice_baseline =
        label_top + label_h + baseline_offset(metrics, &footer.notice_style, notice_h);

    for page in &mut pages {
        let page_label = format!("Page {} of {}", page.index + 1, total);
        let mut commands = vec![
            DrawCommand::Line {
                x1: left,
                y1: band_top + 4.0,
                x2: left + width,
                y2: band_top + 4.0,
                width: 0.5,
                color: Color::RULE,
            },
            centered_text(metrics, &page_label, left, width, label_baseline, &footer.label_style)?,
        ];
        if footer.has_notice() {
            commands.push(centered_text(
                metrics,
                footer.notice,
                left,
                width,
                notice_baseline,
                &footer.notice_style,
            )?);
        }
        page.footer = Some(FooterStamp {
            page_label,
            notice: footer.notice.to_string(),
            commands,
        });
    }

    log::debug!("finalized {total} page(s)");
    Ok(FinishedDocument {
        geometry,
        pages,
        title: title.to_string(),
    })
}
