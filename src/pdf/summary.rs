use crate::error::Error;
use crate::fonts::FontMetrics;
use crate::model::{Cents, Totals};

use super::cursor::{CursorPos, FlowCursor};
use super::layout::{Align, baseline_offset, draw_text, line_height};
use super::surface::{Color, DrawCommand, TextStyle};

const LABEL_GAP: f32 = 8.0;
const DIVIDER_SPACE: f32 = 6.0;

pub struct SummaryLayout<'a> {
    /// Right edge of the value column.
    pub right: f32,
    pub label_width: f32,
    pub value_width: f32,
    pub body_style: TextStyle,
    pub total_style: TextStyle,
    pub currency: Option<&'a str>,
}

fn summary_rows(totals: &Totals) -> Vec<(String, Cents)> {
    let mut rows = vec![
        ("Subtotal".to_string(), totals.subtotal),
        ("Tax".to_string(), totals.tax),
    ];
    if let Some(fee) = &totals.fee {
        rows.push((fee.label.clone(), fee.amount));
        rows.push((format!("{} tax", fee.label), fee.tax));
    }
    rows
}

impl SummaryLayout<'_> {
    pub fn height(&self, metrics: &dyn FontMetrics, totals: &Totals) -> f32 {
        let rows = summary_rows(totals).len() as f32;
        rows * line_height(metrics, &self.body_style)
            + 2.0 * DIVIDER_SPACE
            + line_height(metrics, &self.total_style)
    }

    fn draw_pair(
        &self,
        cursor: &mut FlowCursor,
        metrics: &dyn FontMetrics,
        label: &str,
        value: Cents,
        style: &TextStyle,
    ) -> Result<(), Error> {
        let line_h = line_height(metrics, style);
        let baseline = cursor.y() + baseline_offset(metrics, style, line_h);
        let value_x = self.right - self.value_width;
        let label_x = value_x - self.label_width;
        draw_text(
            cursor,
            metrics,
            label,
            label_x,
            self.label_width - LABEL_GAP,
            Align::Right,
            baseline,
            style,
        )?;
        draw_text(
            cursor,
            metrics,
            &value.format(self.currency),
            value_x,
            self.value_width,
            Align::Right,
            baseline,
            style,
        )?;
        cursor.advance(line_h);
        Ok(())
    }
}

/// Right-aligned label/value pairs: subtotal, tax, the optional fee and its
/// tax, a divider and the grand total. The block is kept on one page.
pub fn draw_summary(
    cursor: &mut FlowCursor,
    metrics: &dyn FontMetrics,
    totals: &Totals,
    layout: &SummaryLayout<'_>,
) -> Result<CursorPos, Error> {
    cursor.ensure_space(layout.height(metrics, totals));

    for (label, value) in summary_rows(totals) {
        layout.draw_pair(cursor, metrics, &label, value, &layout.body_style)?;
    }

    cursor.advance(DIVIDER_SPACE);
    let y = cursor.y();
    cursor.draw(DrawCommand::Line {
        x1: layout.right - layout.value_width - layout.label_width,
        y1: y,
        x2: layout.right,
        y2: y,
        width: 0.75,
        color: Color::DARK_GRAY,
    });
    cursor.advance(DIVIDER_SPACE);

    layout.draw_pair(
        cursor,
        metrics,
        "Grand total",
        totals.grand_total,
        &layout.total_style,
    )?;
    Ok(cursor.position())
}
