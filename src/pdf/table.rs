use crate::error::Error;
use crate::fonts::FontMetrics;

use super::cursor::FlowCursor;
use super::layout::{
    Align, WrappedLine, baseline_offset, draw_line, draw_text, line_height, wrap_text,
};
use super::surface::{Color, DrawCommand, TextStyle};

/// A fixed-position column. `x` is relative to the table's left edge.
#[derive(Clone, Debug)]
pub struct Column {
    pub title: String,
    pub x: f32,
    pub width: f32,
    pub align: Align,
}

impl Column {
    pub fn new(title: &str, x: f32, width: f32, align: Align) -> Self {
        Column {
            title: title.to_string(),
            x,
            width,
            align,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TableLayout {
    pub columns: Vec<Column>,
    /// Absolute x of the table's left edge.
    pub left: f32,
    pub header_style: TextStyle,
    pub body_style: TextStyle,
    pub header_height: f32,
    pub min_row_height: f32,
    /// Inner padding on every side of a cell.
    pub padding: f32,
}

/// A measured row: wrapped lines per cell and the height the row needs.
#[derive(Clone, Debug)]
pub struct RowLayout {
    pub cells: Vec<Vec<WrappedLine>>,
    pub height: f32,
}

/// Where a row was placed, handed to the row callback before it draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowFrame {
    /// Index across the whole table, not reset on a new page.
    pub index: usize,
    pub page: usize,
    pub top: f32,
    pub height: f32,
    pub shaded: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableReport {
    /// Page index of every header band drawn, in order.
    pub header_pages: Vec<usize>,
    pub rows: Vec<RowFrame>,
}

impl TableReport {
    pub fn pages_touched(&self) -> Vec<usize> {
        let mut pages: Vec<usize> = self
            .header_pages
            .iter()
            .copied()
            .chain(self.rows.iter().map(|r| r.page))
            .collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}

impl TableLayout {
    pub fn width(&self) -> f32 {
        self.columns
            .iter()
            .map(|c| c.x + c.width)
            .fold(0.0f32, f32::max)
    }

    fn cell_text_width(&self, column: &Column) -> f32 {
        (column.width - 2.0 * self.padding).max(0.0)
    }

    /// Wrap every cell with the same greedy wrap used for paragraphs and
    /// report the resulting row height. Missing cells are empty.
    pub fn measure_row(
        &self,
        metrics: &dyn FontMetrics,
        cells: &[String],
    ) -> Result<RowLayout, Error> {
        let line_h = line_height(metrics, &self.body_style);
        let mut max_lines = 0usize;
        let mut wrapped = Vec::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            let text = cells.get(i).map(String::as_str).unwrap_or("");
            let lines = wrap_text(metrics, text, &self.body_style, self.cell_text_width(column))?;
            max_lines = max_lines.max(lines.len());
            wrapped.push(lines);
        }
        let content_h = max_lines as f32 * line_h + 2.0 * self.padding;
        Ok(RowLayout {
            cells: wrapped,
            height: content_h.max(self.min_row_height),
        })
    }

    /// Shaded band with column titles, drawn at the cursor's y.
    pub fn draw_header(
        &self,
        cursor: &mut FlowCursor,
        metrics: &dyn FontMetrics,
    ) -> Result<(), Error> {
        let top = cursor.y();
        let width = self.width();
        cursor.draw(DrawCommand::FillRect {
            x: self.left,
            y: top,
            width,
            height: self.header_height,
            color: Color::HEADER_FILL,
        });
        let baseline = top + baseline_offset(metrics, &self.header_style, self.header_height);
        for column in &self.columns {
            draw_text(
                cursor,
                metrics,
                &column.title,
                self.left + column.x + self.padding,
                self.cell_text_width(column),
                column.align,
                baseline,
                &self.header_style,
            )?;
        }
        cursor.draw(DrawCommand::Line {
            x1: self.left,
            y1: top + self.header_height,
            x2: self.left + width,
            y2: top + self.header_height,
            width: 0.75,
            color: Color::DARK_GRAY,
        });
        Ok(())
    }

    /// Cell text top-aligned inside the padding, plus a hairline under the row.
    pub fn draw_row(
        &self,
        cursor: &mut FlowCursor,
        metrics: &dyn FontMetrics,
        row: &RowLayout,
        frame: &RowFrame,
    ) {
        let line_h = line_height(metrics, &self.body_style);
        let ascent = baseline_offset(metrics, &self.body_style, line_h);
        for (column, lines) in self.columns.iter().zip(&row.cells) {
            let x = self.left + column.x + self.padding;
            let box_w = self.cell_text_width(column);
            for (i, line) in lines.iter().enumerate() {
                let baseline = frame.top + self.padding + i as f32 * line_h + ascent;
                draw_line(cursor, line, x, box_w, column.align, baseline, &self.body_style);
            }
        }
        let bottom = frame.top + frame.height;
        cursor.draw(DrawCommand::Line {
            x1: self.left,
            y1: bottom,
            x2: self.left + self.width(),
            y2: bottom,
            width: 0.25,
            color: Color::RULE,
        });
    }
}

fn draw_header_band<H>(
    cursor: &mut FlowCursor,
    table: &TableLayout,
    header_fn: &mut H,
    report: &mut TableReport,
) -> Result<bool, Error>
where
    H: FnMut(&mut FlowCursor, &TableLayout) -> Result<(), Error>,
{
    let at_top = cursor.at_page_top();
    report.header_pages.push(cursor.page_index());
    header_fn(cursor, table)?;
    cursor.advance(table.header_height);
    Ok(at_top)
}

/// Draw a header band followed by `rows`, breaking pages between rows.
///
/// A row is never split across pages. When a row does not fit, a new page is
/// opened and `header_fn` runs again before the row. A row taller than a
/// whole fresh page is drawn anyway from the top of that page and may run
/// into the footer band. Odd global row indices get a light fill that keeps
/// alternating across page breaks.
pub fn draw_table<H, F>(
    cursor: &mut FlowCursor,
    table: &TableLayout,
    rows: &[RowLayout],
    mut header_fn: H,
    mut row_fn: F,
) -> Result<TableReport, Error>
where
    H: FnMut(&mut FlowCursor, &TableLayout) -> Result<(), Error>,
    F: FnMut(&mut FlowCursor, &TableLayout, &RowLayout, &RowFrame) -> Result<(), Error>,
{
    let mut report = TableReport::default();

    // Keep the header together with the first row.
    let first_h = rows.first().map_or(0.0, |r| r.height);
    cursor.ensure_space(table.header_height + first_h);
    let mut header_at_top = draw_header_band(cursor, table, &mut header_fn, &mut report)?;
    let mut rows_on_page = 0usize;
    let mut needs_header = false;

    for (index, row) in rows.iter().enumerate() {
        if needs_header {
            header_at_top = draw_header_band(cursor, table, &mut header_fn, &mut report)?;
            rows_on_page = 0;
            needs_header = false;
        }

        if !cursor.peek(row.height) {
            if rows_on_page > 0 || !header_at_top {
                cursor.break_page();
                header_at_top = draw_header_band(cursor, table, &mut header_fn, &mut report)?;
                rows_on_page = 0;
            }
            if !cursor.peek(row.height) {
                log::warn!(
                    "table row {index} is {:.1}pt tall, taller than the {:.1}pt left on a \
                     fresh page; drawing it anyway",
                    row.height,
                    cursor.remaining()
                );
            }
        }

        let frame = RowFrame {
            index,
            page: cursor.page_index(),
            top: cursor.y(),
            height: row.height,
            shaded: index % 2 == 1,
        };
        log::debug!(
            "TABLE row={} page={} top={:.2} row_h={:.2}",
            index,
            frame.page + 1,
            frame.top,
            frame.height
        );

        if frame.shaded {
            cursor.draw(DrawCommand::FillRect {
                x: table.left,
                y: frame.top,
                width: table.width(),
                height: frame.height,
                color: Color::ROW_FILL,
            });
        }
        row_fn(cursor, table, row, &frame)?;
        report.rows.push(frame);
        rows_on_page += 1;

        let before = cursor.advance(row.height);
        if before.page != cursor.page_index() {
            // Oversized row pushed the flow onto a new page.
            needs_header = true;
        }
    }

    Ok(report)
}

/// Measure `rows` (one string per column) and draw them with the default
/// header band and row painter.
pub fn render_table(
    cursor: &mut FlowCursor,
    metrics: &dyn FontMetrics,
    table: &TableLayout,
    rows: &[Vec<String>],
) -> Result<TableReport, Error> {
    let layouts = rows
        .iter()
        .map(|cells| table.measure_row(metrics, cells))
        .collect::<Result<Vec<_>, _>>()?;
    draw_table(
        cursor,
        table,
        &layouts,
        |cursor, table| table.draw_header(cursor, metrics),
        |cursor, table, row, frame| {
            table.draw_row(cursor, metrics, row, frame);
            Ok(())
        },
    )
}
