pub mod blocks;
pub mod cursor;
pub mod finalize;
pub mod layout;
pub mod summary;
pub mod surface;
pub mod table;
pub mod writer;

use crate::config::LayoutConfig;
use crate::error::Error;
use crate::fonts::{FontId, FontMetrics};
use crate::model::{Cents, DocumentModel, LineItem, Totals};

use cursor::{CursorPos, FlowCursor};
use finalize::{FooterStyle, finalize};
use layout::{Align, flow_text, line_height};
use summary::{SummaryLayout, draw_summary};
use surface::{Color, FinishedDocument, TextStyle};
use table::{Column, TableLayout, TableReport, render_table};

/// Fixed line-item columns as fractions of the content width:
/// description, quantity, unit price, tax %, line total.
const ITEM_COLUMNS: [(&str, f32, Align); 5] = [
    ("Description", 0.46, Align::Left),
    ("Qty", 0.10, Align::Right),
    ("Unit price", 0.16, Align::Right),
    ("Tax", 0.10, Align::Right),
    ("Amount", 0.18, Align::Right),
];

pub fn item_table_layout(config: &LayoutConfig) -> TableLayout {
    let geometry = &config.geometry;
    let total_w = geometry.content_width();
    let mut x = 0.0f32;
    let columns = ITEM_COLUMNS
        .iter()
        .map(|&(title, share, align)| {
            let col = Column::new(title, x, total_w * share, align);
            x += col.width;
            col
        })
        .collect();
    TableLayout {
        columns,
        left: geometry.content_left(),
        header_style: TextStyle::new(FontId::Bold, config.body_size),
        body_style: TextStyle::new(FontId::Regular, config.body_size),
        header_height: config.table_header_height,
        min_row_height: config.table_row_height,
        padding: config.cell_padding,
    }
}

fn format_quantity(q: f64) -> String {
    if q.fract() == 0.0 && q.abs() < 1e15 {
        format!("{}", q as i64)
    } else {
        let s = format!("{q:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn format_rate(rate: f64) -> String {
    format!("{}%", format_quantity(rate))
}

fn item_cells(item: &LineItem, currency: Option<&str>) -> Vec<String> {
    vec![
        item.description.clone(),
        format_quantity(item.quantity),
        Cents::from_amount(item.unit_price).format(currency),
        format_rate(item.tax_rate),
        Cents::from_amount(item.line_total).format(currency),
    ]
}

fn draw_terms(
    cursor: &mut FlowCursor,
    metrics: &dyn FontMetrics,
    terms: Option<&str>,
    config: &LayoutConfig,
) -> Result<CursorPos, Error> {
    let Some(terms) = terms.filter(|t| !t.trim().is_empty()) else {
        return Ok(cursor.position());
    };
    let left = cursor.geometry().content_left();
    let width = cursor.geometry().content_width();
    let heading_style = TextStyle::new(FontId::Bold, config.body_size);
    let body_style =
        TextStyle::new(FontId::Regular, config.small_size).with_color(Color::DARK_GRAY);

    cursor.advance(config.block_gap);
    // Keep the heading with the first line of the paragraph.
    cursor.ensure_space(line_height(metrics, &heading_style) + line_height(metrics, &body_style));
    flow_text(cursor, metrics, "Terms and conditions", left, width, &heading_style)?;
    flow_text(cursor, metrics, terms, left, width, &body_style)
}

/// Result of the first layout pass, kept for inspection.
#[derive(Debug)]
pub struct Layout {
    pub document: FinishedDocument,
    pub table: TableReport,
    pub totals: Totals,
}

/// Lay out `model` onto pages and stamp the footers, without serializing.
pub fn layout(
    model: &DocumentModel,
    config: &LayoutConfig,
    metrics: &dyn FontMetrics,
) -> Result<Layout, Error> {
    config.validate()?;
    let footer = FooterStyle {
        notice: &config.footer_notice,
        label_style: TextStyle::new(FontId::Regular, config.small_size),
        notice_style: TextStyle::new(FontId::Regular, config.small_size)
            .with_color(Color::MID_GRAY),
    };
    let stamp_h = footer.height(metrics);
    if stamp_h > config.geometry.footer_band {
        return Err(Error::Configuration(format!(
            "footer band {} is shorter than the {stamp_h:.1} the page footer needs",
            config.geometry.footer_band
        )));
    }
    let currency = model.currency.as_deref();
    let mut cursor = FlowCursor::new(config.geometry);

    let stage = |name: &str, pos: CursorPos| {
        log::debug!("{name} ends on page {} at y={:.1}", pos.page + 1, pos.y);
    };

    stage(
        "header",
        blocks::draw_issuer_header(&mut cursor, metrics, &model.issuer, config)?,
    );
    stage(
        "metadata",
        blocks::draw_metadata(&mut cursor, metrics, &model.meta, config)?,
    );
    stage(
        "counterparty",
        blocks::draw_counterparty(&mut cursor, metrics, &model.counterparty, config)?,
    );

    let rows: Vec<Vec<String>> = model.items.iter().map(|i| item_cells(i, currency)).collect();
    let table = render_table(&mut cursor, metrics, &item_table_layout(config), &rows)?;
    stage("table", cursor.position());

    cursor.advance(config.summary_gap);
    let totals = Totals::of(model);
    let summary = SummaryLayout {
        right: config.geometry.content_right(),
        label_width: config.summary_label_width,
        value_width: config.summary_value_width,
        body_style: TextStyle::new(FontId::Regular, config.body_size),
        total_style: TextStyle::new(FontId::Bold, config.grand_total_size),
        currency,
    };
    stage("summary", draw_summary(&mut cursor, metrics, &totals, &summary)?);
    stage(
        "terms",
        draw_terms(&mut cursor, metrics, model.terms.as_deref(), config)?,
    );

    let title = match model.meta.number.trim() {
        "" => config.document_title.clone(),
        number => format!("{} {}", config.document_title, number),
    };
    let document = finalize(cursor.into_surface(), metrics, &footer, &title)?;

    Ok(Layout {
        document,
        table,
        totals,
    })
}

/// Build the complete document and return the PDF bytes.
pub fn render(
    model: &DocumentModel,
    config: &LayoutConfig,
    metrics: &dyn FontMetrics,
) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let laid_out = layout(model, config, metrics)?;
    let t_layout = t0.elapsed();

    let bytes = writer::write_pdf(&laid_out.document, metrics, model.issuer.logo.as_ref())?;

    log::info!(
        "Render phases: layout={:.1}ms, write={:.1}ms ({} rows on {} pages)",
        t_layout.as_secs_f64() * 1000.0,
        (t0.elapsed() - t_layout).as_secs_f64() * 1000.0,
        laid_out.table.rows.len(),
        laid_out.document.page_count(),
    );
    Ok(bytes)
}
