//! Paginated PDF layout for quotations and service reports.
//!
//! A [`DocumentModel`] is laid out in two passes: the first flows the header,
//! counterparty block, line-item table, totals and terms onto fixed-size
//! pages; the second stamps "Page i of N" footers once the page count is
//! known. [`render`] returns the PDF bytes.

mod config;
mod error;
mod fonts;
mod model;
pub mod pdf;

pub use config::{DocumentKind, LayoutConfig, PageGeometry, PaperSize};
pub use error::Error;
pub use fonts::{FontId, FontMetrics, FontProgram, StandardFonts, TrueTypeFonts};
pub use model::{
    Cents, Counterparty, DocumentMeta, DocumentModel, FeeTotals, ImageFormat, Issuer, LineItem,
    Logo, MetaField, SecondaryFee, Totals,
};
pub use pdf::{Layout, layout, render};

use std::path::Path;
use std::time::Instant;

/// Render `model` and write the PDF to `output`.
pub fn write_document(
    model: &DocumentModel,
    config: &LayoutConfig,
    metrics: &dyn FontMetrics,
    output: &Path,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let bytes = render(model, config, metrics)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, output.display())))
    })?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}

/// `data:` URI for showing rendered bytes in a viewer without touching disk.
pub fn preview_data_uri(bytes: &[u8]) -> String {
    use base64::Engine;
    format!(
        "data:application/pdf;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
