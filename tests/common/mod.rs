#![allow(dead_code)]

use std::path::PathBuf;

use docket_pdf::pdf::surface::{DrawCommand, Page};
use docket_pdf::{
    Counterparty, DocumentMeta, DocumentModel, Error, FontId, FontMetrics, Issuer, LineItem,
};

/// Every character is `ratio * size` wide, so expected positions can be
/// computed by hand.
pub struct FixedMetrics {
    pub ratio: f32,
}

impl FixedMetrics {
    pub const fn new() -> Self {
        FixedMetrics { ratio: 0.5 }
    }
}

impl FontMetrics for FixedMetrics {
    fn text_width(&self, font: FontId, size: f32, text: &str) -> Result<f32, Error> {
        if text.contains('\u{2603}') {
            return Err(Error::MetricsUnavailable {
                font: font.name().to_string(),
                text: text.to_string(),
            });
        }
        Ok(text.chars().count() as f32 * self.ratio * size)
    }
}

pub fn item(description: &str, quantity: f64, unit_price: f64, tax_rate: f64) -> LineItem {
    LineItem {
        description: description.to_string(),
        quantity,
        unit_price,
        tax_rate,
        line_total: quantity * unit_price,
    }
}

pub fn numbered_items(prefix: &str, count: usize) -> Vec<LineItem> {
    (0..count)
        .map(|i| item(&format!("{prefix} item {i}"), 1.0 + i as f64, 12.5, 10.0))
        .collect()
}

pub fn sample_model(items: Vec<LineItem>) -> DocumentModel {
    DocumentModel {
        issuer: Issuer {
            name: "Northwind Field Services".into(),
            address_lines: vec!["12 Harbour Road".into(), "Portsmouth PO1 2AB".into()],
            contact_lines: vec!["service@northwind.example".into()],
            logo: None,
        },
        meta: DocumentMeta {
            number: "Q-2026-0042".into(),
            date: "2026-10-19".into(),
            extra: vec![],
        },
        counterparty: Counterparty {
            heading: Some("Bill to".into()),
            name: "Contoso Facilities Ltd".into(),
            address: Some("Unit 4, Riverside Park\nSouthampton SO14 3XY".into()),
            contact: None,
        },
        items,
        secondary_fee: None,
        currency: Some("$".into()),
        terms: Some("Payment due within 30 days of invoice. Prices exclude travel.".into()),
    }
}

/// Text commands of a page's body, in drawing order.
pub fn page_texts(page: &Page) -> Vec<&str> {
    page.texts().collect()
}

pub fn text_commands(page: &Page) -> Vec<(f32, f32, &str)> {
    page.commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text {
                x, baseline, text, ..
            } => Some((*x, *baseline, text.as_str())),
            _ => None,
        })
        .collect()
}

/// Output directory for files written by tests.
pub fn output_dir() -> PathBuf {
    let dir = PathBuf::from("tests/output");
    std::fs::create_dir_all(&dir).ok();
    dir
}
