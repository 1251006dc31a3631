use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Fixed page size in PDF points (1/72 inch). One geometry is used for every
/// page of a document.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Reserved band at the bottom edge of every page, written only by the
    /// finalizer. Content stops at `height - footer_band`.
    pub footer_band: f32,
}

impl PageGeometry {
    pub const fn new(width: f32, height: f32, margin: f32, footer_band: f32) -> Self {
        Self {
            width,
            height,
            margin,
            footer_band,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let values = [self.width, self.height, self.margin, self.footer_band];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Configuration(format!(
                "page geometry values must be finite and non-negative: {self:?}"
            )));
        }
        if self.width <= 2.0 * self.margin {
            return Err(Error::Configuration(format!(
                "margin {} leaves no horizontal room on a page {} wide",
                self.margin, self.width
            )));
        }
        if self.footer_band >= self.height - 2.0 * self.margin {
            return Err(Error::Configuration(format!(
                "footer band {} must be smaller than the usable height {}",
                self.footer_band,
                self.height - 2.0 * self.margin
            )));
        }
        Ok(())
    }

    /// Lowest y (top-down) content may reach before a page break.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.footer_band
    }

    pub fn content_left(&self) -> f32 {
        self.margin
    }

    pub fn content_right(&self) -> f32 {
        self.width - self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Height available between the top margin and the footer band.
    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.margin
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A4,
    Letter,
}

impl PaperSize {
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (595.28, 841.89),
            PaperSize::Letter => (612.0, 792.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Quotation,
    ServiceReport,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub geometry: PageGeometry,
    pub document_title: String,
    /// Static line stamped under the page number on every page.
    pub footer_notice: String,
    pub body_size: f32,
    pub small_size: f32,
    pub heading_size: f32,
    pub title_size: f32,
    pub grand_total_size: f32,
    /// Height of the company header block on page 1; never overflow-checked.
    pub header_height: f32,
    pub logo_max_width: f32,
    pub table_header_height: f32,
    pub table_row_height: f32,
    pub cell_padding: f32,
    pub block_gap: f32,
    /// Vertical gap between the end of the table and the summary block.
    pub summary_gap: f32,
    pub summary_label_width: f32,
    pub summary_value_width: f32,
}

/// Gap between the top of the footer band and the first footer line. The
/// band's rule sits inside it.
pub(crate) const FOOTER_TEXT_OFFSET: f32 = 8.0;

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig::for_kind(DocumentKind::Quotation)
    }
}

impl LayoutConfig {
    pub fn for_kind(kind: DocumentKind) -> Self {
        let (paper, title, notice) = match kind {
            DocumentKind::Quotation => (
                PaperSize::A4,
                "QUOTATION",
                "Confidential: prepared for the addressee only. Prices valid as stated.",
            ),
            DocumentKind::ServiceReport => (
                PaperSize::Letter,
                "SERVICE REPORT",
                "Confidential: service record for the named customer.",
            ),
        };
        let (width, height) = paper.dimensions();
        LayoutConfig {
            geometry: PageGeometry::new(width, height, 40.0, 64.0),
            document_title: title.to_string(),
            footer_notice: notice.to_string(),
            body_size: 9.0,
            small_size: 7.5,
            heading_size: 10.5,
            title_size: 16.0,
            grand_total_size: 11.0,
            header_height: 84.0,
            logo_max_width: 120.0,
            table_header_height: 20.0,
            table_row_height: 18.0,
            cell_padding: 4.0,
            block_gap: 12.0,
            summary_gap: 14.0,
            summary_label_width: 120.0,
            summary_value_width: 90.0,
        }
    }

    pub fn with_paper(mut self, paper: PaperSize) -> Self {
        let (width, height) = paper.dimensions();
        self.geometry.width = width;
        self.geometry.height = height;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.geometry.validate()?;
        let sizes = [
            ("body_size", self.body_size),
            ("small_size", self.small_size),
            ("heading_size", self.heading_size),
            ("title_size", self.title_size),
            ("grand_total_size", self.grand_total_size),
        ];
        for (name, size) in sizes {
            if !size.is_finite() || size <= 0.0 {
                return Err(Error::Configuration(format!("{name} must be positive, got {size}")));
            }
        }
        let dimensions = [
            ("header_height", self.header_height),
            ("logo_max_width", self.logo_max_width),
            ("table_header_height", self.table_header_height),
            ("table_row_height", self.table_row_height),
            ("cell_padding", self.cell_padding),
            ("block_gap", self.block_gap),
            ("summary_gap", self.summary_gap),
            ("summary_label_width", self.summary_label_width),
            ("summary_value_width", self.summary_value_width),
        ];
        for (name, value) in dimensions {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Configuration(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        let content_h = self.geometry.content_height();
        if self.header_height >= content_h {
            return Err(Error::Configuration(format!(
                "header_height {} does not fit the {content_h} content height",
                self.header_height
            )));
        }
        if self.table_header_height + self.table_row_height > content_h {
            return Err(Error::Configuration(format!(
                "table header plus one row ({}) exceeds the {content_h} content height",
                self.table_header_height + self.table_row_height
            )));
        }
        if self.summary_label_width + self.summary_value_width > self.geometry.content_width() {
            return Err(Error::Configuration(
                "summary columns are wider than the content area".into(),
            ));
        }
        // Nominal check at the default 1.2 line pitch; `layout` repeats it
        // with the provider's real line height.
        let stamp = self.footer_stamp_height(1.2);
        if stamp > self.geometry.footer_band {
            return Err(Error::Configuration(format!(
                "footer band {} is shorter than the {stamp:.1} the page footer needs",
                self.geometry.footer_band
            )));
        }
        Ok(())
    }

    /// Footer band height needed for the page label and, when set, the
    /// notice line, both in `small_size` at `line_height_ratio`.
    pub fn footer_stamp_height(&self, line_height_ratio: f32) -> f32 {
        let lines = if self.footer_notice.trim().is_empty() { 1.0 } else { 2.0 };
        FOOTER_TEXT_OFFSET + lines * self.small_size * line_height_ratio
    }
}
