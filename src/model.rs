use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Logo {
    /// Raw PNG or JPEG file bytes; base64 in JSON input.
    #[serde(deserialize_with = "base64_bytes")]
    pub data: Vec<u8>,
    pub format: ImageFormat,
    /// Zero means "read from the image header".
    #[serde(default)]
    pub pixel_width: u32,
    #[serde(default)]
    pub pixel_height: u32,
}

impl Logo {
    /// Pixel dimensions, falling back to the encoded image header. `None` when
    /// the data cannot be identified; the logo is then left out.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        if self.pixel_width > 0 && self.pixel_height > 0 {
            return Some((self.pixel_width, self.pixel_height));
        }
        let format = match self.format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        };
        image::ImageReader::with_format(std::io::Cursor::new(&self.data), format)
            .into_dimensions()
            .ok()
            .filter(|&(w, h)| w > 0 && h > 0)
    }
}

fn base64_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use base64::Engine;
    let encoded = String::deserialize(deserializer)?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(serde::de::Error::custom)
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Issuer {
    pub name: String,
    pub address_lines: Vec<String>,
    pub contact_lines: Vec<String>,
    pub logo: Option<Logo>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MetaField {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocumentMeta {
    pub number: String,
    pub date: String,
    /// Additional label/value rows, e.g. "Valid until" or "Technician".
    pub extra: Vec<MetaField>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Counterparty {
    /// Block heading, e.g. "Bill to" or "Site".
    pub heading: Option<String>,
    pub name: String,
    /// Free-form address; `\n` separates lines, long lines wrap.
    pub address: Option<String>,
    pub contact: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Percent, e.g. 7.5 for 7.5%.
    #[serde(default)]
    pub tax_rate: f64,
    pub line_total: f64,
}

/// A second charge category (freight, call-out, installation) listed in the
/// summary block after the item tax.
#[derive(Clone, Debug, Deserialize)]
pub struct SecondaryFee {
    pub label: String,
    pub amount: f64,
    #[serde(default)]
    pub tax_rate: f64,
}

/// Business data for one document. Produced and validated upstream; the
/// layout engine only reads it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocumentModel {
    pub issuer: Issuer,
    pub meta: DocumentMeta,
    pub counterparty: Counterparty,
    pub items: Vec<LineItem>,
    pub secondary_fee: Option<SecondaryFee>,
    /// Prefix for money values, e.g. "$" or "EUR ".
    pub currency: Option<String>,
    pub terms: Option<String>,
}

impl DocumentModel {
    pub fn from_json(input: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(input)?)
    }
}

/// Amount in hundredths of the currency unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cents(pub i64);

impl Cents {
    /// Round half away from zero to two decimals.
    pub fn from_amount(amount: f64) -> Self {
        Cents((amount * 100.0).round() as i64)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `1234567` → `"12,345.67"`, with the optional currency prefix.
    pub fn format(self, currency: Option<&str>) -> String {
        let negative = self.0 < 0;
        let abs = self.0.unsigned_abs();
        let units = (abs / 100).to_string();
        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, ch) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!(
            "{}{}{}.{:02}",
            if negative { "-" } else { "" },
            currency.unwrap_or(""),
            grouped,
            abs % 100
        )
    }
}

impl std::ops::Add for Cents {
    type Output = Cents;
    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        Cents(iter.map(|c| c.0).sum())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeTotals {
    pub label: String,
    pub amount: Cents,
    pub tax: Cents,
}

/// Derived totals. Every amount is rounded to cents before summing, so the
/// result does not depend on item order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Cents,
    pub tax: Cents,
    pub fee: Option<FeeTotals>,
    pub grand_total: Cents,
}

fn tax_on(amount: f64, rate_percent: f64) -> Cents {
    Cents::from_amount(Cents::from_amount(amount).as_f64() * rate_percent / 100.0)
}

impl Totals {
    pub fn compute(items: &[LineItem], fee: Option<&SecondaryFee>) -> Self {
        let subtotal: Cents = items.iter().map(|i| Cents::from_amount(i.line_total)).sum();
        let tax: Cents = items.iter().map(|i| tax_on(i.line_total, i.tax_rate)).sum();
        let fee = fee.map(|f| FeeTotals {
            label: f.label.clone(),
            amount: Cents::from_amount(f.amount),
            tax: tax_on(f.amount, f.tax_rate),
        });
        let fee_sum = fee.as_ref().map_or(Cents(0), |f| f.amount + f.tax);
        Totals {
            subtotal,
            tax,
            grand_total: subtotal + tax + fee_sum,
            fee,
        }
    }

    pub fn of(model: &DocumentModel) -> Self {
        Totals::compute(&model.items, model.secondary_fee.as_ref())
    }
}
