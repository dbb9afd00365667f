//! Catalog row parsing
//!
//! Rows come from a delimited file with at least `id` (or `sample_id`), `price` and
//! `catalog_content` columns. `catalog_content` is free text with loosely labelled
//! sections (`Item Name:`, `Bullet Point 1:`, `Product Description:`) that are
//! split with plain string search.

use csv::ByteRecord;

use super::classify::classify_product;
use crate::domain::Product;
use crate::error::{Result, WarehouseError};

const NAME_LIMIT: usize = 120;
const BULLETS_LIMIT: usize = 200;
const DESCRIPTION_LIMIT: usize = 300;
const FALLBACK_NAME_LIMIT: usize = 80;

const NAME_MARKER: &str = "item name";
const BULLET_MARKER: &str = "bullet point";
const DESCRIPTION_MARKER: &str = "product description";

/// Sections extracted from `catalog_content`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogText {
    pub name: String,
    pub bullet_points: String,
    pub description: String,
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Position just past the `:` following a marker at `marker_pos`
fn section_start(raw: &str, marker_pos: usize, marker: &str) -> usize {
    raw[marker_pos..]
        .find(':')
        .map(|p| marker_pos + p + 1)
        .unwrap_or(marker_pos + marker.len())
}

/// Split free text into name, bullet points and description
pub fn parse_catalog_content(raw: &str) -> CatalogText {
    let mut text = CatalogText::default();
    if raw.trim().is_empty() {
        return text;
    }

    // ASCII-only folding keeps byte offsets aligned with `raw`
    let folded: String = raw
        .chars()
        .map(|c| if c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect();

    let ni = folded.find(NAME_MARKER);
    let bi = folded.find(BULLET_MARKER);
    let di = folded.find(DESCRIPTION_MARKER);

    if let Some(ni) = ni {
        let start = section_start(raw, ni, NAME_MARKER);
        let end = [bi, di]
            .into_iter()
            .flatten()
            .find(|&pos| pos > start)
            .unwrap_or(raw.len());
        text.name = truncate_chars(raw[start..end].trim(), NAME_LIMIT);
    }

    if let Some(bi) = bi {
        let start = section_start(raw, bi, BULLET_MARKER);
        let end = di.filter(|&pos| pos > start).unwrap_or(raw.len());
        text.bullet_points = truncate_chars(raw[start..end].trim(), BULLETS_LIMIT);
    }

    if let Some(di) = di {
        let start = section_start(raw, di, DESCRIPTION_MARKER);
        text.description = truncate_chars(raw[start..].trim(), DESCRIPTION_LIMIT);
    }

    if text.name.is_empty() {
        text.name = truncate_chars(raw, FALLBACK_NAME_LIMIT)
            .trim()
            .replace(['\n', '\r'], " ");
    }

    text
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Columns {
    pub id: Option<usize>,
    pub price: Option<usize>,
    pub content: Option<usize>,
    pub unit: Option<usize>,
    pub value: Option<usize>,
    pub image_link: Option<usize>,
}

impl Columns {
    pub fn from_headers(headers: &ByteRecord) -> Self {
        let mut columns = Columns::default();
        for (idx, raw) in headers.iter().enumerate() {
            let name = String::from_utf8_lossy(raw).trim().to_ascii_lowercase();
            let slot = match name.trim_start_matches('\u{feff}') {
                "id" | "sample_id" => &mut columns.id,
                "price" => &mut columns.price,
                "catalog_content" => &mut columns.content,
                "unit" => &mut columns.unit,
                "value" => &mut columns.value,
                "image_link" => &mut columns.image_link,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        columns
    }

    /// Names of required columns absent from the header
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.is_none() {
            missing.push("id");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.content.is_none() {
            missing.push("catalog_content");
        }
        missing
    }

    /// Parse one data row into a product
    ///
    /// Fails with `MalformedRecord` when the id is empty or the price is missing,
    /// unparseable, negative or non-finite.
    pub fn parse(&self, record: &ByteRecord, line: u64) -> Result<Product> {
        let malformed = |reason: String| WarehouseError::MalformedRecord { line, reason };

        let id = field(record, self.id)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("missing id".to_string()))?;

        let raw_price =
            field(record, self.price).ok_or_else(|| malformed("missing price".to_string()))?;
        let price: f64 = raw_price
            .parse()
            .map_err(|_| malformed(format!("unparseable price {raw_price:?}")))?;
        if !price.is_finite() || price < 0.0 {
            return Err(malformed(format!("price out of range: {price}")));
        }

        let content = match self.content {
            Some(idx) => record
                .get(idx)
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default(),
            None => return Err(malformed("missing catalog_content".to_string())),
        };
        let text = parse_catalog_content(&content);
        let name_text = if text.name.is_empty() {
            format!("Product {id}")
        } else {
            text.name
        };
        let category = classify_product(&name_text, &text.description);

        Ok(Product {
            id,
            price,
            name_text,
            bullet_points: text.bullet_points,
            description_text: text.description,
            category,
            unit: field(record, self.unit).filter(|s| !s.is_empty()),
            value: field(record, self.value).and_then(|s| s.parse().ok()),
            image_link: field(record, self.image_link).filter(|s| !s.is_empty()),
        })
    }
}

/// Trimmed, lossily decoded cell
fn field(record: &ByteRecord, idx: Option<usize>) -> Option<String> {
    let bytes = record.get(idx?)?;
    Some(String::from_utf8_lossy(bytes).trim().to_string())
}
