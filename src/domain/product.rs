use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum characters shown by [`Product::display_name`]
const DISPLAY_NAME_LIMIT: usize = 55;

/// Product category derived from catalog text
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    CoffeeTea,
    Beverages,
    SnacksChips,
    CandySweets,
    SpicesSeasoning,
    HealthWellness,
    DairyRefrigerated,
    CannedPackaged,
    BakingCooking,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CoffeeTea => "Coffee & Tea",
            Category::Beverages => "Beverages",
            Category::SnacksChips => "Snacks & Chips",
            Category::CandySweets => "Candy & Sweets",
            Category::SpicesSeasoning => "Spices & Seasoning",
            Category::HealthWellness => "Health & Wellness",
            Category::DairyRefrigerated => "Dairy & Refrigerated",
            Category::CannedPackaged => "Canned & Packaged",
            Category::BakingCooking => "Baking & Cooking",
            Category::Other => "Other",
        }
    }

    /// All categories, in classification priority order
    pub fn all() -> &'static [Category] {
        &[
            Self::CoffeeTea,
            Self::Beverages,
            Self::SnacksChips,
            Self::CandySweets,
            Self::SpicesSeasoning,
            Self::HealthWellness,
            Self::DairyRefrigerated,
            Self::CannedPackaged,
            Self::BakingCooking,
            Self::Other,
        ]
    }

    /// Case-insensitive lookup by display label
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A product from the catalog
///
/// Immutable once ingested. `price` is always finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub price: f64,
    pub name_text: String,
    pub bullet_points: String,
    pub description_text: String,
    pub category: Category,
    pub unit: Option<String>,
    pub value: Option<f64>,
    pub image_link: Option<String>,
}

impl Product {
    /// Name truncated for table display
    pub fn display_name(&self) -> String {
        if self.name_text.chars().count() > DISPLAY_NAME_LIMIT {
            let head: String = self.name_text.chars().take(DISPLAY_NAME_LIMIT - 3).collect();
            format!("{head}...")
        } else {
            self.name_text.clone()
        }
    }

    /// Price formatted as `$1,234.56`
    pub fn price_display(&self) -> String {
        format_price(self.price)
    }

    pub fn is_priced(&self) -> bool {
        self.price > 0.0
    }
}

/// Format a price with a dollar sign, thousands separators and two decimals
pub fn format_price(price: f64) -> String {
    let fixed = format!("{:.2}", price.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}
