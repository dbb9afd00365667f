//! Keyword-based category classification
//!
//! The rule table is static and ordered: the first category with a keyword found
//! (as a substring of the lowercased text) wins. Text matching nothing is `Other`.

use crate::domain::Category;

/// Ordered keyword rules, first match wins
pub const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::CoffeeTea,
        &["coffee", "tea", "espresso", "latte", "brew", "chai", "matcha"],
    ),
    (
        Category::Beverages,
        &["water", "juice", "soda", "drink", "beverage", "cola", "lemonade"],
    ),
    (
        Category::SnacksChips,
        &["chip", "snack", "pretzel", "popcorn", "cracker", "cookie", "nuts"],
    ),
    (
        Category::CandySweets,
        &["candy", "chocolate", "gum", "mint", "sweet", "gummy", "caramel"],
    ),
    (
        Category::SpicesSeasoning,
        &["spice", "seasoning", "pepper", "salt", "cinnamon", "cumin", "paprika"],
    ),
    (
        Category::HealthWellness,
        &["vitamin", "supplement", "protein", "organic", "health", "probiotic"],
    ),
    (
        Category::DairyRefrigerated,
        &["milk", "cheese", "yogurt", "butter", "cream", "dairy", "egg"],
    ),
    (
        Category::CannedPackaged,
        &["canned", "soup", "sauce", "paste", "jar", "broth", "stock"],
    ),
    (
        Category::BakingCooking,
        &["flour", "sugar", "baking", "yeast", "vanilla", "cocoa", "mix"],
    ),
];

/// Classify a single piece of text
pub fn classify(text: &str) -> Category {
    let lower = text.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

/// Classify a product from its name, falling back to the description
pub fn classify_product(name_text: &str, description_text: &str) -> Category {
    match classify(name_text) {
        Category::Other => classify(description_text),
        category => category,
    }
}
