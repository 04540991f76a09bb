//! Keyword product categorization.

/// Category keywords, checked in order; the first category with a hit wins.
const KEYWORD_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "apparel",
        &["shirt", "dress", "pants", "jacket", "hoodie", "sweater", "tee", "top"],
    ),
    (
        "accessories",
        &["bag", "watch", "jewelry", "belt", "hat", "sunglasses", "bracelet"],
    ),
    ("footwear", &["shoes", "boots", "sneakers", "sandals", "heels"]),
    ("beauty", &["makeup", "skincare", "perfume", "cosmetics", "beauty"]),
    ("fitness", &["protein", "supplement", "equipment", "yoga", "workout"]),
    ("home", &["candle", "decor", "furniture", "kitchen", "bathroom"]),
];

pub const OTHER: &str = "other";

/// Assigns a category from free text fragments (title, type, tags).
///
/// Matching is case-insensitive substring matching, so `"T-Shirts"` hits
/// `shirt`.
#[must_use]
pub fn categorize<'a, I>(fragments: I) -> &'static str
where
    I: IntoIterator<Item = &'a str>,
{
    let haystack = fragments
        .into_iter()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    KEYWORD_CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map_or(OTHER, |(name, _)| name)
}
