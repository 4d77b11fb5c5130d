//! Keyword heuristics for genre and holiday classification of lookup
//! results. Deliberately crude; the user can always edit the record.

const FICTION_KEYWORDS: &[&str] = &[
    "fiction",
    "novel",
    "fantasy",
    "science fiction",
    "mystery",
    "thriller",
    "romance",
];

const NON_FICTION_KEYWORDS: &[&str] = &[
    "biography",
    "history",
    "science",
    "self-help",
    "business",
    "memoir",
    "reference",
];

// Checked in order; the first holiday with a keyword hit wins.
const HOLIDAY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Christmas",
        &["christmas", "santa", "xmas", "holiday", "winter wonderland", "reindeer", "snowman"],
    ),
    (
        "Halloween",
        &["halloween", "spooky", "ghost", "witch", "pumpkin", "haunted"],
    ),
    ("Easter", &["easter", "bunny", "egg"]),
    ("Thanksgiving", &["thanksgiving", "turkey", "pilgrim"]),
    ("Summer", &["summer", "beach", "vacation", "sun"]),
    ("Valentine", &["valentine", "love", "romance", "heart"]),
    ("New Year", &["new year", "resolution"]),
];

/// Reduce a category list to a coarse Fiction/Non-fiction label, defaulting
/// to Fiction when the signals are absent or mixed.
pub fn classify_genre(categories: &[String]) -> String {
    let haystack = categories
        .iter()
        .map(|c| c.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let has_fiction = FICTION_KEYWORDS.iter().any(|k| haystack.contains(k));
    let has_non_fiction = NON_FICTION_KEYWORDS.iter().any(|k| haystack.contains(k));

    if has_non_fiction && !has_fiction {
        return "Non-fiction".to_string();
    }
    "Fiction".to_string()
}

/// Scan title and description for holiday/season signals.
pub fn detect_holiday_category(title: &str, description: &str) -> Option<String> {
    let haystack = format!("{} {}", title, description).to_lowercase();

    for (holiday, keywords) in HOLIDAY_KEYWORDS {
        if keywords.iter().any(|k| haystack.contains(k)) {
            return Some(holiday.to_string());
        }
    }
    None
}
