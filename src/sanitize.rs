//! Whitespace and category normalization applied before an entry is written.

/// Collapses every run of whitespace (newlines and tabs included) into a
/// single space and trims both ends.
pub fn sanitize_single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitizes each category, drops the ones left empty and removes
/// duplicates while keeping first-occurrence order.
pub fn normalize_categories<S: AsRef<str>>(categories: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(categories.len());
    for category in categories {
        let clean = sanitize_single_line(category.as_ref());
        if !clean.is_empty() && !normalized.contains(&clean) {
            normalized.push(clean);
        }
    }
    normalized
}
