/// Collapses runs of whitespace, including newlines, into single spaces.
///
/// Multi-line field values in `.bib` exports are wrapped for readability;
/// the logical value is the single-line form.
pub fn collapse_whitespace(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut was_whitespace = false;
    for chr in value.trim().chars() {
        if chr.is_whitespace() {
            if !was_whitespace {
                result.push(' ');
            }
            was_whitespace = true;
        } else {
            result.push(chr);
            was_whitespace = false;
        }
    }
    result
}

/// Splits a keywords field into individual keywords.
///
/// ACM exports separate keywords with commas. Empty segments produced by
/// stray separators are dropped.
pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Parses a year field into an integer.
///
/// Values like `2020` parse directly; values with stray annotation after the
/// number (e.g. `2020 (to appear)`) use the leading digits. Non-numeric
/// values yield `None`.
pub fn parse_year(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    let digits: &str = match trimmed.find(|c: char| !c.is_ascii_digit()) {
        Some(0) => return None,
        Some(end) => &trimmed[..end],
        None => trimmed,
    };
    digits.parse().ok()
}
