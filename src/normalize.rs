// Search-string normalization
// Editors sprinkle zero-width characters through the text for internal
// bookkeeping; searches found against a cleaned-up view must be mapped
// back to indices in the raw text.

/// Returns true for the zero-width formatting characters the editor inserts
/// (ZWSP, ZWNJ, ZWJ and the BOM when it appears mid-text).
pub fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

/// Remove all zero-width formatting characters.
pub fn strip_zero_width(text: &str) -> String {
    text.chars().filter(|c| !is_zero_width(*c)).collect()
}

/// Remove all whitespace.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Produce the spellings of `query` a search pass should try, in order:
/// the query as typed, then trimmed, then with zero-width characters
/// removed, then with all whitespace removed. Duplicates are dropped,
/// keeping the first occurrence; forms that come out empty are skipped.
/// An empty query yields no variants.
pub fn generate_search_variants(query: &str) -> Vec<String> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut variants: Vec<String> = vec![query.to_string()];
    let push = |variants: &mut Vec<String>, candidate: String| {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    };

    push(&mut variants, query.trim().to_string());
    push(&mut variants, strip_zero_width(query));
    push(&mut variants, strip_whitespace(query));

    variants
}

/// Map a character index in the zero-width-stripped view of `original`
/// back to a character index in `original` itself.
///
/// Walks `original` counting visible (non-zero-width) characters until
/// `normalized_index` of them have passed, then skips over any zero-width
/// run so the returned index lands on visible content. Returns `None`
/// when `original` ends before enough visible characters were seen.
pub fn find_original_position(original: &str, normalized_index: usize) -> Option<usize> {
    let chars: Vec<char> = original.chars().collect();
    let mut original_index = 0;
    let mut visible_count = 0;

    while original_index < chars.len() && visible_count < normalized_index {
        if !is_zero_width(chars[original_index]) {
            visible_count += 1;
        }
        original_index += 1;
    }

    if visible_count < normalized_index {
        return None;
    }

    while original_index < chars.len() && is_zero_width(chars[original_index]) {
        original_index += 1;
    }
    Some(original_index)
}
