/// Split text into approximate tokens (words).
///
/// The text is cut into paragraphs on `separator` first, then each
/// paragraph is split on whitespace runs. An empty separator, or one that
/// never occurs, leaves the whole text as a single paragraph.
pub fn tokenize<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.split_whitespace().collect();
    }

    text.split(separator)
        .flat_map(str::split_whitespace)
        .collect()
}

/// Estimate token count for a piece of text.
///
/// Uses the ~4 characters per token heuristic for English text. This is a
/// quick size estimate and is unrelated to [`tokenize`], which counts words
/// for chunk sizing; the two numbers can disagree.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}
