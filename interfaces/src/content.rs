/// Marker placed between the summary and the key stats in `content_summary`.
pub const KEY_STATS_SEPARATOR: &str = "📊 KEY STATS: ";

/// Builds `"{summary}\n\n{KEY_STATS_SEPARATOR}{key_stats}"`.
pub fn compose_content_summary(summary: &str, key_stats: &str) -> String {
    format!("{}\n\n{}{}", summary, KEY_STATS_SEPARATOR, key_stats)
}

/// Inverse of `compose_content_summary`.
///
/// Splits on the last occurrence of the separator so a summary that happens
/// to quote the marker still round-trips. Returns `None` for rows written
/// without the template.
pub fn split_content_summary(content_summary: &str) -> Option<(&str, &str)> {
    let marker = format!("\n\n{}", KEY_STATS_SEPARATOR);
    let idx = content_summary.rfind(&marker)?;
    let summary = &content_summary[..idx];
    let key_stats = &content_summary[idx + marker.len()..];
    Some((summary, key_stats))
}

/// Returns the inner text of every `{{...}}` highlight span, in order.
pub fn highlight_spans(key_stats: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut rest = key_stats;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                spans.push(&after[..end]);
                rest = &after[end + 2..];
            }
            None => break,
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_matches_template_exactly() {
        let composed = compose_content_summary("S", "K");
        assert_eq!(composed, format!("S\n\n{}K", KEY_STATS_SEPARATOR));
    }

    #[test]
    fn split_recovers_both_halves() {
        let summary = "Nvidia beat estimates.\nShares rose after hours.";
        let key_stats = "Revenue reached {{$35.1B}}, up {{94%}} year over year.";
        let composed = compose_content_summary(summary, key_stats);

        assert_eq!(split_content_summary(&composed), Some((summary, key_stats)));
    }

    #[test]
    fn split_handles_empty_halves() {
        let composed = compose_content_summary("", "");
        assert_eq!(split_content_summary(&composed), Some(("", "")));
    }

    #[test]
    fn split_rejects_untemplated_text() {
        assert_eq!(split_content_summary("### plain markdown summary"), None);
    }

    #[test]
    fn highlight_spans_are_extracted_in_order() {
        let spans = highlight_spans("Raised {{$1.5B}} at a {{$20B}} valuation, {{unclosed");
        assert_eq!(spans, vec!["$1.5B", "$20B"]);
    }
}
