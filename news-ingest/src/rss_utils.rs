/// Feed and article utility functions for the ingester

/// URL utilities for feeds and article links
pub mod url {
    use url::Url;

    /// Extract domain from URL, without a leading `www.`
    pub fn extract_domain(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        let domain = url.domain()?;
        Some(domain.trim_start_matches("www.").to_string())
    }

    /// Validate that a link is an absolute http(s) URL with a host
    pub fn is_valid_http_url(url_str: &str) -> bool {
        match Url::parse(url_str) {
            Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
            Err(_) => false,
        }
    }

    /// Hide the password component of a connection string before logging it
    pub fn redact_password(url_str: &str) -> String {
        match Url::parse(url_str) {
            Ok(mut url) if url.password().is_some() => {
                let _ = url.set_password(Some("***"));
                url.to_string()
            }
            _ => url_str.to_string(),
        }
    }
}

/// Text utilities
pub mod text {
    /// Keep at most `max_chars` characters, never splitting a code point
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Collapse runs of whitespace into single spaces
    pub fn normalize_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Shorten a title for log lines
    pub fn preview(text: &str, max_chars: usize) -> String {
        let cut = truncate_chars(text, max_chars);
        if cut.len() < text.len() {
            format!("{}...", cut)
        } else {
            cut.to_string()
        }
    }
}
