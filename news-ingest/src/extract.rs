//! Main-content extraction for publisher pages.
//!
//! Title: `og:title`, then the first `<h1>`, then `<title>`, then the caller's
//! fallback. Empty when none of those is present.
//!
//! Body: JSON-LD `articleBody` when a page ships one, otherwise the
//! paragraphs of the first of `<article>`, `<main>` and `<body>` that yields any
//! readable text. Paragraphs nested in page chrome are ignored and very short
//! ones are treated as boilerplate.

use crate::rss_utils::text::normalize_whitespace;
use crate::types::{IngestError, RawArticle, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const CONTAINERS: [&str; 3] = ["article", "main", "body"];
// `form` is absent: some sites wrap the whole page in one.
const BOILERPLATE_TAGS: [&str; 7] = [
    "nav", "header", "footer", "aside", "script", "style", "noscript",
];
const MIN_PARAGRAPH_CHARS: usize = 40;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| IngestError::Extraction(format!("invalid selector {}: {:?}", css, e)))
}

pub fn extract_article(html: &str, fallback_title: Option<&str>) -> Result<RawArticle> {
    let doc = Html::parse_document(html);

    // An empty title is left for the caller to fill from the feed entry.
    let title = extract_title(&doc)?
        .or_else(|| fallback_title.map(|t| t.trim().to_string()))
        .unwrap_or_default();

    let body = match extract_json_ld_body(&doc)? {
        Some(body) => body,
        None => extract_paragraph_body(&doc)?,
    };

    if body.trim().is_empty() {
        return Err(IngestError::Extraction("empty article body".to_string()));
    }

    Ok(RawArticle { title, body })
}

fn extract_title(doc: &Html) -> Result<Option<String>> {
    let og = selector("meta[property='og:title']")?;
    if let Some(content) = doc
        .select(&og)
        .filter_map(|m| m.value().attr("content"))
        .map(normalize_whitespace)
        .find(|t| !t.is_empty())
    {
        return Ok(Some(content));
    }

    for css in ["h1", "title"] {
        let sel = selector(css)?;
        if let Some(text) = doc
            .select(&sel)
            .map(|n| normalize_whitespace(&n.text().collect::<String>()))
            .find(|t| !t.is_empty())
        {
            return Ok(Some(text));
        }
    }

    Ok(None)
}

fn extract_json_ld_body(doc: &Html) -> Result<Option<String>> {
    let script_selector = selector("script[type='application/ld+json']")?;

    for script in doc.select(&script_selector) {
        let raw = script.text().collect::<String>();
        let json = match serde_json::from_str::<serde_json::Value>(raw.trim()) {
            Ok(json) => json,
            Err(e) => {
                debug!("Ignoring unparseable JSON-LD block: {}", e);
                continue;
            }
        };

        if let Some(body) = find_article_body(&json) {
            return Ok(Some(body));
        }
    }

    Ok(None)
}

fn find_article_body(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Object(obj) => {
            if let Some(body) = obj.get("articleBody").and_then(|b| b.as_str()) {
                let body = body.trim();
                if !body.is_empty() {
                    return Some(body.to_string());
                }
            }
            obj.get("@graph").and_then(find_article_body)
        }
        serde_json::Value::Array(items) => items.iter().find_map(find_article_body),
        _ => None,
    }
}

fn extract_paragraph_body(doc: &Html) -> Result<String> {
    for container in CONTAINERS {
        let sel = selector(&format!("{} p", container))?;
        let paragraphs: Vec<String> = doc
            .select(&sel)
            .filter(|p| !inside_boilerplate(p))
            .map(|p| normalize_whitespace(&p.text().collect::<String>()))
            .filter(|t| t.chars().count() >= MIN_PARAGRAPH_CHARS)
            .collect();

        if !paragraphs.is_empty() {
            debug!("Extracted {} paragraphs from <{}>", paragraphs.len(), container);
            return Ok(paragraphs.join("\n\n"));
        }
    }

    Err(IngestError::Extraction("no readable paragraphs".to_string()))
}

fn inside_boilerplate(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map(|e| BOILERPLATE_TAGS.contains(&e.name()))
            .unwrap_or(false)
    })
}
