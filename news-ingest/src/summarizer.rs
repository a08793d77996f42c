use crate::llm_adapter::{CompletionRequest, LlmAdapter};
use crate::rss_utils::text::truncate_chars;
use crate::types::{IngestError, Result, StructuredSummary, SummarizerConfig};
use interfaces::defs::SENTIMENT_RANGE;
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns article text into a validated `StructuredSummary` with one LLM call.
pub struct Summarizer {
    llm: Arc<dyn LlmAdapter>,
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmAdapter>, config: SummarizerConfig) -> Self {
        Self { llm, config }
    }

    pub fn build_request(&self, title: &str, body: &str) -> CompletionRequest {
        let body = truncate_chars(body, self.config.max_body_chars);
        CompletionRequest {
            system_instruction: system_instruction(&self.config.language),
            user_message: format!("Title: {}\n\nContent: {}", title, body),
        }
    }

    /// One completion, no retries. Anything that is not a conforming
    /// summary is an error and nothing from the reply is kept.
    pub async fn summarize(&self, title: &str, body: &str) -> Result<StructuredSummary> {
        let request = self.build_request(title, body);
        let raw = self.llm.complete(&request).await?;
        debug!("{} returned {} chars", self.llm.adapter_name(), raw.len());

        parse_structured_summary(&raw).map_err(|e| {
            warn!("Rejected LLM output: {}", e);
            e
        })
    }
}

fn system_instruction(language: &str) -> String {
    format!(
        r#"You are a financial and technology news analyst.
Respond with ONLY a single JSON object. No prose, no markdown, no code fences.
The object must have exactly these fields:
{{
  "summary": string, a concise summary of the article in {language} (at most three sentences),
  "key_stats": string, the article's key figures in {language},
  "sentiment_score": integer from -10 to 10,
  "tags": array of short strings (companies, tickers, sectors, themes)
}}
Rules for "key_stats": write each data point as a complete sentence, never as "label: value" pairs.
Wrap every number, amount, percentage or other quantitative span in double braces, for example:
"Nvidia's quarterly revenue reached {{{{$35.1B}}}}, up {{{{94%}}}} from a year earlier."
Rules for "sentiment_score": -10 to -1 is bearish (more negative means more bearish), 0 is neutral, 1 to 10 is bullish (more positive means more bullish)."#,
        language = language
    )
}

/// Remove a surrounding markdown code fence (```` ```json ```` or bare ```` ``` ````).
/// Text after the closing fence is dropped.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Info string (e.g. `json`), which may share the line with the payload.
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    let inner = match rest.rfind("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    inner.trim()
}

/// Strict parse of a model reply into a `StructuredSummary`.
pub fn parse_structured_summary(raw: &str) -> Result<StructuredSummary> {
    let cleaned = strip_code_fence(raw);
    if cleaned.is_empty() {
        return Err(IngestError::SchemaValidation("empty reply".to_string()));
    }

    let summary: StructuredSummary = serde_json::from_str(cleaned)
        .map_err(|e| IngestError::SchemaValidation(format!("invalid summary JSON: {}", e)))?;

    if !summary.sentiment_in_range() {
        return Err(IngestError::SchemaValidation(format!(
            "sentiment_score {} outside {}..={}",
            summary.sentiment_score,
            SENTIMENT_RANGE.start(),
            SENTIMENT_RANGE.end()
        )));
    }

    if summary.summary.trim().is_empty() {
        return Err(IngestError::SchemaValidation("summary is blank".to_string()));
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"summary":"S","key_stats":"Revenue hit {{$1.5B}}.","sentiment_score":4,"tags":["AI","NVDA"]}"#;

    #[test]
    fn fenced_and_bare_replies_parse_identically() {
        let bare = parse_structured_summary(VALID).unwrap();
        let fenced = parse_structured_summary(&format!("```json\n{}\n```", VALID)).unwrap();
        let plain_fence = parse_structured_summary(&format!("  ```\n{}\n```\n", VALID)).unwrap();

        assert_eq!(bare, fenced);
        assert_eq!(bare, plain_fence);
        assert_eq!(bare.tags, vec!["AI", "NVDA"]);
    }

    #[test]
    fn strip_code_fence_handles_inline_fence_and_trailing_note() {
        assert_eq!(strip_code_fence("```json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(
            strip_code_fence("```json\n{\"a\":1}\n```\nHope this helps!"),
            "{\"a\":1}"
        );
        assert_eq!(strip_code_fence("```json\n```"), "");
    }

    #[test]
    fn strip_code_fence_passes_unfenced_text_through() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn system_instruction_escapes_highlight_braces() {
        let text = system_instruction("English");
        assert!(text.contains("{{$35.1B}}"));
        assert!(text.contains("in English"));
    }
}
