mod common;

use common::{init_tracing, valid_summary_json};
use news_ingest::summarizer::parse_structured_summary;
use news_ingest::{IngestError, MockLlmAdapter, Summarizer, SummarizerConfig};
use std::sync::Arc;

#[test]
fn test_rejects_every_malformed_shape() {
    let cases = [
        ("missing summary", r#"{"key_stats":"K","sentiment_score":1,"tags":[]}"#),
        ("missing key_stats", r#"{"summary":"S","sentiment_score":1,"tags":[]}"#),
        ("missing sentiment", r#"{"summary":"S","key_stats":"K","tags":[]}"#),
        ("missing tags", r#"{"summary":"S","key_stats":"K","sentiment_score":1}"#),
        ("float sentiment", r#"{"summary":"S","key_stats":"K","sentiment_score":2.5,"tags":[]}"#),
        ("string sentiment", r#"{"summary":"S","key_stats":"K","sentiment_score":"5","tags":[]}"#),
        ("above range", r#"{"summary":"S","key_stats":"K","sentiment_score":11,"tags":[]}"#),
        ("below range", r#"{"summary":"S","key_stats":"K","sentiment_score":-11,"tags":[]}"#),
        ("huge sentiment", r#"{"summary":"S","key_stats":"K","sentiment_score":99999999999,"tags":[]}"#),
        ("tags not array", r#"{"summary":"S","key_stats":"K","sentiment_score":1,"tags":"AI"}"#),
        ("tag not string", r#"{"summary":"S","key_stats":"K","sentiment_score":1,"tags":[1]}"#),
        ("null summary", r#"{"summary":null,"key_stats":"K","sentiment_score":1,"tags":[]}"#),
        ("blank summary", r#"{"summary":"  ","key_stats":"K","sentiment_score":1,"tags":[]}"#),
        ("extra field", r#"{"summary":"S","key_stats":"K","sentiment_score":1,"tags":[],"rating":"bull"}"#),
        ("array root", r#"[{"summary":"S","key_stats":"K","sentiment_score":1,"tags":[]}]"#),
        ("prose wrapper", r#"Here you go: {"summary":"S","key_stats":"K","sentiment_score":1,"tags":[]}"#),
        ("truncated", r#"{"summary":"S","key_stats":"K","sentiment_sc"#),
        ("empty", ""),
        ("empty fence", "```json\n```"),
    ];

    for (name, raw) in cases {
        match parse_structured_summary(raw) {
            Err(IngestError::SchemaValidation(_)) => {}
            other => panic!("{}: expected schema failure, got {:?}", name, other),
        }
    }
}

#[test]
fn test_accepts_range_boundaries() {
    for score in [-10, 0, 10] {
        let parsed = parse_structured_summary(&valid_summary_json("S", "K", score)).unwrap();
        assert_eq!(parsed.sentiment_score, score);
    }
}

#[test]
fn test_fenced_reply_equals_unwrapped_reply() {
    let json = valid_summary_json("Fed held rates.", "Rates stay at {{5.25%}}.", -2);

    let bare = parse_structured_summary(&json).unwrap();
    for wrapped in [
        format!("```json\n{}\n```", json),
        format!("```JSON\n{}\n```", json),
        format!("\n\n```\n{}\n```\n", json),
        format!("```json {}```", json),
        format!("```json\n{}\n```\nHope this helps!", json),
    ] {
        assert_eq!(parse_structured_summary(&wrapped).unwrap(), bare);
    }

    assert_eq!(bare.key_stats, "Rates stay at {{5.25%}}.");
}

#[tokio::test]
async fn test_request_truncates_body_and_fixes_language() {
    init_tracing();

    let llm = Arc::new(MockLlmAdapter::new("capture").with_response(valid_summary_json("S", "K", 1)));
    let summarizer = Summarizer::new(
        llm.clone(),
        SummarizerConfig {
            max_body_chars: 100,
            language: "English".to_string(),
        },
    );

    let body = "é".repeat(500);
    let summary = summarizer.summarize("Chip rally", &body).await.unwrap();
    assert_eq!(summary.summary, "S");

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].user_message,
        format!("Title: Chip rally\n\nContent: {}", "é".repeat(100))
    );
    assert!(requests[0].system_instruction.contains("in English"));
    assert!(requests[0].system_instruction.contains("-10 to -1 is bearish"));
}

#[tokio::test]
async fn test_short_body_is_sent_whole() {
    let llm = Arc::new(MockLlmAdapter::new("capture").with_response(valid_summary_json("S", "K", 1)));
    let summarizer = Summarizer::new(llm.clone(), SummarizerConfig::default());

    summarizer.summarize("T", "short body").await.unwrap();

    assert_eq!(llm.requests()[0].user_message, "Title: T\n\nContent: short body");
}

#[tokio::test]
async fn test_no_internal_retry_on_bad_output() {
    let llm = Arc::new(
        MockLlmAdapter::new("once")
            .with_response("not json")
            .with_response(valid_summary_json("S", "K", 1)),
    );
    let summarizer = Summarizer::new(llm.clone(), SummarizerConfig::default());

    let result = summarizer.summarize("T", "body").await;

    assert!(matches!(result, Err(IngestError::SchemaValidation(_))));
    assert_eq!(llm.call_count(), 1);
}
