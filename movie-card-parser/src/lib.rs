pub mod assemble;
pub mod decode;
pub mod error;
pub mod extract;
pub mod record;
pub mod shape;
pub mod tree;
pub mod validate;

use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

// Re-export commonly used types
pub use error::{PipelineError, Result, ValidationError};
pub use extract::{Extraction, Source};
pub use record::{MovieCard, ParseOptions};
pub use tree::{Field, Tree, TreeKind};
pub use validate::Batch;

/// Turns one model answer into at most `requested_count` validated cards.
///
/// Extract → decode → normalize → validate each candidate → assemble. The
/// run is pure: the same input always yields the same output.
pub fn parse_recommendations(
    raw: &str,
    requested_count: NonZeroUsize,
    options: &ParseOptions,
) -> Result<Vec<MovieCard>> {
    let tree = extract_and_decode(raw)?;
    let candidates = shape::normalize(&tree)?;
    debug!(candidates = candidates.len(), "Normalized model answer");

    let batch = validate::validate_all(&candidates, options);
    let cards = assemble::assemble(batch, requested_count)?;

    info!(
        cards = cards.len(),
        requested = requested_count.get(),
        "Parsed recommendation cards"
    );
    Ok(cards)
}

/// Decodes the extracted substring, allowing exactly one retry on the bracket
/// span of the raw answer when the first attempt fails. A failure still
/// reports the first substring.
fn extract_and_decode(raw: &str) -> Result<Tree> {
    let first = extract::extract(raw);
    debug!(source = ?first.source, ambiguous = first.ambiguous, "Extracted answer body");

    let error = match decode::decode(first.text) {
        Ok(tree) => return Ok(tree),
        Err(e) => e,
    };

    if let Some(narrow) = extract::extract_narrow(raw).filter(|n| n.text != first.text) {
        warn!(error = %error, "Answer body is not JSON, retrying on bracket span");
        if let Ok(tree) = decode::decode(narrow.text) {
            return Ok(tree);
        }
    }

    Err(PipelineError::Decode {
        reason: error.to_string(),
        substring: first.text.to_string(),
        ambiguous: first.ambiguous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn parse(raw: &str, n: usize) -> Result<Vec<MovieCard>> {
        parse_recommendations(raw, count(n), &ParseOptions::default())
    }

    fn movie(title: &str) -> serde_json::Value {
        json!({ "title": title, "year": 2000, "reason": format!("see {title}") })
    }

    #[test]
    fn fenced_wrapped_single_movie() {
        let raw = "```json\n{\"movies\":[{\"title\":\"X\",\"year\":2001,\"reason\":\"ok\"}]}\n```";
        let cards = parse(raw, 1).unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "X");
        assert_eq!(cards[0].year, "2001");
        assert_eq!(cards[0].director, "unknown");
        assert_eq!(cards[0].mood_tags, vec!["movie".to_string()]);
        assert_eq!(cards[0].color, record::DEFAULT_COLOR);
    }

    #[test]
    fn plain_prose_is_a_decode_error() {
        let err = parse("not json at all", 1).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert_eq!(err.substring(), Some("not json at all"));
    }

    #[test]
    fn bare_array_is_truncated_in_order() {
        let raw = json!([movie("A"), movie("B"), movie("C")]).to_string();
        let titles: Vec<String> = parse(&raw, 2)
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn unrelated_object_ends_as_empty_result() {
        let raw = json!({ "answer": 42, "note": "hello" }).to_string();
        match parse(&raw, 3).unwrap_err() {
            PipelineError::EmptyResult {
                candidates,
                rejected,
            } => {
                assert_eq!(candidates, 1);
                assert_eq!(rejected, vec![ValidationError::MissingField("title")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scalar_answer_is_a_shape_error() {
        assert!(matches!(
            parse("42", 1),
            Err(PipelineError::Shape {
                found: TreeKind::Number,
                ..
            })
        ));
    }

    #[test]
    fn invalid_candidate_is_dropped_not_fatal() {
        let raw = json!([{ "year": 1999, "reason": "no title" }, movie("Valid")]).to_string();
        let cards = parse(&raw, 2).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Valid");
    }

    #[test]
    fn invalid_leading_candidate_does_not_starve_result() {
        let raw = json!({ "cards": [{ "title": "" }, movie("Second")] }).to_string();
        let cards = parse(&raw, 1).unwrap();
        assert_eq!(cards[0].title, "Second");
    }

    #[test]
    fn output_length_is_min_of_list_and_requested() {
        for len in 1..=4 {
            for requested in 1..=5 {
                let list: Vec<_> = (0..len).map(|i| movie(&format!("M{i}"))).collect();
                let raw = json!({ "recommendations": list }).to_string();
                let cards = parse(&raw, requested).unwrap();
                assert_eq!(cards.len(), len.min(requested));
                assert_eq!(cards[0].title, "M0");
            }
        }
    }

    #[test]
    fn recovers_json_embedded_in_prose() {
        let raw = format!(
            "Sure! Here are my picks: {} Enjoy the show.",
            json!({ "movies": [movie("Heat")] })
        );
        let cards = parse(&raw, 1).unwrap();
        assert_eq!(cards[0].title, "Heat");
    }

    #[test]
    fn recovers_prose_inside_generic_fence() {
        let raw = format!("```\nHere you go: {}\n```", json!([movie("Ran")]));
        assert_eq!(parse(&raw, 1).unwrap()[0].title, "Ran");
    }

    #[test]
    fn recovers_json_after_unrelated_code_fence() {
        let raw = "Run this first:\n```\npip install movies\n```\nResult:\n{\"movies\":[{\"title\":\"X\",\"year\":2001,\"reason\":\"ok\"}]}";
        let cards = parse(raw, 1).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "X");
    }

    #[test]
    fn stray_fence_in_prose_does_not_hide_json_fence() {
        let raw = format!(
            "Wrap output in ``` fences. Here:\n```json\n{}\n```",
            json!({ "movies": [movie("Alien")] })
        );
        let cards = parse(&raw, 1).unwrap();
        assert_eq!(cards[0].title, "Alien");
    }

    #[test]
    fn broken_json_after_recovery_reports_first_substring() {
        let raw = "```json\n{\"movies\": [{\"title\": \"X\",}]}\n```";
        match parse(raw, 1).unwrap_err() {
            PipelineError::Decode {
                substring,
                ambiguous,
                ..
            } => {
                assert_eq!(substring, "{\"movies\": [{\"title\": \"X\",}]}");
                assert!(!ambiguous);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn first_json_fence_is_used_when_several_differ() {
        let raw = format!(
            "```json\n{}\n```\nor maybe\n```json\n{}\n```",
            json!([movie("First")]),
            json!([movie("Second")])
        );
        let cards = parse(&raw, 5).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "First");
    }

    #[test]
    fn repeated_runs_are_identical() {
        let raw = format!(
            "Picks:\n```json\n{}\n```",
            json!({ "movies": [movie("A"), { "title": "B" }, movie("C")] })
        );
        assert_eq!(parse(&raw, 2), parse(&raw, 2));
        assert_eq!(parse("nope", 1), parse("nope", 1));
    }
}
