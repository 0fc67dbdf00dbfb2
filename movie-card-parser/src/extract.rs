//! Isolates the JSON-bearing part of a model answer.
//!
//! Models wrap JSON in Markdown fences, surround it with prose, or return it
//! bare. Extraction is best-effort: it picks a substring and leaves deciding
//! whether it is valid JSON to the decoder.

/// Fence dialects, in scan order
const FENCES: [&str; 2] = ["```", "~~~"];

const JSON_TAG: &str = "json";

/// Which strategy produced an [`Extraction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    JsonFence,
    GenericFence,
    WholeText,
    BracketSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction<'a> {
    pub text: &'a str,
    pub source: Source,
    /// Another plausible substring existed, or none looked like JSON.
    pub ambiguous: bool,
}

#[derive(Debug, Clone, Copy)]
struct Block<'a> {
    start: usize,
    body: &'a str,
}

/// Picks the first `json`-tagged fenced block, else the first fenced block of
/// any kind, else the whole trimmed text.
pub fn extract(raw: &str) -> Extraction<'_> {
    let json_blocks = blocks(raw, Pairing::JsonOpener);
    if let Some(first) = json_blocks.first() {
        return Extraction {
            text: first.body,
            source: Source::JsonFence,
            ambiguous: json_blocks.iter().any(|b| b.body != first.body),
        };
    }

    let generic_blocks = blocks(raw, Pairing::Sequential);
    if let Some(first) = generic_blocks.first() {
        return Extraction {
            text: first.body,
            source: Source::GenericFence,
            ambiguous: generic_blocks.len() > 1,
        };
    }

    let text = raw.trim();
    Extraction {
        text,
        source: Source::WholeText,
        ambiguous: !text.starts_with(['{', '[']),
    }
}

/// Recovery strategy: the span from the first `{` or `[` to the last matching
/// closer. Returns `None` when no such span exists.
pub fn extract_narrow(text: &str) -> Option<Extraction<'_>> {
    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    if end <= start {
        return None;
    }
    Some(Extraction {
        text: &text[start..=end],
        source: Source::BracketSpan,
        ambiguous: false,
    })
}

/// How opening fences are matched with their closers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pairing {
    /// Only a fence tagged `json` opens a block. Any other fence is skipped
    /// rather than paired.
    JsonOpener,
    /// Fences pair up left to right, whatever their tag.
    Sequential,
}

/// Terminated blocks of every fence dialect, in order of appearance.
fn blocks(raw: &str, pairing: Pairing) -> Vec<Block<'_>> {
    let mut blocks: Vec<Block<'_>> = FENCES
        .iter()
        .flat_map(|fence| fenced_blocks(raw, fence, pairing))
        .collect();
    blocks.sort_by_key(|block| block.start);
    blocks
}

fn fenced_blocks<'a>(raw: &'a str, fence: &str, pairing: Pairing) -> Vec<Block<'a>> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(found) = raw[pos..].find(fence) {
        let open = pos + found;
        let after = open + fence.len();
        let (tag, body_start) = info_string(raw, after);

        if pairing == Pairing::JsonOpener && !tag.eq_ignore_ascii_case(JSON_TAG) {
            pos = after;
            continue;
        }

        // Unterminated fence: nothing more to pair
        let Some(len) = raw[body_start..].find(fence) else {
            break;
        };
        let close = body_start + len;

        blocks.push(Block {
            start: open,
            body: raw[body_start..close].trim(),
        });
        pos = close + fence.len();
    }

    blocks
}

/// Reads the one-word info string that may follow an opening fence, e.g.
/// `json` in ```` ```json ````. A word only counts as a tag when it is followed
/// by whitespace or the start of a JSON container.
fn info_string(raw: &str, after: usize) -> (&str, usize) {
    let rest = &raw[after..];
    let len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    let next = rest[len..].chars().next();

    match next {
        Some(c) if len > 0 && (c.is_whitespace() || c == '{' || c == '[') => {
            (&rest[..len], after + len)
        }
        _ => ("", after),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fence_content_is_trimmed() {
        let raw = "Here you go:\n```json\n  {\"a\": 1}  \n```\nEnjoy!";
        let got = extract(raw);
        assert_eq!(got.text, "{\"a\": 1}");
        assert_eq!(got.source, Source::JsonFence);
        assert!(!got.ambiguous);
    }

    #[test]
    fn json_fence_wins_over_earlier_generic_fence() {
        let raw = "```\nnot this\n```\ntext\n```json\n[1]\n```";
        let got = extract(raw);
        assert_eq!(got.text, "[1]");
        assert_eq!(got.source, Source::JsonFence);
    }

    #[test]
    fn stray_fence_before_json_fence_is_skipped() {
        let raw = "Wrap output in ``` fences. Here:\n```json\n{\"movies\":[]}\n```";
        let got = extract(raw);
        assert_eq!(got.text, "{\"movies\":[]}");
        assert_eq!(got.source, Source::JsonFence);
        assert!(!got.ambiguous);
    }

    #[test]
    fn first_of_several_json_fences_is_used_and_flagged() {
        let raw = "```json\n{\"first\": true}\n```\n```json\n{\"second\": true}\n```";
        let got = extract(raw);
        assert_eq!(got.text, "{\"first\": true}");
        assert!(got.ambiguous);
    }

    #[test]
    fn identical_json_fences_are_not_ambiguous() {
        let raw = "```json\n[]\n```\nagain:\n```json\n[]\n```";
        assert!(!extract(raw).ambiguous);
    }

    #[test]
    fn tag_is_case_insensitive() {
        let got = extract("```JSON\n{}\n```");
        assert_eq!(got.source, Source::JsonFence);
        assert_eq!(got.text, "{}");
    }

    #[test]
    fn inline_json_fence() {
        let got = extract("```json{\"a\":1}```");
        assert_eq!(got.text, "{\"a\":1}");
        assert_eq!(got.source, Source::JsonFence);
    }

    #[test]
    fn generic_fence_drops_other_info_string() {
        let got = extract("Result:\n```javascript\n[{\"a\": 1}]\n```");
        assert_eq!(got.text, "[{\"a\": 1}]");
        assert_eq!(got.source, Source::GenericFence);
    }

    #[test]
    fn tilde_fences_are_recognised() {
        let got = extract("~~~json\n{\"movies\": []}\n~~~");
        assert_eq!(got.text, "{\"movies\": []}");
        assert_eq!(got.source, Source::JsonFence);
    }

    #[test]
    fn unterminated_fence_falls_back_to_whole_text() {
        let raw = "  ```json\n{\"a\": 1}  ";
        let got = extract(raw);
        assert_eq!(got.source, Source::WholeText);
        assert_eq!(got.text, "```json\n{\"a\": 1}");
        assert!(got.ambiguous);
    }

    #[test]
    fn bare_json_is_whole_text_and_unambiguous() {
        let got = extract("\n[{\"title\": \"X\"}]\n");
        assert_eq!(got.text, "[{\"title\": \"X\"}]");
        assert_eq!(got.source, Source::WholeText);
        assert!(!got.ambiguous);
    }

    #[test]
    fn narrow_takes_outer_bracket_span() {
        let got = extract_narrow("Sure! {\"a\": {\"b\": 2}} hope that helps").unwrap();
        assert_eq!(got.text, "{\"a\": {\"b\": 2}}");
        assert_eq!(got.source, Source::BracketSpan);

        let list = extract_narrow("list: [1, 2] done").unwrap();
        assert_eq!(list.text, "[1, 2]");
    }

    #[test]
    fn narrow_without_brackets_is_none() {
        assert!(extract_narrow("not json at all").is_none());
        assert!(extract_narrow("} reversed {").is_none());
    }
}
