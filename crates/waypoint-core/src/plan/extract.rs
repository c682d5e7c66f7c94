//! Locate and parse a JSON object embedded in free-form model output.
//!
//! Only answers "is there JSON here?". Whether it is the right JSON is
//! decided by [`super::validate`].

use serde_json::Value;
use thiserror::Error;

/// Errors from extracting JSON out of model text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON object found in model response")]
    NoJsonFound,

    #[error("model response contains malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),
}

/// Parse the JSON object embedded in `text`.
///
/// The widest span (first `{` through last `}`) is tried first. If it does
/// not parse, the span that balances the first `{` is tried, which recovers
/// an object followed by prose that happens to contain a `}`.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    let widest = widest_span(text).ok_or(ExtractError::NoJsonFound)?;

    let widest_err = match serde_json::from_str::<Value>(widest) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    match balanced_span(widest) {
        Some(span) if span.len() < widest.len() => {
            serde_json::from_str(span).map_err(|_| ExtractError::MalformedJson(widest_err))
        }
        _ => Err(ExtractError::MalformedJson(widest_err)),
    }
}

/// Text from the first `{` to the last `}`, inclusive.
pub fn widest_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// The prefix of `text` (which must start with `{`) that closes the opening
/// brace, honouring JSON string literals and escapes.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Sure! Here is your plan:\n{\"title\": \"X\", \"n\": 1}\nGood luck!";
        let value = extract_json(text).unwrap();
        assert_eq!(value, json!({"title": "X", "n": 1}));
    }

    #[test]
    fn extracts_from_markdown_fence() {
        let text = "```json\n{\"a\": {\"b\": [1, 2]}}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"a": {"b": [1, 2]}}));
    }

    #[test]
    fn no_braces_is_no_json() {
        assert!(matches!(
            extract_json("I cannot help with that."),
            Err(ExtractError::NoJsonFound)
        ));
    }

    #[test]
    fn reversed_braces_is_no_json() {
        assert!(matches!(
            extract_json("} nothing here {"),
            Err(ExtractError::NoJsonFound)
        ));
    }

    #[test]
    fn empty_text_is_no_json() {
        assert!(matches!(extract_json(""), Err(ExtractError::NoJsonFound)));
    }

    #[test]
    fn unparseable_span_is_malformed() {
        let text = "Here: {\"title\": \"X\", \"steps\": [ }";
        assert!(matches!(
            extract_json(text),
            Err(ExtractError::MalformedJson(_))
        ));
    }

    #[test]
    fn trailing_braces_in_prose_fall_back_to_balanced_span() {
        let text = "{\"title\": \"X\"} and replace {name} with your name.";
        assert_eq!(extract_json(text).unwrap(), json!({"title": "X"}));
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_balancing() {
        let text = "{\"title\": \"use } and { freely\", \"q\": \"\\\"}\"} trailing {x}";
        let value = extract_json(text).unwrap();
        assert_eq!(value["title"], "use } and { freely");
        assert_eq!(value["q"], "\"}");
    }

    #[test]
    fn object_inside_top_level_array_is_extracted() {
        // The array itself is not an object; the first balanced object wins.
        let text = "[{\"a\": 1}, {\"b\": 2}]";
        assert!(matches!(
            extract_json(text),
            Ok(ref v) if v == &json!({"a": 1})
        ));
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "prefix {\"title\": \"X\", \"list\": [1, 2, {\"k\": null}]} suffix";
        let first = extract_json(text).unwrap();
        let span = widest_span(text).unwrap();
        let again = extract_json(span).unwrap();
        assert_eq!(first, again);
        assert_eq!(first, extract_json(text).unwrap());
    }

    #[test]
    fn widest_span_bounds() {
        assert_eq!(widest_span("a {x} b {y} c"), Some("{x} b {y}"));
        assert_eq!(widest_span("no braces"), None);
    }
}
