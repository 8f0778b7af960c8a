//! Response normalization.
//!
//! The completion API has answered in several shapes over time. Strategies are
//! tried in order and the first one producing non-empty text wins:
//!
//! 1. `output_text` convenience field
//! 2. first text payload in the structured `output` list
//! 3. chat-completions `choices[0].message.content` (compatible gateways)
//!
//! When none match, the raw response is serialized, so extraction is total.

use serde_json::Value;
use tracing::{debug, warn};

type Strategy = fn(&Value) -> Option<String>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("output_text", convenience_text),
    ("output", structured_output),
    ("choices", chat_choices),
];

/// Pull the reply text out of a completion response. Never fails.
pub fn extract_text(response: &Value) -> String {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(response) {
            debug!(strategy = *name, len = text.len(), "extracted completion text");
            return text;
        }
    }
    warn!("unrecognized completion response shape, returning raw body");
    response.to_string()
}

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn convenience_text(response: &Value) -> Option<String> {
    match response.get("output_text")? {
        Value::String(s) => non_empty(s),
        // Some SDK-style proxies return the aggregated text as a list of parts.
        Value::Array(parts) => {
            let joined: String = parts.iter().filter_map(Value::as_str).collect();
            non_empty(&joined)
        }
        _ => None,
    }
}

fn structured_output(response: &Value) -> Option<String> {
    response
        .get("output")?
        .as_array()?
        .iter()
        .find_map(item_text)
}

/// Text carried by one `output` item: either a plain `content` string, the
/// first `content` part with a `text` field, or a bare `text` field.
fn item_text(item: &Value) -> Option<String> {
    match item.get("content") {
        Some(Value::String(s)) => non_empty(s),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .find_map(non_empty),
        _ => item.get("text").and_then(Value::as_str).and_then(non_empty),
    }
}

fn chat_choices(response: &Value) -> Option<String> {
    let choice = response.get("choices")?.get(0)?;
    choice
        .pointer("/message/content")
        .or_else(|| choice.get("text"))
        .and_then(Value::as_str)
        .and_then(non_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn convenience_field_wins_over_structured_output() {
        let resp = json!({
            "output_text": "from convenience",
            "output": [{
                "type": "message",
                "content": [{ "type": "output_text", "text": "from structured" }]
            }]
        });
        assert_eq!(extract_text(&resp), "from convenience");
    }

    #[test]
    fn null_convenience_falls_back_to_structured_output() {
        let resp = json!({
            "output_text": null,
            "output": [{
                "type": "message",
                "content": [{ "type": "output_text", "text": "structured" }]
            }]
        });
        assert_eq!(extract_text(&resp), "structured");
    }

    #[test]
    fn empty_convenience_falls_back_to_structured_output() {
        let resp = json!({
            "output_text": "",
            "output": [{ "content": "plain content" }]
        });
        assert_eq!(extract_text(&resp), "plain content");
    }

    #[test]
    fn skips_output_items_without_text() {
        let resp = json!({
            "output": [
                { "type": "reasoning", "summary": [] },
                { "type": "message", "content": [
                    { "type": "refusal" },
                    { "type": "output_text", "text": "second item" }
                ]}
            ]
        });
        assert_eq!(extract_text(&resp), "second item");
    }

    #[test]
    fn list_convenience_field_is_joined() {
        let resp = json!({ "output_text": ["Hello, ", "world"] });
        assert_eq!(extract_text(&resp), "Hello, world");
    }

    #[test]
    fn chat_completion_shape_is_understood() {
        let resp = json!({
            "choices": [{ "message": { "role": "assistant", "content": "chat reply" } }]
        });
        assert_eq!(extract_text(&resp), "chat reply");
    }

    #[test]
    fn unknown_shape_serializes_whole_response() {
        let resp = json!({ "weird": { "nested": 1 } });
        assert_eq!(extract_text(&resp), r#"{"weird":{"nested":1}}"#);
    }

    #[test]
    fn non_object_response_is_stringified() {
        assert_eq!(extract_text(&json!("just a string")), r#""just a string""#);
        assert_eq!(extract_text(&json!([1, 2])), "[1,2]");
    }
}
