//! OCR result normalization.
//!
//! The engine returns one of three structurally incompatible payloads
//! depending on its version and API path:
//! - a result object carrying parallel `rec_texts`/`rec_scores`/`rec_boxes`
//!   collections,
//! - a page array whose first element is that same object,
//! - a legacy page array of `[box, (text, score)]` lines.
//!
//! All three are folded into one ordered [`TextBlock`] sequence. Conversion
//! is best-effort at entry granularity: an entry that cannot be represented
//! (blank text, uncoercible confidence, malformed line) is dropped and never
//! aborts the surrounding result. A payload matching none of the known
//! shapes normalizes to an empty sequence.

pub mod boxes;

pub use boxes::{normalize_box, Point};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Canonical normalized unit of OCR output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Recognized text, non-empty after trimming
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Bounding polygon; empty when the engine gave no usable coordinates
    #[serde(rename = "bbox")]
    pub polygon: Vec<Point>,
}

/// Map a raw engine payload to an ordered sequence of text blocks.
///
/// Shape detection runs in fixed precedence: attribute-bearing result
/// object, dictionary page, nested-line page. Output order equals the
/// engine's detection order; nothing is sorted or deduplicated.
pub fn normalize(raw: &Value) -> Vec<TextBlock> {
    if let Some(object) = raw.as_object() {
        if has_parallel_collections(object) {
            debug!("attribute-shape result detected");
            return from_keyed(object);
        }
        warn!("result object has no recognition collections");
        return Vec::new();
    }

    match raw.as_array().and_then(|pages| pages.first()) {
        Some(Value::Object(page)) if has_parallel_collections(page) => {
            debug!("dictionary-page result detected");
            from_keyed(page)
        }
        Some(Value::Array(lines)) => {
            debug!("nested-line result detected ({} lines)", lines.len());
            from_lines(lines)
        }
        Some(other) => {
            warn!("unrecognized result shape: first element is {other}");
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn has_parallel_collections(object: &Map<String, Value>) -> bool {
    object.contains_key("rec_texts") && object.contains_key("rec_scores")
}

/// Zip the parallel `rec_texts`/`rec_scores`/`rec_boxes` collections by
/// index, up to the shorter of texts and scores. A missing box index yields
/// an empty polygon.
fn from_keyed(page: &Map<String, Value>) -> Vec<TextBlock> {
    let Some(texts) = page.get("rec_texts").and_then(Value::as_array) else {
        return Vec::new();
    };
    let Some(scores) = page.get("rec_scores").and_then(Value::as_array) else {
        return Vec::new();
    };
    let boxes = page.get("rec_boxes").and_then(Value::as_array);

    let count = texts.len().min(scores.len());
    let mut blocks = Vec::with_capacity(count);
    for index in 0..count {
        let raw_box = boxes.and_then(|boxes| boxes.get(index));
        match make_block(&texts[index], Some(&scores[index]), raw_box) {
            Some(block) => blocks.push(block),
            None => debug!(index, "dropping entry with blank text or bad confidence"),
        }
    }
    blocks
}

/// Process legacy `[box, text_info]` lines independently; a malformed line
/// is skipped without disturbing its neighbors.
fn from_lines(lines: &[Value]) -> Vec<TextBlock> {
    let mut blocks = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        match line_block(line) {
            Some(block) => blocks.push(block),
            None => debug!(index, "skipping malformed or blank line"),
        }
    }
    blocks
}

fn line_block(line: &Value) -> Option<TextBlock> {
    let parts = line.as_array()?;
    if parts.len() < 2 {
        return None;
    }
    let raw_box = parts.first();
    match &parts[1] {
        // Standard form: [box, [text, confidence]]
        Value::Array(info) if info.len() >= 2 => make_block(&info[0], Some(&info[1]), raw_box),
        // Text-only form: [box, "text"], confidence defaults to 1.0
        text @ Value::String(_) => make_block(text, None, raw_box),
        _ => None,
    }
}

/// Shared per-entry conversion for every shape: trim the text and drop
/// blank entries, coerce the confidence (skipping the entry on failure),
/// normalize the box.
fn make_block(text: &Value, confidence: Option<&Value>, raw_box: Option<&Value>) -> Option<TextBlock> {
    let text = text.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    let confidence = match confidence {
        Some(value) => coerce_confidence(value)?,
        None => 1.0,
    };
    Some(TextBlock {
        text: text.to_string(),
        confidence,
        polygon: normalize_box(raw_box),
    })
}

fn coerce_confidence(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_shape_result() {
        let raw = json!({
            "rec_texts": ["Hello", "World"],
            "rec_scores": [0.98, 0.87],
            "rec_boxes": [[0, 0, 10, 10], [[5, 5], [15, 5], [15, 25], [5, 25]]],
        });

        let blocks = normalize(&raw);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "Hello");
        assert!((blocks[0].confidence - 0.98).abs() < 1e-9);
        assert_eq!(blocks[0].polygon, vec![(0, 0), (10, 0), (10, 10), (0, 10)]);
        assert_eq!(blocks[1].text, "World");
        assert_eq!(blocks[1].polygon, vec![(5, 5), (15, 5), (15, 25), (5, 25)]);
    }

    #[test]
    fn test_dictionary_page_result() {
        // One blank entry dropped; its box index is simply unused.
        let raw = json!([{
            "rec_texts": ["Hi", "  "],
            "rec_scores": [0.9, 0.5],
            "rec_boxes": [[0, 0, 10, 10]],
        }]);

        let blocks = normalize(&raw);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Hi");
        assert!((blocks[0].confidence - 0.9).abs() < 1e-9);
        assert_eq!(blocks[0].polygon, vec![(0, 0), (10, 0), (10, 10), (0, 10)]);
    }

    #[test]
    fn test_nested_line_result() {
        let raw = json!([[
            [[[0, 0], [20, 0], [20, 10], [0, 10]], ["first", 0.91]],
            [[[0, 20], [20, 20], [20, 30], [0, 30]], "bare text"],
        ]]);

        let blocks = normalize(&raw);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "first");
        assert!((blocks[0].confidence - 0.91).abs() < 1e-9);
        assert_eq!(blocks[0].polygon.len(), 4);
        assert_eq!(blocks[1].text, "bare text");
        assert_eq!(blocks[1].confidence, 1.0);
        assert_eq!(blocks[1].polygon, vec![(0, 20), (20, 20), (20, 30), (0, 30)]);
    }

    #[test]
    fn test_malformed_line_does_not_abort_neighbors() {
        let raw = json!([[
            [[[0, 0], [9, 0], [9, 9], [0, 9]], ["one", 0.9]],
            [[[0, 0], [9, 0], [9, 9], [0, 9]], 12345],
            [[[0, 0], [9, 0], [9, 9], [0, 9]], ["three", 0.7]],
        ]]);

        let blocks = normalize(&raw);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "one");
        assert_eq!(blocks[1].text, "three");
    }

    #[test]
    fn test_blank_text_dropped_in_all_shapes() {
        let attribute = json!({"rec_texts": ["  ", "\t"], "rec_scores": [0.9, 0.8]});
        assert!(normalize(&attribute).is_empty());

        let page = json!([{"rec_texts": [""], "rec_scores": [0.9]}]);
        assert!(normalize(&page).is_empty());

        let lines = json!([[[[[0, 0], [1, 0], [1, 1], [0, 1]], ["   ", 0.9]]]]);
        assert!(normalize(&lines).is_empty());
    }

    #[test]
    fn test_texts_and_scores_zip_to_shorter_length() {
        let raw = json!({
            "rec_texts": ["a", "b", "c"],
            "rec_scores": [0.1, 0.2],
        });

        let blocks = normalize(&raw);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "a");
        assert_eq!(blocks[1].text, "b");
        // No boxes supplied: polygons are empty, never null
        assert!(blocks.iter().all(|b| b.polygon.is_empty()));
    }

    #[test]
    fn test_confidence_coerced_from_numeric_string() {
        let raw = json!([[
            [[[0, 0], [1, 0], [1, 1], [0, 1]], ["ok", "0.75"]],
        ]]);

        let blocks = normalize(&raw);
        assert_eq!(blocks.len(), 1);
        assert!((blocks[0].confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_uncoercible_confidence_skips_only_that_entry() {
        let raw = json!({
            "rec_texts": ["good", "bad", "also good"],
            "rec_scores": [0.9, "not a number", 0.8],
        });

        let blocks = normalize(&raw);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "good");
        assert_eq!(blocks[1].text, "also good");
    }

    #[test]
    fn test_unrecognized_shapes_normalize_to_empty() {
        for raw in [
            json!(null),
            json!(42),
            json!("text"),
            json!([]),
            json!([42]),
            json!(["strings"]),
            json!({"unrelated": true}),
            json!([{"unrelated": true}]),
        ] {
            assert!(normalize(&raw).is_empty(), "raw: {raw}");
        }
    }

    #[test]
    fn test_output_order_matches_detection_order() {
        let raw = json!({
            "rec_texts": ["z", "a", "m"],
            "rec_scores": [0.1, 0.9, 0.5],
        });

        let texts: Vec<_> = normalize(&raw).into_iter().map(|b| b.text).collect();
        assert_eq!(texts, vec!["z", "a", "m"]);
    }
}
