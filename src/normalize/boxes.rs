//! Box normalization.
//!
//! Depending on version the engine reports text locations either as an
//! axis-aligned rectangle `[x1, y1, x2, y2]` or as an explicit polygon
//! `[[x, y], ...]`. Both are folded into one canonical polygon form here.

use serde_json::Value;

/// Canonical polygon point in pixel coordinates.
pub type Point = (i32, i32);

/// Convert a raw box value into a canonical polygon.
///
/// A four-element array of plain numbers is an axis-aligned rectangle and
/// expands to its corners in top-left, top-right, bottom-right, bottom-left
/// order. An array of `[x, y]` pairs passes through point by point with
/// order and count preserved. The element type is the discriminator: four
/// pairs are four explicit points, never a rectangle. Coordinates are
/// truncated toward zero. An absent or malformed box yields an empty
/// polygon; this function never fails.
pub fn normalize_box(raw: Option<&Value>) -> Vec<Point> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };

    if items.len() == 4 && items.iter().all(Value::is_number) {
        let Some(coords) = items
            .iter()
            .map(truncate)
            .collect::<Option<Vec<i32>>>()
        else {
            return Vec::new();
        };
        let (x1, y1, x2, y2) = (coords[0], coords[1], coords[2], coords[3]);
        return vec![(x1, y1), (x2, y1), (x2, y2), (x1, y2)];
    }

    let mut points = Vec::with_capacity(items.len());
    for item in items {
        match point_of(item) {
            Some(point) => points.push(point),
            None => return Vec::new(),
        }
    }
    points
}

fn point_of(value: &Value) -> Option<Point> {
    let pair = value.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    Some((truncate(&pair[0])?, truncate(&pair[1])?))
}

fn truncate(value: &Value) -> Option<i32> {
    value.as_f64().map(|v| v as i32)
}
