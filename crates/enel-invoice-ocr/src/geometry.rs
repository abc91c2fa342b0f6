use serde_json::Value;

use crate::model::{OcrOutput, Rect, Token};

fn as_point(value: &Value) -> Option<(f64, f64)> {
    let coords = value.as_array()?;
    if coords.len() < 2 {
        return None;
    }
    Some((coords[0].as_f64()?, coords[1].as_f64()?))
}

fn box_points(raw: &Value) -> Option<Vec<(f64, f64)>> {
    let values = raw.as_array()?;
    let first = values.first()?;

    if first.as_array().is_some_and(|pair| pair.len() >= 2) {
        return values.iter().map(as_point).collect();
    }

    if !first.is_number() {
        return None;
    }
    let flat = values.iter().map(Value::as_f64).collect::<Option<Vec<_>>>()?;
    match flat.as_slice() {
        [x0, y0, x1, y1] => Some(vec![(*x0, *y0), (*x1, *y0), (*x1, *y1), (*x0, *y1)]),
        [_, _, _, _, _, _, _, _] => Some(flat.chunks(2).map(|pair| (pair[0], pair[1])).collect()),
        _ => None,
    }
}

/// Canonicalizes a polygon, a flat `[x0, y0, x1, y1]` box or a flat 8-value
/// polygon into an axis-aligned rectangle. Anything else is `None`.
#[must_use]
pub fn normalize_box(raw: &Value) -> Option<Rect> {
    let points = box_points(raw)?;
    let (first_x, first_y) = *points.first()?;
    let rect = points.iter().skip(1).fold(
        Rect {
            x_min: first_x,
            x_max: first_x,
            y_min: first_y,
            y_max: first_y,
        },
        |acc, &(x, y)| Rect {
            x_min: acc.x_min.min(x),
            x_max: acc.x_max.max(x),
            y_min: acc.y_min.min(y),
            y_max: acc.y_max.max(y),
        },
    );
    Some(rect)
}

/// Pairs recognized texts with their boxes, dropping blank texts and boxes
/// that cannot be normalized.
#[must_use]
pub fn build_tokens(texts: &[String], boxes: &[Value]) -> Vec<Token> {
    texts
        .iter()
        .zip(boxes)
        .enumerate()
        .filter_map(|(source_index, (text, raw_box))| {
            if text.trim().is_empty() {
                return None;
            }
            let rect = normalize_box(raw_box)?;
            Some(Token {
                text: text.clone(),
                rect,
                source_index,
            })
        })
        .collect()
}

#[must_use]
pub fn tokens_from_ocr(output: &OcrOutput) -> Vec<Token> {
    build_tokens(&output.texts, &output.boxes)
}
