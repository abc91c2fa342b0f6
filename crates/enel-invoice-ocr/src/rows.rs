use crate::model::{Row, Token};

const MIN_ROW_THRESHOLD: f64 = 8.0;
const ROW_HEIGHT_RATIO: f64 = 0.6;

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let middle = values.len() / 2;
    if values.len() % 2 == 1 {
        values[middle]
    } else {
        (values[middle - 1] + values[middle]) / 2.0
    }
}

pub(crate) fn row_threshold(tokens: &[Token]) -> f64 {
    let mut heights = tokens
        .iter()
        .map(|token| token.rect.height())
        .filter(|height| *height > 0.0)
        .collect::<Vec<_>>();
    (median(&mut heights) * ROW_HEIGHT_RATIO).max(MIN_ROW_THRESHOLD)
}

struct OpenRow {
    mean_y: f64,
    tokens: Vec<Token>,
}

/// Clusters tokens into visual rows, top to bottom.
///
/// Tokens are visited by ascending vertical center and join the last row when
/// they sit within the threshold of that row's running mean center.
#[must_use]
pub fn group_rows(tokens: &[Token]) -> Vec<Row> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let threshold = row_threshold(tokens);
    let mut sorted = tokens.to_vec();
    sorted.sort_by(|left, right| left.y_center().total_cmp(&right.y_center()));

    let mut rows: Vec<OpenRow> = Vec::new();
    for token in sorted {
        let y_center = token.y_center();
        match rows.last_mut() {
            Some(row) if (y_center - row.mean_y).abs() <= threshold => {
                row.tokens.push(token);
                let count = row.tokens.len() as f64;
                row.mean_y = (row.mean_y * (count - 1.0) + y_center) / count;
            }
            _ => rows.push(OpenRow {
                mean_y: y_center,
                tokens: vec![token],
            }),
        }
    }

    rows.into_iter()
        .map(|row| {
            let mut tokens = row.tokens;
            tokens.sort_by(|left, right| left.rect.x_min.total_cmp(&right.rect.x_min));
            Row { tokens }
        })
        .collect()
}
