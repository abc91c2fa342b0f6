use std::collections::{BTreeMap, HashSet};
use std::fmt::Debug;

use crate::model::Token;
use crate::table::{AssignedRow, TableSpec};
use crate::text::normalize_lower;

/// Horizontal center of each resolved column, taken from the header.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnPositions<C> {
    positions: BTreeMap<C, f64>,
}

impl<C> ColumnPositions<C>
where
    C: Copy + Ord,
{
    pub(crate) fn get(&self, column: C) -> Option<f64> {
        self.positions.get(&column).copied()
    }

    pub(crate) fn contains(&self, column: C) -> bool {
        self.positions.contains_key(&column)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Columns ordered by position, left to right.
    pub(crate) fn sorted(&self) -> Vec<(C, f64)> {
        let mut sorted = self
            .positions
            .iter()
            .map(|(column, position)| (*column, *position))
            .collect::<Vec<_>>();
        sorted.sort_by(|left, right| left.1.total_cmp(&right.1));
        sorted
    }

    /// Position of the column immediately to the right of `column`.
    pub(crate) fn right_neighbour(&self, column: C) -> Option<f64> {
        let sorted = self.sorted();
        let index = sorted.iter().position(|(candidate, _)| *candidate == column)?;
        sorted.get(index + 1).map(|(_, position)| *position)
    }
}

impl<C: Ord> FromIterator<(C, f64)> for ColumnPositions<C> {
    fn from_iter<I: IntoIterator<Item = (C, f64)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

fn matches_any(text: &str, aliases: &[&str]) -> bool {
    let normalized = normalize_lower(text);
    aliases.iter().any(|alias| normalized.contains(alias))
}

/// Maps header tokens to column positions, claiming each token at most once
/// and walking the columns in the table's canonical order.
pub(crate) fn infer_positions<C>(spec: &TableSpec<C>, header: &[Token]) -> ColumnPositions<C>
where
    C: Copy + Ord + Debug,
{
    let mut positions = BTreeMap::new();
    let mut claimed = HashSet::new();

    for def in spec.columns {
        let Some(token) = header
            .iter()
            .filter(|token| !claimed.contains(&token.source_index))
            .find(|token| matches_any(&token.text, def.aliases))
        else {
            continue;
        };
        claimed.insert(token.source_index);

        let position = if spec.rightmost_anchor == Some(def.column) {
            header
                .iter()
                .filter(|candidate| matches_any(&candidate.text, def.aliases))
                .map(Token::x_center)
                .fold(token.x_center(), f64::max)
        } else {
            token.x_center()
        };
        positions.insert(def.column, position);
    }

    if let Some(fallback) = spec.midpoint_fallback
        && !positions.contains_key(&fallback.column)
        && let (Some(left), Some(right)) = (
            positions.get(&fallback.left).copied(),
            positions.get(&fallback.right).copied(),
        )
    {
        positions.insert(fallback.column, (left + right) / 2.0);
    }

    ColumnPositions { positions }
}

/// Index of the interval that `x` falls in, given ascending boundaries.
pub(crate) fn column_index(boundaries: &[f64], x: f64) -> usize {
    boundaries
        .iter()
        .take_while(|boundary| x >= **boundary)
        .count()
}

/// Buckets a body row's tokens into columns using the midpoints between
/// consecutive column positions. Every declared column is present in the
/// result; tokens sharing a column are joined with a space.
pub(crate) fn assign_row<C>(
    spec: &TableSpec<C>,
    positions: &ColumnPositions<C>,
    tokens: &[Token],
) -> AssignedRow<C>
where
    C: Copy + Ord + Debug,
{
    let mut row = spec.empty_row();
    if positions.is_empty() {
        return row;
    }

    let sorted = positions.sorted();
    let boundaries = sorted
        .windows(2)
        .map(|pair| (pair[0].1 + pair[1].1) / 2.0)
        .collect::<Vec<_>>();

    for token in tokens {
        let index = column_index(&boundaries, token.x_center()).min(sorted.len() - 1);
        let cell = row.entry(sorted[index].0).or_default();
        if cell.is_empty() {
            cell.push_str(&token.text);
        } else {
            *cell = format!("{cell} {}", token.text).trim().to_string();
        }
    }

    row
}
