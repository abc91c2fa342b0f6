//! Declarative description of one table kind and the generic stages every
//! table goes through: cluster rows, locate the header, infer column
//! positions. Post-processing stays with each table kind.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::columns::{ColumnPositions, infer_positions};
use crate::header::{HeaderRule, extend_header, find_header, find_section};
use crate::model::{Row, Token};
use crate::rows::group_rows;

pub(crate) type AssignedRow<C> = BTreeMap<C, String>;

/// A column of the table and the header aliases that identify it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnDef<C: 'static> {
    pub column: C,
    pub aliases: &'static [&'static str],
}

/// Position used for a column the header does not name directly: the midpoint
/// of its two resolved neighbours.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MidpointFallback<C: 'static> {
    pub column: C,
    pub left: C,
    pub right: C,
}

#[derive(Debug)]
pub(crate) struct TableSpec<C: 'static> {
    pub name: &'static str,
    pub columns: &'static [ColumnDef<C>],
    pub keywords: &'static [&'static str],
    pub header: HeaderRule,
    pub required: C,
    /// Column whose position is the rightmost of all its matching tokens.
    pub rightmost_anchor: Option<C>,
    pub midpoint_fallback: Option<MidpointFallback<C>>,
    pub section_titles: &'static [&'static str],
    pub fold_header_continuation: bool,
}

impl<C> TableSpec<C>
where
    C: Copy + Ord + Debug,
{
    pub(crate) fn empty_row(&self) -> AssignedRow<C> {
        self.columns
            .iter()
            .map(|def| (def.column, String::new()))
            .collect()
    }
}

/// A located table: clustered rows, where its body starts and the column map.
#[derive(Debug)]
pub(crate) struct LocatedTable<C> {
    pub rows: Vec<Row>,
    pub body_start: usize,
    pub positions: ColumnPositions<C>,
}

impl<C> LocatedTable<C> {
    /// Rows below the header and any header lines folded into it.
    pub(crate) fn body(&self) -> &[Row] {
        &self.rows[self.body_start..]
    }
}

/// Runs the shared stages for `spec`. `None` means the structure the table
/// needs is absent and the caller yields no records.
pub(crate) fn locate<C>(spec: &TableSpec<C>, tokens: &[Token]) -> Option<LocatedTable<C>>
where
    C: Copy + Ord + Debug,
{
    let rows = group_rows(tokens);

    let search_start = if spec.section_titles.is_empty() {
        0
    } else {
        let Some(section) = find_section(&rows, spec.section_titles) else {
            tracing::debug!(table = spec.name, "section title not found");
            return None;
        };
        section + 1
    };

    let Some(header_index) = find_header(&rows, search_start, spec.keywords, &spec.header) else {
        tracing::debug!(table = spec.name, rows = rows.len(), "header row not found");
        return None;
    };

    let (header_tokens, folded) = if spec.fold_header_continuation {
        extend_header(&rows, header_index, spec.keywords)
    } else {
        (rows[header_index].tokens.clone(), 0)
    };

    let positions = infer_positions(spec, &header_tokens);
    if !positions.contains(spec.required) {
        tracing::debug!(
            table = spec.name,
            required = ?spec.required,
            "required column missing from header"
        );
        return None;
    }

    Some(LocatedTable {
        body_start: header_index + 1 + folded,
        rows,
        positions,
    })
}
