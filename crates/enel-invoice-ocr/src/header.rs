use crate::model::{Row, Token};
use crate::text::normalize_lower;

const MAX_HEADER_CONTINUATION_ROWS: usize = 2;

/// When a row counts as a table's header.
///
/// The row must mention one of the `primary` keywords and then either hit at
/// least `min_hits` vocabulary keywords or be at most `short_row_tokens` long.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderRule {
    pub min_hits: usize,
    pub primary: &'static [&'static str],
    pub short_row_tokens: Option<usize>,
}

fn keyword_hits(normalized: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|keyword| normalized.contains(*keyword))
        .count()
}

pub(crate) fn row_looks_like_header(row: &Row, keywords: &[&str], rule: &HeaderRule) -> bool {
    let normalized = normalize_lower(&row.text());
    let has_primary = rule
        .primary
        .iter()
        .any(|keyword| normalized.contains(keyword));
    if !has_primary {
        return false;
    }

    keyword_hits(&normalized, keywords) >= rule.min_hits
        || rule
            .short_row_tokens
            .is_some_and(|max_tokens| row.len() <= max_tokens)
}

/// A digit-free row mentioning a vocabulary keyword: the wrapped second line of
/// a header, or a header fragment repeated inside the body.
pub(crate) fn row_extends_header(row: &Row, keywords: &[&str]) -> bool {
    let normalized = normalize_lower(&row.text());
    if normalized.chars().any(|ch| ch.is_ascii_digit()) {
        return false;
    }
    keywords.iter().any(|keyword| normalized.contains(keyword))
}

pub(crate) fn find_header(
    rows: &[Row],
    start: usize,
    keywords: &[&str],
    rule: &HeaderRule,
) -> Option<usize> {
    rows.iter()
        .enumerate()
        .skip(start)
        .find(|(_, row)| row_looks_like_header(row, keywords, rule))
        .map(|(index, _)| index)
}

pub(crate) fn find_section(rows: &[Row], titles: &[&str]) -> Option<usize> {
    rows.iter().position(|row| {
        let normalized = normalize_lower(&row.text());
        titles.iter().any(|title| normalized.contains(title))
    })
}

/// Header tokens plus those of up to two following rows that continue it,
/// with the number of rows folded in.
pub(crate) fn extend_header(
    rows: &[Row],
    header_index: usize,
    keywords: &[&str],
) -> (Vec<Token>, usize) {
    let mut tokens = rows[header_index].tokens.clone();
    let mut folded = 0;
    for row in rows
        .iter()
        .skip(header_index + 1)
        .take(MAX_HEADER_CONTINUATION_ROWS)
    {
        if !row_extends_header(row, keywords) {
            break;
        }
        tokens.extend(row.tokens.iter().cloned());
        folded += 1;
    }
    (tokens, folded)
}

#[cfg(test)]
mod tests {
    use crate::model::Row;
    use crate::rows::tests::token;

    use super::{HeaderRule, extend_header, find_header, find_section, row_extends_header};

    const KEYWORDS: &[&str] = &["descricao", "unid", "quant", "valor", "base"];
    const RULE: HeaderRule = HeaderRule {
        min_hits: 3,
        primary: &["descricao"],
        short_row_tokens: None,
    };

    fn row(texts: &[&str]) -> Row {
        Row {
            tokens: texts
                .iter()
                .enumerate()
                .map(|(index, text)| token(text, index as f64 * 100.0, 0.0, index))
                .collect(),
        }
    }

    #[test]
    fn first_qualifying_row_wins() {
        let rows = vec![
            row(&["CONTA", "DE", "ENERGIA"]),
            row(&["UNID", "QUANT", "VALOR"]),
            row(&["Descrição", "Unid.", "Quant.", "Valor"]),
            row(&["DESCRICAO", "UNID", "QUANT"]),
        ];
        assert_eq!(find_header(&rows, 0, KEYWORDS, &RULE), Some(2));
        assert_eq!(find_header(&rows, 3, KEYWORDS, &RULE), Some(3));
        assert_eq!(find_header(&rows[..2], 0, KEYWORDS, &RULE), None);
    }

    #[test]
    fn short_rows_qualify_when_allowed() {
        let rule = HeaderRule {
            min_hits: 2,
            primary: &["tributos"],
            short_row_tokens: Some(2),
        };
        let rows = vec![row(&["TRIBUTOS"]), row(&["TRIBUTOS", "X", "Y"])];
        assert_eq!(find_header(&rows, 0, &["tributos", "base"], &rule), Some(0));
        assert_eq!(find_header(&rows, 1, &["tributos", "base"], &rule), None);
    }

    #[test]
    fn folds_at_most_two_digit_free_rows() {
        let rows = vec![
            row(&["DESCRICAO", "UNID", "QUANT"]),
            row(&["VALOR"]),
            row(&["BASE"]),
            row(&["VALOR"]),
        ];
        let (tokens, folded) = extend_header(&rows, 0, KEYWORDS);
        assert_eq!(tokens.len(), 5);
        assert_eq!(folded, 2);

        let stops_early = vec![
            row(&["DESCRICAO", "UNID", "QUANT"]),
            row(&["VALOR 1"]),
            row(&["BASE"]),
        ];
        let (tokens, folded) = extend_header(&stops_early, 0, KEYWORDS);
        assert_eq!(tokens.len(), 3);
        assert_eq!(folded, 0);
    }

    #[test]
    fn continuation_requires_keyword_and_no_digits() {
        assert!(row_extends_header(&row(&["(R$)", "VALOR"]), KEYWORDS));
        assert!(!row_extends_header(&row(&["VALOR", "10"]), KEYWORDS));
        assert!(!row_extends_header(&row(&["ENERGIA"]), KEYWORDS));
    }

    #[test]
    fn finds_section_title_by_normalized_text() {
        let rows = vec![
            row(&["ITENS"]),
            row(&["EQUIPAMENTOS DE MEDIÇÃO", "E CONSUMO NO PERÍODO"]),
        ];
        assert_eq!(
            find_section(&rows, &["equipamentos de medicao e consumo no periodo"]),
            Some(1)
        );
    }
}
