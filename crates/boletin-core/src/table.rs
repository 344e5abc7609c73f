//! Annual-report table analysis.
//!
//! The SII annual report renders a fixed-shape table: two header rows, one
//! row per month, and a trailing totals row. Each month row carries the month
//! label in the first cell and the "Total Líquido" amount in the ninth. The
//! analyzer normalizes the amount text and decides whether every monthly
//! total is zero, which is the condition for capturing evidence.

use serde::{Deserialize, Serialize};

/// Rows skipped at the top of the table body (column headers).
const HEADER_ROWS: usize = 2;
/// Rows dropped at the bottom (the totals row).
const TRAILING_ROWS: usize = 1;
/// Month rows with fewer cells than this are malformed and skipped.
const MIN_CELLS: usize = 9;
const MONTH_CELL: usize = 0;
const AMOUNT_CELL: usize = 8;

/// One retained month row, derived and never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    pub month: String,
    pub raw: String,
    pub normalized: String,
    pub is_zero: bool,
}

/// Result of one extraction pass over the report table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableAnalysis {
    pub rows: Vec<TableRow>,
    pub all_zero: bool,
    pub analyzed_count: usize,
}

/// Strip whitespace, non-breaking-space markers, thousands separators and any
/// other non-digit from a raw amount cell. An empty result is the literal
/// value zero.
pub fn normalize_amount(raw: &str) -> String {
    let cleaned: String = raw
        .replace("&nbsp;", "")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if cleaned.is_empty() {
        "0".to_string()
    } else {
        cleaned
    }
}

/// Analyze the extracted cell grid of the report table.
///
/// `all_zero` holds iff every retained row normalized to `"0"` and at least
/// one row was retained. An empty extraction deliberately reports `false` so
/// a broken page never triggers a false-positive capture.
pub fn analyze(cells: &[Vec<String>]) -> TableAnalysis {
    let body = if cells.len() > HEADER_ROWS + TRAILING_ROWS {
        &cells[HEADER_ROWS..cells.len() - TRAILING_ROWS]
    } else {
        &[]
    };

    let mut rows = Vec::new();
    let mut all_zero = true;

    for cell_row in body {
        if cell_row.len() < MIN_CELLS {
            continue;
        }
        let month = cell_row[MONTH_CELL].trim().to_string();
        let raw = cell_row[AMOUNT_CELL].clone();
        let normalized = normalize_amount(&raw);
        let is_zero = normalized == "0";
        if !is_zero {
            all_zero = false;
        }
        rows.push(TableRow {
            month,
            raw,
            normalized,
            is_zero,
        });
    }

    let analyzed_count = rows.len();
    TableAnalysis {
        rows,
        all_zero: all_zero && analyzed_count > 0,
        analyzed_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month_row(month: &str, amount: &str) -> Vec<String> {
        let mut row = vec![month.to_string()];
        row.extend(std::iter::repeat_n(String::new(), 7));
        row.push(amount.to_string());
        row
    }

    fn header() -> Vec<String> {
        vec!["header".to_string()]
    }

    #[test]
    fn normalization_round_trips() {
        assert_eq!(normalize_amount(" 1.234 "), "1234");
        assert_eq!(normalize_amount(" &nbsp; "), "0");
        assert_eq!(normalize_amount(""), "0");
        assert_eq!(normalize_amount("0"), "0");
        assert_eq!(normalize_amount("\u{a0}\u{a0}"), "0");
        assert_eq!(normalize_amount("15.000"), "15000");
    }

    #[test]
    fn is_zero_follows_normalization() {
        let mut cells = vec![header(), header()];
        cells.push(month_row("Enero", " 1.234 "));
        cells.push(month_row("Febrero", " &nbsp; "));
        cells.push(month_row("Marzo", ""));
        cells.push(month_row("Abril", "0"));
        cells.push(month_row("Total", "1.234"));

        let analysis = analyze(&cells);
        assert_eq!(analysis.analyzed_count, 4);
        let zeros: Vec<bool> = analysis.rows.iter().map(|r| r.is_zero).collect();
        assert_eq!(zeros, vec![false, true, true, true]);
        assert!(!analysis.all_zero);
    }

    #[test]
    fn all_zero_for_twelve_zero_months() {
        let mut cells = vec![header(), header()];
        for m in 1..=12 {
            cells.push(month_row(&format!("Mes {}", m), "0"));
        }
        cells.push(month_row("Total", "0"));

        let analysis = analyze(&cells);
        assert_eq!(analysis.analyzed_count, 12);
        assert!(analysis.all_zero);
    }

    #[test]
    fn single_nonzero_month_breaks_all_zero() {
        let mut cells = vec![header(), header()];
        for m in 1..=12 {
            let amount = if m == 5 { "15.000" } else { "0" };
            cells.push(month_row(&format!("Mes {}", m), amount));
        }
        cells.push(month_row("Total", "15.000"));

        let analysis = analyze(&cells);
        assert!(!analysis.all_zero);
        assert_eq!(analysis.rows[4].normalized, "15000");
    }

    #[test]
    fn empty_extraction_is_not_all_zero() {
        let analysis = analyze(&[]);
        assert_eq!(analysis.analyzed_count, 0);
        assert!(!analysis.all_zero);

        // Headers only, no month rows retained.
        let cells = vec![header(), header()];
        let analysis = analyze(&cells);
        assert!(!analysis.all_zero);
    }

    #[test]
    fn short_rows_are_skipped_without_error() {
        let mut cells = vec![header(), header()];
        for m in 1..=11 {
            cells.push(month_row(&format!("Mes {}", m), if m % 2 == 0 { "&nbsp;" } else { "0" }));
        }
        // A malformed spacer row in the middle of the body.
        cells.push(vec!["".to_string(), "".to_string()]);
        cells.push(month_row("Total", "0"));

        let analysis = analyze(&cells);
        assert_eq!(analysis.analyzed_count, 11);
        assert!(analysis.all_zero);
    }

    #[test]
    fn fourteen_row_report_analyzes_eleven_months() {
        // 2 header rows, 11 month rows, 1 totals row.
        let mut cells = vec![header(), header()];
        for m in 1..=11 {
            cells.push(month_row(&format!("Mes {}", m), if m % 3 == 0 { "&nbsp;" } else { "0" }));
        }
        cells.push(month_row("Total", "0"));
        assert_eq!(cells.len(), 14);

        let analysis = analyze(&cells);
        assert_eq!(analysis.analyzed_count, 11);
        assert!(analysis.all_zero);
    }
}
