//! Column layout for numbered menu options

use console::{Alignment, measure_text_width, pad_str};

const COLUMN_GAP: &str = "  ";

/// Number of columns to use for `count` options.
///
/// Starts at one column and adds another while each column would still hold
/// more than `min_rows` options, up to `max_columns`.
pub fn column_count(count: usize, max_columns: usize, min_rows: usize) -> usize {
    let mut columns = 1;
    while columns < max_columns && count > min_rows * columns {
        columns += 1;
    }
    columns
}

/// Lay out `labels` as `N) label` cells filling columns top to bottom.
pub fn layout(labels: &[String], max_columns: usize, min_rows: usize) -> Vec<String> {
    if labels.is_empty() {
        return Vec::new();
    }
    let columns = column_count(labels.len(), max_columns, min_rows);
    let rows = labels.len().div_ceil(columns);

    let cells: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{}) {label}", i + 1))
        .collect();
    let widths: Vec<usize> = cells
        .chunks(rows)
        .map(|column| column.iter().map(|c| measure_text_width(c)).max().unwrap_or(0))
        .collect();

    (0..rows)
        .map(|row| {
            let line: Vec<String> = widths
                .iter()
                .enumerate()
                .filter_map(|(col, &width)| {
                    cells
                        .get(col * rows + row)
                        .map(|cell| pad_str(cell, width, Alignment::Left, None).into_owned())
                })
                .collect();
            line.join(COLUMN_GAP).trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Opt{i}")).collect()
    }

    #[test]
    fn test_column_count() {
        assert_eq!(column_count(0, 3, 15), 1);
        assert_eq!(column_count(15, 3, 15), 1);
        assert_eq!(column_count(16, 3, 15), 2);
        assert_eq!(column_count(31, 3, 15), 3);
        assert_eq!(column_count(200, 3, 15), 3);
        assert_eq!(column_count(200, 1, 15), 1);
    }

    #[test]
    fn test_single_column() {
        assert_eq!(layout(&labels(3), 3, 15), vec!["1) Opt0", "2) Opt1", "3) Opt2"]);
    }

    #[test]
    fn test_columns_fill_top_to_bottom() {
        let rows = layout(&labels(5), 3, 2);
        assert_eq!(rows, vec!["1) Opt0  3) Opt2  5) Opt4", "2) Opt1  4) Opt3"]);
    }

    #[test]
    fn test_columns_pad_to_widest_cell() {
        let labels = vec!["A".to_string(), "Longer".to_string(), "B".to_string()];
        let rows = layout(&labels, 2, 1);
        assert_eq!(rows, vec!["1) A       3) B", "2) Longer"]);
    }

    #[test]
    fn test_empty() {
        assert!(layout(&[], 3, 15).is_empty());
    }
}
