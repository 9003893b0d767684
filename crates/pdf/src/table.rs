//! Table detection from positioned text spans.

use std::cmp::Ordering;

use crate::content::TextSpan;

/// Spans whose baselines differ by less than this share a row.
const ROW_TOLERANCE: f64 = 2.0;

/// Minimum rows and cells per row for a region to count as a table.
const MIN_ROWS: usize = 2;
const MIN_CELLS: usize = 2;

/// Group spans into rows of cells, top of the page first.
///
/// Neighbouring spans are merged into one cell unless the horizontal gap
/// between them is at least one font size wide.
pub fn rows_of_cells<'a>(spans: impl IntoIterator<Item = &'a TextSpan>) -> Vec<Vec<String>> {
    let mut spans: Vec<&TextSpan> = spans
        .into_iter()
        .filter(|s| !s.text.trim().is_empty())
        .collect();
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut rows: Vec<Vec<&TextSpan>> = Vec::new();
    for span in spans {
        match rows.last_mut() {
            Some(row) if (row[0].y - span.y).abs() < ROW_TOLERANCE => row.push(span),
            _ => rows.push(vec![span]),
        }
    }

    rows.into_iter()
        .map(|mut row| {
            row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
            merge_cells(&row)
        })
        .collect()
}

fn merge_cells(row: &[&TextSpan]) -> Vec<String> {
    let mut cells: Vec<String> = Vec::new();
    let mut previous: Option<&TextSpan> = None;

    for &span in row {
        let text = span.text.trim();
        match previous {
            Some(prev) if span.x - prev.estimated_end() < prev.size.max(1.0) => {
                if let Some(cell) = cells.last_mut() {
                    cell.push(' ');
                    cell.push_str(text);
                }
            }
            _ => cells.push(text.to_string()),
        }
        previous = Some(span);
    }

    cells
}

/// The first run of consecutive rows that all have several cells.
pub fn detect_table<'a>(spans: impl IntoIterator<Item = &'a TextSpan>) -> Option<Vec<Vec<String>>> {
    let mut run: Vec<Vec<String>> = Vec::new();

    for row in rows_of_cells(spans) {
        if row.len() >= MIN_CELLS {
            run.push(row);
            continue;
        }
        if run.len() >= MIN_ROWS {
            return Some(run);
        }
        run.clear();
    }

    (run.len() >= MIN_ROWS).then_some(run)
}
