//! Row classification.
//!
//! Walks the data rows after the header, separating section banner rows
//! (category groupings such as `["B", "BATHROOMS", ""]`) from product rows.
//! The category in effect is threaded through the walk as explicit fold
//! state and carried forward until the next banner; this assumes the source
//! file groups products contiguously by category.

use crate::workbook::{ParsedSheet, Row};

/// A data row classified as a product, tagged with the category in effect
/// at that row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    /// Zero-based index of the row in the original grid.
    pub row_index: usize,
    /// Category carried forward from the most recent section banner, if any.
    pub category: Option<String>,
    pub row: Row,
}

/// True for the price-list banner convention: a single uppercase letter in
/// the first cell, a label in the second, nothing in the third.
fn is_section_banner(row: &Row) -> bool {
    let first_is_letter = row
        .get(0)
        .and_then(|cell| cell.text())
        .map(|text| text.len() == 1 && text.chars().all(|c| c.is_ascii_uppercase()))
        .unwrap_or(false);
    let second_present = row.get(1).and_then(|cell| cell.text()).is_some();
    let third_empty = row.get(2).and_then(|cell| cell.text()).is_none();

    first_is_letter && second_present && third_empty
}

/// Classify the rows after the header into product rows.
///
/// Blank rows are skipped; banner rows update the running category and emit
/// nothing; rows with neither a product code nor specs are separator noise
/// and are skipped.
pub fn classify_rows(sheet: &ParsedSheet) -> Vec<ClassifiedRow> {
    let mut current_category: Option<String> = None;
    let mut products = Vec::new();

    for (row_index, row) in sheet.rows.iter().enumerate().skip(sheet.header_row + 1) {
        if row.is_blank() {
            continue;
        }

        if is_section_banner(row) {
            current_category = row.get(1).and_then(|cell| cell.text());
            continue;
        }

        let has_code = row.text_at(sheet.columns.product_code).is_some();
        let has_specs = row.text_at(sheet.columns.specs).is_some();
        if !has_code && !has_specs {
            continue;
        }

        products.push(ClassifiedRow {
            row_index,
            category: current_category.clone(),
            row: row.clone(),
        });
    }

    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{parse_grid, Cell};

    fn text_row(values: &[&str]) -> Row {
        Row::new(
            values
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        )
    }

    fn sheet_with(rows: Vec<Row>) -> ParsedSheet {
        parse_grid(rows).unwrap()
    }

    #[test]
    fn test_banner_detection() {
        assert!(is_section_banner(&text_row(&["B", "BATHROOMS", ""])));
        assert!(is_section_banner(&text_row(&["A", "KITCHEN"])));
        assert!(!is_section_banner(&text_row(&["AB", "KITCHEN", ""])));
        assert!(!is_section_banner(&text_row(&["b", "KITCHEN", ""])));
        assert!(!is_section_banner(&text_row(&["B", "", ""])));
        assert!(!is_section_banner(&text_row(&["B", "KITCHEN", "occupied"])));
    }

    #[test]
    fn test_banner_updates_category_and_emits_nothing() {
        let sheet = sheet_with(vec![
            text_row(&["S.No", "Product Category", "Product Specs"]),
            text_row(&["B", "BATHROOMS", ""]),
            text_row(&["", "", "Tap"]),
        ]);
        let rows = classify_rows(&sheet);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category.as_deref(), Some("BATHROOMS"));
        assert_eq!(rows[0].row_index, 2);
    }

    #[test]
    fn test_category_carries_forward_until_next_banner() {
        let sheet = sheet_with(vec![
            text_row(&["S.No", "Product Category", "Product Specs"]),
            text_row(&["A", "KITCHEN", ""]),
            text_row(&["KWO001", "", "Sintered Stone Worktop"]),
            text_row(&["KOC001", "", "German Kitchen Cabinets"]),
            text_row(&["B", "BATHROOMS", ""]),
            text_row(&["BBA001", "", "Basin+Vanity Unit"]),
        ]);
        let rows = classify_rows(&sheet);
        let categories: Vec<_> = rows.iter().map(|r| r.category.as_deref()).collect();
        assert_eq!(
            categories,
            vec![Some("KITCHEN"), Some("KITCHEN"), Some("BATHROOMS")]
        );
    }

    #[test]
    fn test_blank_and_noise_rows_skipped() {
        let sheet = sheet_with(vec![
            text_row(&["S.No", "Product Category", "Product Specs", "Notes"]),
            text_row(&["", "", "", ""]),
            text_row(&["", "", "", "left as a reminder"]),
            text_row(&["BSH001", "", "Walk-in Shower Screen 1200mm", ""]),
        ]);
        let rows = classify_rows(&sheet);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_index, 3);
    }

    #[test]
    fn test_rows_before_any_banner_have_no_category() {
        let sheet = sheet_with(vec![
            text_row(&["S.No", "Product Category", "Product Specs"]),
            text_row(&["FWO001", "", "Engineered Oak 15mm"]),
        ]);
        let rows = classify_rows(&sheet);
        assert_eq!(rows[0].category, None);
    }
}
