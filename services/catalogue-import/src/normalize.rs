//! Product record normalization.
//!
//! Assembles one `NewProduct` per qualifying classified row: resolved or
//! synthesized product code (deduplicated within the import), cleaned
//! decimal prices, fixed defaults for the fields the price list never
//! carries, and the associated image URL when one was assigned.

use std::collections::{HashMap, HashSet};

use hoc_models::{NewProduct, DEFAULT_CATEGORY, DEFAULT_SUPPLIER};

use crate::classify::ClassifiedRow;
use crate::workbook::ColumnMap;

/// Prefix for synthesized product codes.
const GENERATED_CODE_PREFIX: &str = "AUTO";

/// Import-scoped set of product codes already handed out. Collisions get a
/// numeric suffix so two rows resolving to the same code both persist.
#[derive(Debug, Default)]
pub struct UsedCodes {
    codes: HashSet<String>,
}

impl UsedCodes {
    pub fn claim(&mut self, code: String) -> String {
        if self.codes.insert(code.clone()) {
            return code;
        }
        let mut suffix = 1usize;
        loop {
            let candidate = format!("{code}-{suffix}");
            if self.codes.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Normalize a raw price value to a two-decimal string.
///
/// Currency symbols, thousands separators and any other non-numeric
/// characters are stripped before parsing; empty or unparseable input
/// defaults to `"0.00"`. Normalization is idempotent.
pub fn clean_price(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "0.00".to_string();
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => format!("{value:.2}"),
        _ => "0.00".to_string(),
    }
}

/// Build product records from classified rows and their image assignments.
///
/// Rows with neither specs nor a nonzero price are incomplete and silently
/// dropped; an unparseable price never fails a row on its own.
pub fn normalize_rows(
    rows: &[ClassifiedRow],
    columns: &ColumnMap,
    image_urls: &HashMap<usize, String>,
) -> Vec<NewProduct> {
    let import_stamp = chrono::Utc::now().timestamp_millis();
    let mut used_codes = UsedCodes::default();
    let mut products = Vec::new();

    for row in rows {
        let record = build_record(row, columns, image_urls, import_stamp, &mut used_codes);
        if record.is_incomplete() {
            continue;
        }
        products.push(record);
    }

    products
}

fn build_record(
    row: &ClassifiedRow,
    columns: &ColumnMap,
    image_urls: &HashMap<usize, String>,
    import_stamp: i64,
    used_codes: &mut UsedCodes,
) -> NewProduct {
    let cells = &row.row;

    let product_code = match cells.text_at(columns.product_code) {
        Some(code) => used_codes.claim(code),
        None => used_codes.claim(format!(
            "{GENERATED_CODE_PREFIX}-{import_stamp}-{}",
            row.row_index
        )),
    };

    let category = row
        .category
        .clone()
        .or_else(|| cells.text_at(columns.category))
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    NewProduct {
        product_code,
        product_type: cells
            .text_at(columns.product_type)
            .unwrap_or_else(|| "Product".to_string()),
        category,
        sub_category: cells.text_at(columns.sub_category),
        specs: cells.text_at(columns.specs).unwrap_or_default(),
        hoc_price: clean_price(cells.text_at(columns.hoc_price).as_deref()),
        uk_price: clean_price(cells.text_at(columns.uk_price).as_deref()),
        link: cells.text_at(columns.link),
        supplier: cells
            .text_at(columns.supplier)
            .unwrap_or_else(|| DEFAULT_SUPPLIER.to_string()),
        image_url: image_urls.get(&row.row_index).cloned(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{Cell, Row};

    fn classified(row_index: usize, category: Option<&str>, cells: &[&str]) -> ClassifiedRow {
        ClassifiedRow {
            row_index,
            category: category.map(str::to_string),
            row: Row::new(
                cells
                    .iter()
                    .map(|v| {
                        if v.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(v.to_string())
                        }
                    })
                    .collect(),
            ),
        }
    }

    fn columns() -> ColumnMap {
        ColumnMap {
            product_code: Some(0),
            specs: Some(1),
            hoc_price: Some(2),
            uk_price: Some(3),
            supplier: Some(4),
            ..Default::default()
        }
    }

    #[test]
    fn test_price_cleaning() {
        assert_eq!(clean_price(Some("£1,250.00")), "1250.00");
        assert_eq!(clean_price(Some("12.50")), "12.50");
        assert_eq!(clean_price(Some("$48")), "48.00");
        assert_eq!(clean_price(Some("abc")), "0.00");
        assert_eq!(clean_price(Some("")), "0.00");
        assert_eq!(clean_price(None), "0.00");
    }

    #[test]
    fn test_code_collision_gets_numeric_suffix() {
        let rows = vec![
            classified(2, None, &["ABC", "First widget", "10", "20", ""]),
            classified(3, None, &["ABC", "Second widget", "10", "20", ""]),
            classified(4, None, &["ABC", "Third widget", "10", "20", ""]),
        ];
        let products = normalize_rows(&rows, &columns(), &HashMap::new());
        let codes: Vec<_> = products.iter().map(|p| p.product_code.as_str()).collect();
        assert_eq!(codes, vec!["ABC", "ABC-1", "ABC-2"]);
    }

    #[test]
    fn test_missing_code_is_synthesized() {
        let rows = vec![classified(7, None, &["", "Oak flooring", "48", "75", ""])];
        let products = normalize_rows(&rows, &columns(), &HashMap::new());
        let code = &products[0].product_code;
        assert!(code.starts_with("AUTO-"), "unexpected code {code}");
        assert!(code.ends_with("-7"), "unexpected code {code}");
    }

    #[test]
    fn test_incomplete_rows_dropped_silently() {
        let rows = vec![
            classified(2, None, &["XYZ", "", "0", "", ""]),
            classified(3, None, &["KWO001", "Sintered Stone Worktop", "£2,850", "", ""]),
        ];
        let products = normalize_rows(&rows, &columns(), &HashMap::new());
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_code, "KWO001");
        assert_eq!(products[0].hoc_price, "2850.00");
    }

    #[test]
    fn test_banner_category_wins_over_column_and_default() {
        let mut cols = columns();
        cols.category = Some(5);
        let rows = vec![
            classified(2, Some("BATHROOMS"), &["BBA001", "Vanity", "980", "1580", "", "KITCHEN"]),
            classified(3, None, &["KWO001", "Worktop", "10", "20", "", "KITCHEN"]),
            classified(4, None, &["FWO001", "Flooring", "10", "20", ""]),
        ];
        let products = normalize_rows(&rows, &cols, &HashMap::new());
        assert_eq!(products[0].category, "BATHROOMS");
        assert_eq!(products[1].category, "KITCHEN");
        assert_eq!(products[2].category, "General");
    }

    #[test]
    fn test_defaults_and_image_assignment() {
        let mut image_urls = HashMap::new();
        image_urls.insert(2usize, "/uploads/extracted-images/image1.png".to_string());

        let rows = vec![classified(2, None, &["BSH001", "Shower Screen", "450", "780", ""])];
        let products = normalize_rows(&rows, &columns(), &image_urls);

        let product = &products[0];
        assert_eq!(product.supplier, "Unknown");
        assert_eq!(product.product_type, "Product");
        assert_eq!(product.lead_time, hoc_models::DEFAULT_LEAD_TIME_DAYS);
        assert_eq!(product.moq, hoc_models::DEFAULT_MOQ);
        assert_eq!(
            product.image_url.as_deref(),
            Some("/uploads/extracted-images/image1.png")
        );
    }

    proptest::proptest! {
        /// Normalizing an already-normalized price is the identity.
        #[test]
        fn prop_price_cleaning_idempotent(pounds in 0u32..1_000_000, pence in 0u32..100) {
            let normalized = clean_price(Some(&format!("{pounds}.{pence:02}")));
            proptest::prop_assert_eq!(clean_price(Some(&normalized)), normalized);
        }
    }
}
