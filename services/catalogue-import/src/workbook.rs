//! Workbook tabular parser.
//!
//! Reads the first sheet of a price-list workbook into a row-major grid of
//! tagged cell values, locates the header row by keyword scan, and resolves
//! each canonical field to a column index through an ordered chain of
//! resolution strategies (fixed-position override first for the two price
//! columns, then synonym matching).

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, DataType, Reader};
use std::path::Path;

/// Keywords that identify the header row. The first row containing a cell
/// whose lowercased text contains any of these becomes the header.
const HEADER_KEYWORDS: &[&str] = &["product", "category", "price"];

/// Fixed column positions for the two price fields in the primary price-list
/// layout. Header-text matching is unreliable for these ("price" is
/// ambiguous across columns), so position wins over synonyms when the header
/// row is wide enough.
pub const HOC_PRICE_COLUMN: usize = 5;
pub const UK_PRICE_COLUMN: usize = 6;

const TYPE_SYNONYMS: &[&str] = &["type", "item type"];
const PRODUCT_CODE_SYNONYMS: &[&str] = &["s.no", "product code", "code", "item code"];
const CATEGORY_SYNONYMS: &[&str] = &["product category", "category"];
const SUB_CATEGORY_SYNONYMS: &[&str] = &["sub category", "subcategory"];
const SPECS_SYNONYMS: &[&str] = &["product specs", "specs", "specification"];
const HOC_PRICE_SYNONYMS: &[&str] = &["hoc price", "house price", "cost"];
const UK_PRICE_SYNONYMS: &[&str] = &["uk price", "retail price", "price"];
const LINK_SYNONYMS: &[&str] = &["uk product link", "link", "url"];
const SUPPLIER_SYNONYMS: &[&str] = &["supplier", "manufacturer"];

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Trimmed text content, or `None` for empty/whitespace-only cells.
    /// Integral numeric cells render without a decimal point so product
    /// codes stored as numbers round-trip cleanly.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(value) => Some(format_number(*value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_none()
    }
}

impl From<&DataType> for Cell {
    fn from(value: &DataType) -> Self {
        match value {
            DataType::Empty => Cell::Empty,
            DataType::String(s) => Cell::Text(s.clone()),
            DataType::Float(f) => Cell::Number(*f),
            DataType::Int(i) => Cell::Number(*i as f64),
            DataType::Bool(b) => Cell::Text(b.to_string()),
            other => {
                let rendered = other.to_string();
                if rendered.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(rendered)
                }
            }
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// One spreadsheet row as an ordered sequence of tagged cells with safe
/// accessor-by-index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Text of the cell at a resolved column index. Unresolved columns
    /// (`None`) and out-of-range indices read as empty.
    pub fn text_at(&self, index: Option<usize>) -> Option<String> {
        index.and_then(|i| self.cells.get(i)).and_then(Cell::text)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
}

/// One column-resolution strategy. Strategies are evaluated in order per
/// field; the first that yields an index wins.
enum ColumnStrategy {
    /// Use a fixed column position when the header row is wide enough to
    /// contain it.
    FixedPosition(usize),
    /// First header cell whose lowercased text contains any synonym.
    Synonyms(&'static [&'static str]),
}

fn resolve_column(headers: &Row, strategies: &[ColumnStrategy]) -> Option<usize> {
    for strategy in strategies {
        match strategy {
            ColumnStrategy::FixedPosition(index) => {
                if *index < headers.len() {
                    return Some(*index);
                }
            }
            ColumnStrategy::Synonyms(synonyms) => {
                let found = headers.iter().position(|cell| {
                    cell.text()
                        .map(|text| {
                            let lowered = text.to_lowercase();
                            synonyms.iter().any(|synonym| lowered.contains(synonym))
                        })
                        .unwrap_or(false)
                });
                if found.is_some() {
                    return found;
                }
            }
        }
    }
    None
}

/// Canonical field name to column index mapping, built once per import.
/// Unresolved fields stay `None` and read as always-empty downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    pub product_type: Option<usize>,
    pub product_code: Option<usize>,
    pub category: Option<usize>,
    pub sub_category: Option<usize>,
    pub specs: Option<usize>,
    pub hoc_price: Option<usize>,
    pub uk_price: Option<usize>,
    pub link: Option<usize>,
    pub supplier: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(headers: &Row) -> Self {
        Self {
            product_type: resolve_column(headers, &[ColumnStrategy::Synonyms(TYPE_SYNONYMS)]),
            product_code: resolve_column(
                headers,
                &[ColumnStrategy::Synonyms(PRODUCT_CODE_SYNONYMS)],
            ),
            category: resolve_column(headers, &[ColumnStrategy::Synonyms(CATEGORY_SYNONYMS)]),
            sub_category: resolve_column(
                headers,
                &[ColumnStrategy::Synonyms(SUB_CATEGORY_SYNONYMS)],
            ),
            specs: resolve_column(headers, &[ColumnStrategy::Synonyms(SPECS_SYNONYMS)]),
            hoc_price: resolve_column(
                headers,
                &[
                    ColumnStrategy::FixedPosition(HOC_PRICE_COLUMN),
                    ColumnStrategy::Synonyms(HOC_PRICE_SYNONYMS),
                ],
            ),
            uk_price: resolve_column(
                headers,
                &[
                    ColumnStrategy::FixedPosition(UK_PRICE_COLUMN),
                    ColumnStrategy::Synonyms(UK_PRICE_SYNONYMS),
                ],
            ),
            link: resolve_column(headers, &[ColumnStrategy::Synonyms(LINK_SYNONYMS)]),
            supplier: resolve_column(headers, &[ColumnStrategy::Synonyms(SUPPLIER_SYNONYMS)]),
        }
    }
}

/// First sheet of a workbook with its located header row and resolved
/// column map.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub rows: Vec<Row>,
    pub header_row: usize,
    pub columns: ColumnMap,
}

/// Read the first sheet of the workbook at `path` into a parsed grid.
///
/// Uses format auto-detection so binary `.xls` files parse as well as
/// `.xlsx`. A sheet without a recognizable header row is fatal for the
/// import.
pub fn parse_workbook(path: &Path) -> Result<ParsedSheet> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("No sheets found in workbook")?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .context("Failed to read worksheet")??;

    let rows: Vec<Row> = range
        .rows()
        .map(|cells| Row::new(cells.iter().map(Cell::from).collect()))
        .collect();

    parse_grid(rows)
}

/// Locate the header row in a raw grid and resolve its column map.
pub fn parse_grid(rows: Vec<Row>) -> Result<ParsedSheet> {
    let header_row = rows
        .iter()
        .position(|row| {
            row.iter().any(|cell| {
                cell.text()
                    .map(|text| {
                        let lowered = text.to_lowercase();
                        HEADER_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
                    })
                    .unwrap_or(false)
            })
        });

    let Some(header_row) = header_row else {
        bail!("Could not find header row in workbook");
    };

    let columns = ColumnMap::resolve(&rows[header_row]);

    Ok(ParsedSheet {
        rows,
        header_row,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn price_list_header() -> Row {
        text_row(&[
            "Type",
            "S.No",
            "Product Category",
            "Sub Category",
            "Product Specs",
            "HOC Price",
            "UK Price",
            "UK Product Link",
            "Supplier",
        ])
    }

    #[test]
    fn test_header_row_located_past_preamble() {
        let rows = vec![
            text_row(&["House of Clarence"]),
            text_row(&["Price list 2024"]),
            price_list_header(),
        ];
        let sheet = parse_grid(rows).unwrap();
        assert_eq!(sheet.header_row, 2);
    }

    #[test]
    fn test_missing_header_is_fatal() {
        let rows = vec![text_row(&["just", "some", "noise"])];
        let err = parse_grid(rows).unwrap_err();
        assert!(err.to_string().contains("header row"));
    }

    #[test]
    fn test_synonym_resolution() {
        let columns = ColumnMap::resolve(&price_list_header());
        assert_eq!(columns.product_type, Some(0));
        assert_eq!(columns.product_code, Some(1)); // "s.no"
        assert_eq!(columns.category, Some(2));
        assert_eq!(columns.sub_category, Some(3));
        assert_eq!(columns.specs, Some(4));
        assert_eq!(columns.link, Some(7));
        assert_eq!(columns.supplier, Some(8));
    }

    #[test]
    fn test_price_columns_use_fixed_positions() {
        // Even with misleading header text in other columns, the price
        // fields resolve to the fixed layout positions.
        let columns = ColumnMap::resolve(&price_list_header());
        assert_eq!(columns.hoc_price, Some(HOC_PRICE_COLUMN));
        assert_eq!(columns.uk_price, Some(UK_PRICE_COLUMN));
    }

    #[test]
    fn test_price_synonyms_used_for_narrow_layouts() {
        let headers = text_row(&["Product Specs", "Cost", "Retail Price"]);
        let columns = ColumnMap::resolve(&headers);
        assert_eq!(columns.hoc_price, Some(1));
        assert_eq!(columns.uk_price, Some(2));
    }

    #[test]
    fn test_unresolved_fields_read_as_empty() {
        let headers = text_row(&["Product Specs", "Price"]);
        let columns = ColumnMap::resolve(&headers);
        assert_eq!(columns.supplier, None);

        let row = text_row(&["Oak flooring", "48"]);
        assert_eq!(row.text_at(columns.supplier), None);
    }

    #[test]
    fn test_numeric_cell_text_rendering() {
        assert_eq!(Cell::Number(123.0).text().as_deref(), Some("123"));
        assert_eq!(Cell::Number(12.5).text().as_deref(), Some("12.5"));
        assert_eq!(Cell::Text("  trimmed  ".into()).text().as_deref(), Some("trimmed"));
        assert_eq!(Cell::Text("   ".into()).text(), None);
        assert_eq!(Cell::Empty.text(), None);
    }
}
