//! Image-to-row association.
//!
//! The workbook format anchors pictures to drawing coordinates, not to row
//! semantics, and this pipeline deliberately does not parse the drawing
//! anchor XML. Association is therefore heuristic and tiered: a curated
//! keyword table for known recurring catalogue products, then sequential
//! assignment in archive order for everything else. The sequential cursor
//! advances independently of which indices the keyword tier consumed, so
//! one image can serve both a keyword-matched row and a sequential row;
//! that mirrors the established import behavior and is pinned by test.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::classify::ClassifiedRow;
use crate::workbook::ColumnMap;

/// An image extracted from the workbook archive: its entry of origin, the
/// local destination file, and the servable URL recorded on products.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    pub entry_name: String,
    pub path: PathBuf,
    pub url: String,
}

/// One curated association between a specs substring and an image position.
#[derive(Debug, Clone, Copy)]
pub struct ImageKeywordRule {
    /// Lowercase substring searched for in the product specs.
    pub specs_keyword: &'static str,
    /// Index into the extracted image list, in archive order.
    pub image_index: usize,
}

/// Keyword table curated for the recurring House of Clarence price-list
/// products. Positions reflect the media order of the standard catalogue
/// workbook.
pub const IMAGE_KEYWORD_RULES: &[ImageKeywordRule] = &[
    ImageKeywordRule { specs_keyword: "vanity unit", image_index: 0 },
    ImageKeywordRule { specs_keyword: "basin faucet", image_index: 1 },
    ImageKeywordRule { specs_keyword: "back to wall wc", image_index: 2 },
    ImageKeywordRule { specs_keyword: "shower screen", image_index: 3 },
    ImageKeywordRule { specs_keyword: "freestanding stone bath", image_index: 4 },
    ImageKeywordRule { specs_keyword: "calacatta", image_index: 5 },
];

/// Map classified product rows to extracted image URLs.
///
/// Tier 1 assigns the keyword table's configured image when a product's
/// specs contain a known substring and the index is in bounds. Tier 2
/// assigns remaining images in strict archive order; rows beyond the
/// available image count simply get none.
pub fn assign_images(
    rows: &[ClassifiedRow],
    columns: &ColumnMap,
    images: &[ExtractedImage],
) -> HashMap<usize, String> {
    let mut assignments = HashMap::new();
    if images.is_empty() {
        return assignments;
    }

    let mut cursor = 0usize;

    for row in rows {
        let specs = row
            .row
            .text_at(columns.specs)
            .map(|text| text.to_lowercase())
            .unwrap_or_default();

        let keyword_hit = IMAGE_KEYWORD_RULES
            .iter()
            .find(|rule| !specs.is_empty() && specs.contains(rule.specs_keyword))
            .filter(|rule| rule.image_index < images.len());

        if let Some(rule) = keyword_hit {
            assignments.insert(row.row_index, images[rule.image_index].url.clone());
            continue;
        }

        if cursor < images.len() {
            assignments.insert(row.row_index, images[cursor].url.clone());
            cursor += 1;
        }
    }

    assignments
}
