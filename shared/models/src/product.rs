//! Product domain models for the House of Clarence catalogue.
//!
//! This module defines the catalogue product record in its two lifecycle
//! forms: `NewProduct`, the insertable record assembled by the spreadsheet
//! ingestion pipeline, and `Product`, the persisted record owned by the
//! storage collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default lead time applied when the source data carries none (days).
pub const DEFAULT_LEAD_TIME_DAYS: i32 = 7;

/// Default minimum order quantity applied when the source data carries none.
pub const DEFAULT_MOQ: i32 = 1;

/// Category applied to rows that resolve no category of their own.
pub const DEFAULT_CATEGORY: &str = "General";

/// Supplier applied to rows that resolve no supplier of their own.
pub const DEFAULT_SUPPLIER: &str = "Unknown";

/// A persisted catalogue product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i32,
    pub product_code: String,
    pub product_type: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub specs: String,
    /// House of Clarence trade price, normalized decimal string.
    pub hoc_price: String,
    /// UK retail price, normalized decimal string.
    pub uk_price: String,
    pub unit: Option<String>,
    pub lead_time: i32,
    pub moq: i32,
    pub supplier: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable product record produced by the ingestion pipeline.
///
/// Prices are carried as normalized decimal strings (currency symbols and
/// thousands separators stripped, two decimal places) so the record can be
/// handed to any storage backend without float round-tripping.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 64, message = "Product code must be between 1 and 64 characters"))]
    pub product_code: String,
    #[validate(length(min = 1, max = 100, message = "Product type must be between 1 and 100 characters"))]
    pub product_type: String,
    #[validate(length(min = 1, max = 50, message = "Category must be between 1 and 50 characters"))]
    pub category: String,
    pub sub_category: Option<String>,
    pub specs: String,
    pub hoc_price: String,
    pub uk_price: String,
    pub unit: Option<String>,
    #[validate(range(min = 0, max = 365, message = "Lead time must be between 0 and 365 days"))]
    pub lead_time: i32,
    #[validate(range(min = 1, message = "Minimum order quantity must be at least 1"))]
    pub moq: i32,
    #[validate(length(min = 1, max = 100, message = "Supplier must be between 1 and 100 characters"))]
    pub supplier: String,
    #[validate(url(message = "Link must be a valid URL"))]
    pub link: Option<String>,
    pub image_url: Option<String>,
}

impl Default for NewProduct {
    fn default() -> Self {
        Self {
            product_code: String::new(),
            product_type: "Product".to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            sub_category: None,
            specs: String::new(),
            hoc_price: "0.00".to_string(),
            uk_price: "0.00".to_string(),
            unit: Some("unit".to_string()),
            lead_time: DEFAULT_LEAD_TIME_DAYS,
            moq: DEFAULT_MOQ,
            supplier: DEFAULT_SUPPLIER.to_string(),
            link: None,
            image_url: None,
        }
    }
}

impl NewProduct {
    /// True when the record carries neither specs text nor a nonzero price.
    ///
    /// Such rows are treated as incomplete by the normalizer and dropped
    /// before persistence.
    pub fn is_incomplete(&self) -> bool {
        self.specs.trim().is_empty()
            && parse_price(&self.hoc_price) == 0.0
            && parse_price(&self.uk_price) == 0.0
    }

    /// Persist this record as `Product` with the given serial id.
    pub fn into_product(self, id: i32) -> Product {
        let now = Utc::now();
        Product {
            id,
            product_code: self.product_code,
            product_type: self.product_type,
            category: self.category,
            sub_category: self.sub_category,
            specs: self.specs,
            hoc_price: self.hoc_price,
            uk_price: self.uk_price,
            unit: self.unit,
            lead_time: self.lead_time,
            moq: self.moq,
            supplier: self.supplier,
            link: self.link,
            image_url: self.image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

fn parse_price(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(0.0)
}
