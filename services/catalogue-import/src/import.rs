//! Import orchestration.
//!
//! Sequences the ingestion components over one uploaded workbook: embedded
//! image extraction and tabular parsing run independently over the same
//! file, the associator joins their outputs by row index, and each
//! normalized record is persisted one at a time. Partial success is the
//! normal completion mode; a single record's failure never aborts the
//! batch.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use hoc_models::{ImportReport, NewProduct};
use hoc_utils::UploadConfig;

use crate::archive;
use crate::classify::classify_rows;
use crate::images::{assign_images, ExtractedImage};
use crate::normalize::normalize_rows;
use crate::storage::ProductStore;
use crate::workbook::{parse_workbook, ParsedSheet};

#[derive(Debug, Clone)]
pub struct CatalogueImporter {
    images_dir: PathBuf,
    images_url_prefix: String,
}

impl CatalogueImporter {
    pub fn new(upload: &UploadConfig) -> Self {
        Self {
            images_dir: PathBuf::from(&upload.extracted_images_dir),
            images_url_prefix: upload.extracted_images_prefix.clone(),
        }
    }

    pub fn with_dirs(images_dir: impl Into<PathBuf>, images_url_prefix: impl Into<String>) -> Self {
        Self {
            images_dir: images_dir.into(),
            images_url_prefix: images_url_prefix.into(),
        }
    }

    /// Run one import end to end: parse, persist each record, clean up the
    /// uploaded workbook.
    ///
    /// A workbook that cannot be parsed at all surfaces as a single report
    /// error with zero successes; the upload is left in place in that case.
    pub async fn import_file<S>(&self, workbook_path: &Path, store: &S) -> ImportReport
    where
        S: ProductStore + ?Sized,
    {
        let mut report = ImportReport::default();

        let products = match self.parse_catalogue(workbook_path).await {
            Ok(products) => products,
            Err(error) => {
                report.record_error(format!("Failed to process workbook: {error:#}"));
                return report;
            }
        };

        for product in products {
            let code = product.product_code.clone();
            match store.create_product(product).await {
                Ok(_) => report.record_success(),
                Err(error) => {
                    report.record_error(format!("Failed to import product {code}: {error}"))
                }
            }
        }

        // Uploaded workbook is a temporary artifact; remove it on the
        // success path.
        if let Err(error) = tokio::fs::remove_file(workbook_path).await {
            warn!(
                workbook = %workbook_path.display(),
                error = %error,
                "Failed to remove uploaded workbook after import"
            );
        }

        info!(
            imported = report.success,
            errors = report.errors.len(),
            "Catalogue import completed"
        );
        report
    }

    /// Parse a workbook into normalized product records without persisting.
    pub async fn parse_catalogue(&self, workbook_path: &Path) -> Result<Vec<NewProduct>> {
        let images = archive::extract_embedded_images(
            workbook_path,
            &self.images_dir,
            &self.images_url_prefix,
        )
        .await;
        info!(count = images.len(), "Extracted embedded images");

        let sheet = parse_workbook(workbook_path)?;
        let products = build_products(&sheet, &images);
        info!(count = products.len(), "Parsed products from workbook");
        Ok(products)
    }
}

/// Join a parsed sheet with its extracted images into product records.
pub fn build_products(sheet: &ParsedSheet, images: &[ExtractedImage]) -> Vec<NewProduct> {
    let rows = classify_rows(sheet);
    let image_urls: HashMap<usize, String> = assign_images(&rows, &sheet.columns, images);
    normalize_rows(&rows, &sheet.columns, &image_urls)
}
