//! Embedded image extraction.
//!
//! A workbook of the xlsx family is a ZIP container; embedded raster images
//! live under `xl/media/`. This module enumerates the container, filters the
//! media entries, and streams each to the extraction directory under a
//! timestamped name. The directory is append-only across imports: prior
//! extractions are never overwritten or collected.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::images::ExtractedImage;

/// Archive path prefix under which workbook media entries live.
const MEDIA_DIR: &str = "xl/media/";

/// Raster extensions accepted for extraction.
const RASTER_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif"];

/// Generic temp extension some producers use for embedded images;
/// normalized to `.png` on extraction.
const TEMP_EXTENSION: &str = ".tmp";

/// Extract all embedded raster images from the workbook at `workbook_path`
/// into `images_dir`, returning them in archive enumeration order.
///
/// A file that cannot be opened as an archive yields an empty set: the
/// import continues with zero images rather than failing. Individual
/// entries that fail to stream are skipped.
pub async fn extract_embedded_images(
    workbook_path: &Path,
    images_dir: &Path,
    url_prefix: &str,
) -> Vec<ExtractedImage> {
    match try_extract(workbook_path, images_dir, url_prefix).await {
        Ok(images) => images,
        Err(error) => {
            warn!(
                workbook = %workbook_path.display(),
                error = %format!("{error:#}"),
                "Workbook is not readable as an archive; continuing with no images"
            );
            Vec::new()
        }
    }
}

async fn try_extract(
    workbook_path: &Path,
    images_dir: &Path,
    url_prefix: &str,
) -> Result<Vec<ExtractedImage>> {
    tokio::fs::create_dir_all(images_dir)
        .await
        .with_context(|| format!("Failed to create {}", images_dir.display()))?;

    let file = File::open(workbook_path)
        .with_context(|| format!("Failed to open {}", workbook_path.display()))?;
    let mut archive =
        zip::ZipArchive::new(file).context("Failed to open workbook as ZIP archive")?;

    let extraction_stamp = chrono::Utc::now().timestamp_millis();
    let mut images = Vec::new();

    for index in 0..archive.len() {
        // Read-then-write per entry; the entry borrow must end before the
        // async write.
        let (entry_name, data) = {
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(index, error = %error, "Skipping unreadable archive entry");
                    continue;
                }
            };

            let entry_name = entry.name().to_string();
            if entry.is_dir() || !is_media_image(&entry_name) {
                continue;
            }

            let mut data = Vec::with_capacity(entry.size() as usize);
            if let Err(error) = entry.read_to_end(&mut data) {
                warn!(entry = %entry_name, error = %error, "Skipping archive entry that failed to stream");
                continue;
            }
            (entry_name, data)
        };

        let file_name = extracted_file_name(&entry_name, extraction_stamp);
        let destination = images_dir.join(&file_name);

        if let Err(error) = tokio::fs::write(&destination, &data).await {
            warn!(entry = %entry_name, error = %error, "Skipping archive entry that failed to write");
            continue;
        }

        debug!(entry = %entry_name, destination = %destination.display(), "Extracted embedded image");
        images.push(ExtractedImage {
            entry_name,
            path: destination,
            url: format!("{}/{}", url_prefix.trim_end_matches('/'), file_name),
        });
    }

    Ok(images)
}

fn is_media_image(entry_name: &str) -> bool {
    if !entry_name.starts_with(MEDIA_DIR) {
        return false;
    }
    let lowered = entry_name.to_lowercase();
    RASTER_EXTENSIONS
        .iter()
        .any(|extension| lowered.ends_with(extension))
        || lowered.ends_with(TEMP_EXTENSION)
}

/// Destination file name: `extracted-<timestamp>-<original basename>`, with
/// the generic temp extension normalized to `.png`.
fn extracted_file_name(entry_name: &str, extraction_stamp: i64) -> String {
    let basename = entry_name.rsplit('/').next().unwrap_or(entry_name);
    let basename = if basename.to_lowercase().ends_with(TEMP_EXTENSION) {
        format!("{}.png", &basename[..basename.len() - TEMP_EXTENSION.len()])
    } else {
        basename.to_string()
    };
    format!("extracted-{extraction_stamp}-{basename}")
}
