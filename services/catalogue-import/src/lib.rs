//! House of Clarence catalogue import pipeline.
//!
//! Ingests supplier price-list workbooks: parses the first sheet into
//! product rows, independently extracts raster images embedded in the
//! workbook's ZIP container, re-associates images with rows via a tiered
//! heuristic, and persists normalized product records through the
//! [`storage::ProductStore`] collaborator.

pub mod archive;
pub mod classify;
pub mod images;
pub mod import;
pub mod normalize;
pub mod storage;
pub mod workbook;

pub use import::CatalogueImporter;
