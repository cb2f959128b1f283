//! House of Clarence Catalogue Import Service
//!
//! Accepts supplier price-list workbooks via multipart upload, runs the
//! ingestion pipeline, and serves the resulting products and extracted
//! images.

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use hoc_catalogue_import::storage::{MemoryProductStore, ProductStore};
use hoc_catalogue_import::CatalogueImporter;
use hoc_models::Product;
use hoc_utils::{init_logging, AppConfig, UploadConfig};

#[derive(Clone)]
struct AppState {
    store: Arc<MemoryProductStore>,
    importer: Arc<CatalogueImporter>,
    upload: Arc<UploadConfig>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;
    info!("Starting House of Clarence Catalogue Import Service");

    tokio::fs::create_dir_all(&config.upload.upload_dir)
        .await
        .context("Failed to create upload directory")?;
    tokio::fs::create_dir_all(&config.upload.extracted_images_dir)
        .await
        .context("Failed to create extracted images directory")?;

    let state = AppState {
        store: Arc::new(MemoryProductStore::new()),
        importer: Arc::new(CatalogueImporter::new(&config.upload)),
        upload: Arc::new(config.upload.clone()),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/products", get(list_products))
        .route("/api/catalogue/upload", post(upload_catalogue))
        .nest_service(
            "/uploads/extracted-images",
            ServeDir::new(&config.upload.extracted_images_dir),
        )
        .layer(DefaultBodyLimit::max(config.upload.max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Catalogue Import Service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "catalogue-import",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, (StatusCode, String)> {
    let products = state
        .store
        .list_products()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(products))
}

/// Upload response mirroring the import report.
#[derive(Debug, Serialize)]
struct UploadResponse {
    message: String,
    results: UploadResults,
}

#[derive(Debug, Serialize)]
struct UploadResults {
    imported: usize,
    errors: Vec<String>,
}

/// Accept a price-list workbook and run the import.
async fn upload_catalogue(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Upload error: {}", e)))?
        {
            Some(field) if field.name() == Some("excelFile") => break field,
            Some(_) => continue,
            None => return Err((StatusCode::BAD_REQUEST, "No file uploaded".to_string())),
        }
    };

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "workbook.xlsx".to_string());

    let extension = workbook_extension(&filename).ok_or((
        StatusCode::BAD_REQUEST,
        "Only Excel files are allowed".to_string(),
    ))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Read error: {}", e)))?;

    // Unique name per upload so concurrent imports never collide on disk.
    let workbook_path = PathBuf::from(&state.upload.upload_dir).join(format!(
        "excelFile-{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension
    ));

    tokio::fs::write(&workbook_path, &data)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let report = state
        .importer
        .import_file(&workbook_path, state.store.as_ref())
        .await;

    Ok(Json(UploadResponse {
        message: "Workbook processed".to_string(),
        results: UploadResults {
            imported: report.success,
            errors: report.errors,
        },
    }))
}

fn workbook_extension(filename: &str) -> Option<&'static str> {
    let lowered = filename.to_lowercase();
    if lowered.ends_with(".xlsx") {
        Some("xlsx")
    } else if lowered.ends_with(".xls") {
        Some("xls")
    } else {
        None
    }
}
