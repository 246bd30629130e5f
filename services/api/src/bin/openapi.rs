//! services/api/src/bin/openapi.rs
//!
//! Dumps the tutor API's OpenAPI document. The output path is the first
//! argument and defaults to `openapi.json` in the working directory.

use api_lib::{error::ApiError, web::rest::ApiDoc};
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn document() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "Nihongo Tutor API".to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc
}

fn main() -> Result<(), ApiError> {
    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let doc = document();
    let json = doc
        .to_pretty_json()
        .map_err(|e| ApiError::Internal(format!("serializing OpenAPI document: {}", e)))?;
    std::fs::write(&output, json)?;

    println!(
        "Wrote {} operations across {} paths to {}",
        doc.paths.paths.values().map(item_operations).sum::<usize>(),
        doc.paths.paths.len(),
        output.display()
    );
    Ok(())
}

fn item_operations(item: &utoipa::openapi::PathItem) -> usize {
    [
        item.get.is_some(),
        item.post.is_some(),
        item.patch.is_some(),
        item.put.is_some(),
        item.delete.is_some(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count()
}
