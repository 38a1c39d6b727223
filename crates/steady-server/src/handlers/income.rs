//! Income history upload handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{AppError, AppState, DEFAULT_USER_ID, MAX_UPLOAD_SIZE};
use steady_core::import::parse_income_csv;

/// Response for the income upload endpoint
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub rows: usize,
    pub date_range: String,
    pub avg_income: String,
}

/// POST /api/income/upload - Upload income history as CSV
///
/// Expects multipart form with:
/// - file: CSV file with `date,income` columns (required, max 10MB)
/// - user_id: user to attach the history to (optional, defaults to demo_user)
pub async fn upload_income(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut user_id = DEFAULT_USER_ID.to_string();
    let mut total_size: usize = 0;

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;
                total_size += bytes.len();

                if total_size > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes.to_vec());
            }
            "user_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read user_id"))?;
                if !value.is_empty() {
                    user_id = value;
                }
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;

    // Parse the CSV; bad columns or malformed rows surface as 400
    let records = parse_income_csv(file_data.as_slice())
        .map_err(|e| AppError::bad_request(&e.to_string()))?;

    if records.is_empty() {
        return Err(AppError::bad_request("CSV contained no income rows"));
    }

    let rows = records.len();
    let date_range = format!(
        "{} to {}",
        records.first().unwrap().date,
        records.last().unwrap().date
    );
    let avg_income = records.iter().map(|r| r.amount).sum::<f64>() / rows as f64;

    let handle = state.store.user(&user_id).await;
    handle.write().await.set_income_history(records);

    info!(user_id = %user_id, rows, "Income history uploaded");

    Ok(Json(UploadResponse {
        message: "Income data uploaded successfully".to_string(),
        rows,
        date_range,
        avg_income: format!("{:.0}/day", avg_income),
    }))
}
