//! Product slug availability.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::slug::SlugAvailability;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckSlugRequest {
    #[serde(default)]
    slug: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckSlugResponse {
    exists: bool,
}

/// `POST /api/products/check-slug`
pub async fn check_slug(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckSlugRequest>, JsonRejection>,
) -> Result<Json<CheckSlugResponse>> {
    let Json(request) = payload.map_err(|e| AppError::Internal(e.body_text()))?;
    let slug = request
        .slug
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Slug is required".to_string()))?;

    let exists = match state.slugs().check(&slug).await? {
        SlugAvailability::Taken => true,
        SlugAvailability::Available => false,
        SlugAvailability::Unknown => {
            return Err(AppError::BadRequest("Slug is required".to_string()));
        }
    };

    Ok(Json(CheckSlugResponse { exists }))
}
