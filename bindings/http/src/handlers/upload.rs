//! Face crop upload handler.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::sanitize::secure_filename;
use crate::state::AppState;

/// Multipart field carrying the photo.
pub const PHOTO_FIELD: &str = "foto";

/// Prefix added to the stored name of the cropped file.
pub const CROPPED_PREFIX: &str = "recortado_";

/// Successful crop response.
#[derive(Debug, Serialize)]
pub struct CropResponse {
    /// Public path of the cropped image.
    pub caminho: String,
}

struct Upload {
    file_name: String,
    data: Bytes,
}

/// `POST /api/recortar-rosto`
///
/// Stores the uploaded photo, crops the first detected face next to it and
/// returns the public path of the crop.
pub async fn recortar_rosto(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<CropResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(%rejection, "request is not a multipart upload");
        ApiError::MissingUpload
    })?;

    let upload = read_photo(&mut multipart).await?;

    let safe_name = secure_filename(&upload.file_name);
    if safe_name.is_empty() {
        return Err(ApiError::InvalidFilename);
    }

    let upload_dir = &state.config.upload_dir;
    let original_path = upload_dir.join(&safe_name);
    tokio::fs::write(&original_path, &upload.data)
        .await
        .map_err(|e| {
            ApiError::internal(
                "Falha ao salvar imagem",
                format!("writing {}: {e}", original_path.display()),
            )
        })?;

    let output_name = format!("{CROPPED_PREFIX}{safe_name}");
    let output_path = upload_dir.join(&output_name);
    let locator = Arc::clone(&state.locator);
    let margin_ratio = state.config.margin_ratio;

    let saved = tokio::task::spawn_blocking(move || {
        facecrop::crop_face(&original_path, &output_path, margin_ratio, &*locator)
    })
    .await
    .map_err(|e| ApiError::internal("Erro interno", format!("crop task failed: {e}")))?
    .map_err(|e| {
        warn!(file = %safe_name, "{e}");
        ApiError::from(e)
    })?;

    info!(
        original = %safe_name,
        cropped = %saved,
        bytes = upload.data.len(),
        "face cropped"
    );

    Ok(Json(CropResponse {
        caminho: state.config.public_url(&saved),
    }))
}

/// Find the first file part named [`PHOTO_FIELD`].
///
/// Parts without a filename are form values, not files, and are skipped.
async fn read_photo(multipart: &mut Multipart) -> ApiResult<Upload> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::MissingUpload),
            Err(e) => return Err(ApiError::upload_read(e.status(), e.body_text())),
        };

        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if file_name.is_empty() {
            return Err(ApiError::EmptyFilename);
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::upload_read(e.status(), e.body_text()))?;
        return Ok(Upload { file_name, data });
    }
}
