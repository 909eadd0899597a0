//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use facecrop::FaceCropError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Nenhum arquivo enviado")]
    MissingUpload,

    #[error("Nome de arquivo vazio")]
    EmptyFilename,

    #[error("Nome de arquivo inválido")]
    InvalidFilename,

    #[error("Falha ao ler o arquivo enviado")]
    UploadRead { status: StatusCode, detail: String },

    #[error("{0}")]
    Unprocessable(&'static str),

    #[error("{public}")]
    Internal {
        public: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn internal(public: &'static str, detail: impl Into<String>) -> Self {
        Self::Internal {
            public,
            detail: detail.into(),
        }
    }

    pub fn upload_read(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::UploadRead {
            status,
            detail: detail.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingUpload | ApiError::EmptyFilename | ApiError::InvalidFilename => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UploadRead { status, .. } => *status,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FaceCropError> for ApiError {
    fn from(err: FaceCropError) -> Self {
        if err.is_input_error() {
            ApiError::Unprocessable(err.reason())
        } else {
            ApiError::internal(err.reason(), err.to_string())
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    erro: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details go to the log, never to the client
        match &self {
            ApiError::Internal { detail, .. } => error!(%detail, "request failed"),
            ApiError::UploadRead { detail, .. } => warn!(%detail, "could not read upload"),
            _ => {}
        }

        let body = ErrorResponse {
            erro: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_validation_errors_are_bad_requests() {
        assert_eq!(ApiError::MissingUpload.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyFilename.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingUpload.to_string(), "Nenhum arquivo enviado");
    }

    #[test]
    fn image_errors_are_unprocessable() {
        let err = ApiError::from(FaceCropError::NoFaceFound);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "Nenhum rosto detectado");

        let err = ApiError::from(FaceCropError::DecodeError("bad header".into()));
        assert_eq!(err.to_string(), "Imagem inválida");
    }

    #[test]
    fn upload_read_keeps_transport_status() {
        let err =
            ApiError::upload_read(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded");
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "Falha ao ler o arquivo enviado");
    }

    #[test]
    fn write_errors_hide_details() {
        let err = ApiError::from(FaceCropError::WriteError {
            path: "/secret/path.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Falha ao salvar imagem");
    }
}
