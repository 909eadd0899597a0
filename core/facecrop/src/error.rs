use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceCropError {
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("no face detected")]
    NoFaceFound,

    #[error("detected face lies outside the image")]
    EmptyCrop,

    #[error("unsupported output format for {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("margin ratio must be finite and >= 0.0, got {0}")]
    InvalidMargin(f64),

    #[error("failed to encode image: {0}")]
    EncodeError(String),

    #[error("failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load face model from {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },
}

impl FaceCropError {
    /// Short, user-facing description of the failure.
    ///
    /// This is the text printed by the command-line tool and returned in the
    /// `erro` field of the upload endpoint.
    pub fn reason(&self) -> &'static str {
        match self {
            FaceCropError::DecodeError(_) | FaceCropError::ZeroDimensions => "Imagem inválida",
            FaceCropError::NoFaceFound => "Nenhum rosto detectado",
            FaceCropError::EmptyCrop => "Rosto fora dos limites da imagem",
            FaceCropError::UnsupportedFormat(_) => "Formato de imagem não suportado",
            FaceCropError::InvalidMargin(_) => "Margem inválida",
            FaceCropError::EncodeError(_) | FaceCropError::WriteError { .. } => {
                "Falha ao salvar imagem"
            }
            FaceCropError::ModelLoad { .. } => "Falha ao carregar o modelo",
        }
    }

    /// Whether the failure was caused by the submitted image rather than by
    /// the host (disk, model, configuration).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FaceCropError::DecodeError(_)
                | FaceCropError::ZeroDimensions
                | FaceCropError::NoFaceFound
                | FaceCropError::EmptyCrop
                | FaceCropError::UnsupportedFormat(_)
                | FaceCropError::InvalidMargin(_)
        )
    }
}
