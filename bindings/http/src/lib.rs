//! Axum HTTP front end for the face cropper.
//!
//! Exposes a single upload endpoint, `POST /api/recortar-rosto`, plus a
//! health probe and static serving of the upload directory.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sanitize;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
