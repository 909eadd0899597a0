//! Application state.

use std::sync::Arc;

use facecrop::{FaceLocator, RustfaceLocator};

use crate::config::ServerConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub locator: Arc<dyn FaceLocator>,
}

impl AppState {
    /// Create state around an already-built locator.
    pub fn new(config: ServerConfig, locator: Arc<dyn FaceLocator>) -> Self {
        Self {
            config: Arc::new(config),
            locator,
        }
    }

    /// Load the SeetaFace model named in `config` and build the state.
    pub fn from_config(config: ServerConfig) -> Result<Self, facecrop::FaceCropError> {
        let locator = RustfaceLocator::from_path(&config.model_path, config.detector)?;
        Ok(Self::new(config, Arc::new(locator)))
    }
}
