//! Server configuration.

use std::path::PathBuf;
use std::str::FromStr;

use facecrop::{DetectorSettings, DEFAULT_MARGIN_RATIO};

/// Upload server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory that receives uploads and crops
    pub upload_dir: PathBuf,
    /// URL prefix under which `upload_dir` is served
    pub public_path: String,
    /// SeetaFace model file
    pub model_path: PathBuf,
    /// Margin ratio applied around detected faces
    pub margin_ratio: f64,
    /// Max request body size
    pub max_body_size: usize,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Detector tuning
    pub detector: DetectorSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            upload_dir: PathBuf::from("uploads"),
            public_path: "/uploads".to_string(),
            model_path: PathBuf::from("model/seeta_fd_frontal_v1.0.bin"),
            margin_ratio: DEFAULT_MARGIN_RATIO,
            max_body_size: 10 * 1024 * 1024, // 10MB
            cors_origins: vec!["*".to_string()],
            detector: DetectorSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("API_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "API_PORT").unwrap_or(defaults.port),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            public_path: lookup("UPLOAD_PUBLIC_PATH")
                .map(|p| normalize_public_path(&p))
                .unwrap_or(defaults.public_path),
            model_path: lookup("FACECROP_MODEL")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            margin_ratio: parse_var(&lookup, "FACE_MARGIN")
                .filter(|m: &f64| m.is_finite() && *m >= 0.0)
                .unwrap_or(defaults.margin_ratio),
            max_body_size: parse_var(&lookup, "MAX_BODY_SIZE")
                .unwrap_or(defaults.max_body_size),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            detector: DetectorSettings {
                min_face_size: parse_var(&lookup, "MIN_FACE_SIZE")
                    .unwrap_or(defaults.detector.min_face_size),
                score_threshold: parse_var(&lookup, "SCORE_THRESHOLD")
                    .unwrap_or(defaults.detector.score_threshold),
                ..defaults.detector
            },
        }
    }

    /// Public URL of a file stored in the upload directory.
    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_path.trim_end_matches('/'), file_name)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}

fn normalize_public_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/uploads".to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.port, 5001);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.public_path, "/uploads");
        assert!((config.margin_ratio - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn env_overrides() {
        let config = config_from(&[
            ("API_PORT", "8080"),
            ("UPLOAD_DIR", "/var/lib/facecrop"),
            ("UPLOAD_PUBLIC_PATH", "files/"),
            ("FACE_MARGIN", "0.5"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
            ("MIN_FACE_SIZE", "40"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/facecrop"));
        assert_eq!(config.public_path, "/files");
        assert!((config.margin_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.detector.min_face_size, 40);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("API_PORT", "not-a-port"),
            ("FACE_MARGIN", "-1"),
        ]);
        assert_eq!(config.port, 5001);
        assert!((config.margin_ratio - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn public_url_joins_prefix_and_name() {
        let config = ServerConfig::default();
        assert_eq!(
            config.public_url("recortado_a.png"),
            "/uploads/recortado_a.png"
        );
    }
}
