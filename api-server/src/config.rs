// Server configuration from environment variables

use graphviz_render_core::ImageFormat;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings for the render API server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `BIND_ADDR`
    pub bind_addr: SocketAddr,

    /// `DOT_DIR`: where server-resident DOT files and signal generator images live
    pub dot_dir: PathBuf,

    /// `OUTPUT_DIR`: where rendered images are written
    pub output_dir: PathBuf,

    /// `GRAPHVIZ_DOT`: path or name of the Graphviz `dot` executable
    pub dot_binary: PathBuf,

    /// `OUTPUT_FORMAT`: png or svg
    pub output_format: ImageFormat,

    /// `MAX_UPLOAD_BYTES`: request body limit
    pub max_upload_bytes: usize,

    /// `LOG_DIR`: also write daily-rolling log files here when set
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            dot_dir: PathBuf::from("."),
            output_dir: PathBuf::from("outputs"),
            dot_binary: PathBuf::from("dot"),
            output_format: ImageFormat::Png,
            max_upload_bytes: 1024 * 1024, // 1MB
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get("BIND_ADDR") {
            config.bind_addr = value.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidValue {
                    key: "BIND_ADDR",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = get("DOT_DIR") {
            config.dot_dir = PathBuf::from(value);
        }

        if let Some(value) = get("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(value);
        }

        if let Some(value) = get("GRAPHVIZ_DOT") {
            config.dot_binary = PathBuf::from(value);
        }

        if let Some(value) = get("OUTPUT_FORMAT") {
            config.output_format = value.parse().map_err(|e: graphviz_render_core::UnknownFormat| {
                ConfigError::InvalidValue {
                    key: "OUTPUT_FORMAT",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = get("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = value.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "MAX_UPLOAD_BYTES",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        config.log_dir = get("LOG_DIR").map(PathBuf::from);

        Ok(config)
    }
}
