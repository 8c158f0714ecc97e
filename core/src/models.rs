// Core data models for the Graphviz render API

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Image format produced by the rendering engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// File extension (also the `dot -T` argument)
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    /// MIME type used when serving the image
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Guess the format from an output file name
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl FromStr for ImageFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown image format: {0} (expected png or svg)")]
pub struct UnknownFormat(pub String);

/// DOT file uploaded from the caller's side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotUpload {
    /// File name sent in the multipart part (must end in .dot or .gv)
    pub file_name: String,

    /// Raw DOT source
    pub content: Vec<u8>,

    /// Sent as the `signal_generator_image` form field when set
    pub signal_generator_image: Option<String>,
}

impl DotUpload {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            signal_generator_image: None,
        }
    }

    pub fn with_signal_generator_image(mut self, image: impl Into<String>) -> Self {
        self.signal_generator_image = Some(image.into());
        self
    }
}

/// A render request: exactly one source per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderRequest {
    /// DOT file already present on the server
    Existing { filename: String },

    /// DOT content sent with the request
    Upload(DotUpload),
}

/// API Request: POST /generate_from_existing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateFromExistingRequest {
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_generator_image: Option<String>,
}

impl GenerateFromExistingRequest {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            signal_generator_image: None,
        }
    }

    pub fn with_signal_generator_image(mut self, image: impl Into<String>) -> Self {
        self.signal_generator_image = Some(image.into());
        self
    }
}

/// API Response: POST /generate and POST /generate_from_existing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResult {
    /// Status text; an empty string is kept as sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Source DOT file name (the upload endpoint may omit it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    /// Output identifier used for the image and download URLs
    pub output_file: String,

    /// Inline SVG markup, only sent for SVG output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_content: Option<String>,

    /// Any other fields the server sent
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RenderResult {
    /// Convert inline SVG to Data URL format (for img src attribute)
    pub fn svg_data_url(&self) -> Option<String> {
        use base64::Engine;
        let svg = self.svg_content.as_ref()?;
        let base64_data = base64::engine::general_purpose::STANDARD.encode(svg.as_bytes());
        Some(format!("data:{};base64,{}", ImageFormat::Svg.mime_type(), base64_data))
    }
}

/// API Response: GET /list_dot_files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileListing {
    pub dot_files: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// API Response: GET /list_signal_generator_images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalGeneratorImages {
    pub signal_generator_images: Vec<String>,

    #[serde(default)]
    pub count: usize,
}

/// API Response: GET /health
///
/// The payload shape belongs to the service, so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthStatus(pub serde_json::Value);

impl HealthStatus {
    /// The `status` field, when the service reports one
    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(|v| v.as_str())
    }
}

/// API Error Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Optional error details (for debugging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
