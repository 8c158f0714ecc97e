// API client library for the Graphviz render service
//
// This crate provides HTTP client functionality for communicating
// with the render API server, plus a stateful session adapter for UIs.

pub mod errors;
pub mod http_client;
pub mod session;

// Re-export commonly used items
pub use errors::ApiError;
pub use http_client::{DiagramServiceClient, DEFAULT_BASE_URL};
pub use session::{RenderSession, SessionState};

pub use graphviz_render_core::{
    DotUpload, FileListing, HealthStatus, RenderRequest, RenderResult, SignalGeneratorImages,
};
