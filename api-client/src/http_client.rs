// HTTP client for the Graphviz render API

use crate::errors::ApiError;
use graphviz_render_core::{
    DotUpload, FileListing, GenerateFromExistingRequest, HealthStatus, RenderRequest,
    RenderResult, SignalGeneratorImages,
};
use serde::de::DeserializeOwned;
use std::env;

/// Base endpoint used when `API_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Client for the render service
///
/// Holds only immutable configuration, so a single instance can be cloned
/// or shared across tasks and used for concurrent calls. Every network
/// operation is one request/response exchange with no retry and no timeout
/// of its own.
#[derive(Debug, Clone)]
pub struct DiagramServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl DiagramServiceClient {
    /// Create a client for the given base endpoint (e.g. "http://localhost:5000")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Create a client that reuses an existing `reqwest::Client`
    pub fn with_http_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    /// Create a client from `API_BASE_URL`, falling back to [`DEFAULT_BASE_URL`]
    pub fn from_env() -> Self {
        let base_url = env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Configured base endpoint, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Render a DOT file that already lives on the server
    ///
    /// Sends `{"filename": ...}` as JSON to `POST /generate_from_existing`.
    pub async fn generate_from_existing(&self, filename: &str) -> Result<RenderResult, ApiError> {
        self.generate_from_existing_request(&GenerateFromExistingRequest::new(filename))
            .await
    }

    /// Same as [`generate_from_existing`](Self::generate_from_existing) with
    /// the full request body, including the optional signal generator image
    pub async fn generate_from_existing_request(
        &self,
        request: &GenerateFromExistingRequest,
    ) -> Result<RenderResult, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/generate_from_existing"))
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        decode_response(response).await
    }

    /// Upload DOT content and render it
    ///
    /// The content is sent as `multipart/form-data` in the `file` field,
    /// with `signal_generator_image` as a text field when the upload sets one.
    pub async fn generate_from_upload(&self, upload: DotUpload) -> Result<RenderResult, ApiError> {
        let part = reqwest::multipart::Part::bytes(upload.content)
            .file_name(upload.file_name)
            .mime_str("text/vnd.graphviz")
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(image) = upload.signal_generator_image {
            form = form.text("signal_generator_image", image);
        }

        let response = self
            .client
            .post(self.endpoint("/generate"))
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;

        decode_response(response).await
    }

    /// Dispatch a [`RenderRequest`] to the matching generate call
    pub async fn generate(&self, request: RenderRequest) -> Result<RenderResult, ApiError> {
        match request {
            RenderRequest::Existing { filename } => self.generate_from_existing(&filename).await,
            RenderRequest::Upload(upload) => self.generate_from_upload(upload).await,
        }
    }

    /// List DOT files available on the server
    pub async fn list_dot_files(&self) -> Result<FileListing, ApiError> {
        self.get_json("/list_dot_files").await
    }

    /// List signal generator images available on the server
    pub async fn list_signal_generator_images(&self) -> Result<SignalGeneratorImages, ApiError> {
        self.get_json("/list_signal_generator_images").await
    }

    /// Query the service health endpoint
    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health").await
    }

    /// URL for displaying a rendered image (no network call)
    pub fn image_url(&self, filename: &str) -> String {
        format!("{}/image/{}", self.base_url, filename)
    }

    /// URL for downloading a rendered image (no network call)
    pub fn download_url(&self, filename: &str) -> String {
        format!("{}/download/{}", self.base_url, filename)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(network_error)?;

        decode_response(response).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn network_error(error: reqwest::Error) -> ApiError {
    if error.is_builder() {
        ApiError::InvalidRequest(error.to_string())
    } else {
        ApiError::Network(error.to_string())
    }
}

/// Map non-2xx to [`ApiError::Remote`], otherwise decode the JSON body as-is
async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Remote {
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
