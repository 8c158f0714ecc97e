// API handlers

use crate::errors::ServerError;
use crate::routes::AppState;
use crate::signal_generator::{
    is_signal_generator_image, substitute_image, DEFAULT_SIGNAL_GENERATOR_IMAGE,
};
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use graphviz_render_core::{
    is_allowed_dot_file, validate_dot_file_name, validate_plain_file_name, FileListing,
    GenerateFromExistingRequest, ImageFormat, RenderResult, SignalGeneratorImages,
};
use serde_json::json;
use std::path::Path as FsPath;
use uuid::Uuid;

/// GET / - API documentation
pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "GraphViz Render API",
        "endpoints": {
            "/": "GET - This documentation",
            "/generate": "POST - Generate an image from an uploaded DOT file",
            "/generate_from_existing": "POST - Generate an image from a DOT file on the server",
            "/list_dot_files": "GET - List available DOT files",
            "/list_signal_generator_images": "GET - List available signal generator images",
            "/health": "GET - Health check",
            "/image/<filename>": "GET - Serve a generated image for web display",
            "/download/<filename>": "GET - Download a generated image"
        },
        "example_usage": {
            "upload_file": "POST /generate with 'file' in form-data and optional 'signal_generator_image'",
            "use_existing": "POST /generate_from_existing with {'filename': 'your_file.dot', 'signal_generator_image': 'signal_generator2.png'}",
            "display_image": "GET /image/<filename> - Use this URL in <img> tags"
        }
    }))
}

/// GET /health - Health check endpoint
pub async fn health() -> Response {
    let health_status = json!({
        "status": "healthy",
        "message": "GraphViz Render API is running",
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, Json(health_status)).into_response()
}

/// GET /list_dot_files - DOT and GV files in the DOT directory
pub async fn list_dot_files(State(state): State<AppState>) -> Result<Json<FileListing>, ServerError> {
    let dot_files = list_files(&state.config.dot_dir, is_allowed_dot_file).await?;

    Ok(Json(FileListing {
        count: Some(dot_files.len()),
        dot_files,
        extra: Default::default(),
    }))
}

/// GET /list_signal_generator_images - signal_generator*.png in the DOT directory
pub async fn list_signal_generator_images(
    State(state): State<AppState>,
) -> Result<Json<SignalGeneratorImages>, ServerError> {
    let images = list_files(&state.config.dot_dir, is_signal_generator_image).await?;

    Ok(Json(SignalGeneratorImages {
        count: images.len(),
        signal_generator_images: images,
    }))
}

/// POST /generate - Render an uploaded DOT file (multipart field `file`)
pub async fn generate_from_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RenderResult>, ServerError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut signal_generator_image: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content = field.bytes().await.map_err(multipart_error)?;
                upload = Some((file_name, content.to_vec()));
            }
            "signal_generator_image" => {
                let value = field.text().await.map_err(multipart_error)?;
                if !value.trim().is_empty() {
                    signal_generator_image = Some(value.trim().to_string());
                }
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let (file_name, content) =
        upload.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
    validate_dot_file_name(&file_name)?;

    let source = String::from_utf8(content)
        .map_err(|_| ServerError::BadRequest("File must be valid UTF-8 text".to_string()))?;

    let format = state.config.output_format;
    let output_file = format!("{}.{}", Uuid::new_v4(), format.extension());

    tracing::info!(source_file = %file_name, output_file = %output_file, "Rendering uploaded DOT file");

    let signal_generator_image =
        signal_generator_image.unwrap_or_else(|| DEFAULT_SIGNAL_GENERATOR_IMAGE.to_string());
    render_and_store(&state, source, file_name, output_file, signal_generator_image)
        .await
        .map(Json)
}

/// POST /generate_from_existing - Render a DOT file already on the server
pub async fn generate_from_existing(
    State(state): State<AppState>,
    payload: Result<Json<GenerateFromExistingRequest>, JsonRejection>,
) -> Result<Json<RenderResult>, ServerError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected generate_from_existing body: {}", e);
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(e.body_text())
        } else {
            ServerError::BadRequest(
                "No filename provided. Send JSON with 'filename' field".to_string(),
            )
        }
    })?;

    let filename = request.filename;
    validate_plain_file_name(&filename)?;

    let path = state.config.dot_dir.join(&filename);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(ServerError::NotFound(format!(
            "File '{}' not found",
            filename
        )));
    }

    if !is_allowed_dot_file(&filename) {
        return Err(ServerError::BadRequest(
            "Invalid file type. Only .dot and .gv files allowed".to_string(),
        ));
    }

    let source = tokio::fs::read_to_string(&path).await?;

    let format = state.config.output_format;
    let stem = FsPath::new(&filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("graph");
    let output_file = format!("{}_{}.{}", stem, Uuid::new_v4(), format.extension());

    tracing::info!(source_file = %filename, output_file = %output_file, "Rendering existing DOT file");

    let signal_generator_image = request
        .signal_generator_image
        .unwrap_or_else(|| DEFAULT_SIGNAL_GENERATOR_IMAGE.to_string());
    render_and_store(&state, source, filename, output_file, signal_generator_image)
        .await
        .map(Json)
}

/// GET /image/:filename - Serve a generated image inline
pub async fn serve_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ServerError> {
    let data = read_output(&state, &filename).await?;

    Ok(([(header::CONTENT_TYPE, content_type_for(&filename))], data).into_response())
}

/// GET /download/:filename - Serve a generated image as an attachment
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ServerError> {
    let data = read_output(&state, &filename).await?;

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, data).into_response())
}

/// Pipe the source through the renderer and write the result to the output directory
async fn render_and_store(
    state: &AppState,
    source: String,
    source_file: String,
    output_file: String,
    signal_generator_image: String,
) -> Result<RenderResult, ServerError> {
    let source = apply_signal_generator_image(state, source, &signal_generator_image).await?;

    let format = state.config.output_format;
    let data = state.renderer.render(&source, format).await?;

    tokio::fs::create_dir_all(&state.config.output_dir).await?;
    tokio::fs::write(state.config.output_dir.join(&output_file), &data).await?;

    tracing::info!(output_file = %output_file, bytes = data.len(), "Image generated");

    let svg_content = match format {
        ImageFormat::Svg => Some(String::from_utf8_lossy(&data).into_owned()),
        ImageFormat::Png => None,
    };

    let mut extra = serde_json::Map::new();
    extra.insert(
        "signal_generator_image".to_string(),
        serde_json::Value::String(signal_generator_image),
    );

    Ok(RenderResult {
        message: Some(format!(
            "{} generated successfully",
            format.extension().to_uppercase()
        )),
        source_file: Some(source_file),
        output_file,
        svg_content,
        extra,
    })
}

async fn apply_signal_generator_image(
    state: &AppState,
    source: String,
    requested: &str,
) -> Result<String, ServerError> {
    let Some(rewritten) = substitute_image(&source, requested) else {
        return Ok(source);
    };

    let not_found =
        || ServerError::BadRequest(format!("Signal generator image '{}' not found", requested));

    validate_plain_file_name(requested).map_err(|_| not_found())?;
    let image_path = state.config.dot_dir.join(requested);
    if !tokio::fs::try_exists(&image_path).await.unwrap_or(false) {
        return Err(not_found());
    }

    tracing::info!("Replaced signal generator image with: {}", requested);
    Ok(rewritten)
}

async fn read_output(state: &AppState, filename: &str) -> Result<Vec<u8>, ServerError> {
    let not_found = || ServerError::NotFound("File not found".to_string());

    validate_plain_file_name(filename).map_err(|_| not_found())?;

    match tokio::fs::read(state.config.output_dir.join(filename)).await {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(ServerError::Io(e)),
    }
}

/// Sorted names of regular files in `dir` accepted by `predicate`
async fn list_files(
    dir: &FsPath,
    predicate: impl Fn(&str) -> bool,
) -> Result<Vec<String>, ServerError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let is_file = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        if let Some(name) = entry.file_name().to_str() {
            if predicate(name) {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

fn content_type_for(filename: &str) -> &'static str {
    ImageFormat::from_file_name(filename)
        .map(|format| format.mime_type())
        .unwrap_or("application/octet-stream")
}

fn multipart_error(error: axum::extract::multipart::MultipartError) -> ServerError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(error.body_text())
    } else {
        ServerError::BadRequest(format!("Failed to parse multipart data: {}", error))
    }
}
