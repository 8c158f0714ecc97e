use graphviz_render_api_client::{
    ApiError, DiagramServiceClient, DotUpload, RenderRequest, RenderSession, DEFAULT_BASE_URL,
};
use graphviz_render_core::GenerateFromExistingRequest;
use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{body_json, body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ========================================
// Test helpers
// ========================================

/// Client pointed at a local stub server, bypassing any proxy settings
fn client_for(base_url: &str) -> DiagramServiceClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    DiagramServiceClient::with_http_client(base_url, http)
}

async fn mount_status(server: &MockServer, http_method: &str, route: &str, status: u16) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

// ========================================
// Configuration
// ========================================

#[test]
#[serial]
fn test_from_env_uses_api_base_url() {
    std::env::set_var("API_BASE_URL", "http://render.internal:8000/");
    let client = DiagramServiceClient::from_env();
    std::env::remove_var("API_BASE_URL");

    assert_eq!(client.base_url(), "http://render.internal:8000");
}

#[test]
#[serial]
fn test_from_env_default() {
    std::env::remove_var("API_BASE_URL");
    let client = DiagramServiceClient::from_env();

    assert_eq!(client.base_url(), DEFAULT_BASE_URL);
}

// ========================================
// URL builders
// ========================================

#[test]
fn test_image_and_download_urls() {
    let client = DiagramServiceClient::new("http://localhost:5000");

    assert_eq!(
        client.image_url("graph.png"),
        "http://localhost:5000/image/graph.png"
    );
    assert_eq!(
        client.download_url("graph.png"),
        "http://localhost:5000/download/graph.png"
    );
}

// ========================================
// generate_from_existing
// ========================================

#[tokio::test]
async fn test_generate_from_existing_sends_json() {
    let mock_server = MockServer::start().await;

    let mock_response = json!({
        "message": "PNG generated successfully",
        "source_file": "sample.dot",
        "output_file": "sample_123.png",
        "signal_generator_image": "signal_generator.png"
    });

    Mock::given(method("POST"))
        .and(path("/generate_from_existing"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "filename": "sample.dot" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let result = client.generate_from_existing("sample.dot").await.unwrap();

    assert_eq!(result.message.as_deref(), Some("PNG generated successfully"));
    assert_eq!(result.source_file.as_deref(), Some("sample.dot"));
    assert_eq!(result.output_file, "sample_123.png");

    // Decoded unchanged, extra fields included
    assert_eq!(serde_json::to_value(&result).unwrap(), mock_response);
}

#[tokio::test]
async fn test_generate_from_existing_request_sends_signal_generator_image() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate_from_existing"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "filename": "bench.dot",
            "signal_generator_image": "signal_generator2.png"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output_file": "bench_1.png",
            "signal_generator_image": "signal_generator2.png"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let request =
        GenerateFromExistingRequest::new("bench.dot").with_signal_generator_image("signal_generator2.png");
    let result = client.generate_from_existing_request(&request).await.unwrap();

    assert_eq!(result.output_file, "bench_1.png");
}

#[tokio::test]
async fn test_generate_from_existing_with_svg_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate_from_existing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "SVG generated successfully",
            "source_file": "sample.dot",
            "output_file": "sample_1.svg",
            "svg_content": "<svg xmlns=\"http://www.w3.org/2000/svg\"/>"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let result = client.generate_from_existing("sample.dot").await.unwrap();

    assert!(result.svg_content.unwrap().starts_with("<svg"));
}

#[tokio::test]
async fn test_generate_from_existing_not_found() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "POST", "/generate_from_existing", 404).await;

    let client = client_for(&mock_server.uri());
    let error = client.generate_from_existing("missing.dot").await.unwrap_err();

    assert!(matches!(error, ApiError::Remote { status: 404 }));
    assert!(error.to_string().contains("404"));
}

#[tokio::test]
async fn test_generate_from_existing_invalid_json_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate_from_existing"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let result = client.generate_from_existing("sample.dot").await;

    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_generate_from_existing_network_error() {
    // Nothing listens here
    let client = client_for("http://127.0.0.1:9");
    let result = client.generate_from_existing("sample.dot").await;

    assert!(matches!(result, Err(ApiError::Network(_))));
}

// ========================================
// generate_from_upload
// ========================================

#[tokio::test]
async fn test_generate_from_upload_sends_multipart_file_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"graph.dot\""))
        .and(body_string_contains("digraph { a -> b }"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "PNG generated successfully",
            "output_file": "0b6f.png"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let result = client
        .generate_from_upload(DotUpload::new("graph.dot", "digraph { a -> b }"))
        .await
        .unwrap();

    assert_eq!(result.output_file, "0b6f.png");
    assert!(result.source_file.is_none());
}

#[tokio::test]
async fn test_generate_from_upload_sends_signal_generator_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"file\"; filename=\"bench.dot\""))
        .and(body_string_contains(
            "name=\"signal_generator_image\"\r\n\r\nsignal_generator2.png\r\n",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output_file": "b.png" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let upload = DotUpload::new("bench.dot", r#"digraph { g [image="signal_generator.png"] }"#)
        .with_signal_generator_image("signal_generator2.png");
    let result = client.generate_from_upload(upload).await.unwrap();

    assert_eq!(result.output_file, "b.png");
}

#[tokio::test]
async fn test_generate_from_upload_omits_signal_generator_field_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_string_contains("signal_generator_image"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output_file": "g.png" })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let result = client
        .generate_from_upload(DotUpload::new("g.dot", "digraph {}"))
        .await
        .unwrap();

    assert_eq!(result.output_file, "g.png");
}

#[tokio::test]
async fn test_generate_from_upload_with_mockito() {
    use mockito::Matcher;

    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/generate")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::Regex(r#"name="file"; filename="g.gv""#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"ok","output_file":"g.png"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client
        .generate_from_upload(DotUpload::new("g.gv", "graph { x -- y }"))
        .await
        .unwrap();

    assert_eq!(result.output_file, "g.png");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generate_from_upload_bad_request() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "POST", "/generate", 400).await;

    let client = client_for(&mock_server.uri());
    let error = client
        .generate_from_upload(DotUpload::new("notes.txt", "hello"))
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(400));
    assert!(error.to_string().contains("400"));
}

#[tokio::test]
async fn test_generate_dispatches_by_variant() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate_from_existing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output_file": "a.png" })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output_file": "b.png" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());

    let existing = client
        .generate(RenderRequest::Existing {
            filename: "a.dot".to_string(),
        })
        .await
        .unwrap();
    let uploaded = client
        .generate(RenderRequest::Upload(DotUpload::new("b.dot", "digraph {}")))
        .await
        .unwrap();

    assert_eq!(existing.output_file, "a.png");
    assert_eq!(uploaded.output_file, "b.png");
}

// ========================================
// list_dot_files / health_check
// ========================================

#[tokio::test]
async fn test_list_dot_files_success() {
    let mock_server = MockServer::start().await;

    let mock_response = json!({ "dot_files": ["a.dot", "b.gv"], "count": 2 });

    Mock::given(method("GET"))
        .and(path("/list_dot_files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let listing = client.list_dot_files().await.unwrap();

    assert_eq!(listing.dot_files, vec!["a.dot", "b.gv"]);
    assert_eq!(serde_json::to_value(&listing).unwrap(), mock_response);
}

#[tokio::test]
async fn test_list_dot_files_server_error() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "GET", "/list_dot_files", 500).await;

    let client = client_for(&mock_server.uri());
    let error = client.list_dot_files().await.unwrap_err();

    assert!(matches!(error, ApiError::Remote { status: 500 }));
    assert!(error.to_string().contains("500"));
}

#[tokio::test]
async fn test_list_signal_generator_images() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list_signal_generator_images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signal_generator_images": ["signal_generator.png", "signal_generator2.png"],
            "count": 2
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let images = client.list_signal_generator_images().await.unwrap();

    assert_eq!(images.count, 2);
    assert_eq!(images.signal_generator_images[1], "signal_generator2.png");
}

#[tokio::test]
async fn test_health_check_passes_payload_through() {
    let mock_server = MockServer::start().await;

    let mock_response = json!({ "status": "healthy", "message": "GraphViz API is running" });

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let health = client.health_check().await.unwrap();

    assert_eq!(health.status(), Some("healthy"));
    assert_eq!(health.0, mock_response);
}

#[tokio::test]
async fn test_health_check_unavailable() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "GET", "/health", 503).await;

    let client = client_for(&mock_server.uri());
    let error = client.health_check().await.unwrap_err();

    assert!(error.to_string().contains("503"));
}

// ========================================
// End-to-end: render then build the image URL
// ========================================

#[tokio::test]
async fn test_generate_then_image_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate_from_existing"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "output_file": "sample_123.svg" })),
        )
        .mount(&mock_server)
        .await;

    let stub_client = client_for(&mock_server.uri());
    let result = stub_client.generate_from_existing("sample.dot").await.unwrap();

    let client = DiagramServiceClient::new("http://localhost:5000");
    assert_eq!(
        client.image_url(&result.output_file),
        "http://localhost:5000/image/sample_123.svg"
    );
}

// ========================================
// RenderSession
// ========================================

#[tokio::test]
async fn test_session_publishes_image_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate_from_existing"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "output_file": "sample_123.svg" })),
        )
        .mount(&mock_server)
        .await;

    let mut session = RenderSession::new(client_for(&mock_server.uri()));
    let mut updates = session.subscribe();

    session.generate_from_existing("sample.dot").await.unwrap();

    assert!(updates.has_changed().unwrap());
    let state = updates.borrow_and_update().clone();
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(
        state.image_url.as_deref(),
        Some(format!("{}/image/sample_123.svg", mock_server.uri()).as_str())
    );
    assert_eq!(state.last_result.unwrap().output_file, "sample_123.svg");
}

#[tokio::test]
async fn test_session_records_error_and_clears_loading() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "POST", "/generate", 500).await;

    let mut session = RenderSession::new(client_for(&mock_server.uri()));
    let result = session
        .generate_from_upload(DotUpload::new("g.dot", "digraph {}"))
        .await;

    assert!(result.is_err());
    let state = session.state();
    assert!(!state.loading);
    assert!(state.image_url.is_none());
    assert!(state.error.unwrap().contains("500"));

    session.reset();
    assert!(session.state().error.is_none());
}
