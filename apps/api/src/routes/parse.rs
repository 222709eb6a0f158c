use std::path::Path;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::Value;

use crate::errors::ErrorResult;
use crate::extract::{extract, Extraction};
use crate::llm_client::prompts::{build_prompt, PARSE_SYSTEM};
use crate::llm_client::sanitize::sanitize;
use crate::state::AppState;
use crate::storage::TempUpload;

const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

/// POST /parse
///
/// Runs the full pipeline for one upload: validate → save → extract →
/// prompt → query model → sanitize. Every failure is converted into a
/// data-valued `ErrorResult` body; the response status is 200 in all
/// cases, and clients distinguish outcomes by the presence of an `error`
/// key.
pub async fn handle_parse(State(state): State<AppState>, multipart: Multipart) -> Json<Value> {
    match parse_resume(&state, multipart).await {
        Ok(parsed) => Json(parsed),
        Err(err) => Json(err.into_value()),
    }
}

async fn parse_resume(state: &AppState, mut multipart: Multipart) -> Result<Value, ErrorResult> {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => return Err(ErrorResult::new("No file part")),
            Err(e) => return Err(ErrorResult::new(format!("Error processing file: {e}"))),
        }
    };

    let filename = field.file_name().unwrap_or_default().to_string();
    if filename.is_empty() {
        return Err(ErrorResult::new("No selected file"));
    }

    let ext = Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ErrorResult::new(
            "File type not supported. Please upload a PDF, DOCX, or TXT file.",
        ));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| ErrorResult::new(format!("Error processing file: {e}")))?;

    // The saved upload is removed when the guard drops, on every exit path.
    let upload = TempUpload::save(&state.config.upload_dir, &filename, &data)
        .map_err(|e| ErrorResult::new(format!("Error processing file: {e}")))?;
    let extraction = extract(upload.path(), &ext);
    drop(upload); // temp file is gone before the model call blocks

    let resume_text = match extraction {
        Extraction::Text(text) if !text.is_empty() => text,
        _ => return Err(ErrorResult::new("Could not extract text from the file")),
    };

    let prompt = build_prompt(&resume_text);
    let reply = state.llm.chat(&prompt, PARSE_SYSTEM).await?;
    sanitize(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm_client::LlmClient;
    use crate::routes::build_router;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::{routing::post, Router};
    use serde_json::json;
    use std::path::PathBuf;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-RESUME-PARSER-TEST-BOUNDARY";

    fn multipart_body(field_name: &str, filename: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    /// Serves `reply` with `status` on POST /api/chat from an ephemeral
    /// port, standing in for the inference endpoint.
    async fn spawn_stub(status: StatusCode, reply: Value) -> String {
        let app = Router::new().route(
            "/api/chat",
            post(move || {
                let reply = reply.clone();
                async move { (status, Json(reply)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/chat")
    }

    fn test_app(endpoint: String, upload_dir: PathBuf) -> Router {
        let config = Config {
            ollama_url: endpoint.clone(),
            model_name: "test-model".to_string(),
            upload_dir,
            port: 0,
            rust_log: "info".to_string(),
        };
        let llm = LlmClient::new(endpoint, "test-model".to_string());
        build_router(AppState { llm, config })
    }

    async fn post_parse(app: Router, body: Vec<u8>) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/parse")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn fixed_resume_json() -> Value {
        json!({
            "personal_details": {
                "name": "Jane Doe",
                "phone": null,
                "email": "jane@x.com",
                "linkedin": null,
                "location": null,
                "other_contacts": []
            },
            "about": "",
            "sections": [{"title": "Experience", "content": "Did things."}]
        })
    }

    #[tokio::test]
    async fn test_txt_upload_round_trips_the_stubbed_reply() {
        let reply = json!({
            "message": {"role": "assistant", "content": fixed_resume_json().to_string()}
        });
        let endpoint = spawn_stub(StatusCode::OK, reply).await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(endpoint, dir.path().to_path_buf());

        let body = multipart_body(
            "file",
            "resume.txt",
            b"Jane Doe\nEmail: jane@x.com\n\nExperience\nDid things.",
        );
        let (status, value) = post_parse(app, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, fixed_resume_json());
    }

    #[tokio::test]
    async fn test_fenced_model_reply_is_recovered_end_to_end() {
        let fenced = format!("```json\n{}\n```", fixed_resume_json());
        let reply = json!({"message": {"role": "assistant", "content": fenced}});
        let endpoint = spawn_stub(StatusCode::OK, reply).await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(endpoint, dir.path().to_path_buf());

        let (status, value) = post_parse(app, multipart_body("file", "resume.txt", b"Jane Doe")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, fixed_resume_json());
    }

    #[tokio::test]
    async fn test_csv_is_rejected_before_extraction_and_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        // Unreachable endpoint: validation must short-circuit first.
        let app = test_app(
            "http://127.0.0.1:1/api/chat".to_string(),
            dir.path().to_path_buf(),
        );

        let (status, value) = post_parse(app, multipart_body("file", "resume.csv", b"a,b,c")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value["error"],
            "File type not supported. Please upload a PDF, DOCX, or TXT file."
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_endpoint_500_yields_error_result_with_status() {
        let endpoint =
            spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})).await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(endpoint, dir.path().to_path_buf());

        let (status, value) = post_parse(app, multipart_body("file", "resume.txt", b"Jane Doe")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["error"], "API request failed with status code 500");
        assert!(value["details"].as_str().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_missing_file_field_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(
            "http://127.0.0.1:1/api/chat".to_string(),
            dir.path().to_path_buf(),
        );

        let (_, value) = post_parse(app, multipart_body("attachment", "resume.txt", b"x")).await;
        assert_eq!(value["error"], "No file part");
    }

    #[tokio::test]
    async fn test_empty_filename_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(
            "http://127.0.0.1:1/api/chat".to_string(),
            dir.path().to_path_buf(),
        );

        let (_, value) = post_parse(app, multipart_body("file", "", b"x")).await;
        assert_eq!(value["error"], "No selected file");
    }

    #[tokio::test]
    async fn test_empty_txt_reports_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(
            "http://127.0.0.1:1/api/chat".to_string(),
            dir.path().to_path_buf(),
        );

        let (_, value) = post_parse(app, multipart_body("file", "resume.txt", b"")).await;
        assert_eq!(value["error"], "Could not extract text from the file");
        // The temp file for that filename is gone even though extraction
        // came back empty.
        assert!(!dir.path().join("resume.txt").exists());
    }

    #[tokio::test]
    async fn test_temp_file_is_gone_after_a_successful_parse() {
        let reply = json!({
            "message": {"role": "assistant", "content": fixed_resume_json().to_string()}
        });
        let endpoint = spawn_stub(StatusCode::OK, reply).await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(endpoint, dir.path().to_path_buf());

        let (_, value) = post_parse(app, multipart_body("file", "resume.txt", b"Jane Doe")).await;

        assert!(value.get("error").is_none());
        assert!(!dir.path().join("resume.txt").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_model_reply_returns_raw_response() {
        let reply = json!({
            "message": {"role": "assistant", "content": "Sorry, I cannot help with that."}
        });
        let endpoint = spawn_stub(StatusCode::OK, reply).await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(endpoint, dir.path().to_path_buf());

        let (_, value) = post_parse(app, multipart_body("file", "resume.txt", b"Jane Doe")).await;

        assert_eq!(value["error"], "Failed to parse JSON");
        assert_eq!(value["raw_response"], "Sorry, I cannot help with that.");
    }

    #[tokio::test]
    async fn test_index_serves_the_upload_form() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(
            "http://127.0.0.1:1/api/chat".to_string(),
            dir.path().to_path_buf(),
        );

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("<form"));
        assert!(page.contains("name=\"file\""));
    }
}
