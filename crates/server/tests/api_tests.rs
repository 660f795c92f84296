use application_form::{
    ApplicationPdfGenerator, ApplicationType, FormFonts, InMemoryApplicationRepository, TemplateStore,
};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use form_server::config::FormConfig;
use form_server::{router, AppState};
use lopdf::{dictionary, Document, Object};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const SEED: &str = r#"[
  {
    "Application": { "ApplicationID": 7, "UserID": 1, "JobID": 2, "SubmissionDate": "2024-03-15", "Status": "New" },
    "JobVacancy": { "JobID": 2, "Title": "Management Assistant" },
    "GeneralDetails": { "FullName": "Jane Perera" }
  }
]"#;

fn one_page_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let contents_id = doc.add_object(lopdf::Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => contents_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn template_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let ty = ApplicationType::NonAcademic;
    std::fs::write(dir.path().join(ty.template_file()), one_page_pdf()).unwrap();
    std::fs::write(
        dir.path().join(ty.mapping_file()),
        r#"{ "fields": { "FullName": { "x": 50, "y": 700 } } }"#,
    )
    .unwrap();
    dir
}

fn app(templates: &Path) -> Router {
    let repository = Arc::new(InMemoryApplicationRepository::from_json(SEED).unwrap());
    let generator =
        ApplicationPdfGenerator::new(repository, TemplateStore::new(templates), FormFonts::helvetica().unwrap());
    router(AppState::new(generator))
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = template_dir();
    let (status, _, body) = get(app(dir.path()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({ "status": "ok" }));
}

#[tokio::test]
async fn download_returns_pdf_attachment() {
    let dir = template_dir();
    let (status, headers, body) = get(app(dir.path()), "/api/applications/download/7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=application_7.pdf"
    );
    assert_eq!(headers[header::CONTENT_LENGTH], body.len().to_string().as_str());
    assert!(body.starts_with(b"%PDF"));

    let doc = Document::load_mem(&body).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let dir = template_dir();
    let (status, _, body) = get(app(dir.path()), "/api/applications/download/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body = json_body(&body);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("positive integer"));
}

#[tokio::test]
async fn zero_id_is_bad_request() {
    let dir = template_dir();
    let (status, _, _) = get(app(dir.path()), "/api/applications/download/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_application_is_not_found() {
    let dir = template_dir();
    let (status, _, body) = get(app(dir.path()), "/api/applications/download/999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(&body),
        json!({ "status": "error", "message": "Application 999 not found" })
    );
}

#[tokio::test]
async fn missing_template_is_not_found() {
    let empty = tempfile::tempdir().unwrap();
    let (status, _, body) = get(app(empty.path()), "/api/applications/download/7").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(&body)["message"],
        "Template not found for type: NonAcademic"
    );
}

#[tokio::test]
async fn broken_mapping_is_server_error() {
    let dir = template_dir();
    std::fs::write(
        dir.path().join(ApplicationType::NonAcademic.mapping_file()),
        "not json",
    )
    .unwrap();

    let (status, _, body) = get(app(dir.path()), "/api/applications/download/7").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body)["status"], "error");
}

#[tokio::test]
async fn state_from_config_loads_seed_file() {
    let dir = template_dir();
    let seed = dir.path().join("seed.json");
    std::fs::write(&seed, SEED).unwrap();

    let config = FormConfig {
        template_dir: dir.path().to_path_buf(),
        font_regular: None,
        font_bold: None,
        strict_sections: false,
        seed_file: Some(seed),
    };
    let state = AppState::from_config(&config).unwrap();
    let (status, _, _) = get(router(state), "/api/applications/download/7").await;
    assert_eq!(status, StatusCode::OK);
}

#[test]
fn state_from_config_rejects_bad_seed() {
    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("seed.json");
    std::fs::write(&seed, "{}").unwrap();

    let config = FormConfig {
        template_dir: dir.path().to_path_buf(),
        font_regular: None,
        font_bold: None,
        strict_sections: false,
        seed_file: Some(seed),
    };
    assert!(AppState::from_config(&config).is_err());
}
