//! End-to-end generation against on-disk templates
//!
//! Templates are built with lopdf in a temporary directory, the generated
//! bytes are re-read with lopdf and their content streams inspected.

use application_form::{
    ApplicationId, ApplicationPdfGenerator, ApplicationType, DrawOp, FormError, FormFonts, FormLayout, FormMapping,
    FormRenderer, ImageAsset, InMemoryApplicationRepository, ResolvedTemplate, TemplateStore,
};
use lopdf::{dictionary, Document, Object, ObjectId};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const SEED: &str = r#"[
  {
    "Application": { "ApplicationID": 12, "UserID": 3, "JobID": 9, "SubmissionDate": "2024-03-15", "Status": "New" },
    "JobVacancy": { "JobID": 9, "Title": "Management Assistant", "ExpiryDate": "2024-04-30" },
    "GeneralDetails": { "FullName": "Jane Perera", "DOB": "2001-05-20", "MobileNo": 771234567 },
    "References": [
      { "Name": "Prof. A. Silva", "Designation": "Dean" },
      { "Name": "Dr. B. Fernando", "Designation": "Head" }
    ]
  },
  {
    "Application": { "ApplicationID": 13, "UserID": 4, "JobID": 10, "Status": "New" },
    "JobVacancy": { "JobID": 10, "Title": "Senior Lecturer", "Type": "Academic" }
  }
]"#;

fn create_template(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for page in 0..page_count {
        let content = format!("BT /F1 12 Tf 72 800 Td (Template page {}) Tj ET", page + 1);
        let contents_id = doc.add_object(lopdf::Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => contents_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
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

fn create_test_jpeg() -> Vec<u8> {
    vec![
        0xFF, 0xD8, // SOI
        0xFF, 0xC0, 0x00, 0x11, 0x08, // SOF0, length, precision
        0x00, 0x10, // height 16
        0x00, 0x20, // width 32
        0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, // components
        0xFF, 0xD9, // EOI
    ]
}

/// Hex string the standard fonts draw `text` as
fn hex(text: &str) -> String {
    let body: String = text.bytes().map(|b| format!("{b:02X}")).collect();
    format!("<{body}>")
}

fn template_dir(pages: usize, mapping: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_type(dir.path(), ApplicationType::NonAcademic, pages, mapping);
    dir
}

fn write_type(dir: &Path, application_type: ApplicationType, pages: usize, mapping: &str) {
    std::fs::write(dir.join(application_type.template_file()), create_template(pages)).unwrap();
    std::fs::write(dir.join(application_type.mapping_file()), mapping).unwrap();
}

fn generator(dir: &Path) -> ApplicationPdfGenerator {
    let repository = Arc::new(InMemoryApplicationRepository::from_json(SEED).unwrap());
    ApplicationPdfGenerator::new(repository, TemplateStore::new(dir), FormFonts::helvetica().unwrap())
}

fn load(bytes: &[u8]) -> (Document, Vec<ObjectId>) {
    let doc = Document::load_mem(bytes).unwrap();
    let ids = doc.get_pages().values().copied().collect();
    (doc, ids)
}

fn page_content(doc: &Document, page_id: ObjectId) -> String {
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

fn image_stream_count(doc: &Document) -> usize {
    doc.objects
        .values()
        .filter(|obj| {
            obj.as_stream()
                .ok()
                .and_then(|s| s.dict.get(b"Subtype").ok())
                .and_then(|s| s.as_name().ok())
                == Some(b"Image".as_slice())
        })
        .count()
}

#[test]
fn test_full_name_lands_on_page_one() {
    let dir = template_dir(1, r#"{ "fields": { "FullName": { "x": 50, "y": 700 } } }"#);

    let pdf = generator(dir.path()).generate(ApplicationId(12)).unwrap();
    assert_eq!(pdf.filename, "application_12.pdf");

    let (doc, ids) = load(&pdf.bytes);
    assert_eq!(ids.len(), 1);
    let content = page_content(&doc, ids[0]);

    assert!(content.contains("Template page 1"));
    assert!(content.contains("50 700 Td"));
    let label = content.find(&hex("Full Name:")).expect("label drawn");
    let value = content.find(&hex("Jane Perera")).expect("value drawn");
    assert!(label < value);
}

#[test]
fn test_dates_and_tables_rendered() {
    let mapping = r#"{
      "fields": {
        "DOB": { "x": 200, "y": 680 },
        "ClosingDate": { "x": 200, "y": 660 },
        "MobileNo": { "x": 200, "y": 640 }
      },
      "tables": {
        "references": { "startX": 40, "startY": 500, "rowHeight": 16, "columns": { "Name": 0, "Designation": 250 } }
      }
    }"#;
    let dir = template_dir(1, mapping);

    let pdf = generator(dir.path()).generate(ApplicationId(12)).unwrap();
    let (doc, ids) = load(&pdf.bytes);
    let content = page_content(&doc, ids[0]);

    assert!(content.contains(&hex("20/05/2001")));
    assert!(content.contains(&hex("30/04/2024")));
    assert!(content.contains(&hex("771234567")));
    assert!(content.contains(&hex("Referees")));
    // Rows at startY, then one rowHeight lower
    assert!(content.contains("40 500 Td"));
    assert!(content.contains("40 484 Td"));
    assert!(content.contains(&hex("Dr. B. Fernando")));
}

#[test]
fn test_academic_type_uses_academic_template() {
    let dir = tempfile::tempdir().unwrap();
    write_type(dir.path(), ApplicationType::NonAcademic, 1, "{}");
    write_type(
        dir.path(),
        ApplicationType::Academic,
        2,
        r#"{ "fields": { "PostAppliedFor": { "x": 200, "y": 700, "page": 2 } } }"#,
    );

    let pdf = generator(dir.path()).generate(ApplicationId(13)).unwrap();
    let (doc, ids) = load(&pdf.bytes);
    assert_eq!(ids.len(), 2);
    assert!(page_content(&doc, ids[1]).contains(&hex("Senior Lecturer")));
}

#[test]
fn test_missing_template_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = generator(dir.path()).generate(ApplicationId(12)).unwrap_err();

    assert!(matches!(err, FormError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_unknown_application_is_not_found() {
    let dir = template_dir(1, "{}");
    let err = generator(dir.path()).generate(ApplicationId(999)).unwrap_err();
    assert!(matches!(err, FormError::NotFound(_)));
}

#[test]
fn test_corrupt_mapping_is_configuration() {
    let dir = template_dir(1, r#"{ "fields": [ "#);
    let err = generator(dir.path()).generate(ApplicationId(12)).unwrap_err();

    assert!(matches!(err, FormError::Configuration(_)));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_overflow_pages_are_added() {
    let dir = template_dir(1, r#"{ "fields": { "FullName": { "x": 50, "y": 700, "page": 3 } } }"#);

    let pdf = generator(dir.path()).generate(ApplicationId(12)).unwrap();
    let (doc, ids) = load(&pdf.bytes);

    assert_eq!(ids.len(), 3);
    assert!(!page_content(&doc, ids[0]).contains(&hex("Jane Perera")));
    assert!(page_content(&doc, ids[2]).contains(&hex("Jane Perera")));
}

#[test]
fn test_logo_placed_from_template_directory() {
    let dir = template_dir(1, r#"{ "logo": { "x": 40, "y": 760 } }"#);
    std::fs::write(dir.path().join("logo.jpg"), create_test_jpeg()).unwrap();

    let pdf = generator(dir.path()).generate(ApplicationId(12)).unwrap();
    let (doc, ids) = load(&pdf.bytes);

    // 32x16 pixels fit into the default 60x60 box
    assert!(page_content(&doc, ids[0]).contains("60 0 0 30 40 760 cm"));
    assert_eq!(image_stream_count(&doc), 1);
}

#[test]
fn test_logo_without_image_is_skipped() {
    let dir = template_dir(1, r#"{ "logo": { "x": 40, "y": 760 } }"#);

    let pdf = generator(dir.path()).generate(ApplicationId(12)).unwrap();
    let (doc, _) = load(&pdf.bytes);
    assert_eq!(image_stream_count(&doc), 0);
}

#[test]
fn test_logo_referenced_twice_is_embedded_once() {
    let template = ResolvedTemplate {
        application_type: ApplicationType::NonAcademic,
        pdf: create_template(2),
        mapping: FormMapping::default(),
        logo: Some(create_test_jpeg()),
    };
    let logo = |page| DrawOp::Image {
        page,
        x: 40.0,
        y: 760.0,
        width: 60.0,
        height: 60.0,
        asset: ImageAsset::Logo,
    };
    let layout = FormLayout {
        application_type: ApplicationType::NonAcademic,
        page_count: 2,
        ops: vec![logo(1), logo(2)],
    };

    let fonts = FormFonts::helvetica().unwrap();
    let bytes = FormRenderer::new(&template, &fonts).render(&layout).unwrap();
    let (doc, ids) = load(&bytes);

    assert_eq!(image_stream_count(&doc), 1);
    assert!(page_content(&doc, ids[1]).contains("60 0 0 30 40 760 cm"));
}
