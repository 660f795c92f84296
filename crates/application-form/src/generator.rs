//! The generation pipeline: aggregate, resolve, lay out, render

use crate::aggregate::DataAggregator;
use crate::layout::{self, LayoutOptions};
use crate::record::ApplicationId;
use crate::renderer::{FormFonts, FormRenderer};
use crate::repository::ApplicationRepository;
use crate::store::TemplateStore;
use crate::Result;
use std::sync::Arc;

/// A rendered application form ready to be downloaded
#[derive(Debug, Clone)]
pub struct GeneratedPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Produces the filled form for an application id
///
/// Holds no per-request state, so one generator can serve concurrent requests.
pub struct ApplicationPdfGenerator {
    aggregator: DataAggregator,
    templates: TemplateStore,
    fonts: FormFonts,
    options: LayoutOptions,
}

impl ApplicationPdfGenerator {
    pub fn new(repository: Arc<dyn ApplicationRepository>, templates: TemplateStore, fonts: FormFonts) -> Self {
        Self {
            aggregator: DataAggregator::new(repository),
            templates,
            fonts,
            options: LayoutOptions::default(),
        }
    }

    /// Use strict section handling; `logo_available` is decided per template
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    pub fn generate(&self, id: ApplicationId) -> Result<GeneratedPdf> {
        let record = self.aggregator.fetch(id)?;
        let application_type = record.application_type();
        let template = self.templates.resolve(application_type)?;

        let options = LayoutOptions {
            logo_available: template.logo.is_some(),
            ..self.options
        };
        let layout = layout::build(&record, &template.mapping, &self.fonts, options)?;
        let bytes = FormRenderer::new(&template, &self.fonts).render(&layout)?;

        tracing::info!(
            application_id = %id,
            %application_type,
            pages = layout.page_count,
            bytes = bytes.len(),
            "generated application form"
        );

        Ok(GeneratedPdf {
            filename: format!("application_{id}.pdf"),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Application, ApplicationRecord, JobVacancy};
    use crate::repository::InMemoryApplicationRepository;
    use crate::FormError;
    use lopdf::{dictionary, Document, Object};
    use pretty_assertions::assert_eq;

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

    fn generator(dir: &std::path::Path) -> ApplicationPdfGenerator {
        let record = ApplicationRecord::new(
            Application {
                application_id: ApplicationId(5),
                user_id: 1,
                job_id: 2,
                submission_date: None,
                status: "New".to_string(),
                remarks: None,
            },
            JobVacancy {
                job_id: 2,
                title: "Clerk".to_string(),
                ..Default::default()
            },
        );
        let repository = Arc::new(InMemoryApplicationRepository::with_records(vec![record]));
        ApplicationPdfGenerator::new(repository, TemplateStore::new(dir), FormFonts::helvetica().unwrap())
    }

    #[test]
    fn test_generate_names_file_after_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("non_academic_template.pdf"), one_page_pdf()).unwrap();
        std::fs::write(
            dir.path().join("non_academic_mapping.json"),
            r#"{ "fields": { "PostAppliedFor": { "x": 200, "y": 700 } } }"#,
        )
        .unwrap();

        let pdf = generator(dir.path()).generate(ApplicationId(5)).unwrap();
        assert_eq!(pdf.filename, "application_5.pdf");
        assert!(pdf.bytes.starts_with(b"%PDF"));

        let doc = Document::load_mem(&pdf.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_unknown_id_fails_before_template_lookup() {
        // Empty directory: a template lookup would fail with a different message
        let dir = tempfile::tempdir().unwrap();
        let err = generator(dir.path()).generate(ApplicationId(6)).unwrap_err();

        assert!(matches!(err, FormError::NotFound(_)));
        assert_eq!(err.to_string(), "Not found: Application 6 not found");
    }

    #[test]
    fn test_strict_sections_reach_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("non_academic_template.pdf"), one_page_pdf()).unwrap();
        std::fs::write(dir.path().join("non_academic_mapping.json"), "{}").unwrap();

        let generator = generator(dir.path()).with_options(LayoutOptions {
            strict_sections: true,
            ..Default::default()
        });
        let err = generator.generate(ApplicationId(5)).unwrap_err();
        assert!(matches!(err, FormError::Configuration(_)));
    }
}
