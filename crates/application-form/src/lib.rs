//! Application Form - filled job application PDFs
//!
//! This crate provides:
//! - The application record model and the repository capability behind it
//! - Template and mapping resolution per application type
//! - The layout engine turning a record plus a mapping into draw instructions
//! - The renderer applying those instructions to a template PDF
//! - [`ApplicationPdfGenerator`], the pipeline tying the stages together
//!
//! # Example
//!
//! ```ignore
//! use application_form::{
//!     parse_application_id, ApplicationPdfGenerator, FormFonts, InMemoryApplicationRepository, TemplateStore,
//! };
//! use std::sync::Arc;
//!
//! let repository = Arc::new(InMemoryApplicationRepository::from_json(&seed)?);
//! let generator = ApplicationPdfGenerator::new(repository, TemplateStore::new("templates"), FormFonts::helvetica()?);
//! let pdf = generator.generate(parse_application_id("42")?)?;
//! std::fs::write(&pdf.filename, &pdf.bytes)?;
//! ```

mod aggregate;
mod generator;
pub mod instruction;
pub mod layout;
pub mod mapping;
pub mod record;
mod renderer;
mod repository;
mod store;
mod submission;

pub use aggregate::{parse_application_id, DataAggregator};
pub use generator::{ApplicationPdfGenerator, GeneratedPdf};
pub use instruction::{DrawOp, FormLayout, ImageAsset, TableCell, TextRole};
pub use layout::{LayoutOptions, TextMeasure};
pub use mapping::FormMapping;
pub use record::{ApplicationId, ApplicationRecord, ApplicationType, SectionRecords};
pub use renderer::{FormFonts, FormRenderer};
pub use repository::{ApplicationRepository, InMemoryApplicationRepository, RepositoryError};
pub use store::{ResolvedTemplate, TemplateStore};
pub use submission::ApplicationSubmissions;

use thiserror::Error;

/// Errors that can occur while producing an application form
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),
}

impl FormError {
    /// HTTP status class of the error
    pub fn status_code(&self) -> u16 {
        match self {
            FormError::BadRequest(_) => 400,
            FormError::NotFound(_) => 404,
            FormError::Configuration(_) | FormError::Internal(_) | FormError::Pdf(_) => 500,
        }
    }
}

impl From<RepositoryError> for FormError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ApplicationNotFound(_) => FormError::NotFound(err.to_string()),
            RepositoryError::Conflict(_) => FormError::BadRequest(err.to_string()),
            RepositoryError::Unavailable(_) => FormError::Internal(err.to_string()),
        }
    }
}

/// Result type for application form operations
pub type Result<T> = std::result::Result<T, FormError>;
