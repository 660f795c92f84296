//! Template and mapping resolution
//!
//! Each application type owns a template PDF and a JSON mapping in one
//! directory. An optional `logo.png` (or `logo.jpg`) next to them supplies
//! the logo image.

use crate::mapping::FormMapping;
use crate::record::ApplicationType;
use crate::{FormError, Result};
use std::io::ErrorKind;
use std::path::PathBuf;

const LOGO_FILES: [&str; 2] = ["logo.png", "logo.jpg"];

/// Everything the renderer needs for one application type
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub application_type: ApplicationType,
    pub pdf: Vec<u8>,
    pub mapping: FormMapping,
    pub logo: Option<Vec<u8>>,
}

/// Directory holding the per-type templates and mappings
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn template_path(&self, application_type: ApplicationType) -> PathBuf {
        self.dir.join(application_type.template_file())
    }

    pub fn mapping_path(&self, application_type: ApplicationType) -> PathBuf {
        self.dir.join(application_type.mapping_file())
    }

    /// Load the template, mapping and logo for an application type
    ///
    /// Files are read on every call so templates can be replaced without a restart.
    pub fn resolve(&self, application_type: ApplicationType) -> Result<ResolvedTemplate> {
        let pdf = self.read_template(application_type)?;
        let mapping = self.read_mapping(application_type)?;
        let logo = self.read_logo()?;

        tracing::debug!(
            %application_type,
            template_bytes = pdf.len(),
            fields = mapping.fields.len(),
            tables = mapping.tables.len(),
            logo = logo.is_some(),
            "resolved template"
        );

        Ok(ResolvedTemplate {
            application_type,
            pdf,
            mapping,
            logo,
        })
    }

    fn read_template(&self, application_type: ApplicationType) -> Result<Vec<u8>> {
        let path = self.template_path(application_type);
        std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FormError::NotFound(format!("Template not found for type: {application_type}")),
            _ => FormError::Internal(format!("Failed to read template {}: {}", path.display(), e)),
        })
    }

    fn read_mapping(&self, application_type: ApplicationType) -> Result<FormMapping> {
        let path = self.mapping_path(application_type);
        let json = std::fs::read_to_string(&path).map_err(|e| {
            FormError::Configuration(format!("Failed to read mapping {}: {}", path.display(), e))
        })?;
        FormMapping::from_json(&json)
            .map_err(|e| FormError::Configuration(format!("Invalid mapping {}: {}", path.display(), e)))
    }

    fn read_logo(&self) -> Result<Option<Vec<u8>>> {
        for name in LOGO_FILES {
            let path = self.dir.join(name);
            match std::fs::read(&path) {
                Ok(data) => return Ok(Some(data)),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(FormError::Internal(format!(
                        "Failed to read logo {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
        Ok(None)
    }
}
