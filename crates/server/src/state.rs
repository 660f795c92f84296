use crate::config::FormConfig;
use application_form::{
    ApplicationPdfGenerator, ApplicationRepository, FormError, FormFonts, InMemoryApplicationRepository, LayoutOptions,
    TemplateStore,
};
use std::sync::Arc;

/// Shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ApplicationPdfGenerator>,
}

impl AppState {
    pub fn new(generator: ApplicationPdfGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Wire the generator from configuration: seed data, fonts and templates
    pub fn from_config(config: &FormConfig) -> Result<Self, FormError> {
        let repository = load_repository(config)?;
        let fonts = match &config.font_regular {
            Some(regular) => FormFonts::from_files(regular, config.font_bold.as_deref())?,
            None => FormFonts::helvetica()?,
        };
        let generator = ApplicationPdfGenerator::new(repository, TemplateStore::new(&config.template_dir), fonts)
            .with_options(LayoutOptions {
                strict_sections: config.strict_sections,
                ..Default::default()
            });
        Ok(Self::new(generator))
    }
}

fn load_repository(config: &FormConfig) -> Result<Arc<dyn ApplicationRepository>, FormError> {
    let Some(path) = &config.seed_file else {
        tracing::warn!("FORM_SEED_FILE not set, starting with an empty application repository");
        return Ok(Arc::new(InMemoryApplicationRepository::new()));
    };

    let json = std::fs::read_to_string(path)
        .map_err(|e| FormError::Configuration(format!("Failed to read seed file {}: {}", path.display(), e)))?;
    let repository = InMemoryApplicationRepository::from_json(&json)
        .map_err(|e| FormError::Configuration(format!("Invalid seed file {}: {}", path.display(), e)))?;

    tracing::info!(path = %path.display(), applications = repository.len(), "loaded seed applications");
    Ok(Arc::new(repository))
}
