//! Data aggregation: one application id in, one complete record out

use crate::record::{ApplicationId, ApplicationRecord};
use crate::repository::ApplicationRepository;
use crate::{FormError, Result};
use std::sync::Arc;

/// Parse a raw application id, which must be a positive integer
pub fn parse_application_id(raw: &str) -> Result<ApplicationId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FormError::BadRequest("Application ID is required".to_string()));
    }
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(FormError::BadRequest(format!(
            "Application ID must be a positive integer, got {raw:?}"
        ))),
        Ok(id) => Ok(ApplicationId(id)),
    }
}

/// Reads the full record for an application from the repository
#[derive(Clone)]
pub struct DataAggregator {
    repository: Arc<dyn ApplicationRepository>,
}

impl DataAggregator {
    pub fn new(repository: Arc<dyn ApplicationRepository>) -> Self {
        Self { repository }
    }

    /// Fetch the record, failing with [`FormError::NotFound`] when no such application exists
    pub fn fetch(&self, id: ApplicationId) -> Result<ApplicationRecord> {
        let record = self
            .repository
            .fetch_by_id(id)
            .map_err(|err| FormError::Internal(err.to_string()))?
            .ok_or_else(|| FormError::NotFound(format!("Application {id} not found")))?;

        tracing::debug!(
            application_id = %id,
            application_type = %record.application_type(),
            references = record.references.len(),
            employment_histories = record.employment_histories.len(),
            "aggregated application record"
        );
        Ok(record)
    }
}
