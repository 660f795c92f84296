//! Applicant-side submission of application sections

use crate::record::{Application, GeneralDetails, JobId, JobVacancy, SectionRecords, UserId};
use crate::repository::ApplicationRepository;
use crate::{FormError, Result};
use chrono::{Local, NaiveDate};
use std::sync::Arc;

/// Stores submitted sections against the (user, job) application
///
/// Every submission resolves its application through a single get-or-create
/// call on the repository.
#[derive(Clone)]
pub struct ApplicationSubmissions {
    repository: Arc<dyn ApplicationRepository>,
}

impl ApplicationSubmissions {
    pub fn new(repository: Arc<dyn ApplicationRepository>) -> Self {
        Self { repository }
    }

    /// Submit the personal details; a second submission is rejected
    pub fn submit_general_details(
        &self,
        user: UserId,
        job: JobId,
        vacancy: &JobVacancy,
        details: GeneralDetails,
    ) -> Result<Application> {
        let application = self.repository.get_or_create(user, job, vacancy, today())?;
        self.repository
            .set_general_details(application.application_id, details)?;

        tracing::info!(application_id = %application.application_id, user, job, "general details submitted");
        Ok(application)
    }

    /// Submit a non-empty batch of entries for one repeatable section
    pub fn submit_section(
        &self,
        user: UserId,
        job: JobId,
        vacancy: &JobVacancy,
        records: SectionRecords,
    ) -> Result<usize> {
        if records.is_empty() {
            return Err(FormError::BadRequest(format!(
                "{} must be provided as a non-empty list",
                records.name()
            )));
        }

        let section = records.name();
        let application = self.repository.get_or_create(user, job, vacancy, today())?;
        let stored = self
            .repository
            .insert_many(application.application_id, records)?;

        tracing::info!(application_id = %application.application_id, section, stored, "section submitted");
        Ok(stored)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
