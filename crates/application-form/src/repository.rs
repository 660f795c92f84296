//! Persistence capability consumed by aggregation and submission

use crate::record::{
    Application, ApplicationId, ApplicationRecord, GeneralDetails, JobId, JobVacancy, SectionRecords, UserId,
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Error enumeration for repository failures
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("general details already submitted for application {0}")]
    Conflict(ApplicationId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction so aggregation and submission run without a database
pub trait ApplicationRepository: Send + Sync {
    /// The full record for one application
    fn fetch_by_id(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;

    fn fetch_by_user_and_job(&self, user: UserId, job: JobId) -> Result<Option<Application>, RepositoryError>;

    /// Return the application for (user, job), creating it on first use
    ///
    /// Repeated calls for the same pair return the same application.
    fn get_or_create(
        &self,
        user: UserId,
        job: JobId,
        vacancy: &JobVacancy,
        submitted_on: NaiveDate,
    ) -> Result<Application, RepositoryError>;

    /// Store the general details, failing with [`RepositoryError::Conflict`] if already present
    fn set_general_details(&self, id: ApplicationId, details: GeneralDetails) -> Result<(), RepositoryError>;

    /// Append a batch of section entries, returning how many were stored
    fn insert_many(&self, id: ApplicationId, records: SectionRecords) -> Result<usize, RepositoryError>;
}

#[derive(Default)]
struct Store {
    records: BTreeMap<ApplicationId, ApplicationRecord>,
    by_user_job: HashMap<(UserId, JobId), ApplicationId>,
    last_id: u64,
}

impl Store {
    fn insert(&mut self, record: ApplicationRecord) {
        let id = record.id();
        self.last_id = self.last_id.max(id.0);
        self.by_user_job
            .entry((record.application.user_id, record.application.job_id))
            .or_insert(id);
        self.records.insert(id, record);
    }

    fn record_mut(&mut self, id: ApplicationId) -> Result<&mut ApplicationRecord, RepositoryError> {
        self.records
            .get_mut(&id)
            .ok_or(RepositoryError::ApplicationNotFound(id))
    }
}

/// Repository kept in process memory, seeded from fixture records
#[derive(Default)]
pub struct InMemoryApplicationRepository {
    store: RwLock<Store>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records; a later record with the same id replaces an earlier one
    pub fn with_records(records: impl IntoIterator<Item = ApplicationRecord>) -> Self {
        let mut store = Store::default();
        for record in records {
            store.insert(record);
        }
        Self {
            store: RwLock::new(store),
        }
    }

    /// Seed from a JSON array of application records
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let records: Vec<ApplicationRecord> = serde_json::from_str(json)?;
        Ok(Self::with_records(records))
    }

    pub fn len(&self) -> usize {
        self.store.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn fetch_by_id(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self.store.read().records.get(&id).cloned())
    }

    fn fetch_by_user_and_job(&self, user: UserId, job: JobId) -> Result<Option<Application>, RepositoryError> {
        let store = self.store.read();
        Ok(store
            .by_user_job
            .get(&(user, job))
            .and_then(|id| store.records.get(id))
            .map(|record| record.application.clone()))
    }

    fn get_or_create(
        &self,
        user: UserId,
        job: JobId,
        vacancy: &JobVacancy,
        submitted_on: NaiveDate,
    ) -> Result<Application, RepositoryError> {
        // Lookup and insert happen under one write lock so (user, job) stays unique
        let mut store = self.store.write();
        if let Some(record) = store
            .by_user_job
            .get(&(user, job))
            .and_then(|id| store.records.get(id))
        {
            return Ok(record.application.clone());
        }

        let application = Application {
            application_id: ApplicationId(store.last_id + 1),
            user_id: user,
            job_id: job,
            submission_date: Some(submitted_on),
            status: "New".to_string(),
            remarks: Some(String::new()),
        };
        let mut job_vacancy = vacancy.clone();
        job_vacancy.job_id = job;

        store.insert(ApplicationRecord::new(application.clone(), job_vacancy));
        tracing::debug!(application_id = %application.application_id, user, job, "created application");
        Ok(application)
    }

    fn set_general_details(&self, id: ApplicationId, details: GeneralDetails) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let record = store.record_mut(id)?;
        if record.general_details.is_some() {
            return Err(RepositoryError::Conflict(id));
        }
        record.general_details = Some(details);
        Ok(())
    }

    fn insert_many(&self, id: ApplicationId, records: SectionRecords) -> Result<usize, RepositoryError> {
        let mut store = self.store.write();
        let record = store.record_mut(id)?;
        Ok(records.append_to(record))
    }
}
