//! Application record model
//!
//! Field names follow the persisted JSON shape (`ApplicationID`,
//! `DegreeOrDiploma`, ...). Dates accept plain `YYYY-MM-DD` values as well as
//! full timestamps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type UserId = u64;
pub type JobId = u64;

/// Identifier of one application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which printed form an application is rendered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationType {
    Academic,
    NonAcademic,
}

impl ApplicationType {
    /// Vacancy type tag selecting the academic form
    pub const ACADEMIC_TAG: &'static str = "Academic";

    /// Resolve a vacancy's type tag, anything but the exact academic tag is non-academic
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some(Self::ACADEMIC_TAG) => Self::Academic,
            _ => Self::NonAcademic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Academic => "Academic",
            Self::NonAcademic => "NonAcademic",
        }
    }

    pub fn template_file(self) -> &'static str {
        match self {
            Self::Academic => "academic_template.pdf",
            Self::NonAcademic => "non_academic_template.pdf",
        }
    }

    pub fn mapping_file(self) -> &'static str {
        match self {
            Self::Academic => "academic_mapping.json",
            Self::NonAcademic => "non_academic_mapping.json",
        }
    }

    /// Title printed at the top of the form
    pub fn form_title(self) -> &'static str {
        match self {
            Self::Academic => "APPLICATION FOR ACADEMIC POSTS",
            Self::NonAcademic => "APPLICATION FOR NON-ACADEMIC POSTS",
        }
    }
}

impl fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Application {
    #[serde(rename = "ApplicationID")]
    pub application_id: ApplicationId,
    #[serde(rename = "UserID")]
    pub user_id: UserId,
    #[serde(rename = "JobID")]
    pub job_id: JobId,
    #[serde(default, with = "flexible_date")]
    pub submission_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobVacancy {
    #[serde(rename = "JobID")]
    pub job_id: JobId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, with = "flexible_date")]
    pub expiry_date: Option<NaiveDate>,
    /// Template type tag, `"Academic"` or anything else
    #[serde(default, rename = "Type")]
    pub template_type: Option<String>,
}

impl JobVacancy {
    pub fn application_type(&self) -> ApplicationType {
        ApplicationType::from_tag(self.template_type.as_deref())
    }
}

/// Personal details, at most one set per application
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GeneralDetails {
    pub title: Option<String>,
    pub full_name: Option<String>,
    pub name_with_initials: Option<String>,
    #[serde(rename = "NIC")]
    pub nic: Option<String>,
    #[serde(rename = "DOB", with = "flexible_date")]
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub civil_status: Option<String>,
    pub citizenship: Option<String>,
    pub permanent_address: Option<String>,
    pub postal_address: Option<String>,
    #[serde(with = "flexible_text")]
    pub mobile_no: Option<String>,
    #[serde(with = "flexible_text")]
    pub land_no: Option<String>,
    pub email: Option<String>,
    pub present_post: Option<String>,
    pub present_employer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UniversityEducation {
    pub degree_or_diploma: Option<String>,
    pub institute: Option<String>,
    #[serde(with = "flexible_text")]
    pub from_year: Option<String>,
    #[serde(with = "flexible_text")]
    pub to_year: Option<String>,
    pub class: Option<String>,
    #[serde(with = "flexible_text")]
    pub year_obtained: Option<String>,
    #[serde(with = "flexible_text")]
    pub index_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProfessionalQualification {
    pub institution: Option<String>,
    pub qualification_name: Option<String>,
    #[serde(with = "flexible_text")]
    pub from_year: Option<String>,
    #[serde(with = "flexible_text")]
    pub to_year: Option<String>,
    pub result_or_exam_passed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LanguageProficiency {
    pub language: Option<String>,
    #[serde(with = "flexible_flag")]
    pub can_speak: Option<bool>,
    #[serde(with = "flexible_flag")]
    pub can_read: Option<bool>,
    #[serde(with = "flexible_flag")]
    pub can_write: Option<bool>,
    #[serde(with = "flexible_flag")]
    pub can_teach: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EmploymentHistory {
    pub post_held: Option<String>,
    pub institution: Option<String>,
    #[serde(with = "flexible_date")]
    pub from_date: Option<NaiveDate>,
    #[serde(with = "flexible_date")]
    pub to_date: Option<NaiveDate>,
    #[serde(with = "flexible_text")]
    pub last_salary: Option<String>,
}

/// Free-text entry used by experience, special qualification and publication lists
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescriptionEntry {
    pub description: Option<String>,
}

impl DescriptionEntry {
    pub fn new(description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
        }
    }
}

pub type ExperienceDetail = DescriptionEntry;
pub type SpecialQualification = DescriptionEntry;
pub type ResearchAndPublication = DescriptionEntry;

/// One GCE O/L or A/L subject result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExamResult {
    pub subject: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Reference {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Attachment {
    pub file_type: Option<String>,
    pub file_path: Option<String>,
    #[serde(with = "flexible_date")]
    pub uploaded_at: Option<NaiveDate>,
}

/// Everything known about one application, as read for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicationRecord {
    pub application: Application,
    pub job_vacancy: JobVacancy,
    #[serde(default)]
    pub general_details: Option<GeneralDetails>,
    #[serde(default)]
    pub university_educations: Vec<UniversityEducation>,
    #[serde(default)]
    pub professional_qualifications: Vec<ProfessionalQualification>,
    #[serde(default)]
    pub language_proficiencies: Vec<LanguageProficiency>,
    #[serde(default)]
    pub employment_histories: Vec<EmploymentHistory>,
    #[serde(default)]
    pub experience_details: Vec<ExperienceDetail>,
    #[serde(default)]
    pub special_qualifications: Vec<SpecialQualification>,
    #[serde(default)]
    pub research_and_publications: Vec<ResearchAndPublication>,
    #[serde(default)]
    pub ol_results: Vec<ExamResult>,
    #[serde(default)]
    pub al_results: Vec<ExamResult>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl ApplicationRecord {
    /// A record with no details and no section entries yet
    pub fn new(application: Application, job_vacancy: JobVacancy) -> Self {
        Self {
            application,
            job_vacancy,
            general_details: None,
            university_educations: Vec::new(),
            professional_qualifications: Vec::new(),
            language_proficiencies: Vec::new(),
            employment_histories: Vec::new(),
            experience_details: Vec::new(),
            special_qualifications: Vec::new(),
            research_and_publications: Vec::new(),
            ol_results: Vec::new(),
            al_results: Vec::new(),
            references: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn id(&self) -> ApplicationId {
        self.application.application_id
    }

    pub fn application_type(&self) -> ApplicationType {
        self.job_vacancy.application_type()
    }
}

macro_rules! section_records {
    ($($variant:ident($item:ty) => $field:ident, $label:literal;)+) => {
        /// A batch of entries for one repeatable section
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "Section", content = "Records")]
        pub enum SectionRecords {
            $($variant(Vec<$item>),)+
        }

        impl SectionRecords {
            /// Human-readable section name
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $label,)+
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(Self::$variant(entries) => entries.len(),)+
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Append the entries to the matching list of `record`, keeping insertion order
            pub fn append_to(self, record: &mut ApplicationRecord) -> usize {
                match self {
                    $(Self::$variant(mut entries) => {
                        let count = entries.len();
                        record.$field.append(&mut entries);
                        count
                    })+
                }
            }
        }
    };
}

section_records! {
    UniversityEducations(UniversityEducation) => university_educations, "university education";
    ProfessionalQualifications(ProfessionalQualification) => professional_qualifications, "professional qualifications";
    LanguageProficiencies(LanguageProficiency) => language_proficiencies, "language proficiencies";
    EmploymentHistories(EmploymentHistory) => employment_histories, "employment histories";
    ExperienceDetails(ExperienceDetail) => experience_details, "experience details";
    SpecialQualifications(SpecialQualification) => special_qualifications, "special qualifications";
    ResearchAndPublications(ResearchAndPublication) => research_and_publications, "research and publications";
    OlResults(ExamResult) => ol_results, "G.C.E. O/L results";
    AlResults(ExamResult) => al_results, "G.C.E. A/L results";
    References(Reference) => references, "references";
    Attachments(Attachment) => attachments, "attachments";
}

/// Dates written either as `YYYY-MM-DD` or as a timestamp
mod flexible_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => form_text::parse_date(text)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Text that is sometimes stored as a number (years, phone numbers, salaries)
mod flexible_text {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    pub fn serialize<S: Serializer>(text: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        match text {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
            Raw::Text(text) => text,
            Raw::Integer(n) => n.to_string(),
            Raw::Float(n) => n.to_string(),
        }))
    }
}

/// Yes/no answers stored as booleans, 0/1 or words
mod flexible_flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Integer(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(flag: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match flag {
            Some(flag) => serializer.serialize_bool(*flag),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        let Some(raw) = Option::<Raw>::deserialize(deserializer)? else {
            return Ok(None);
        };
        match raw {
            Raw::Bool(flag) => Ok(Some(flag)),
            Raw::Integer(n) => Ok(Some(n != 0)),
            Raw::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "" => Ok(None),
                "yes" | "y" | "true" | "1" => Ok(Some(true)),
                "no" | "n" | "false" | "0" => Ok(Some(false)),
                other => Err(de::Error::custom(format!("expected yes or no, got {other:?}"))),
            },
        }
    }
}
