//! Academic post application form

use super::{Composer, FieldValue, LayoutOptions, TableDef, TextMeasure};
use super::{EMPLOYMENT_HISTORIES, PROFESSIONAL_QUALIFICATIONS, REFERENCES};
use crate::instruction::FormLayout;
use crate::mapping::FormMapping;
use crate::record::{ApplicationRecord, ApplicationType, GeneralDetails};
use crate::Result;

const UNIVERSITY_EDUCATIONS: TableDef = TableDef {
    key: "universityEducations",
    title: "University Education",
    columns: &[
        "DegreeOrDiploma",
        "Institute",
        "FromYear",
        "ToYear",
        "Class",
        "YearObtained",
        "IndexNumber",
    ],
};

const RESEARCH_AND_PUBLICATIONS: TableDef = TableDef {
    key: "researchAndPublications",
    title: "Research and Publications",
    columns: &["Description"],
};

const LANGUAGE_PROFICIENCIES: TableDef = TableDef {
    key: "languageProficiencies",
    title: "Language Proficiency",
    columns: &["Language", "CanSpeak", "CanRead", "CanWrite", "CanTeach"],
};

fn personal_fields(details: &GeneralDetails) -> [(&'static str, FieldValue<'_>); 14] {
    [
        ("Title", FieldValue::text(&details.title)),
        ("FullName", FieldValue::text(&details.full_name)),
        ("NameWithInitials", FieldValue::text(&details.name_with_initials)),
        ("NIC", FieldValue::text(&details.nic)),
        ("DOB", FieldValue::Date(details.dob)),
        ("Gender", FieldValue::text(&details.gender)),
        ("CivilStatus", FieldValue::text(&details.civil_status)),
        ("Citizenship", FieldValue::text(&details.citizenship)),
        ("PermanentAddress", FieldValue::text(&details.permanent_address)),
        ("PostalAddress", FieldValue::text(&details.postal_address)),
        ("MobileNo", FieldValue::text(&details.mobile_no)),
        ("Email", FieldValue::text(&details.email)),
        ("PresentPost", FieldValue::text(&details.present_post)),
        ("PresentEmployer", FieldValue::text(&details.present_employer)),
    ]
}

pub(super) fn build(
    record: &ApplicationRecord,
    mapping: &FormMapping,
    measure: &dyn TextMeasure,
    options: LayoutOptions,
) -> Result<FormLayout> {
    let mut form = Composer::new(mapping, measure, options);
    let vacancy = &record.job_vacancy;
    let submitted = record.application.submission_date;

    form.header(ApplicationType::Academic);

    form.field("PostAppliedFor", FieldValue::Text(Some(&vacancy.title)));
    form.field("Department", FieldValue::text(&vacancy.department));
    form.field("ApplicationDate", FieldValue::Date(submitted));

    if let Some(details) = &record.general_details {
        for (name, value) in personal_fields(details) {
            form.field(name, value);
        }
    }

    form.table(&UNIVERSITY_EDUCATIONS, &record.university_educations);
    form.table(&PROFESSIONAL_QUALIFICATIONS, &record.professional_qualifications);
    form.table(&RESEARCH_AND_PUBLICATIONS, &record.research_and_publications);
    form.table(&EMPLOYMENT_HISTORIES, &record.employment_histories);
    form.table(&LANGUAGE_PROFICIENCIES, &record.language_proficiencies);

    form.paragraph("experience", mapping.experience.as_ref(), "Experience", &record.experience_details);
    form.paragraph(
        "specialQualifications",
        mapping.special_qualifications.as_ref(),
        "Special Qualifications",
        &record.special_qualifications,
    );

    form.table(&REFERENCES, &record.references);

    form.declaration()?;
    form.signature(submitted)?;

    Ok(form.finish(ApplicationType::Academic))
}

#[cfg(test)]
mod tests {
    use crate::instruction::{DrawOp, TextRole};
    use crate::layout::tests::{record, table_slot, HalfEm};
    use crate::layout::{build, LayoutOptions};
    use crate::mapping::{FieldSlot, FormMapping, TextSlot};
    use crate::record::{ApplicationType, LanguageProficiency, UniversityEducation};
    use pretty_assertions::assert_eq;

    fn mapping_with_fields(names: &[&str]) -> FormMapping {
        let mut mapping = FormMapping::default();
        for (i, name) in names.iter().enumerate() {
            mapping
                .fields
                .insert(name.to_string(), FieldSlot::at(200.0, 780.0 - i as f64 * 16.0));
        }
        mapping
    }

    #[test]
    fn test_academic_field_set() {
        let mapping = mapping_with_fields(&[
            "PostAppliedFor",
            "Department",
            "ClosingDate",
            "Title",
            "PresentPost",
            "LandNo",
        ]);

        let layout = build(&record(Some("Academic")), &mapping, &HalfEm, LayoutOptions::default()).unwrap();
        assert_eq!(layout.application_type, ApplicationType::Academic);

        let labels: Vec<_> = layout
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    role: TextRole::Label,
                    text,
                    ..
                } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        // ClosingDate and LandNo belong to the non-academic form only
        assert_eq!(labels, vec!["Post Applied For:", "Department:", "Title:", "Present Post:"]);
    }

    #[test]
    fn test_form_title() {
        let mut mapping = FormMapping::default();
        mapping.form_title = Some(TextSlot {
            x: 297.0,
            y: 780.0,
            font_size: 12.0,
            page: 1,
            text: None,
            align: crate::mapping::TextAlign::Center,
        });

        let layout = build(&record(Some("Academic")), &mapping, &HalfEm, LayoutOptions::default()).unwrap();
        assert_eq!(layout.texts(), vec!["APPLICATION FOR ACADEMIC POSTS"]);
    }

    #[test]
    fn test_academic_tables() {
        let mut record = record(Some("Academic"));
        record.university_educations = vec![UniversityEducation {
            degree_or_diploma: Some("BSc (Hons)".to_string()),
            institute: Some("University of Colombo".to_string()),
            year_obtained: Some("2012".to_string()),
            ..Default::default()
        }];
        record.language_proficiencies = vec![LanguageProficiency {
            language: Some("Sinhala".to_string()),
            can_teach: Some(true),
            ..Default::default()
        }];

        let mut mapping = FormMapping::default();
        mapping.tables.insert(
            "universityEducations".to_string(),
            table_slot(600.0, 1, &[("YearObtained", 400.0), ("DegreeOrDiploma", 0.0)]),
        );
        mapping.tables.insert(
            "languageProficiencies".to_string(),
            table_slot(400.0, 1, &[("Language", 0.0), ("CanTeach", 300.0)]),
        );
        // Mapped, but the record has no O/L results and this form has no such table
        mapping
            .tables
            .insert("olResults".to_string(), table_slot(200.0, 1, &[("Subject", 0.0)]));

        let layout = build(&record, &mapping, &HalfEm, LayoutOptions::default()).unwrap();
        assert_eq!(
            layout.texts(),
            vec![
                "University Education",
                "BSc (Hons)",
                "2012",
                "Language Proficiency",
                "Sinhala",
                "Yes"
            ]
        );
    }
}
