//! Non-academic post application form

use super::{Composer, FieldValue, LayoutOptions, TableDef, TextMeasure};
use super::{EMPLOYMENT_HISTORIES, PROFESSIONAL_QUALIFICATIONS, REFERENCES};
use crate::instruction::FormLayout;
use crate::mapping::FormMapping;
use crate::record::{ApplicationRecord, ApplicationType, GeneralDetails};
use crate::Result;

const OL_RESULTS: TableDef = TableDef {
    key: "olResults",
    title: "G.C.E. (O/L) Results",
    columns: &["Subject", "Grade"],
};

const AL_RESULTS: TableDef = TableDef {
    key: "alResults",
    title: "G.C.E. (A/L) Results",
    columns: &["Subject", "Grade"],
};

// No teaching column on this form
const LANGUAGE_PROFICIENCIES: TableDef = TableDef {
    key: "languageProficiencies",
    title: "Language Proficiency",
    columns: &["Language", "CanSpeak", "CanRead", "CanWrite"],
};

fn personal_fields(details: &GeneralDetails) -> [(&'static str, FieldValue<'_>); 11] {
    [
        ("FullName", FieldValue::text(&details.full_name)),
        ("NameWithInitials", FieldValue::text(&details.name_with_initials)),
        ("NIC", FieldValue::text(&details.nic)),
        ("DOB", FieldValue::Date(details.dob)),
        ("Gender", FieldValue::text(&details.gender)),
        ("CivilStatus", FieldValue::text(&details.civil_status)),
        ("Citizenship", FieldValue::text(&details.citizenship)),
        ("PermanentAddress", FieldValue::text(&details.permanent_address)),
        ("MobileNo", FieldValue::text(&details.mobile_no)),
        ("LandNo", FieldValue::text(&details.land_no)),
        ("Email", FieldValue::text(&details.email)),
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

    form.header(ApplicationType::NonAcademic);

    form.field("PostAppliedFor", FieldValue::Text(Some(&vacancy.title)));
    form.field("ClosingDate", FieldValue::Date(vacancy.expiry_date));
    form.field("ApplicationDate", FieldValue::Date(submitted));

    if let Some(details) = &record.general_details {
        for (name, value) in personal_fields(details) {
            form.field(name, value);
        }
    }

    form.table(&OL_RESULTS, &record.ol_results);
    form.table(&AL_RESULTS, &record.al_results);
    form.table(&PROFESSIONAL_QUALIFICATIONS, &record.professional_qualifications);
    form.table(&EMPLOYMENT_HISTORIES, &record.employment_histories);
    form.table(&LANGUAGE_PROFICIENCIES, &record.language_proficiencies);

    form.paragraph(
        "specialQualifications",
        mapping.special_qualifications.as_ref(),
        "Special Qualifications",
        &record.special_qualifications,
    );
    form.paragraph("experience", mapping.experience.as_ref(), "Experience", &record.experience_details);

    form.table(&REFERENCES, &record.references);

    form.declaration()?;
    form.signature(submitted)?;

    Ok(form.finish(ApplicationType::NonAcademic))
}

#[cfg(test)]
mod tests {
    use crate::instruction::{DrawOp, TableCell, TextRole};
    use crate::layout::tests::{record, table_slot, HalfEm};
    use crate::layout::{build, LayoutOptions};
    use crate::mapping::{FieldSlot, FormMapping};
    use crate::record::{ApplicationType, EmploymentHistory, ExamResult, LanguageProficiency};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn labels(mapping: &FormMapping, template_type: Option<&str>) -> Vec<String> {
        let layout = build(&record(template_type), mapping, &HalfEm, LayoutOptions::default()).unwrap();
        layout
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    role: TextRole::Label,
                    text,
                    ..
                } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_unset_and_unknown_types_use_non_academic_fields() {
        let mut mapping = FormMapping::default();
        for (i, name) in ["Department", "ClosingDate", "Title", "LandNo", "PresentPost"]
            .iter()
            .enumerate()
        {
            mapping
                .fields
                .insert(name.to_string(), FieldSlot::at(200.0, 700.0 - i as f64 * 16.0));
        }

        let expected = vec!["Closing Date:".to_string(), "Telephone No:".to_string()];
        assert_eq!(labels(&mapping, None), expected);
        assert_eq!(labels(&mapping, Some("Administrative")), expected);
        assert_eq!(
            labels(&mapping, Some("Academic")),
            vec!["Department:".to_string(), "Title:".to_string(), "Present Post:".to_string()]
        );
    }

    #[test]
    fn test_dates_printed_day_first() {
        let mut mapping = FormMapping::default();
        mapping.fields.insert("ClosingDate".to_string(), FieldSlot::at(200.0, 760.0));
        mapping.fields.insert("DOB".to_string(), FieldSlot::at(200.0, 740.0));

        let layout = build(&record(None), &mapping, &HalfEm, LayoutOptions::default()).unwrap();
        assert_eq!(layout.application_type, ApplicationType::NonAcademic);
        assert_eq!(
            layout.texts(),
            vec!["Closing Date:", "30/04/2024", "Date of Birth:", "20/05/2001"]
        );
    }

    #[test]
    fn test_missing_dates_are_blank() {
        let mut record = record(None);
        record.employment_histories = vec![EmploymentHistory {
            post_held: Some("Clerk".to_string()),
            from_date: NaiveDate::from_ymd_opt(2015, 1, 5),
            to_date: None,
            ..Default::default()
        }];
        let mut mapping = FormMapping::default();
        mapping.tables.insert(
            "employmentHistories".to_string(),
            table_slot(500.0, 1, &[("PostHeld", 0.0), ("FromDate", 200.0), ("ToDate", 280.0)]),
        );

        let layout = build(&record, &mapping, &HalfEm, LayoutOptions::default()).unwrap();
        let cells = layout.ops.iter().find_map(|op| match op {
            DrawOp::TableRow { cells, .. } => Some(cells.clone()),
            _ => None,
        });
        assert_eq!(
            cells,
            Some(vec![
                TableCell {
                    x: 40.0,
                    text: "Clerk".to_string()
                },
                TableCell {
                    x: 240.0,
                    text: "05/01/2015".to_string()
                },
                TableCell {
                    x: 320.0,
                    text: String::new()
                },
            ])
        );
    }

    #[test]
    fn test_exam_results_and_language_without_teaching() {
        let mut record = record(None);
        let result = |subject: &str, grade: &str| ExamResult {
            subject: Some(subject.to_string()),
            grade: Some(grade.to_string()),
        };
        record.ol_results = vec![result("Mathematics", "A"), result("English", "B")];
        record.al_results = vec![result("Accounting", "C")];
        record.language_proficiencies = vec![LanguageProficiency {
            language: Some("Tamil".to_string()),
            can_speak: Some(true),
            can_teach: Some(true),
            ..Default::default()
        }];

        let mut mapping = FormMapping::default();
        mapping
            .tables
            .insert("olResults".to_string(), table_slot(600.0, 1, &[("Subject", 0.0), ("Grade", 200.0)]));
        mapping
            .tables
            .insert("alResults".to_string(), table_slot(520.0, 1, &[("Subject", 0.0), ("Grade", 200.0)]));
        mapping.tables.insert(
            "languageProficiencies".to_string(),
            table_slot(400.0, 1, &[("Language", 0.0), ("CanSpeak", 150.0), ("CanTeach", 300.0)]),
        );

        let layout = build(&record, &mapping, &HalfEm, LayoutOptions::default()).unwrap();
        assert_eq!(
            layout.texts(),
            vec![
                "G.C.E. (O/L) Results",
                "Mathematics",
                "A",
                "English",
                "B",
                "G.C.E. (A/L) Results",
                "Accounting",
                "C",
                "Language Proficiency",
                "Tamil",
                "Yes",
            ]
        );
    }
}
