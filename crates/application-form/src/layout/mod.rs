//! Layout engine
//!
//! Turns an [`ApplicationRecord`] and a [`FormMapping`] into the ordered
//! [`DrawOp`]s of one form without touching a PDF. The academic and
//! non-academic forms are separate section lists built from the shared
//! placement primitives of [`Composer`]:
//!
//! - **fields** print a label and a value at a mapped point
//! - **tables** print a heading and one row per entry, `rowHeight` apart
//! - **paragraphs** print word-wrapped text
//!
//! Tables, paragraphs, the declaration and the signature are *flowing*
//! sections. Once drawn they leave an extent on each page they touched. A
//! later flowing section whose vertical range, from its anchor down to its
//! last row, comes within `sectionGap` of any of those extents starts
//! `sectionGap` below the lowest one it hits instead. Rows and lines that
//! would drop below `bottomMargin` continue on the next page at
//! `continuationY`, below whatever was already placed there.
//!
//! A section is printed only when it has data and a mapping entry.

mod academic;
mod non_academic;

use crate::instruction::{DrawOp, FormLayout, ImageAsset, TableCell, TextRole};
use crate::mapping::{FormMapping, ParagraphSlot, TextAlign};
use crate::record::{
    ApplicationRecord, ApplicationType, DescriptionEntry, EmploymentHistory, ExamResult, LanguageProficiency,
    ProfessionalQualification, Reference, UniversityEducation,
};
use crate::{FormError, Result};
use chrono::NaiveDate;
use form_text::{format_date, format_date_text, humanize_field_name, is_date_field, wrap_text};
use std::collections::BTreeMap;

/// Text measurement used for wrapping and heading rules
///
/// Implemented by the renderer's fonts so that wrapped lines fit once drawn.
pub trait TextMeasure {
    /// Width in points of `text` set at `font_size` in the weight of `role`
    fn text_width(&self, text: &str, font_size: f64, role: TextRole) -> f64;
}

/// Layout switches that do not belong in a mapping document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Treat a missing declaration or signature mapping as a configuration error
    pub strict_sections: bool,
    /// Whether a logo image is available to place
    pub logo_available: bool,
}

/// Lay out `record` on the form selected by its vacancy type
pub fn build(
    record: &ApplicationRecord,
    mapping: &FormMapping,
    measure: &dyn TextMeasure,
    options: LayoutOptions,
) -> Result<FormLayout> {
    let layout = match record.application_type() {
        ApplicationType::Academic => academic::build(record, mapping, measure, options)?,
        ApplicationType::NonAcademic => non_academic::build(record, mapping, measure, options)?,
    };

    tracing::debug!(
        application_id = %record.id(),
        application_type = %layout.application_type,
        ops = layout.ops.len(),
        pages = layout.page_count,
        "layout complete"
    );
    Ok(layout)
}

const HEADING_RULE_OFFSET: f64 = 2.0;
const HEADING_RULE_THICKNESS: f64 = 0.75;
const SIGNATURE_RULE_THICKNESS: f64 = 0.5;
const CAPTION_GAP: f64 = 2.0;

const DECLARATION_TEXT: &str = "I hereby declare that the particulars furnished by me in this application \
are true and accurate to the best of my knowledge. I am aware that if any particulars contained herein are \
found to be false or incorrect, I am liable to disqualification before selection or to dismissal without \
compensation if the inaccuracy is discovered after appointment.";

const SIGNATURE_CAPTION: &str = "Signature of Applicant";

/// A value about to be printed
#[derive(Debug, Clone, Copy)]
pub(crate) enum FieldValue<'a> {
    Text(Option<&'a str>),
    Date(Option<NaiveDate>),
    Flag(Option<bool>),
}

impl<'a> FieldValue<'a> {
    pub(crate) fn text(value: &'a Option<String>) -> Self {
        FieldValue::Text(value.as_deref())
    }

    /// Printable form; date-named fields are normalized to `DD/MM/YYYY`
    pub(crate) fn display(self, name: &str) -> String {
        match self {
            FieldValue::Text(text) => {
                let text = text.unwrap_or_default();
                if is_date_field(name) {
                    format_date_text(text)
                } else {
                    text.trim().to_string()
                }
            }
            FieldValue::Date(date) => format_date(date),
            FieldValue::Flag(Some(true)) => "Yes".to_string(),
            FieldValue::Flag(Some(false)) => "No".to_string(),
            FieldValue::Flag(None) => String::new(),
        }
    }
}

/// Entries of a repeatable table
pub(crate) trait TableRow {
    /// Value of a named column, `None` when the entry has no such column
    fn cell(&self, column: &str) -> Option<FieldValue<'_>>;
}

/// Name, default heading and canonical column order of one table
pub(crate) struct TableDef {
    pub key: &'static str,
    pub title: &'static str,
    pub columns: &'static [&'static str],
}

pub(crate) const PROFESSIONAL_QUALIFICATIONS: TableDef = TableDef {
    key: "professionalQualifications",
    title: "Professional Qualifications",
    columns: &["QualificationName", "Institution", "FromYear", "ToYear", "ResultOrExamPassed"],
};

pub(crate) const EMPLOYMENT_HISTORIES: TableDef = TableDef {
    key: "employmentHistories",
    title: "Employment History",
    columns: &["PostHeld", "Institution", "FromDate", "ToDate", "LastSalary"],
};

pub(crate) const REFERENCES: TableDef = TableDef {
    key: "references",
    title: "Referees",
    columns: &["Name", "Designation", "Address"],
};

impl TableRow for UniversityEducation {
    fn cell(&self, column: &str) -> Option<FieldValue<'_>> {
        let value = match column {
            "DegreeOrDiploma" => &self.degree_or_diploma,
            "Institute" => &self.institute,
            "FromYear" => &self.from_year,
            "ToYear" => &self.to_year,
            "Class" => &self.class,
            "YearObtained" => &self.year_obtained,
            "IndexNumber" => &self.index_number,
            _ => return None,
        };
        Some(FieldValue::text(value))
    }
}

impl TableRow for ProfessionalQualification {
    fn cell(&self, column: &str) -> Option<FieldValue<'_>> {
        let value = match column {
            "QualificationName" => &self.qualification_name,
            "Institution" => &self.institution,
            "FromYear" => &self.from_year,
            "ToYear" => &self.to_year,
            "ResultOrExamPassed" => &self.result_or_exam_passed,
            _ => return None,
        };
        Some(FieldValue::text(value))
    }
}

impl TableRow for LanguageProficiency {
    fn cell(&self, column: &str) -> Option<FieldValue<'_>> {
        match column {
            "Language" => Some(FieldValue::text(&self.language)),
            "CanSpeak" => Some(FieldValue::Flag(self.can_speak)),
            "CanRead" => Some(FieldValue::Flag(self.can_read)),
            "CanWrite" => Some(FieldValue::Flag(self.can_write)),
            "CanTeach" => Some(FieldValue::Flag(self.can_teach)),
            _ => None,
        }
    }
}

impl TableRow for EmploymentHistory {
    fn cell(&self, column: &str) -> Option<FieldValue<'_>> {
        match column {
            "PostHeld" => Some(FieldValue::text(&self.post_held)),
            "Institution" => Some(FieldValue::text(&self.institution)),
            "FromDate" => Some(FieldValue::Date(self.from_date)),
            "ToDate" => Some(FieldValue::Date(self.to_date)),
            "LastSalary" => Some(FieldValue::text(&self.last_salary)),
            _ => None,
        }
    }
}

impl TableRow for DescriptionEntry {
    fn cell(&self, column: &str) -> Option<FieldValue<'_>> {
        (column == "Description").then(|| FieldValue::text(&self.description))
    }
}

impl TableRow for ExamResult {
    fn cell(&self, column: &str) -> Option<FieldValue<'_>> {
        match column {
            "Subject" => Some(FieldValue::text(&self.subject)),
            "Grade" => Some(FieldValue::text(&self.grade)),
            _ => None,
        }
    }
}

impl TableRow for Reference {
    fn cell(&self, column: &str) -> Option<FieldValue<'_>> {
        let value = match column {
            "Name" => &self.name,
            "Designation" => &self.designation,
            "Address" => &self.address,
            _ => return None,
        };
        Some(FieldValue::text(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    page: usize,
    y: f64,
}

/// Vertical range a section occupies on one page
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extent {
    top: f64,
    bottom: f64,
}

impl Extent {
    /// Whether the range `top..bottom` comes within `gap` of this extent
    fn collides(&self, top: f64, bottom: f64, gap: f64) -> bool {
        top > self.bottom - gap && bottom < self.top + gap
    }
}

/// Per-page extents of the section being drawn
#[derive(Debug, Default)]
struct Span {
    pages: BTreeMap<usize, Extent>,
}

impl Span {
    fn touch(&mut self, page: usize, top: f64, bottom: f64) {
        self.pages
            .entry(page)
            .and_modify(|extent| {
                extent.top = extent.top.max(top);
                extent.bottom = extent.bottom.min(bottom);
            })
            .or_insert(Extent { top, bottom });
    }
}

/// Accumulates the draw instructions of one form
pub(crate) struct Composer<'a> {
    mapping: &'a FormMapping,
    measure: &'a dyn TextMeasure,
    options: LayoutOptions,
    ops: Vec<DrawOp>,
    /// Flowing sections drawn so far, per page
    extents: BTreeMap<usize, Vec<Extent>>,
}

impl<'a> Composer<'a> {
    pub(crate) fn new(mapping: &'a FormMapping, measure: &'a dyn TextMeasure, options: LayoutOptions) -> Self {
        Self {
            mapping,
            measure,
            options,
            ops: Vec::new(),
            extents: BTreeMap::new(),
        }
    }

    /// Logo, university title and form title
    pub(crate) fn header(&mut self, application_type: ApplicationType) {
        let mapping = self.mapping;

        if let Some(slot) = &mapping.logo {
            if self.options.logo_available {
                self.ops.push(DrawOp::Image {
                    page: slot.page,
                    x: slot.x,
                    y: slot.y,
                    width: slot.width,
                    height: slot.height,
                    asset: ImageAsset::Logo,
                });
            } else {
                tracing::debug!("logo is mapped but no logo image is available");
            }
        }

        if let Some(slot) = &mapping.university_title {
            if let Some(text) = slot.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                self.push_text(slot.page, slot.x, slot.y, slot.font_size, TextRole::Title, slot.align, text);
            }
        }

        if let Some(slot) = &mapping.form_title {
            let text = slot.text.as_deref().unwrap_or(application_type.form_title());
            self.push_text(slot.page, slot.x, slot.y, slot.font_size, TextRole::Title, slot.align, text);
        }
    }

    /// Labelled field at its mapped point, skipped when unmapped or empty
    pub(crate) fn field(&mut self, name: &str, value: FieldValue<'_>) {
        let mapping = self.mapping;
        let Some(slot) = mapping.field(name) else {
            return;
        };
        let text = value.display(name);
        if text.is_empty() {
            return;
        }

        let label = match &slot.label {
            Some(label) => label.clone(),
            None => format!("{}:", humanize_field_name(name)),
        };
        let (label_x, label_align) = match slot.label_x {
            Some(x) => (x, TextAlign::Left),
            None => (slot.x - mapping.layout.label_gap, TextAlign::Right),
        };
        self.push_text(slot.page, label_x, slot.y, slot.font_size, TextRole::Label, label_align, &label);

        match slot.max_width {
            Some(max_width) => {
                let lines = self.wrap(&text, max_width, slot.font_size);
                let start = Position {
                    page: slot.page,
                    y: slot.y,
                };
                self.push_lines(start, slot.x, slot.font_size, slot.line_height(), lines, &mut Span::default());
            }
            None => self.push_text(slot.page, slot.x, slot.y, slot.font_size, TextRole::Value, TextAlign::Left, &text),
        }
    }

    /// Heading plus one row per entry, columns in definition order
    pub(crate) fn table<R: TableRow>(&mut self, def: &TableDef, rows: &[R]) {
        if rows.is_empty() {
            return;
        }
        let mapping = self.mapping;
        let Some(slot) = mapping.table(def.key) else {
            tracing::debug!(table = def.key, "no mapping entry, table skipped");
            return;
        };

        let columns: Vec<(&str, f64)> = def
            .columns
            .iter()
            .filter_map(|name| slot.columns.get(*name).map(|offset| (*name, slot.start_x + offset)))
            .collect();
        if columns.is_empty() {
            tracing::debug!(table = def.key, "mapping names no known column, table skipped");
            return;
        }

        let mut span = Span::default();
        let height = rows.len() as f64 * slot.row_height;
        let heading = self.flow_anchor(slot.page, slot.start_y + slot.row_height, height);
        let title = slot.title.as_deref().unwrap_or(def.title);
        self.push_heading(heading, slot.start_x, slot.font_size + 1.0, title, &mut span);

        let mut position = Position {
            page: heading.page,
            y: heading.y - slot.row_height,
        };
        for (index, row) in rows.iter().enumerate() {
            if index > 0 {
                position.y -= slot.row_height;
            }
            position = self.paginate(position);

            let cells = columns
                .iter()
                .map(|(name, x)| TableCell {
                    x: *x,
                    text: row.cell(name).map(|value| value.display(name)).unwrap_or_default(),
                })
                .collect();
            self.ops.push(DrawOp::TableRow {
                page: position.page,
                y: position.y,
                font_size: slot.font_size,
                cells,
            });
            span.touch(position.page, position.y + slot.font_size, position.y);
        }

        self.commit(span);
    }

    /// Free-text entries printed as one wrapped paragraph per entry
    pub(crate) fn paragraph(
        &mut self,
        section: &str,
        slot: Option<&ParagraphSlot>,
        default_title: &str,
        entries: &[DescriptionEntry],
    ) {
        let text = entries
            .iter()
            .filter_map(|entry| entry.description.as_deref().map(str::trim))
            .filter(|description| !description.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if text.is_empty() {
            return;
        }
        let Some(slot) = slot else {
            tracing::debug!(section, "no mapping entry, paragraph skipped");
            return;
        };

        let title = slot.title.as_deref().unwrap_or(default_title);
        self.paragraph_block(slot, Some(title), &text);
    }

    /// Declaration text; its mapping is mandatory in strict mode
    pub(crate) fn declaration(&mut self) -> Result<()> {
        let mapping = self.mapping;
        let Some(slot) = &mapping.declaration else {
            return self.missing_mandatory("declaration");
        };
        let text = slot.text.as_deref().unwrap_or(DECLARATION_TEXT);
        self.paragraph_block(slot, slot.title.as_deref(), text);
        Ok(())
    }

    /// Signature line with caption and the application date; mandatory in strict mode
    pub(crate) fn signature(&mut self, date: Option<NaiveDate>) -> Result<()> {
        let mapping = self.mapping;
        let Some(slot) = &mapping.signature else {
            return self.missing_mandatory("signature");
        };

        let mut span = Span::default();
        let line = self.flow_anchor(slot.page, slot.y, slot.font_size + CAPTION_GAP);
        let caption_y = line.y - slot.font_size - CAPTION_GAP;

        self.ops.push(DrawOp::Rule {
            page: line.page,
            from: (slot.x, line.y),
            to: (slot.x + slot.width, line.y),
            thickness: SIGNATURE_RULE_THICKNESS,
        });
        let caption = slot.label.as_deref().unwrap_or(SIGNATURE_CAPTION);
        self.push_text(line.page, slot.x, caption_y, slot.font_size, TextRole::Label, TextAlign::Left, caption);

        if let Some(date_x) = slot.date_x {
            let date = format_date(date);
            if !date.is_empty() {
                self.push_text(line.page, date_x, line.y + CAPTION_GAP, slot.font_size, TextRole::Value, TextAlign::Left, &date);
                self.push_text(line.page, date_x, caption_y, slot.font_size, TextRole::Label, TextAlign::Left, "Date");
            }
        }

        span.touch(line.page, line.y + slot.font_size, caption_y);
        self.commit(span);
        Ok(())
    }

    pub(crate) fn finish(self, application_type: ApplicationType) -> FormLayout {
        let page_count = self.ops.iter().map(DrawOp::page).max().unwrap_or(1).max(1);
        FormLayout {
            application_type,
            page_count,
            ops: self.ops,
        }
    }

    fn missing_mandatory(&self, section: &str) -> Result<()> {
        if self.options.strict_sections {
            return Err(FormError::Configuration(format!(
                "mapping has no {section} section"
            )));
        }
        tracing::debug!(section, "no mapping entry, section skipped");
        Ok(())
    }

    fn paragraph_block(&mut self, slot: &ParagraphSlot, title: Option<&str>, text: &str) {
        let line_height = slot.line_height();
        let mut span = Span::default();

        let anchor = match title {
            Some(_) => slot.y + line_height,
            None => slot.y,
        };
        let lines = self.wrap(text, slot.max_width, slot.font_size);
        let steps = lines.len().saturating_sub(1) + usize::from(title.is_some());
        let mut position = self.flow_anchor(slot.page, anchor, steps as f64 * line_height);

        if let Some(title) = title {
            self.push_heading(position, slot.x, slot.font_size + 1.0, title, &mut span);
            position.y -= line_height;
            position = self.paginate(position);
        }

        self.push_lines(position, slot.x, slot.font_size, line_height, lines, &mut span);
        self.commit(span);
    }

    fn wrap(&self, text: &str, max_width: f64, font_size: f64) -> Vec<String> {
        wrap_text(Some(text), max_width, |line| {
            self.measure.text_width(line, font_size, TextRole::Value)
        })
    }

    /// Place wrapped lines from `start`, one [`DrawOp::WrappedText`] per page
    fn push_lines(
        &mut self,
        start: Position,
        x: f64,
        font_size: f64,
        line_height: f64,
        lines: Vec<String>,
        span: &mut Span,
    ) {
        let mut groups: Vec<(Position, Vec<String>)> = Vec::new();
        let mut previous: Option<Position> = None;

        for line in lines {
            let expected = match previous {
                Some(last) => Position {
                    page: last.page,
                    y: last.y - line_height,
                },
                None => start,
            };
            let position = self.paginate(expected);
            span.touch(position.page, position.y + font_size, position.y);

            // A line moved to another page or below another section starts a new run
            match groups.last_mut() {
                Some((_, group)) if previous.is_some() && position == expected => group.push(line),
                _ => groups.push((position, vec![line])),
            }
            previous = Some(position);
        }

        for (first, lines) in groups {
            self.ops.push(DrawOp::WrappedText {
                page: first.page,
                x,
                y: first.y,
                font_size,
                line_height,
                role: TextRole::Value,
                lines,
            });
        }
    }

    /// Bold heading underlined by a rule as wide as the text
    fn push_heading(&mut self, position: Position, x: f64, font_size: f64, title: &str, span: &mut Span) {
        let width = self.measure.text_width(title, font_size, TextRole::Heading);
        let rule_y = position.y - HEADING_RULE_OFFSET;

        self.push_text(position.page, x, position.y, font_size, TextRole::Heading, TextAlign::Left, title);
        self.ops.push(DrawOp::Rule {
            page: position.page,
            from: (x, rule_y),
            to: (x + width, rule_y),
            thickness: HEADING_RULE_THICKNESS,
        });
        span.touch(position.page, position.y + font_size, rule_y);
    }

    #[allow(clippy::too_many_arguments)]
    fn push_text(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        font_size: f64,
        role: TextRole,
        align: TextAlign,
        text: &str,
    ) {
        self.ops.push(DrawOp::Text {
            page,
            x,
            y,
            font_size,
            role,
            align,
            text: text.to_string(),
        });
    }

    /// Move a position below the bottom margin to the top of the next page,
    /// and out of any flowing section already drawn there
    fn paginate(&self, mut position: Position) -> Position {
        let layout = &self.mapping.layout;
        loop {
            if position.y < layout.bottom_margin {
                position = Position {
                    page: position.page + 1,
                    y: layout.continuation_y,
                };
                continue;
            }
            match self.lowest_collision(position.page, position.y, position.y) {
                Some(bottom) => position.y = bottom - layout.section_gap,
                None => return position,
            }
        }
    }

    /// First baseline of a flowing section spanning `height` points below its anchor
    fn flow_anchor(&self, page: usize, y: f64, height: f64) -> Position {
        let layout = &self.mapping.layout;
        let mut position = self.paginate(Position { page, y });
        loop {
            let bottom = (position.y - height).max(layout.bottom_margin);
            match self.lowest_collision(position.page, position.y, bottom) {
                Some(lowest) => {
                    position = self.paginate(Position {
                        page: position.page,
                        y: lowest - layout.section_gap,
                    })
                }
                None => return position,
            }
        }
    }

    /// Bottom of the lowest drawn extent on `page` the range `top..bottom` runs into
    fn lowest_collision(&self, page: usize, top: f64, bottom: f64) -> Option<f64> {
        let gap = self.mapping.layout.section_gap;
        self.extents
            .get(&page)?
            .iter()
            .filter(|extent| extent.collides(top, bottom, gap))
            .map(|extent| extent.bottom)
            .reduce(f64::min)
    }

    fn commit(&mut self, span: Span) {
        for (page, extent) in span.pages {
            self.extents.entry(page).or_default().push(extent);
        }
    }
}
