//! Student and school information pages.
//!
//! Both pages are a table of cells shaped like
//! `<td><span>Label</span>value text</td>`. On the school page a cell may hold
//! a second span with a staff member's name and `mailto:` link.

use crate::error::{Result, StudentVueError};
use crate::models::{InfoRecord, InfoValue, Teacher};
use crate::parsers::fields::parse_email;
use crate::parsers::{element_text, select_first, selector, text_lines_excluding};
use scraper::{ElementRef, Html};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoTableKind {
    /// Every value is text.
    Student,
    /// Cells with more than one span hold a teacher.
    School,
}

impl InfoTableKind {
    fn page(self) -> &'static str {
        match self {
            InfoTableKind::Student => "student info",
            InfoTableKind::School => "school info",
        }
    }
}

/// Parses `PXP2_MyAccount.aspx`.
pub fn parse_student_info_from_html(html: &str) -> Result<InfoRecord> {
    parse_info_table(html, "table.info_tbl", InfoTableKind::Student)
}

/// Parses `PXP2_SchoolInformation.aspx`.
pub fn parse_school_info_from_html(html: &str) -> Result<InfoRecord> {
    parse_info_table(html, "table", InfoTableKind::School)
}

/// Reads every cell of the first table matching `table_selector` into label/value pairs.
pub fn parse_info_table(
    html: &str,
    table_selector: &str,
    kind: InfoTableKind,
) -> Result<InfoRecord> {
    let page = kind.page();
    let document = Html::parse_document(html);
    let table = select_first(page, document.root_element(), table_selector)?;

    let cells = selector(page, "td")?;
    let spans = selector(page, "span")?;
    let anchors = selector(page, "a[href]")?;

    let mut record = InfoRecord::default();

    for cell in table.select(&cells) {
        let cell_spans: Vec<ElementRef<'_>> = cell.select(&spans).collect();
        let label_span = *cell_spans.first().ok_or_else(|| {
            StudentVueError::not_found(page, "label span in an information cell")
        })?;
        let label = element_text(label_span);

        let value = match (kind, cell_spans.get(1)) {
            (InfoTableKind::School, Some(contact)) => {
                let email = contact
                    .select(&anchors)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .and_then(parse_email);
                InfoValue::Teacher(Teacher::new(element_text(*contact), email))
            }
            _ => InfoValue::Text(text_lines_excluding(cell, Some(label_span)).join("\n")),
        };

        record.insert(label, value);
    }

    Ok(record)
}
