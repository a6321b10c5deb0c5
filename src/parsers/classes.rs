//! Gradebook page (`PXP2_Gradebook.aspx`).
//!
//! The page carries its data in two places: a `PXP.GBFocusData = {...};`
//! assignment in an inline script (grading periods, school and org-year ids)
//! and a rendered table. In the table each class row is followed somewhere by a
//! mark row carrying a `data-mark-gu` attribute. The two row sets are joined by
//! position: class row `i` goes with mark row `i`.

use crate::error::{Result, StudentVueError};
use crate::models::{Class, GradingPeriod, Teacher};
use crate::parsers::fields::{parse_email, parse_percentage, parse_room};
use crate::parsers::{element_text, select_first, selector};
use scraper::{ElementRef, Html};
use serde::Deserialize;

const PAGE: &str = "gradebook";
const FOCUS_DATA_MARKER: &str = "PXP.GBFocusData";

#[derive(Debug, Deserialize)]
struct FocusData {
    #[serde(rename = "GradingPeriods")]
    grading_periods: Vec<FocusGradingPeriod>,
}

#[derive(Debug, Deserialize)]
struct FocusGradingPeriod {
    #[serde(rename = "GU")]
    gu: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "schoolID")]
    school_id: Option<serde_json::Value>,
    #[serde(rename = "OrgYearGU")]
    org_year_gu: Option<String>,
}

/// Parses every class on the gradebook page. Fails on the first malformed row.
pub fn parse_classes_from_html(html: &str) -> Result<Vec<Class>> {
    let document = Html::parse_document(html);

    let focus_data = parse_focus_data(&document)?;
    let first_period = focus_data
        .grading_periods
        .first()
        .ok_or_else(|| StudentVueError::parsing(PAGE, "GBFocusData has no grading periods"))?;

    let school_id = first_period
        .school_id
        .as_ref()
        .and_then(json_integer)
        .ok_or_else(|| {
            StudentVueError::parsing(PAGE, "first grading period has no numeric schoolID")
        })?;
    let org_year_gu = first_period
        .org_year_gu
        .clone()
        .ok_or_else(|| {
            StudentVueError::parsing(PAGE, "first grading period has no OrgYearGU")
        })?;

    let grading_periods: Vec<GradingPeriod> = focus_data
        .grading_periods
        .iter()
        .map(|p| GradingPeriod {
            gu: p.gu.clone(),
            name: p.name.clone(),
        })
        .collect();

    let table = select_first(PAGE, document.root_element(), "table")?;
    let body = select_first(PAGE, table, "tbody")?;

    let class_rows: Vec<ElementRef<'_>> = body
        .select(&selector(PAGE, "tr:not([data-mark-gu])")?)
        .collect();
    let mark_rows: Vec<ElementRef<'_>> = body
        .select(&selector(PAGE, "tr[data-mark-gu]")?)
        .collect();

    if class_rows.len() != mark_rows.len() {
        return Err(StudentVueError::parsing(
            PAGE,
            format!(
                "{} class rows but {} mark rows; rows cannot be paired",
                class_rows.len(),
                mark_rows.len()
            ),
        ));
    }

    class_rows
        .into_iter()
        .zip(mark_rows)
        .map(|(class_row, mark_row)| {
            parse_class_row(
                class_row,
                mark_row,
                &grading_periods,
                school_id,
                &org_year_gu,
            )
        })
        .collect()
}

/// Finds the script assigning `PXP.GBFocusData`, then parses the value on the right of `=`.
fn parse_focus_data(document: &Html) -> Result<FocusData> {
    let scripts = selector(PAGE, "script")?;

    let value_text = document
        .select(&scripts)
        .find_map(|s| assigned_value(&s.text().collect::<String>()).map(str::to_string))
        .ok_or_else(|| StudentVueError::not_found(PAGE, "script assigning PXP.GBFocusData"))?;

    serde_json::Deserializer::from_str(&value_text)
        .into_iter::<FocusData>()
        .next()
        .ok_or_else(|| StudentVueError::parsing(PAGE, "PXP.GBFocusData has no JSON value"))?
        .map_err(|e| {
            StudentVueError::parsing(PAGE, format!("PXP.GBFocusData is not valid JSON: {e}"))
        })
}

/// The text following the first `PXP.GBFocusData =` in `script`. Reads and
/// comparisons (`if (!PXP.GBFocusData)`, `PXP.GBFocusData == null`) are skipped.
fn assigned_value(script: &str) -> Option<&str> {
    script
        .match_indices(FOCUS_DATA_MARKER)
        .find_map(|(start, _)| {
            let rest = script[start + FOCUS_DATA_MARKER.len()..].trim_start();
            rest.strip_prefix('=')
                .filter(|value| !value.starts_with('='))
                .map(str::trim_start)
        })
}

fn json_integer(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_class_row(
    row: ElementRef<'_>,
    mark_row: ElementRef<'_>,
    grading_periods: &[GradingPeriod],
    school_id: i64,
    org_year_gu: &str,
) -> Result<Class> {
    // Button labels look like "3: Algebra II".
    let label = select_first(PAGE, row, "button")?.text().collect::<String>();
    let label = label.trim();
    let period = label
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| {
            StudentVueError::parsing(PAGE, format!("no period number in {label:?}"))
        })?;
    let title: String = label.chars().skip(3).collect::<String>().trim().to_string();

    let room = parse_room(&element_text(select_first(PAGE, row, ".teacher-room")?))?;

    let teacher_name = element_text(select_first(PAGE, row, "div.teacher")?);
    let teacher_link = row
        .select(&selector(PAGE, "span.teacher a[href]")?)
        .next()
        .and_then(|a| a.value().attr("href"));
    let teacher = Teacher::new(teacher_name, teacher_link.and_then(parse_email));

    let class_group_id = row
        .value()
        .attr("data-guid")
        .ok_or_else(|| {
            StudentVueError::not_found(PAGE, format!("data-guid on the row for {title:?}"))
        })?
        .trim()
        .parse::<i64>()
        .map_err(|e| StudentVueError::parsing(PAGE, format!("data-guid for {title:?}: {e}")))?;

    let mark = parse_percentage(&element_text(select_first(PAGE, mark_row, ".score")?))?;

    Ok(Class {
        period,
        title,
        room,
        teacher,
        mark,
        grading_periods: grading_periods.to_vec(),
        class_group_id,
        school_id,
        org_year_gu: org_year_gu.to_string(),
    })
}
