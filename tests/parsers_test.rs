// tests/parsers_test.rs

use scraper::{Html, Selector};
use studentvue_core::parsers::calendar::{parse_assignment, parse_assignments_from_html};
use studentvue_core::parsers::classes::parse_classes_from_html;
use studentvue_core::parsers::form::{extract_fields, extract_form};
use studentvue_core::parsers::home::parse_identity_from_html;
use studentvue_core::parsers::info::{parse_school_info_from_html, parse_student_info_from_html};
use studentvue_core::{Assignment, InfoValue, Result, StudentVueError, Teacher};

const LOGIN: &str = include_str!("fixtures/login.html");
const HOME: &str = include_str!("fixtures/home.html");
const GRADEBOOK: &str = include_str!("fixtures/gradebook.html");
const CALENDAR: &str = include_str!("fixtures/calendar.html");
const MY_ACCOUNT: &str = include_str!("fixtures/my_account.html");
const SCHOOL_INFO: &str = include_str!("fixtures/school_info.html");

#[test]
fn test_login_form_fields() -> Result<()> {
    let fields = extract_form(LOGIN, "aspnetForm")?;

    // Hidden view-state fields come back verbatim.
    assert_eq!(
        fields.get("__VIEWSTATE"),
        Some("/wEPDwUKMTY1NDU2MTA1MmRk+3Qz==")
    );
    assert_eq!(fields.get("__VIEWSTATEGENERATOR"), Some("6D2B6B6C"));
    assert_eq!(
        fields.get("__EVENTVALIDATION"),
        Some("/wEdAAT1a2b3c4d5e6f$7g8h")
    );

    assert_eq!(fields.get("ctl00$MainContent$username"), Some(""));
    assert_eq!(fields.get("ctl00$MainContent$password"), Some(""));
    assert_eq!(fields.get("ctl00$MainContent$role"), Some("student"));
    assert_eq!(fields.get("ctl00$MainContent$language"), Some("es"));
    assert_eq!(fields.get("ctl00$MainContent$notes"), Some("hello"));
    assert_eq!(fields.get("ctl00$MainContent$Submit1"), Some("Login"));

    assert!(!fields.contains("ctl00$MainContent$rememberMe"));
    assert!(!fields.contains("ctl00$MainContent$clear"));

    let names: Vec<&str> = fields.names().collect();
    assert_eq!(
        names,
        vec![
            "__VIEWSTATE",
            "__VIEWSTATEGENERATOR",
            "__EVENTVALIDATION",
            "ctl00$MainContent$username",
            "ctl00$MainContent$password",
            "ctl00$MainContent$role",
            "ctl00$MainContent$language",
            "ctl00$MainContent$notes",
            "ctl00$MainContent$Submit1",
        ]
    );
    Ok(())
}

#[test]
fn test_form_fields_from_fragment() -> Result<()> {
    let fragment = Html::parse_fragment(
        r#"<form><input name="a" value="1">
            <select name="b"><option>First</option><option>Second</option></select>
            <input name="a" value="2"></form>"#,
    );
    let form = fragment
        .select(&Selector::parse("form").unwrap())
        .next()
        .unwrap();

    let mut fields = extract_fields(form)?;
    assert_eq!(fields.len(), 2);
    assert_eq!(fields.get("a"), Some("2"));
    assert_eq!(fields.get("b"), Some("First"));

    fields.set("LB", "3/1/2024");
    assert_eq!(fields.as_pairs().last().unwrap().1, "3/1/2024");

    // The request body is serialized straight from the fields, as ordered pairs.
    assert_eq!(
        serde_json::to_value(&fields).unwrap(),
        serde_json::json!([["a", "2"], ["b", "First"], ["LB", "3/1/2024"]])
    );
    Ok(())
}

#[test]
fn test_missing_form_is_reported() {
    let err = extract_form("<html><body></body></html>", "aspnetForm").unwrap_err();
    assert!(err.is_parse());
}

#[test]
fn test_identity_from_landing_page() -> Result<()> {
    let identity = parse_identity_from_html(HOME, "portal.district.org/sv")?;

    assert_eq!(identity.student_id, "918273");
    assert_eq!(identity.name, "Alex Rivera");
    assert_eq!(identity.school_name, "Lincoln High School");
    assert_eq!(identity.school_phone, "(555) 010-2030");
    assert_eq!(
        identity.photo_url,
        "https://portal.district.org/sv/Photos/E2024/3F2A9C1B-77D0-4E1A-9B8C-ABCDEF012345_Photo.PNG"
    );
    assert_eq!(identity.photo_guid, "3F2A9C1B-77D0-4E1A-9B8C-ABCDEF012345");
    Ok(())
}

#[test]
fn test_classes_from_gradebook() -> Result<()> {
    let classes = parse_classes_from_html(GRADEBOOK)?;
    assert_eq!(classes.len(), 3);

    let periods: Vec<u32> = classes.iter().map(|c| c.period).collect();
    assert_eq!(periods, vec![1, 2, 3]);
    let marks: Vec<f64> = classes.iter().map(|c| c.mark).collect();
    assert_eq!(marks, vec![93.5, 88.0, 71.25]);

    let algebra = &classes[0];
    assert_eq!(algebra.title, "Algebra II");
    assert_eq!(algebra.room, "B12");
    assert_eq!(
        algebra.teacher,
        Teacher::new("Ms. Jane Doe", Some("jane.doe@district.org".to_string()))
    );
    assert_eq!(algebra.class_group_id, 7001);
    assert_eq!(algebra.school_id, 112);
    assert_eq!(algebra.org_year_gu, "{ORG-2024}");
    assert_eq!(algebra.grading_periods.len(), 2);
    assert_eq!(algebra.grading_periods[1].gu, "{A1B2-Q2}");
    assert_eq!(algebra.grading_periods[1].name, "Quarter 2");

    let history = &classes[1];
    assert_eq!(history.title, "World History");
    assert_eq!(history.room, "204");
    assert_eq!(history.teacher.email, None);

    for class in &classes {
        assert_eq!(class.grading_periods, algebra.grading_periods);
    }
    Ok(())
}

#[test]
fn test_gradebook_without_focus_data_fails() {
    let html = GRADEBOOK.replace("PXP.GBFocusData", "PXP.SomethingElse");
    let err = parse_classes_from_html(&html).unwrap_err();
    assert!(err.is_parse(), "unexpected error: {err}");
}

#[test]
fn test_focus_data_assignment_found_after_earlier_mentions() -> Result<()> {
    let guarded = GRADEBOOK.replace(
        "  PXP.GBFocusData = {",
        "  if (!PXP.GBFocusData) PXP.GBFocusData = {",
    );
    assert_eq!(parse_classes_from_html(&guarded)?.len(), 3);

    let compared = GRADEBOOK.replace(
        "  PXP.GBFocusData = {",
        "  if (PXP.GBFocusData == null) {}\n  PXP.GBFocusData = {",
    );
    assert_eq!(parse_classes_from_html(&compared)?.len(), 3);
    Ok(())
}

#[test]
fn test_school_id_as_numeric_string() -> Result<()> {
    let html = GRADEBOOK.replace(r#""schoolID":112"#, r#""schoolID":"112""#);
    let classes = parse_classes_from_html(&html)?;
    assert!(classes.iter().all(|c| c.school_id == 112));
    Ok(())
}

#[test]
fn test_gradebook_without_grading_periods_fails() {
    let start = GRADEBOOK.find(r#""GradingPeriods":["#).unwrap();
    let end = start + GRADEBOOK[start..].find("],").unwrap() + 1;
    let html = format!(
        "{}{}{}",
        &GRADEBOOK[..start],
        r#""GradingPeriods":[]"#,
        &GRADEBOOK[end..]
    );

    let err = parse_classes_from_html(&html).unwrap_err();
    assert!(
        matches!(err, StudentVueError::ParsingError { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn test_course_label_without_period_fails() {
    let html = GRADEBOOK.replace("1: Algebra II", "A: Algebra II");
    let err = parse_classes_from_html(&html).unwrap_err();
    assert!(
        matches!(err, StudentVueError::ParsingError { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn test_gradebook_with_broken_json_fails() {
    let html = GRADEBOOK.replace(r#"{"GradingPeriods":["#, r#"{"GradingPeriods":[oops"#);
    let err = parse_classes_from_html(&html).unwrap_err();
    assert!(err.is_parse(), "unexpected error: {err}");
}

#[test]
fn test_gradebook_row_count_mismatch_fails() {
    let html = GRADEBOOK.replace(
        r#"<tr data-mark-gu="{M-3}"><td><span class="score">71.25%</span></td></tr>"#,
        "",
    );
    let err = parse_classes_from_html(&html).unwrap_err();
    assert!(err.is_parse(), "unexpected error: {err}");
}

#[test]
fn test_gradebook_bad_mark_fails() {
    let html = GRADEBOOK.replace("88%", "N/A");
    assert!(parse_classes_from_html(&html).is_err());
}

#[test]
fn test_assignment_title_parsing() -> Result<()> {
    let assignment = parse_assignment(
        "Math: Homework 3 - Score: 9/10",
        "PXP2_GradeBook.aspx?DGU=5&GP=abc",
    )?;

    assert_eq!(
        assignment,
        Assignment {
            title: "Homework 3".to_string(),
            category: "Math".to_string(),
            id: 5,
            grading_period: "abc".to_string(),
        }
    );
    Ok(())
}

#[test]
fn test_assignments_from_calendar() -> Result<()> {
    let assignments = parse_assignments_from_html(CALENDAR)?;
    assert_eq!(assignments.len(), 2);

    assert_eq!(assignments[0].title, "Homework 3");
    assert_eq!(assignments[0].category, "Math");
    assert_eq!(assignments[0].id, 5);
    assert_eq!(assignments[0].grading_period, "abc");

    // Only the first colon separates the category.
    assert_eq!(assignments[1].category, "English 10");
    assert_eq!(assignments[1].title, "Essay: Outline");
    assert_eq!(assignments[1].id, 17);
    assert_eq!(assignments[1].grading_period, "{Q1}");
    Ok(())
}

#[test]
fn test_assignment_without_ids_fails() {
    assert!(parse_assignment("Math: Quiz", "PXP2_GradeBook.aspx?GP=abc").is_err());
    assert!(parse_assignment("Math: Quiz", "PXP2_GradeBook.aspx?DGU=x&GP=abc").is_err());
    assert!(parse_assignment("No category here", "PXP2_GradeBook.aspx?DGU=1&GP=abc").is_err());
}

#[test]
fn test_student_info_table() -> Result<()> {
    let info = parse_student_info_from_html(MY_ACCOUNT)?;

    let labels: Vec<&str> = info.labels().collect();
    assert_eq!(labels, vec!["Student Name", "Student ID", "Address", "Grade"]);

    assert_eq!(
        info.get("Student Name").and_then(InfoValue::as_text),
        Some("Alex Rivera")
    );
    assert_eq!(
        info.get("Address").and_then(InfoValue::as_text),
        Some("12 Elm Street\nSpringfield, OR 97477")
    );
    assert_eq!(info.get("Grade").and_then(InfoValue::as_text), Some("11"));
    Ok(())
}

#[test]
fn test_school_info_table() -> Result<()> {
    let info = parse_school_info_from_html(SCHOOL_INFO)?;
    assert_eq!(info.len(), 4);

    assert_eq!(
        info.get("Principal"),
        Some(&InfoValue::Teacher(Teacher::new(
            "Jane Doe",
            Some("jane@x.edu".to_string())
        )))
    );
    assert_eq!(
        info.get("School").and_then(InfoValue::as_text),
        Some("Lincoln High School")
    );
    assert_eq!(
        info.get("Address").and_then(InfoValue::as_text),
        Some("400 Main St\nSpringfield, OR 97477")
    );
    Ok(())
}

#[test]
fn test_school_contact_without_mailto() -> Result<()> {
    let html = SCHOOL_INFO.replace(r#"<a href="mailto:jane@x.edu"></a>"#, "");
    let info = parse_school_info_from_html(&html)?;

    assert_eq!(
        info.get("Principal"),
        Some(&InfoValue::Teacher(Teacher::new("Jane Doe", None)))
    );
    Ok(())
}

#[test]
fn test_repeated_label_keeps_first_position() -> Result<()> {
    let html = MY_ACCOUNT.replace("<span>Grade</span>", "<span>Student Name</span>");
    let info = parse_student_info_from_html(&html)?;

    assert_eq!(info.len(), 3);
    let labels: Vec<&str> = info.labels().collect();
    assert_eq!(labels, vec!["Student Name", "Student ID", "Address"]);
    assert_eq!(
        info.get("Student Name").and_then(InfoValue::as_text),
        Some("11")
    );
    Ok(())
}

#[test]
fn test_info_cell_without_label_fails() {
    let html = r#"<table class="info_tbl"><tr><td>orphan value</td></tr></table>"#;
    let err = parse_student_info_from_html(html).unwrap_err();
    assert!(err.is_parse());
}
