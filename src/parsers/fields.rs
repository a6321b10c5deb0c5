//! Small parsers for the scalar values the portal embeds in labels and links.

use crate::error::{Result, StudentVueError};
use regex::Regex;
use std::sync::LazyLock;

static STUDENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ID:\s*([0-9]+)").expect("valid student id regex"));
static ROOM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Room:\s*([A-Za-z0-9]+)").expect("valid room regex"));
static PHOTO_GUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Photos/[A-Z0-9]+/([A-Z0-9-]+)_Photo\.PNG").expect("valid photo regex")
});

/// `"ID: 123456"` -> `"123456"`.
pub fn parse_student_id(text: &str) -> Result<String> {
    STUDENT_ID_RE
        .captures(text.trim())
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| StudentVueError::parsing("home", format!("no student ID in {text:?}")))
}

/// `"mailto:jane@x.edu"` -> `"jane@x.edu"`. Anything after `?` (subject, cc) is dropped.
pub fn parse_email(href: &str) -> Option<String> {
    let href = href.trim();
    let address = href
        .get(..7)
        .filter(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
        .map(|_| &href[7..])?;
    let address = address.split('?').next().unwrap_or_default().trim();

    if address.is_empty() {
        None
    } else {
        Some(address.to_string())
    }
}

/// `"Room: B12"` -> `"B12"`.
pub fn parse_room(text: &str) -> Result<String> {
    ROOM_RE
        .captures(text.trim())
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| StudentVueError::parsing("gradebook", format!("no room in {text:?}")))
}

/// `"93.5%"` -> `93.5`.
pub fn parse_percentage(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    number.parse::<f64>().map_err(|_| {
        StudentVueError::parsing("gradebook", format!("mark {text:?} is not a percentage"))
    })
}

/// `"Photos/E123/ABCD-1234_Photo.PNG"` -> `"ABCD-1234"`.
pub fn parse_photo_guid(src: &str) -> Result<String> {
    PHOTO_GUID_RE
        .captures(src.trim())
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| StudentVueError::parsing("home", format!("no photo GUID in {src:?}")))
}
