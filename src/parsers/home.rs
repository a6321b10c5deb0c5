use crate::error::{Result, StudentVueError};
use crate::models::SessionIdentity;
use crate::parsers::fields::{parse_photo_guid, parse_student_id};
use crate::parsers::{element_text, select_first};
use scraper::Html;

const PAGE: &str = "home";

/// Parses the post-login landing page into the session's identity.
pub fn parse_identity_from_html(html: &str, district_domain: &str) -> Result<SessionIdentity> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let student_id = parse_student_id(&element_text(select_first(PAGE, root, ".student-id")?))?;
    let name = element_text(select_first(PAGE, root, ".student-name")?);
    let school_name = element_text(select_first(PAGE, root, ".school")?);
    let school_phone = element_text(select_first(PAGE, root, ".phone")?);

    let photo_src = select_first(PAGE, root, "img[alt=\"Student Photo\"]")?
        .value()
        .attr("src")
        .map(|src| src.trim().trim_start_matches('/').to_string())
        .ok_or_else(|| StudentVueError::not_found(PAGE, "src of the student photo"))?;

    let photo_guid = parse_photo_guid(&photo_src)?;
    let photo_url = format!("https://{district_domain}/{photo_src}");

    Ok(SessionIdentity {
        district_domain: district_domain.to_string(),
        student_id,
        name,
        school_name,
        school_phone,
        photo_url,
        photo_guid,
    })
}
