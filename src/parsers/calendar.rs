use crate::error::{Result, StudentVueError};
use crate::models::Assignment;
use crate::parsers::selector;
use regex::Regex;
use reqwest::Url;
use scraper::Html;
use std::sync::LazyLock;

const PAGE: &str = "calendar";

static SCORE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"- Score:.*").expect("valid score suffix regex"));

/// Parses the assignment links of a rendered calendar month.
pub fn parse_assignments_from_html(html: &str) -> Result<Vec<Assignment>> {
    let document = Html::parse_document(html);
    let links = selector(PAGE, "a[data-control=\"Gradebook_AssignmentDetails\"]")?;

    document
        .select(&links)
        .map(|link| {
            let text = link.text().collect::<String>();
            let href = link.value().attr("href").ok_or_else(|| {
                StudentVueError::not_found(PAGE, format!("href on assignment link {text:?}"))
            })?;
            parse_assignment(&text, href)
        })
        .collect()
}

/// Builds an assignment from a link's text (`"Math: Homework 3 - Score: 9/10"`) and href.
pub fn parse_assignment(text: &str, href: &str) -> Result<Assignment> {
    let (category, remainder) = text.split_once(':').ok_or_else(|| {
        StudentVueError::parsing(PAGE, format!("assignment link {text:?} has no category"))
    })?;
    let title = SCORE_SUFFIX_RE.replace(remainder, "").trim().to_string();

    let id = query_param(href, "DGU")?
        .trim()
        .parse::<i64>()
        .map_err(|e| StudentVueError::parsing(PAGE, format!("DGU in {href:?}: {e}")))?;
    let grading_period = query_param(href, "GP")?;

    Ok(Assignment {
        title,
        category: category.trim().to_string(),
        id,
        grading_period,
    })
}

fn query_param(href: &str, key: &str) -> Result<String> {
    // Links are relative to the portal, so resolve them against any absolute base.
    let base = Url::parse("https://portal.invalid/")
        .map_err(|e| StudentVueError::parsing(PAGE, e.to_string()))?;
    let url = base
        .join(href.trim())
        .map_err(|e| StudentVueError::parsing(PAGE, format!("bad link {href:?}: {e}")))?;

    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| {
            StudentVueError::parsing(PAGE, format!("no {key} parameter in {href:?}"))
        })
}
