pub mod calendar;
pub mod classes;
pub mod fields;
pub mod form;
pub mod home;
pub mod info;

use crate::error::{Result, StudentVueError};
use scraper::node::Node;
use scraper::{ElementRef, Selector};

/// Parses a CSS selector, reporting a bad selector as a parse failure of `page`.
pub(crate) fn selector(page: &'static str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| {
        StudentVueError::parsing(page, format!("invalid CSS selector '{css}': {e}"))
    })
}

/// First descendant of `scope` matching `css`, or `ElementNotFound`.
pub(crate) fn select_first<'a>(
    page: &'static str,
    scope: ElementRef<'a>,
    css: &str,
) -> Result<ElementRef<'a>> {
    let sel = selector(page, css)?;
    scope
        .select(&sel)
        .next()
        .ok_or_else(|| StudentVueError::not_found(page, format!("element matching '{css}'")))
}

/// All text of an element, trimmed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed, non-empty text nodes under `element`, skipping the subtree of `skip`.
pub(crate) fn text_lines_excluding(
    element: ElementRef<'_>,
    skip: Option<ElementRef<'_>>,
) -> Vec<String> {
    let mut lines = Vec::new();
    collect_text(element, skip, &mut lines);
    lines
}

fn collect_text(
    element: ElementRef<'_>,
    skip: Option<ElementRef<'_>>,
    lines: &mut Vec<String>,
) {
    for child in element.children() {
        if skip.is_some_and(|s| s.id() == child.id()) {
            continue;
        }
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, skip, lines);
                }
            }
            _ => {}
        }
    }
}
