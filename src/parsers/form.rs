use crate::error::{Result, StudentVueError};
use crate::parsers::selector;
use scraper::{ElementRef, Html};
use serde::Serialize;

/// The fields of an HTML form in document order, one entry per control name.
///
/// Serializes as a sequence of `(name, value)` pairs, which is what
/// `application/x-www-form-urlencoded` bodies are built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    /// Sets `name` to `value`, replacing an existing entry in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(n, _)| n.as_str())
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Collects every named control inside `form`, hidden fields included.
///
/// Checkboxes and radio buttons only contribute when checked. Selects contribute
/// their selected option (or the first one), textareas their text. Submit
/// inputs are kept because ASP.NET pages expect the clicked button's name on
/// postback.
pub fn extract_fields(form: ElementRef<'_>) -> Result<FormFields> {
    let controls = selector("form", "input, select, textarea")?;
    let options = selector("form", "option")?;
    let mut fields = FormFields::default();

    for control in form.select(&controls) {
        let element = control.value();
        let Some(name) = element.attr("name") else {
            continue;
        };

        match element.name() {
            "input" => {
                let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "checkbox" | "radio" => {
                        if element.attr("checked").is_some() {
                            fields.set(name, element.attr("value").unwrap_or("on"));
                        }
                    }
                    "file" | "image" | "reset" | "button" => {}
                    _ => fields.set(name, element.attr("value").unwrap_or_default()),
                }
            }
            "select" => {
                let all: Vec<ElementRef<'_>> = control.select(&options).collect();
                let chosen = all
                    .iter()
                    .find(|o| o.value().attr("selected").is_some())
                    .or_else(|| all.first());
                let value = chosen
                    .map(|o| match o.value().attr("value") {
                        Some(value) => value.to_string(),
                        None => o.text().collect::<String>().trim().to_string(),
                    })
                    .unwrap_or_default();
                fields.set(name, value);
            }
            "textarea" => fields.set(name, control.text().collect::<String>()),
            _ => {}
        }
    }

    Ok(fields)
}

/// Finds the form with id `form_id` in a full page and extracts its fields.
pub fn extract_form(html: &str, form_id: &str) -> Result<FormFields> {
    let document = Html::parse_document(html);
    let form_selector = selector("form", &format!("#{form_id}"))?;

    let form = document
        .select(&form_selector)
        .next()
        .ok_or_else(|| StudentVueError::not_found("form", format!("form #{form_id}")))?;

    extract_fields(form)
}
