use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Who is logged in, derived from the portal's landing page right after login.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionIdentity {
    /// The district portal as `host[/path]`, without scheme or trailing slash.
    pub district_domain: String,
    /// The numeric student ID shown on the landing page.
    pub student_id: String,
    /// The student's display name.
    pub name: String,
    /// The name of the student's school.
    pub school_name: String,
    /// The school's phone number as displayed.
    pub school_phone: String,
    /// Absolute URL of the student photo.
    pub photo_url: String,
    /// The GUID embedded in the photo filename.
    pub photo_guid: String,
}

/// A grading period of the current marking cycle (e.g., "Quarter 1").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GradingPeriod {
    /// Opaque portal token identifying the period.
    pub gu: String,
    /// Display name of the period.
    pub name: String,
}

/// A teacher or staff member as listed by the portal.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Teacher {
    /// Display name.
    pub name: String,
    /// Email address taken from a `mailto:` link, when the portal shows one.
    pub email: Option<String>,
}

impl Teacher {
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            name: name.into(),
            email,
        }
    }
}

/// One row of the gradebook.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Class {
    /// The period the class meets in.
    pub period: u32,
    /// The course title.
    pub title: String,
    /// The room identifier.
    pub room: String,
    /// The teacher of record.
    pub teacher: Teacher,
    /// The current mark as a percentage (e.g., `93.5`).
    pub mark: f64,
    /// All grading periods of the marking cycle this class belongs to.
    pub grading_periods: Vec<GradingPeriod>,
    /// The class group identifier from the row's `data-guid` attribute.
    pub class_group_id: i64,
    /// The school identifier. Taken from the first grading period of the page.
    pub school_id: i64,
    /// The organization-year token. Taken from the first grading period of the page.
    pub org_year_gu: String,
}

/// An assignment entry on the calendar.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Assignment title without the trailing score.
    pub title: String,
    /// The class or category label in front of the title.
    pub category: String,
    /// The assignment detail ID (`DGU` query parameter).
    pub id: i64,
    /// The grading period token (`GP` query parameter).
    pub grading_period: String,
}

/// The value of one labeled cell in an info table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum InfoValue {
    Text(String),
    Teacher(Teacher),
}

impl InfoValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InfoValue::Text(text) => Some(text),
            InfoValue::Teacher(_) => None,
        }
    }

    pub fn as_teacher(&self) -> Option<&Teacher> {
        match self {
            InfoValue::Teacher(teacher) => Some(teacher),
            InfoValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub label: String,
    pub value: InfoValue,
}

/// Label/value pairs of the student or school information page, in page order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct InfoRecord {
    entries: Vec<InfoEntry>,
}

impl InfoRecord {
    /// Adds an entry. A repeated label keeps its original position and takes the new value.
    pub fn insert(&mut self, label: String, value: InfoValue) {
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => entry.value = value,
            None => self.entries.push(InfoEntry { label, value }),
        }
    }

    pub fn get(&self, label: &str) -> Option<&InfoValue> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| &e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InfoEntry> {
        self.entries.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A calendar month, used to navigate the portal's assignment calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    /// Month of the year, 1 through 12.
    pub month: u32,
    /// The calendar year.
    pub year: i32,
}

impl CalendarMonth {
    /// Creates a `CalendarMonth`, rejecting months outside 1..=12.
    pub fn new(month: u32, year: i32) -> crate::error::Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(crate::error::StudentVueError::InvalidMonth(month));
        }
        Ok(Self { month, year })
    }

    /// The month containing today's date on the local clock, read at call time.
    pub fn current() -> Self {
        let today = Local::now();
        Self {
            month: today.month(),
            year: today.year(),
        }
    }

    /// Fills in whichever of `month`/`year` is missing from `current`.
    pub fn resolve(
        month: Option<u32>,
        year: Option<i32>,
        current: CalendarMonth,
    ) -> crate::error::Result<Self> {
        Self::new(
            month.unwrap_or(current.month),
            year.unwrap_or(current.year),
        )
    }

    /// The value the calendar's navigation field expects.
    ///
    /// `CalendarMonth { month: 3, year: 2024 }.navigation_value()` is `"3/1/2024"`.
    pub fn navigation_value(&self) -> String {
        format!("{}/1/{}", self.month, self.year)
    }
}

impl std::fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Transport settings for the HTTP client backing a session.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// The `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Total timeout per request. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Timeout for establishing a connection. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
}

impl Default for PortalConfig {
    /// Default configuration: desktop browser user agent, no timeouts.
    fn default() -> Self {
        Self {
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/100.0.0.0 Safari/537.36"
            )
            .to_string(),
            timeout: None,
            connect_timeout: None,
        }
    }
}

/// Login parameters for one portal account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub district_domain: String,
}

impl Credentials {
    pub const USERNAME_VAR: &'static str = "STUDENTVUE_USERNAME";
    pub const PASSWORD_VAR: &'static str = "STUDENTVUE_PASSWORD";
    pub const DOMAIN_VAR: &'static str = "STUDENTVUE_DOMAIN";

    /// Reads credentials from the environment, loading a `.env` file first if one exists.
    pub fn from_env() -> crate::error::Result<Self> {
        dotenvy::dotenv().ok();

        let var = |name: &'static str| {
            std::env::var(name).map_err(|_| crate::error::StudentVueError::MissingEnvVar(name))
        };

        Ok(Self {
            username: var(Self::USERNAME_VAR)?,
            password: var(Self::PASSWORD_VAR)?,
            district_domain: var(Self::DOMAIN_VAR)?,
        })
    }
}
