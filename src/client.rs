use crate::error::Result;
use crate::models::{
    Assignment, CalendarMonth, Class, Credentials, InfoRecord, PortalConfig, SessionIdentity,
};
use crate::parsers;
use crate::parsers::form::extract_form;
use crate::session::{FORM_ID, PortalSession};
use crate::transport::{HttpTransport, Transport};
use std::path::Path;

const GRADEBOOK_PATH: &str = "PXP2_Gradebook.aspx?AGU=0";
const CALENDAR_PATH: &str = "PXP2_Calendar.aspx?AGU=0";
const MY_ACCOUNT_PATH: &str = "PXP2_MyAccount.aspx?AGU=0";
const SCHOOL_INFO_PATH: &str = "PXP2_SchoolInformation.aspx?AGU=0";
const CALENDAR_NAVIGATION_FIELD: &str = "LB";

/// A logged-in StudentVue account.
///
/// Fetching methods take `&mut self`: the portal's view-state only tracks the
/// most recently served page, so requests on one session must not overlap.
pub struct StudentVueClient<T: Transport = HttpTransport> {
    session: PortalSession<T>,
}

impl StudentVueClient<HttpTransport> {
    /// Logs into the portal at `district_domain` with default transport settings.
    pub async fn login(username: &str, password: &str, district_domain: &str) -> Result<Self> {
        let config = PortalConfig::default();
        Self::login_with_config(username, password, district_domain, config).await
    }

    /// Logs in using a custom user agent or timeouts.
    pub async fn login_with_config(
        username: &str,
        password: &str,
        district_domain: &str,
        config: PortalConfig,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(transport, username, password, district_domain).await
    }

    /// Logs in with credentials read from the environment (see [`Credentials::from_env`]).
    pub async fn login_from_env() -> Result<Self> {
        let credentials = Credentials::from_env()?;
        Self::login(
            &credentials.username,
            &credentials.password,
            &credentials.district_domain,
        )
        .await
    }
}

impl<T: Transport> StudentVueClient<T> {
    /// Logs in over an arbitrary transport.
    pub async fn with_transport(
        transport: T,
        username: &str,
        password: &str,
        district_domain: &str,
    ) -> Result<Self> {
        let session =
            PortalSession::login(transport, username, password, district_domain).await?;
        Ok(Self { session })
    }

    pub fn identity(&self) -> &SessionIdentity {
        self.session.identity()
    }

    pub async fn get_classes(&mut self) -> Result<Vec<Class>> {
        let html_content = self.session.authenticated_get(GRADEBOOK_PATH).await?;
        let classes = parsers::classes::parse_classes_from_html(&html_content)?;
        log::info!("Parsed {} classes", classes.len());
        Ok(classes)
    }

    /// Assignments on the calendar for one month.
    ///
    /// A missing `month` or `year` is taken from today's date at the time of the
    /// call. Months other than the current one need one extra navigation POST.
    pub async fn get_assignments(
        &mut self,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<Assignment>> {
        let current = CalendarMonth::current();
        let requested = CalendarMonth::resolve(month, year, current)?;
        self.get_assignments_for(requested, current).await
    }

    async fn get_assignments_for(
        &mut self,
        requested: CalendarMonth,
        current: CalendarMonth,
    ) -> Result<Vec<Assignment>> {
        let mut html_content = self.session.authenticated_get(CALENDAR_PATH).await?;

        if requested != current {
            log::debug!("Navigating calendar from {current} to {requested}");
            let mut form = extract_form(&html_content, FORM_ID)?;
            form.set(CALENDAR_NAVIGATION_FIELD, requested.navigation_value());
            html_content = self.session.authenticated_post(CALENDAR_PATH, &form).await?;
        }

        let assignments = parsers::calendar::parse_assignments_from_html(&html_content)?;
        log::info!("Parsed {} assignments for {requested}", assignments.len());
        Ok(assignments)
    }

    pub async fn get_student_info(&mut self) -> Result<InfoRecord> {
        let html_content = self.session.authenticated_get(MY_ACCOUNT_PATH).await?;
        parsers::info::parse_student_info_from_html(&html_content)
    }

    pub async fn get_school_info(&mut self) -> Result<InfoRecord> {
        let html_content = self.session.authenticated_get(SCHOOL_INFO_PATH).await?;
        parsers::info::parse_school_info_from_html(&html_content)
    }

    /// Downloads the student photo.
    pub async fn get_photo(&mut self) -> Result<Vec<u8>> {
        let url = self.session.identity().photo_url.clone();
        self.session.fetch_bytes(&url).await
    }

    /// Downloads the student photo into `path`.
    pub async fn save_photo(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.get_photo().await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}
