use crate::error::{Result, StudentVueError};
use crate::models::SessionIdentity;
use crate::parsers::form::{FormFields, extract_form};
use crate::parsers::home::parse_identity_from_html;
use crate::transport::{PortalResponse, Transport};
use reqwest::Url;

pub(crate) const LOGIN_PATH: &str = "PXP2_Login_Student.aspx?regenerateSessionId=True";
pub(crate) const HOME_PATH: &str = "Home_PXP2.aspx";
pub(crate) const FORM_ID: &str = "aspnetForm";

const LOGIN_PAGE_MARKER: &str = "PXP2_Login";
const USERNAME_FIELD: &str = "ctl00$MainContent$username";
const PASSWORD_FIELD: &str = "ctl00$MainContent$password";

/// Reduces whatever the caller typed to `host[/path]`.
///
/// Drops the scheme, query, fragment, trailing slashes and a default `:443`
/// port, and lowercases the host, so `"https://Portal.District.org:443/sv/?x=1"`
/// becomes `"portal.district.org/sv"`. Normalizing an already normalized domain
/// returns it unchanged.
pub fn normalize_domain(district_domain: &str) -> Result<String> {
    let mut rest = district_domain.trim();

    if let Some((scheme, after)) = rest.split_once("://")
        && !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
    {
        rest = after;
    }
    rest = rest.trim_start_matches('/');

    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let normalized = rest[..end].trim_end_matches('/');

    let (host, path) = match normalized.find('/') {
        Some(slash) => normalized.split_at(slash),
        None => (normalized, ""),
    };
    let host = host.strip_suffix(":443").unwrap_or(host).to_ascii_lowercase();

    if host.is_empty() {
        return Err(StudentVueError::InvalidDomain(district_domain.to_string()));
    }

    Ok(format!("{host}{path}"))
}

/// Compares two absolute URLs the way a browser would, so host case and an
/// explicit default port do not matter.
fn same_url(left: &str, right: &str) -> bool {
    match (Url::parse(left), Url::parse(right)) {
        (Ok(left), Ok(right)) => left == right,
        _ => left == right,
    }
}

/// One logged-in portal session.
///
/// Every request goes through the same transport, so the cookies set during
/// login carry over to all later requests.
pub struct PortalSession<T: Transport> {
    transport: T,
    identity: SessionIdentity,
}

impl<T: Transport> PortalSession<T> {
    /// Runs the login handshake and reads the student's identity off the landing page.
    pub async fn login(
        transport: T,
        username: &str,
        password: &str,
        district_domain: &str,
    ) -> Result<Self> {
        let domain = normalize_domain(district_domain)?;
        let login_url = format!("https://{domain}/{LOGIN_PATH}");

        // --- STEP 1: GET a fresh login page for its view-state fields ---
        log::debug!("Fetching login page {login_url}");
        let login_page = transport.get(&login_url).await?;
        if !login_page.is_success() {
            return Err(StudentVueError::AuthenticationFailed(format!(
                "login page returned HTTP {}",
                login_page.status
            )));
        }

        let mut form = extract_form(&login_page.body, FORM_ID).map_err(|_| {
            StudentVueError::AuthenticationFailed("login page has no login form".to_string())
        })?;
        form.set(USERNAME_FIELD, username);
        form.set(PASSWORD_FIELD, password);

        // --- STEP 2: POST the form back with the credentials filled in ---
        let response = transport.post_form(&login_url, &form).await?;

        // --- STEP 3: Only a redirect to the landing page means success ---
        let home_url = format!("https://{domain}/{HOME_PATH}");
        if !same_url(&response.final_url, &home_url) {
            log::info!(
                "Login for {username} on {domain} ended at {} (HTTP {})",
                response.final_url,
                response.status
            );
            return Err(StudentVueError::AuthenticationFailed(
                "invalid credentials".to_string(),
            ));
        }

        let identity = parse_identity_from_html(&response.body, &domain)?;
        log::info!("Logged in to {domain} as student {}", identity.student_id);

        Ok(Self {
            transport,
            identity,
        })
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "https://{}/{}",
            self.identity.district_domain,
            path.trim_start_matches('/')
        )
    }

    /// GET a portal page with the session's cookies.
    pub async fn authenticated_get(&mut self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        log::debug!("GET {url}");
        let response = self.transport.get(&url).await?;
        Self::ensure_authenticated(response)
    }

    /// POST a form to a portal page with the session's cookies.
    pub async fn authenticated_post(
        &mut self,
        path: &str,
        form: &FormFields,
    ) -> Result<String> {
        let url = self.url_for(path);
        log::debug!("POST {url} ({} fields)", form.len());
        let response = self.transport.post_form(&url, form).await?;
        Self::ensure_authenticated(response)
    }

    /// Download a binary resource (e.g. the student photo) with the session's cookies.
    pub async fn fetch_bytes(&mut self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {url} (binary)");
        self.transport.get_bytes(url).await
    }

    fn ensure_authenticated(response: PortalResponse) -> Result<String> {
        if response.final_url.contains(LOGIN_PAGE_MARKER) {
            log::warn!("Request was redirected to the login page: {}", response.final_url);
            return Err(StudentVueError::SessionExpired);
        }
        Ok(response.body)
    }
}
