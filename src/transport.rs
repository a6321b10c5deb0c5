use crate::error::Result;
use crate::models::PortalConfig;
use crate::parsers::form::FormFields;
use async_trait::async_trait;
use reqwest::cookie::Jar;
use std::sync::Arc;

/// A fetched page: where the redirects ended up, and what was there.
#[derive(Debug, Clone)]
pub struct PortalResponse {
    /// The URL after following redirects.
    pub final_url: String,
    /// The HTTP status of the final response.
    pub status: u16,
    /// The response body as text.
    pub body: String,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP operations a portal session needs.
///
/// Implementations must follow redirects and keep cookies across calls, so that
/// every request made through one transport belongs to the same portal session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET a page.
    async fn get(&self, url: &str) -> Result<PortalResponse>;
    /// POST url-encoded form fields.
    async fn post_form(&self, url: &str, form: &FormFields) -> Result<PortalResponse>;
    /// GET a binary resource.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// `reqwest`-backed transport with its own cookie jar.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let cookie_jar = Arc::new(Jar::default());

        let mut builder = reqwest::Client::builder()
            .cookie_provider(cookie_jar)
            .user_agent(config.user_agent.as_str());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn into_portal_response(response: reqwest::Response) -> Result<PortalResponse> {
        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(PortalResponse {
            final_url,
            status,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<PortalResponse> {
        let response = self.client.get(url).send().await?;
        Self::into_portal_response(response).await
    }

    async fn post_form(&self, url: &str, form: &FormFields) -> Result<PortalResponse> {
        let response = self.client.post(url).form(form).send().await?;
        Self::into_portal_response(response).await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
