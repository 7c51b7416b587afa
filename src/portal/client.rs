//! HTTP transport to the course search portal.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::{debug, trace};
use url::Url;

use crate::config::Config;
use crate::portal::errors::PortalError;
use crate::portal::search::SearchForm;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Request/response exchange with the portal.
///
/// Both calls return the raw HTML body; parsing is left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET the search landing page for a term (carries the subject selector).
    async fn fetch_subject_page(&self, term_code: &str) -> Result<String, PortalError>;

    /// POST a search and return the results page.
    async fn submit_search(&self, form: &SearchForm) -> Result<String, PortalError>;
}

/// [`Transport`] over `reqwest`.
pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    pub fn from_config(config: &Config) -> Result<Self, PortalError> {
        let base_url = Url::parse(&config.portal_url)?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .cookie_store(true)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(PortalError::ClientBuild)?;

        Ok(Self { http, base_url })
    }

    fn subject_page_url(&self, term_code: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("term_code", term_code);
        url
    }

    fn search_url(&self) -> Result<Url, PortalError> {
        Ok(self.base_url.join("search/")?)
    }

    async fn read_body(response: reqwest::Response, url: &Url) -> Result<String, PortalError> {
        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::BadStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| PortalError::RequestFailed {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl Transport for PortalClient {
    async fn fetch_subject_page(&self, term_code: &str) -> Result<String, PortalError> {
        let url = self.subject_page_url(term_code);
        debug!(url = url.as_str(), "Fetching subject page");

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await
            .map_err(|source| PortalError::RequestFailed {
                url: url.to_string(),
                source,
            })?;

        Self::read_body(response, &url).await
    }

    async fn submit_search(&self, form: &SearchForm) -> Result<String, PortalError> {
        let url = self.search_url()?;
        let params = form.to_params();
        trace!(
            url = url.as_str(),
            subjects = ?form.subjects,
            "Submitting course search"
        );

        let response = self
            .http
            .post(url.clone())
            .header(ACCEPT, HTML_ACCEPT)
            .form(&params)
            .send()
            .await
            .map_err(|source| PortalError::RequestFailed {
                url: url.to_string(),
                source,
            })?;

        Self::read_body(response, &url).await
    }
}
