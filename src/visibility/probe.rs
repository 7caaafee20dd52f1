use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SifterError};

/// Marker phrase shown in the profile notice region when an author has
/// hidden their topics from search.
const HIDDEN_MARKER: &str = "根据";

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Placeholder substituted with the username in the profile URL template.
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Raw outcome of probing a profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    NotFound,
    Found {
        display_name: String,
        searchable: bool,
    },
}

/// Fetches the visibility signal for one username. Implementations own the
/// transport and page parsing so tests can swap them out.
#[async_trait]
pub trait ProfileProbe: Send + Sync {
    async fn fetch(&self, username: &str) -> Result<ProbeOutcome>;
}

/// Probe backed by the forum's public profile page.
pub struct HttpProfileProbe {
    client: reqwest::Client,
    url_template: String,
}

impl HttpProfileProbe {
    pub fn new(url_template: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| SifterError::Internal(format!("probe client: {e}")))?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    fn profile_url(&self, username: &str) -> String {
        self.url_template.replace(USERNAME_PLACEHOLDER, username)
    }
}

#[async_trait]
impl ProfileProbe for HttpProfileProbe {
    async fn fetch(&self, username: &str) -> Result<ProbeOutcome> {
        let url = self.profile_url(username);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SifterError::ProbeFailed(format!("fetch {url}: {e}")))?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(ProbeOutcome::NotFound),
            reqwest::StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| SifterError::ProbeFailed(format!("read {url}: {e}")))?;
                Ok(parse_profile_page(&body))
            }
            status => {
                tracing::error!(%username, %status, "profile fetch returned abnormal status");
                Err(SifterError::ProbeFailed(format!(
                    "profile page status {status}"
                )))
            }
        }
    }
}

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<h1[^>]*>(.*?)</h1>").unwrap());
static NOTICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<td[^>]*class="[^"]*topic_content[^"]*"[^>]*>(.*?)</td>"#).unwrap()
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Extracts the structured visibility signal from a 200 profile page: the
/// display name comes from the first page heading, and the presence of the
/// marker phrase anywhere in the notice region means topics are hidden.
pub fn parse_profile_page(html: &str) -> ProbeOutcome {
    let display_name = HEADING_RE
        .captures(html)
        .map(|c| TAG_RE.replace_all(&c[1], "").trim().to_string())
        .unwrap_or_default();

    let notice: String = NOTICE_RE
        .captures_iter(html)
        .map(|c| TAG_RE.replace_all(&c[1], "").into_owned())
        .collect();
    let searchable = !(!notice.is_empty() && notice.contains(HIDDEN_MARKER));

    ProbeOutcome::Found {
        display_name,
        searchable,
    }
}
