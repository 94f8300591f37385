pub mod types;

pub use types::{Milestone, PullRequest, Repository};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use types::{filter_release_note_prs, IssueRecord, MilestoneRecord};

const USER_AGENT: &str = "release-notes-extractor";
const ACCEPT: &str = "application/vnd.github.v3+json";
const RELEASE_NOTE_LABEL: &str = "release-note";

/// Maximum number of response-body bytes kept in a status error.
const ERROR_BODY_LIMIT: usize = 1024;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API responded with code: {status} for URL {url} - Response: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where milestones and labelled pull requests come from.
/// The session only talks to this trait, so it can run against a fake in tests.
#[async_trait]
pub trait ReleaseNoteSource: Send + Sync {
    /// Open milestones of `repo`, each tagged with `repo` as its origin.
    async fn fetch_milestones(&self, repo: &Repository) -> Result<Vec<Milestone>, GitHubError>;

    /// Pull requests labelled `release-note` in the given milestone of `repo`.
    /// Plain issues and entries without a milestone are filtered out.
    async fn fetch_release_note_prs(
        &self,
        repo: &Repository,
        milestone: u64,
    ) -> Result<Vec<PullRequest>, GitHubError>;
}

/// Thin reqwest client for the two GitHub REST endpoints this tool needs.
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// `token` is attached as a bearer token when present; without it requests
    /// are anonymous and private repositories will fail.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GitHubError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "received response");

        if !status.is_success() {
            return Err(GitHubError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body: truncate_body(&text).to_string(),
            });
        }

        serde_json::from_str(&text).map_err(|source| GitHubError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ReleaseNoteSource for GitHubClient {
    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn fetch_milestones(&self, repo: &Repository) -> Result<Vec<Milestone>, GitHubError> {
        let url = format!("{}{}/milestones?state=open", self.base_url, repo.api_path());
        let records: Vec<MilestoneRecord> = self.get_json(&url).await?;
        debug!(milestones = records.len(), "fetched milestones");
        Ok(records
            .into_iter()
            .map(|record| record.into_milestone(repo))
            .collect())
    }

    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn fetch_release_note_prs(
        &self,
        repo: &Repository,
        milestone: u64,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        let url = format!(
            "{}{}/issues?milestone={}&state=all&labels={}",
            self.base_url,
            repo.api_path(),
            milestone,
            RELEASE_NOTE_LABEL
        );
        let records: Vec<IssueRecord> = self.get_json(&url).await?;
        let fetched = records.len();
        let prs = filter_release_note_prs(records, repo);
        debug!(fetched, kept = prs.len(), "filtered labelled issues");
        Ok(prs)
    }
}

/// Cut `body` to at most ERROR_BODY_LIMIT bytes without splitting a character.
fn truncate_body(body: &str) -> &str {
    if body.len() <= ERROR_BODY_LIMIT {
        return body;
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
