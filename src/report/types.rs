use crate::github::{PullRequest, Repository};
use crate::notes::{self, ExtractionResult};

/// One line item of the output: a labelled PR and what was found in its body.
#[derive(Debug, Clone)]
pub struct ReleaseNoteEntry {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Repository the PR belongs to
    pub repository: Repository,
    /// Extracted note, or NotFound
    pub note: ExtractionResult,
}

impl ReleaseNoteEntry {
    /// Run the extractor over the PR body.
    pub fn from_pull_request(pr: &PullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title.clone(),
            repository: pr.origin.clone(),
            note: notes::extract(&pr.body),
        }
    }
}
