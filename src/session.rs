use std::fmt;
use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::github::{ReleaseNoteSource, Repository};
use crate::milestone::{self, UnifiedMilestone};
use crate::prompt::{self, SelectionError};
use crate::report::{self, ReleaseNoteEntry};

const ALL_REPOSITORIES: &str = "All repositories";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Milestones,
    PullRequests,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::Milestones => write!(f, "milestones"),
            FetchStage::PullRequests => write!(f, "pull requests"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Console I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("No repositories configured")]
    NoRepositories,

    #[error("Failed to fetch {stage} from every selected repository")]
    AllFetchesFailed { stage: FetchStage },
}

/// How an interactive run ended, when it did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Release notes were printed. Repositories whose fetches failed were skipped.
    Completed {
        printed: usize,
        failed_repositories: Vec<Repository>,
    },
    /// The user entered something that was not a listed option.
    InvalidSelection,
    /// The selected repositories have no open milestones.
    NothingToSelect,
}

impl Outcome {
    /// One line naming the repositories skipped after fetch errors, if any.
    pub fn skipped_summary(&self) -> Option<String> {
        match self {
            Outcome::Completed {
                failed_repositories,
                ..
            } if !failed_repositories.is_empty() => {
                let names: Vec<String> =
                    failed_repositories.iter().map(Repository::full_name).collect();
                Some(format!(
                    "Results are incomplete; skipped after fetch errors: {}",
                    names.join(", ")
                ))
            }
            _ => None,
        }
    }
}

/// One interactive run: pick repositories, pick a milestone, print release notes.
///
/// Fetch failures are per repository: the failing repository is reported and
/// skipped, and the run only aborts when every selected repository failed.
pub struct Session<S> {
    source: S,
    repositories: Vec<Repository>,
}

impl<S: ReleaseNoteSource> Session<S> {
    pub fn new(source: S, repositories: Vec<Repository>) -> Self {
        Self {
            source,
            repositories,
        }
    }

    #[instrument(skip_all, fields(repositories = self.repositories.len()))]
    pub async fn run<R, W>(&self, input: &mut R, out: &mut W) -> Result<Outcome, SessionError>
    where
        R: BufRead,
        W: Write,
    {
        if self.repositories.is_empty() {
            return Err(SessionError::NoRepositories);
        }

        let Some((selected, label)) = self.choose_repositories(input, out)? else {
            return Ok(Outcome::InvalidSelection);
        };
        info!(selection = %label, "repositories selected");

        let mut failed_repositories = Vec::new();
        let milestones = self
            .collect_milestones(&selected, out, &mut failed_repositories)
            .await?;

        writeln!(out, "\nWorking with {label}")?;
        if milestones.is_empty() {
            writeln!(out, "No open milestones found.")?;
            return Ok(Outcome::NothingToSelect);
        }

        prompt::render_menu(out, "Available milestones:", &milestones)?;
        let Some(index) = choose(input, out, "Select a milestone (number): ", milestones.len())? else {
            return Ok(Outcome::InvalidSelection);
        };
        let chosen = &milestones[index];
        writeln!(out, "\nSelected milestone: {}\n", chosen.title)?;

        let entries = self
            .collect_entries(chosen, out, &mut failed_repositories)
            .await?;
        let found = entries.iter().filter(|e| e.note.is_found()).count();
        info!(prs = entries.len(), found, "release notes extracted");
        report::print_entries(out, &chosen.title, &entries)?;

        Ok(Outcome::Completed {
            printed: entries.len(),
            failed_repositories,
        })
    }

    /// Show the repository menu. `None` means the answer was not a listed option.
    fn choose_repositories<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        out: &mut W,
    ) -> Result<Option<(Vec<Repository>, String)>, SessionError> {
        let mut choices: Vec<String> = self.repositories.iter().map(Repository::full_name).collect();
        if self.repositories.len() > 1 {
            choices.push(ALL_REPOSITORIES.to_string());
        }

        prompt::render_menu(out, "Select a repository:", &choices)?;
        let prompt = format!("Select an option (1-{}): ", choices.len());
        let Some(index) = choose(input, out, &prompt, choices.len())? else {
            return Ok(None);
        };

        Ok(Some(match self.repositories.get(index) {
            Some(repo) => (vec![repo.clone()], repo.full_name()),
            None => (self.repositories.clone(), "all repositories".to_string()),
        }))
    }

    async fn collect_milestones<W: Write>(
        &self,
        selected: &[Repository],
        out: &mut W,
        failed: &mut Vec<Repository>,
    ) -> Result<Vec<UnifiedMilestone>, SessionError> {
        let mut sets = Vec::with_capacity(selected.len());
        for repo in selected {
            match self.source.fetch_milestones(repo).await {
                Ok(milestones) => {
                    debug!(repo = %repo, count = milestones.len(), "milestones fetched");
                    sets.push(milestones);
                }
                Err(err) => {
                    warn!(repo = %repo, error = %err, "skipping repository");
                    writeln!(out, "Error getting milestones from {repo}: {err}")?;
                    failed.push(repo.clone());
                }
            }
        }

        if sets.is_empty() {
            return Err(SessionError::AllFetchesFailed {
                stage: FetchStage::Milestones,
            });
        }
        Ok(milestone::unify(sets))
    }

    async fn collect_entries<W: Write>(
        &self,
        chosen: &UnifiedMilestone,
        out: &mut W,
        failed: &mut Vec<Repository>,
    ) -> Result<Vec<ReleaseNoteEntry>, SessionError> {
        let mut entries = Vec::new();
        let mut succeeded = 0;
        for member in &chosen.members {
            match self
                .source
                .fetch_release_note_prs(&member.origin, member.number)
                .await
            {
                Ok(prs) => {
                    debug!(repo = %member.origin, milestone = member.number, prs = prs.len(), "pull requests fetched");
                    entries.extend(prs.iter().map(ReleaseNoteEntry::from_pull_request));
                    succeeded += 1;
                }
                Err(err) => {
                    warn!(repo = %member.origin, error = %err, "skipping repository");
                    writeln!(out, "Error getting PRs from {}: {err}", member.origin)?;
                    failed.push(member.origin.clone());
                }
            }
        }

        if succeeded == 0 && !chosen.members.is_empty() {
            return Err(SessionError::AllFetchesFailed {
                stage: FetchStage::PullRequests,
            });
        }
        Ok(entries)
    }
}

/// Read a menu choice; an unusable answer is reported on `out` and becomes `None`.
fn choose<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    count: usize,
) -> Result<Option<usize>, SessionError> {
    match prompt::read_selection(input, out, prompt, count) {
        Ok(index) => Ok(Some(index)),
        Err(SelectionError::Io(err)) => Err(err.into()),
        Err(err) => {
            debug!(error = %err, "rejected selection");
            writeln!(out, "{err}")?;
            Ok(None)
        }
    }
}
