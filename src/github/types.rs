use serde::Deserialize;

/// A repository on GitHub, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// `owner/name`, as shown in menus and error messages.
    pub fn full_name(&self) -> String {
        self.to_string()
    }

    /// Path of the repository resource relative to the API base URL.
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// An open milestone of one repository.
/// Note: `number` is only unique within `origin`; titles may repeat across repositories.
#[derive(Debug, Clone, PartialEq)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
    pub description: Option<String>,
    /// Repository the milestone was fetched from
    pub origin: Repository,
}

/// A pull request carrying the `release-note` label.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// PR description; a null body from the API becomes an empty string
    pub body: String,
    /// Number of the attached milestone, if any
    pub milestone: Option<u64>,
    pub labels: Vec<String>,
    pub origin: Repository,
}

/// Milestone record as returned by `GET /repos/{owner}/{repo}/milestones`.
#[derive(Debug, Deserialize)]
pub(crate) struct MilestoneRecord {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl MilestoneRecord {
    pub fn into_milestone(self, origin: &Repository) -> Milestone {
        Milestone {
            number: self.number,
            title: self.title,
            description: self.description,
            origin: origin.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MilestoneRef {
    pub number: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelRecord {
    pub name: String,
}

/// Issue record as returned by `GET /repos/{owner}/{repo}/issues`.
/// The issues endpoint also lists pull requests; those carry a `pull_request` object.
#[derive(Debug, Deserialize)]
pub(crate) struct IssueRecord {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub milestone: Option<MilestoneRef>,
    #[serde(default)]
    pub labels: Vec<LabelRecord>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl IssueRecord {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Keep only genuine pull requests that have a milestone attached.
pub(crate) fn filter_release_note_prs(
    records: Vec<IssueRecord>,
    origin: &Repository,
) -> Vec<PullRequest> {
    records
        .into_iter()
        .filter(|record| record.is_pull_request())
        .filter_map(|record| {
            let milestone = record.milestone.as_ref()?.number;
            Some(PullRequest {
                number: record.number,
                title: record.title,
                body: record.body.unwrap_or_default(),
                milestone: Some(milestone),
                labels: record.labels.into_iter().map(|l| l.name).collect(),
                origin: origin.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Repository {
        Repository::new("org", "repo")
    }

    #[test]
    fn test_repository_names() {
        let repo = repo();
        assert_eq!(repo.full_name(), "org/repo");
        assert_eq!(repo.to_string(), "org/repo");
        assert_eq!(repo.api_path(), "/repos/org/repo");
    }

    #[test]
    fn test_decode_milestone_without_description() {
        let records: Vec<MilestoneRecord> =
            serde_json::from_str(r#"[{"number": 3, "title": "v9.1", "description": null}]"#).unwrap();
        let milestone = records.into_iter().next().unwrap().into_milestone(&repo());
        assert_eq!(milestone.number, 3);
        assert_eq!(milestone.title, "v9.1");
        assert!(milestone.description.is_none());
        assert_eq!(milestone.origin, repo());
    }

    #[test]
    fn test_filter_drops_issues_and_prs_without_milestone() {
        let json = r#"[
            {"number": 1, "title": "plain issue", "body": "x", "milestone": {"number": 5}, "labels": []},
            {"number": 2, "title": "pr without milestone", "body": "x", "milestone": null,
             "labels": [], "pull_request": {"url": "u"}},
            {"number": 3, "title": "keeper", "body": null, "milestone": {"number": 5},
             "labels": [{"name": "release-note"}], "pull_request": {"url": "u"}}
        ]"#;
        let records: Vec<IssueRecord> = serde_json::from_str(json).unwrap();
        let prs = filter_release_note_prs(records, &repo());
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].number, 3);
        assert_eq!(prs[0].body, "");
        assert_eq!(prs[0].milestone, Some(5));
        assert_eq!(prs[0].labels, vec!["release-note".to_string()]);
        assert_eq!(prs[0].origin, repo());
    }
}
