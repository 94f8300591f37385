use std::collections::HashMap;
use std::fmt;

use crate::github::{Milestone, Repository};

/// Same-titled milestones from one or more repositories, presented as a single choice.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedMilestone {
    /// Shared title; the grouping key
    pub title: String,
    /// Description of the first milestone seen with this title
    pub description: Option<String>,
    /// Every milestone with this title, in the order encountered
    pub members: Vec<Milestone>,
}

impl UnifiedMilestone {
    fn from_first(milestone: Milestone) -> Self {
        Self {
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            members: vec![milestone],
        }
    }

    /// Repositories contributing to this milestone.
    pub fn repositories(&self) -> Vec<&Repository> {
        self.members.iter().map(|m| &m.origin).collect()
    }
}

/// Menu label: the title, then the description and the contributing
/// repositories when there is more than one.
impl fmt::Display for UnifiedMilestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(description) = self.description.as_deref().map(str::trim) {
            if !description.is_empty() {
                write!(f, " - {description}")?;
            }
        }
        if self.members.len() > 1 {
            let repos: Vec<String> = self.repositories().iter().map(|r| r.full_name()).collect();
            write!(f, " [{}]", repos.join(", "))?;
        }
        Ok(())
    }
}

/// Merge per-repository milestone lists by title.
///
/// Sets are walked in the order given, each in its own order. The first
/// milestone seen with a title creates the entry (and fixes its description);
/// later ones are appended as members. Entries come out in first-occurrence order.
pub fn unify(sets: Vec<Vec<Milestone>>) -> Vec<UnifiedMilestone> {
    let mut unified: Vec<UnifiedMilestone> = Vec::new();
    let mut index_by_title: HashMap<String, usize> = HashMap::new();

    for milestone in sets.into_iter().flatten() {
        match index_by_title.get(&milestone.title) {
            Some(&index) => unified[index].members.push(milestone),
            None => {
                index_by_title.insert(milestone.title.clone(), unified.len());
                unified.push(UnifiedMilestone::from_first(milestone));
            }
        }
    }

    unified
}
