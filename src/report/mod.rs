pub mod types;

pub use types::ReleaseNoteEntry;

use colored::Colorize;
use std::io::{self, Write};
use tracing::instrument;

use crate::notes::ExtractionResult;

pub const NO_PRS_MESSAGE: &str = "No PRs with 'release-note' label found in this milestone.";

/// Print the release notes gathered for a milestone.
///
/// PR #42: Add OAuth2 login flow
/// Release Note: Users can sign in with OAuth2.
///
/// The owning repository is appended to the PR line when the entries span
/// more than one repository.
#[instrument(skip(out, entries), fields(entries = entries.len()))]
pub fn print_entries<W: Write>(
    out: &mut W,
    milestone_title: &str,
    entries: &[ReleaseNoteEntry],
) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(out, "{NO_PRS_MESSAGE}")?;
        return Ok(());
    }

    let multi_repo = entries
        .iter()
        .any(|e| e.repository != entries[0].repository);

    writeln!(
        out,
        "PRs with release notes in milestone {}:",
        milestone_title.bold()
    )?;
    writeln!(out)?;

    for entry in entries {
        let heading = format!("PR #{}:", entry.number);
        if multi_repo {
            writeln!(
                out,
                "{} {} [{}]",
                heading.bold(),
                entry.title,
                entry.repository.full_name().dimmed()
            )?;
        } else {
            writeln!(out, "{} {}", heading.bold(), entry.title)?;
        }
        writeln!(out, "Release Note: {}", colorize_note(&entry.note))?;
        writeln!(out)?;
    }
    Ok(())
}

fn colorize_note(note: &ExtractionResult) -> colored::ColoredString {
    match note.text() {
        Some(text) => text.green(),
        None => note.to_string().yellow().dimmed(),
    }
}
