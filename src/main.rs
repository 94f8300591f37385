mod config;
mod github;
mod milestone;
mod notes;
mod prompt;
mod report;
mod session;

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use session::{Outcome, Session};

/// Release Notes Extractor — collects the release notes of pull requests
/// labelled `release-note` in a chosen milestone of one or more repositories.
///
/// Repositories and the milestone are picked from interactive menus.
#[derive(Parser, Debug)]
#[command(name = "release-notes", version, about)]
struct Cli {
    /// GitHub API token. Takes precedence over GITHUB_TOKEN and the config file.
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(Outcome::InvalidSelection) => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "run aborted");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome, Box<dyn std::error::Error>> {
    info!("loading configuration");
    let config = config::Config::load()?;

    let token = config.github_token(cli.token.as_deref());
    match &token {
        Some(token) => println!(
            "Using GitHub token (last 4 chars: {})",
            config::mask_token(token)
        ),
        None => println!("Warning: No GitHub token found. Access to private repositories will fail."),
    }

    let repositories = config.repositories();
    debug!(api_url = config.api_url(), repositories = repositories.len(), "configured");

    let client = github::GitHubClient::new(config.api_url(), token);
    let session = Session::new(client, repositories);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();
    let outcome = session.run(&mut input, &mut out).await?;
    if let Some(summary) = outcome.skipped_summary() {
        writeln!(out, "{summary}")?;
    }
    out.flush()?;

    info!(?outcome, "done");
    Ok(outcome)
}
