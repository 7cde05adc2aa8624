mod config;
mod error;
mod metadata;
mod patch;
mod pipeline;
mod publish;
mod render;
mod report;
mod source;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use config::Settings;
use metadata::RunMetadata;
use pipeline::Pipeline;
use report::ReportParser;
use source::claude::ClaudeClient;
use source::github::GithubClient;
use source::{BranchCompare, FetchedChangelog, ManualUrl, ReportSource, SavedReport};

#[derive(Parser)]
#[command(name = "risk_dashboard", about = "Weekly RC release-risk dashboard updater")]
struct Cli {
    /// Settings file (default: risk_dashboard.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// Report date, YYYY-MM-DD (default: today)
    #[arg(long, value_parser = metadata::parse_report_date)]
    date: Option<NaiveDate>,
    /// Update files but do not commit or push
    #[arg(long)]
    skip_git: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the two newest release branches and update the dashboard
    Run {
        /// Repository as owner/name
        #[arg(long)]
        repo: String,
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        claude_token: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Use a compare URL given by hand; the report service browses it
    Manual {
        #[arg(long)]
        compare_url: String,
        /// Release version (default: taken from the URL)
        #[arg(long)]
        version: Option<String>,
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        claude_token: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Fetch the changelog from GitHub and send it with the prompt
    Fetch {
        #[arg(long)]
        compare_url: String,
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: String,
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        claude_token: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Apply report text saved earlier, without calling any service
    Apply {
        #[arg(long)]
        report: PathBuf,
        #[arg(long)]
        version: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print the parsed form of a report text file as JSON
    Parse {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    let result = match cli.command {
        Commands::Run {
            repo,
            github_token,
            claude_token,
            run,
        } => {
            let source = BranchCompare {
                github: GithubClient::new(&settings, github_token)?,
                claude: ClaudeClient::new(&settings, claude_token)?,
                repo,
            };
            execute(&settings, source, run).await
        }
        Commands::Manual {
            compare_url,
            version,
            claude_token,
            run,
        } => {
            let source = ManualUrl {
                claude: ClaudeClient::new(&settings, claude_token)?,
                compare_url,
                version,
            };
            execute(&settings, source, run).await
        }
        Commands::Fetch {
            compare_url,
            github_token,
            claude_token,
            run,
        } => {
            let source = FetchedChangelog {
                github: GithubClient::new(&settings, Some(github_token))?,
                claude: ClaudeClient::new(&settings, claude_token)?,
                compare_url,
                file_limit: settings.changelog_file_limit,
            };
            execute(&settings, source, run).await
        }
        Commands::Apply {
            report,
            version,
            run,
        } => {
            let source = SavedReport {
                path: report,
                version,
            };
            execute(&settings, source, run).await
        }
        Commands::Parse { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let report = ReportParser::new(&settings.other_changes_headers)?.parse(&text);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Produce the report text, patch both documents, then publish or print
/// review hints.
async fn execute<S: ReportSource>(settings: &Settings, source: S, run: RunArgs) -> anyhow::Result<()> {
    let started = Local::now().naive_local();

    println!("Step 1: report from {}", source.describe());
    let t_source = Instant::now();
    let sourced = source.produce().await.context("Failed to produce report text")?;
    println!(
        "Received {} characters in {}",
        sourced.text.len(),
        format_duration(t_source.elapsed())
    );

    let meta = RunMetadata::at(sourced.version, run.date, started);
    println!(
        "\nStep 2: updating documents for {} {} (report {})",
        settings.release_label, meta.version, meta.report_date
    );
    let summary = Pipeline::new(settings)?.run(&sourced.text, &meta)?;
    summary.print();

    let paths = summary.written_paths();
    let message = publish::commit_message(&meta.week_of, &settings.release_label, &meta.version);
    if run.skip_git {
        println!("\nFiles updated, not committed. Review and publish with:");
        for hint in publish::review_hints(&paths, &message) {
            println!("  {hint}");
        }
    } else {
        println!("\nStep 3: committing and pushing...");
        publish::publish(Path::new("."), &paths, &message)?;
        println!("Pushed.");
    }

    if !settings.dashboard_url.is_empty() {
        println!("\nDashboard: {}", settings.dashboard_url);
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
