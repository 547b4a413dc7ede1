mod analyzers;
mod config;
mod error;
mod git;
mod reporters;
mod roast;
mod sampling;
mod scoring;
mod types;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use config::{FileConfig, TzMode};
use error::RoastResult;
use git::numstat::SizeMap;
use git::LogOptions;
use types::{Filters, RepoInfo, Report};

const EXIT_USAGE: i32 = 2;
const EXIT_GIT_ERROR: i32 = 4;

/// Size data is sampled beyond this many commits unless --deep is given.
const SIZE_SAMPLE_LIMIT: usize = 500;
/// Histories smaller than this load fast enough that a spinner just flickers.
const SPINNER_COMMITS: usize = 2000;

#[derive(Parser, Debug)]
#[command(
    name = "git-roast",
    about = "🔥 Roast your git history: habit metrics, a score, and the worst offenders",
    version,
    long_about = "Reads the commit history of a local git repository, scores commit\n\
                  habits across four categories (messages, cadence, hygiene, size),\n\
                  ranks the worst offending commits, and serves the result with a\n\
                  side of roast commentary.\n\n\
                  Settings may also come from a .git-roast.yml file; CLI flags win."
)]
struct Args {
    /// Path to the repository (default: auto-detect from the working directory)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Only analyze commits since this date (YYYY-MM-DD)
    #[arg(long)]
    since: Option<String>,

    /// Only analyze commits until this date (YYYY-MM-DD)
    #[arg(long)]
    until: Option<String>,

    /// Only analyze commits whose author matches this pattern
    #[arg(long)]
    author: Option<String>,

    /// Output the full report as JSON
    #[arg(long)]
    json: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Roast intensity: 0 factual, 1-2 light, 3-4 savage, 5 nuclear
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=5))]
    intensity: Option<u8>,

    /// Encouragement instead of roasts
    #[arg(long)]
    wholesome: bool,

    /// Censor profanity in roast output
    #[arg(long)]
    censor: bool,

    /// Collect size data for every commit instead of a sample
    #[arg(long)]
    deep: bool,

    /// Limit analysis to the newest N commits (0 = no limit)
    #[arg(long)]
    max_commits: Option<usize>,

    /// Bucket times by each commit's recorded offset or the local zone
    #[arg(long, value_enum)]
    tz: Option<TzMode>,

    /// Include the scoring arithmetic in the report
    #[arg(long)]
    explain: bool,
}

/// Fully resolved run settings: CLI over config file over defaults.
#[derive(Debug, Clone, Default)]
struct Settings {
    path: Option<PathBuf>,
    since: String,
    until: String,
    author: String,
    json: bool,
    no_color: bool,
    intensity: u8,
    wholesome: bool,
    censor: bool,
    deep: bool,
    max_commits: usize,
    tz: TzMode,
    explain: bool,
}

fn resolve_settings(args: Args, file: FileConfig) -> Settings {
    Settings {
        since: args.since.or(file.since).unwrap_or_default(),
        until: args.until.or(file.until).unwrap_or_default(),
        author: args.author.or(file.author).unwrap_or_default(),
        json: args.json,
        no_color: args.no_color,
        intensity: args.intensity.or(file.intensity).unwrap_or(3),
        wholesome: args.wholesome || file.wholesome.unwrap_or(false),
        censor: args.censor || file.censor.unwrap_or(false),
        deep: args.deep || file.deep.unwrap_or(false),
        max_commits: args.max_commits.or(file.max_commits).unwrap_or(0),
        tz: args.tz.or(file.tz).unwrap_or_default(),
        explain: args.explain || file.explain.unwrap_or(false),
        path: args.path,
    }
}

fn main() {
    let args = Args::parse();

    let file = match config::load_file(args.path.as_deref()) {
        Ok(file) => file,
        Err(msg) => exit_with(EXIT_USAGE, &msg),
    };
    let settings = resolve_settings(args, file);
    if let Err(msg) = validate_settings(&settings) {
        exit_with(EXIT_USAGE, &msg);
    }

    if settings.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&settings) {
        exit_with(e.exit_code(), &e.to_string());
    }
}

fn validate_settings(settings: &Settings) -> Result<(), String> {
    if !settings.since.is_empty() {
        config::validate_date("since", &settings.since)?;
    }
    if !settings.until.is_empty() {
        config::validate_date("until", &settings.until)?;
    }
    Ok(())
}

// ─── Analysis pipeline ─────────────────────────────────────────────────────────

fn run(settings: &Settings) -> RoastResult<()> {
    git::ensure_git()?;

    let start = match &settings.path {
        Some(p) => p.clone(),
        None => std::env::current_dir()?,
    };
    let repo = git::find_repo_root(&start)?;
    if !git::is_git_repo(&repo) {
        return Err(error::RoastError::NotARepo);
    }

    let head = git::head_sha(&repo)?;
    let repo_name = repo
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repo")
        .to_string();

    let opts = LogOptions {
        since: settings.since.clone(),
        until: settings.until.clone(),
        author: settings.author.clone(),
        max_commits: settings.max_commits,
    };
    let commits = git::log_commits(&repo, &opts)?;
    let commit_count = commits.len();

    // Branch listing is best-effort: a repo without refs still gets a report.
    let branches = git::branches(&repo).unwrap_or_default();

    let spinner = (!settings.json && commit_count > SPINNER_COMMITS).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        pb.set_message(format!("Collecting size data for {commit_count} commits..."));
        pb
    });
    let sizes_result = load_sizes(&repo, &commits, settings, &opts);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let (sizes, sampled) = sizes_result?;

    let (mut metrics, offenders) = analyzers::aggregate::analyze(commits, &sizes, &branches, settings.tz);
    metrics.size.sampled = sampled;

    let score = scoring::score(&metrics);
    let seed = roast_seed(&head, commit_count, settings.wholesome);
    let roasts = roast::generate_roasts(
        &metrics,
        &score,
        settings.intensity,
        settings.wholesome,
        settings.censor,
        &seed,
    );

    let report = Report {
        repo: RepoInfo {
            path: repo.display().to_string(),
            name: repo_name,
            head,
            commit_count,
        },
        filters: Filters {
            since: settings.since.clone(),
            until: settings.until.clone(),
            author: settings.author.clone(),
            max_commits: settings.max_commits,
            tz: settings.tz.as_str().to_string(),
            deep: settings.deep,
        },
        score,
        metrics,
        offenders,
        roasts,
    };

    if settings.json {
        match reporters::json::render_json(&report) {
            Ok(text) => println!("{text}"),
            Err(msg) => exit_with(EXIT_GIT_ERROR, &msg),
        }
        return Ok(());
    }

    reporters::terminal::report_terminal(
        &report,
        &reporters::terminal::RenderOptions {
            explain: settings.explain,
        },
    );
    Ok(())
}

/// Either every commit (--deep) or a deterministic, evenly spaced sample of
/// at most 500, so size retrieval stays bounded on huge histories.
fn load_sizes(
    repo: &std::path::Path,
    commits: &[types::Commit],
    settings: &Settings,
    opts: &LogOptions,
) -> RoastResult<(SizeMap, bool)> {
    if commits.is_empty() {
        return Ok((SizeMap::new(), false));
    }
    if settings.deep {
        return Ok((git::numstat_for_log(repo, opts)?, false));
    }
    let count = commits.len();
    let sample = count.min(SIZE_SAMPLE_LIMIT);
    let shas: Vec<String> = sampling::sample_indices(count, sample)
        .into_iter()
        .map(|i| commits[i].sha.clone())
        .collect();
    let sizes = git::numstat_for_commits(repo, &shas)?;
    Ok((sizes, sample < count))
}

fn roast_seed(head: &str, commit_count: usize, wholesome: bool) -> String {
    format!("{head}-{commit_count}-{wholesome}")
}

fn exit_with(code: i32, message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(code);
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
