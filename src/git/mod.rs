pub mod log_parser;
pub mod numstat;
pub mod record;

use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::error::{RoastError, RoastResult};
use crate::types::Commit;

use numstat::SizeMap;

/// `git show` argument lists are chunked to keep argv bounded on huge repos.
const NUMSTAT_BATCH: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub since: String,
    pub until: String,
    pub author: String,
    pub max_commits: usize,
}

impl LogOptions {
    fn push_filters(&self, args: &mut Vec<String>) {
        if !self.since.is_empty() {
            args.push("--since".into());
            args.push(self.since.clone());
        }
        if !self.until.is_empty() {
            args.push("--until".into());
            args.push(self.until.clone());
        }
        if !self.author.is_empty() {
            args.push("--author".into());
            args.push(self.author.clone());
        }
        if self.max_commits > 0 {
            args.push("-n".into());
            args.push(self.max_commits.to_string());
        }
    }
}

// ─── Repo discovery ────────────────────────────────────────────────────────────

/// Walks up from `start` until a directory containing `.git` is found.
pub fn find_repo_root(start: &Path) -> RoastResult<PathBuf> {
    let mut dir = start
        .canonicalize()
        .map_err(|_| RoastError::NotARepo)?;
    loop {
        if dir.join(".git").exists() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(RoastError::NotARepo);
        }
    }
}

pub fn ensure_git() -> RoastResult<()> {
    match Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => Ok(()),
        Err(_) => Err(RoastError::GitMissing),
    }
}

pub fn is_git_repo(repo: &Path) -> bool {
    run_git(repo, &["rev-parse", "--is-inside-work-tree"])
        .map(|out| out.trim() == "true")
        .unwrap_or(false)
}

pub fn head_sha(repo: &Path) -> RoastResult<String> {
    Ok(run_git(repo, &["rev-parse", "HEAD"])?.trim().to_string())
}

/// Local branch names, one per line from for-each-ref.
pub fn branches(repo: &Path) -> RoastResult<Vec<String>> {
    let out = run_git(
        repo,
        &["for-each-ref", "refs/heads", "--format=%(refname:short)"],
    )?;
    Ok(out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

// ─── Log and numstat retrieval ─────────────────────────────────────────────────

/// Streams `git log` through the record parser and returns commits in git's
/// traversal order.
pub fn log_commits(repo: &Path, opts: &LogOptions) -> RoastResult<Vec<Commit>> {
    let mut args: Vec<String> = vec![
        "log".into(),
        "--date=iso-strict".into(),
        "--pretty=format:%H%x1f%an%x1f%ae%x1f%ad%x1f%s%x1f%P%x1e".into(),
    ];
    opts.push_filters(&mut args);
    stream_git(repo, args, log_parser::parse_log)
}

/// Numstat for an explicit sha list, chunked and merged additively.
pub fn numstat_for_commits(repo: &Path, shas: &[String]) -> RoastResult<SizeMap> {
    let mut sizes = SizeMap::new();
    for chunk in shas.chunks(NUMSTAT_BATCH) {
        let mut args: Vec<String> = vec![
            "show".into(),
            "--numstat".into(),
            "--format=%H%x1f".into(),
        ];
        args.extend(chunk.iter().cloned());
        let batch = stream_git(repo, args, numstat::parse_numstat)?;
        numstat::merge_sizes(&mut sizes, batch);
    }
    Ok(sizes)
}

/// Numstat for the whole filtered log (`--deep` mode).
pub fn numstat_for_log(repo: &Path, opts: &LogOptions) -> RoastResult<SizeMap> {
    let mut args: Vec<String> = vec![
        "log".into(),
        "--numstat".into(),
        "--pretty=format:%H%x1f".into(),
    ];
    opts.push_filters(&mut args);
    stream_git(repo, args, numstat::parse_numstat)
}

// ─── Subprocess plumbing ───────────────────────────────────────────────────────

/// Spawns git and hands its stdout to `parse` as a buffered stream, so a
/// whole-repo log is never held in memory as one string. The child is always
/// reaped; a nonzero exit wins over a parse error because git's stderr is the
/// more useful diagnosis.
fn stream_git<T>(
    repo: &Path,
    args: Vec<String>,
    parse: impl FnOnce(BufReader<std::process::ChildStdout>) -> RoastResult<T>,
) -> RoastResult<T> {
    let mut child = spawn_git(repo, &args)?;
    let stdout = child.stdout.take().expect("stdout piped");
    let parsed = parse(BufReader::new(stdout));
    finish(child, &args)?;
    parsed
}

fn spawn_git(repo: &Path, args: &[String]) -> RoastResult<Child> {
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RoastError::GitMissing
            } else {
                RoastError::Io(e)
            }
        })
}

fn finish(mut child: Child, args: &[String]) -> RoastResult<()> {
    let mut stderr_text = String::new();
    if let Some(mut stderr) = child.stderr.take() {
        stderr.read_to_string(&mut stderr_text).ok();
    }
    let status = child.wait()?;
    if !status.success() {
        return Err(git_failure(args, stderr_text.trim()));
    }
    Ok(())
}

fn run_git(repo: &Path, args: &[&str]) -> RoastResult<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RoastError::GitMissing
            } else {
                RoastError::Io(e)
            }
        })?;
    if !output.status.success() {
        let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        return Err(git_failure(
            &owned,
            String::from_utf8_lossy(&output.stderr).trim(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn git_failure(args: &[String], stderr: &str) -> RoastError {
    let command = args.first().cloned().unwrap_or_default();
    let detail = if stderr.is_empty() {
        "exited with failure".to_string()
    } else {
        stderr.to_string()
    };
    if detail.to_lowercase().contains("not a git repository") {
        return RoastError::NotARepo;
    }
    RoastError::GitCommand { command, detail }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_repo_root_walks_up() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().join("repo");
        let nested = root.join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir(root.join(".git")).unwrap();
        let found = find_repo_root(&nested).expect("should find the repo root");
        assert_eq!(found, root.canonicalize().unwrap());
    }

    #[test]
    fn test_find_repo_root_fails_outside_repo() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let plain = tmp.path().join("plain");
        std::fs::create_dir_all(&plain).unwrap();
        let err = find_repo_root(&plain).expect_err("no .git anywhere above tempdir");
        assert!(matches!(err, RoastError::NotARepo), "got {err:?}");
    }

    #[test]
    fn test_log_options_filters_in_order() {
        let opts = LogOptions {
            since: "2024-01-01".into(),
            until: "2024-12-31".into(),
            author: "ada".into(),
            max_commits: 50,
        };
        let mut args = Vec::new();
        opts.push_filters(&mut args);
        assert_eq!(
            args,
            vec!["--since", "2024-01-01", "--until", "2024-12-31", "--author", "ada", "-n", "50"]
        );
    }

    #[test]
    fn test_log_options_empty_adds_nothing() {
        let mut args = Vec::new();
        LogOptions::default().push_filters(&mut args);
        assert!(args.is_empty(), "no filters means no extra argv");
    }

    #[test]
    fn test_git_failure_detects_not_a_repo() {
        let err = git_failure(
            &["log".to_string()],
            "fatal: not a git repository (or any of the parent directories): .git",
        );
        assert!(matches!(err, RoastError::NotARepo));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_git_failure_keeps_stderr_verbatim() {
        let err = git_failure(&["show".to_string()], "fatal: bad object abc123");
        match err {
            RoastError::GitCommand { command, detail } => {
                assert_eq!(command, "show");
                assert_eq!(detail, "fatal: bad object abc123");
            }
            other => panic!("expected GitCommand, got {other:?}"),
        }
    }
}
