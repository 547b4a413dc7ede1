use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::BTreeMap;

// ─── Core Git Data ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Commit {
    pub sha: String,
    pub author_name: String,
    pub author_email: String,
    /// Commit timestamp with the author's original UTC offset preserved.
    pub date: DateTime<FixedOffset>,
    pub subject: String,
    /// 0 parents = root commit, 1 = normal, 2+ = merge.
    pub parents: Vec<String>,
    /// Attached once after numstat retrieval; `None` when size data was not
    /// collected for this commit (sampling).
    pub size: Option<CommitSize>,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Per-commit change size. Invariant: `files >= binary_files`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSize {
    pub files: usize,
    pub added: usize,
    pub deleted: usize,
    pub binary_files: usize,
}

impl CommitSize {
    pub fn lines_changed(&self) -> usize {
        self.added + self.deleted
    }
}

// ─── Derived Per-Commit State ─────────────────────────────────────────────────

/// Classification of a single subject line. Recomputed per commit, never
/// stored apart from the commit it describes.
#[derive(Debug, Clone, Default)]
pub struct MessageInfo {
    pub generic: bool,
    pub generic_key: String,
    pub emoji_only: bool,
    pub too_long: bool,
    pub too_short: bool,
    /// 0-100 quality score, additive penalties clamped.
    pub score: i32,
}

#[derive(Debug, Clone, Default)]
pub struct CommitFlags {
    pub message: MessageInfo,
    pub low_quality: bool,
    pub lying: bool,
    pub panic: bool,
    pub oversized: bool,
    pub binary_heavy: bool,
    pub off_hours: bool,
    pub deadline: bool,
}

/// One record per commit with its derived flags embedded, so flags cannot
/// drift out of alignment with the commit sequence.
#[derive(Debug, Clone)]
pub struct AnalyzedCommit {
    pub commit: Commit,
    pub flags: CommitFlags,
}

// ─── Metrics ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageMetrics {
    pub total: usize,
    pub generic: usize,
    pub emoji_only: usize,
    pub too_long: usize,
    pub too_short: usize,
    pub lying: usize,
    pub panic: usize,
    pub low_quality: usize,
    pub average_length: f64,
    pub average_quality: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_generic_words: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeMetrics {
    pub commits_per_day_avg: f64,
    pub commits_per_week_avg: f64,
    pub unique_days: usize,
    pub unique_weeks: usize,
    pub midnight_ratio: f64,
    pub deadline_ratio: f64,
    pub longest_streak_days: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HygieneMetrics {
    pub merge_ratio: f64,
    pub linear_ratio: f64,
    pub branch_count: usize,
    pub bad_branch_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bad_branches: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SizeMetrics {
    pub sampled: bool,
    /// Number of commits that actually carry size data: the denominator for
    /// every size ratio.
    pub sample_size: usize,
    pub large_commit_count: usize,
    pub binary_commit_count: usize,
    pub average_lines: f64,
    pub max_lines: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Metrics {
    pub message: MessageMetrics,
    pub time: TimeMetrics,
    pub hygiene: HygieneMetrics,
    pub size: SizeMetrics,
}

// ─── Scoring ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreBreakdown {
    pub message_quality: i32,
    pub hygiene: i32,
    pub cadence: i32,
    pub size_discipline: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Score {
    pub overall: i32,
    pub breakdown: ScoreBreakdown,
    /// Human-readable formula per category. Descriptive only; never feeds
    /// back into the numbers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub explain: BTreeMap<String, String>,
}

// ─── Offenders ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Offender {
    pub sha: String,
    pub subject: String,
    pub date: String,
    pub reasons: Vec<String>,
    /// Severity used only for ranking, not part of the report contract.
    #[serde(skip)]
    pub score: i32,
}

// ─── Roasts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoastOutput {
    pub headline: String,
    pub sections: BTreeMap<String, String>,
    pub tips: Vec<String>,
}

// ─── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct RepoInfo {
    pub path: String,
    pub name: String,
    pub head: String,
    pub commit_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Filters {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub since: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub until: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub max_commits: usize,
    pub tz: String,
    pub deep: bool,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub repo: RepoInfo,
    pub filters: Filters,
    pub score: Score,
    pub metrics: Metrics,
    pub offenders: Vec<Offender>,
    pub roasts: RoastOutput,
}
