use std::collections::HashMap;

use crate::analyzers::{message, temporal};
use crate::config::TzMode;
use crate::git::numstat::SizeMap;
use crate::types::{
    AnalyzedCommit, Commit, CommitFlags, HygieneMetrics, Metrics, Offender, SizeMetrics,
};

const OVERSIZED_LINES: usize = 800;
const OVERSIZED_FILES: usize = 20;

const TOP_OFFENDERS: usize = 5;
const TOP_GENERIC_WORDS: usize = 3;

const BAD_BRANCH_NAMES: &[&str] = &[
    "test", "new", "asdf", "temp", "final", "final2", "wip", "tmp",
];

/// Folds the commit sequence into metrics and ranked offenders.
///
/// One pass attaches size data and message/size flags, the temporal analyzer
/// adds cadence flags over its own ascending view, then everything is counted.
/// Size ratios are computed over the commits that actually carry size data,
/// never the full commit count.
pub fn analyze(
    commits: Vec<Commit>,
    sizes: &SizeMap,
    branches: &[String],
    tz: TzMode,
) -> (Metrics, Vec<Offender>) {
    let mut metrics = Metrics::default();
    if commits.is_empty() {
        return (metrics, Vec::new());
    }
    let total = commits.len();

    let mut records: Vec<AnalyzedCommit> = Vec::with_capacity(total);
    let mut generic_counts: HashMap<String, usize> = HashMap::new();
    let mut length_total = 0usize;
    let mut quality_total = 0i64;
    let mut size_metrics = SizeMetrics::default();
    let mut size_line_total = 0usize;

    for mut commit in commits {
        if let Some(size) = sizes.get(&commit.sha) {
            commit.size = Some(*size);
        }

        let info = message::classify(&commit.subject);
        if info.generic {
            *generic_counts.entry(info.generic_key.clone()).or_default() += 1;
        }
        length_total += commit.subject.chars().count();
        quality_total += i64::from(info.score);

        let mut flags = CommitFlags {
            low_quality: info.generic || info.emoji_only || info.too_long || info.too_short,
            ..CommitFlags::default()
        };

        if let Some(size) = commit.size {
            let lines = size.lines_changed();
            size_line_total += lines;
            size_metrics.max_lines = size_metrics.max_lines.max(lines);
            if lines >= OVERSIZED_LINES || size.files >= OVERSIZED_FILES {
                size_metrics.large_commit_count += 1;
                flags.oversized = true;
            }
            if size.binary_files > 0 {
                size_metrics.binary_commit_count += 1;
                flags.binary_heavy = true;
            }
            size_metrics.sample_size += 1;
            if message::is_lying(&commit.subject, lines, size.files) {
                flags.lying = true;
            }
        }

        flags.message = info;
        records.push(AnalyzedCommit { commit, flags });
    }

    if size_metrics.sample_size > 0 {
        size_metrics.average_lines = size_line_total as f64 / size_metrics.sample_size as f64;
    }
    metrics.size = size_metrics;

    metrics.time = temporal::apply_time_flags(&mut records, tz);

    let msg = &mut metrics.message;
    msg.total = total;
    for r in &records {
        let f = &r.flags;
        msg.generic += usize::from(f.message.generic);
        msg.emoji_only += usize::from(f.message.emoji_only);
        msg.too_long += usize::from(f.message.too_long);
        msg.too_short += usize::from(f.message.too_short);
        msg.lying += usize::from(f.lying);
        msg.panic += usize::from(f.panic);
        msg.low_quality += usize::from(f.low_quality);
    }
    msg.average_length = length_total as f64 / total as f64;
    msg.average_quality = quality_total as f64 / total as f64;
    msg.top_generic_words = top_generic_words(generic_counts, TOP_GENERIC_WORDS);

    metrics.hygiene = hygiene_metrics(&records, branches);

    let offenders = build_offenders(&records);
    (metrics, offenders)
}

fn hygiene_metrics(records: &[AnalyzedCommit], branches: &[String]) -> HygieneMetrics {
    let total = records.len().max(1);
    let merge_count = records.iter().filter(|r| r.commit.is_merge()).count();
    let merge_ratio = merge_count as f64 / total as f64;
    let bad_branches = bad_branch_names(branches);
    HygieneMetrics {
        merge_ratio,
        linear_ratio: 1.0 - merge_ratio,
        branch_count: branches.len(),
        bad_branch_count: bad_branches.len(),
        bad_branches,
    }
}

/// A branch name is bad when it is on the throwaway list or too short to say
/// anything (<= 3 characters).
fn bad_branch_names(branches: &[String]) -> Vec<String> {
    branches
        .iter()
        .filter(|b| {
            let lower = b.to_lowercase();
            BAD_BRANCH_NAMES.contains(&lower.as_str()) || lower.chars().count() <= 3
        })
        .cloned()
        .collect()
}

fn top_generic_words(counts: HashMap<String, usize>, limit: usize) -> Vec<String> {
    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs.into_iter().take(limit).map(|(word, _)| word).collect()
}

// ─── Offender ranking ──────────────────────────────────────────────────────────

const WEIGHT_GENERIC: i32 = 8;
const WEIGHT_EMOJI_ONLY: i32 = 7;
const WEIGHT_TOO_LONG: i32 = 3;
const WEIGHT_TOO_SHORT: i32 = 3;
const WEIGHT_LYING: i32 = 9;
const WEIGHT_PANIC: i32 = 6;
const WEIGHT_OVERSIZED: i32 = 7;
const WEIGHT_BINARY: i32 = 5;
const WEIGHT_OFF_HOURS: i32 = 2;
const WEIGHT_DEADLINE: i32 = 2;

fn build_offenders(records: &[AnalyzedCommit]) -> Vec<Offender> {
    let mut candidates: Vec<(&AnalyzedCommit, i32, Vec<String>)> = Vec::new();
    for r in records {
        let mut reasons = Vec::new();
        let mut score = 0;
        let f = &r.flags;
        if f.message.generic {
            reasons.push("generic message".to_string());
            score += WEIGHT_GENERIC;
        }
        if f.message.emoji_only {
            reasons.push("emoji-only message".to_string());
            score += WEIGHT_EMOJI_ONLY;
        }
        if f.message.too_long {
            reasons.push("too long".to_string());
            score += WEIGHT_TOO_LONG;
        }
        if f.message.too_short {
            reasons.push("too short".to_string());
            score += WEIGHT_TOO_SHORT;
        }
        if f.lying {
            reasons.push("lying message".to_string());
            score += WEIGHT_LYING;
        }
        if f.panic {
            reasons.push("panic streak".to_string());
            score += WEIGHT_PANIC;
        }
        if f.oversized {
            reasons.push("huge commit".to_string());
            score += WEIGHT_OVERSIZED;
        }
        if f.binary_heavy {
            reasons.push("binary blobs".to_string());
            score += WEIGHT_BINARY;
        }
        if f.off_hours {
            reasons.push("midnight gremlin".to_string());
            score += WEIGHT_OFF_HOURS;
        }
        if f.deadline {
            reasons.push("deadline scramble".to_string());
            score += WEIGHT_DEADLINE;
        }
        if reasons.is_empty() {
            continue;
        }
        candidates.push((r, score, reasons));
    }

    candidates.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.0.commit.date.timestamp().cmp(&a.0.commit.date.timestamp()))
    });

    candidates
        .into_iter()
        .take(TOP_OFFENDERS)
        .map(|(r, score, reasons)| Offender {
            sha: r.commit.sha.clone(),
            subject: r.commit.subject.clone(),
            date: r.commit.date.to_rfc3339(),
            reasons,
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommitSize;
    use chrono::DateTime;

    fn commit(sha: &str, iso: &str, subject: &str, parents: &[&str]) -> Commit {
        Commit {
            sha: sha.to_string(),
            author_name: "Dev".to_string(),
            author_email: "dev@example.com".to_string(),
            date: DateTime::parse_from_rfc3339(iso).expect("test timestamp"),
            subject: subject.to_string(),
            parents: parents.iter().map(|s| s.to_string()).collect(),
            size: None,
        }
    }

    fn day_commit(sha: &str, day: u32, subject: &str) -> Commit {
        // Spread across days at noon so no panic window can form.
        commit(sha, &format!("2024-03-{day:02}T12:00:00+00:00"), subject, &["p"])
    }

    #[test]
    fn test_half_generic_history() {
        let good = "improve retry backoff handling in sync loop";
        let mut commits = Vec::new();
        for i in 0..5 {
            commits.push(day_commit(&format!("g{i}"), i + 1, "fix"));
        }
        for i in 0..5 {
            commits.push(day_commit(&format!("h{i}"), i + 10, good));
        }
        let (metrics, offenders) = analyze(commits, &SizeMap::new(), &[], TzMode::Commit);

        assert_eq!(metrics.message.total, 10);
        assert_eq!(metrics.message.generic, 5);
        assert_eq!(metrics.message.too_short, 5, "'fix' is also too short");
        assert_eq!(metrics.message.low_quality, 5);
        assert_eq!(metrics.message.panic, 0, "commits a day apart cannot panic");
        let expected_len = (5 * 3 + 5 * good.chars().count()) as f64 / 10.0;
        assert!((metrics.message.average_length - expected_len).abs() < 1e-9);
        assert_eq!(metrics.message.top_generic_words, vec!["fix".to_string()]);

        assert_eq!(metrics.size.sample_size, 0, "no size data was supplied");
        assert_eq!(metrics.size.average_lines, 0.0);

        assert_eq!(offenders.len(), 5, "only the generic five offend");
        for o in &offenders {
            assert_eq!(o.subject, "fix");
        }
    }

    #[test]
    fn test_half_generic_history_scores_below_ceiling() {
        let mut commits = Vec::new();
        for i in 0..5 {
            commits.push(day_commit(&format!("g{i}"), i + 1, "fix"));
        }
        for i in 0..5 {
            commits.push(day_commit(&format!("h{i}"), i + 10, "tighten numstat parsing edge cases"));
        }
        let (metrics, _) = analyze(commits, &SizeMap::new(), &[], TzMode::Commit);
        let score = crate::scoring::score(&metrics);
        // generic ratio 0.5*15 = 7.5 plus short ratio 0.5*5 = 2.5 -> penalty 10
        assert_eq!(score.breakdown.message_quality, 20);
        assert!(
            score.breakdown.message_quality <= 30 - 8,
            "the generic-ratio term alone costs 8 points"
        );
    }

    #[test]
    fn test_size_flags_and_denominator() {
        let commits = vec![
            day_commit("aaaa", 1, "minor api surface adjustments for v2"),
            day_commit("bbbb", 2, "add importer"),
            day_commit("cccc", 3, "no size data here"),
        ];
        let mut sizes = SizeMap::new();
        sizes.insert(
            "aaaa".to_string(),
            CommitSize { files: 12, added: 700, deleted: 150, binary_files: 0 },
        );
        sizes.insert(
            "bbbb".to_string(),
            CommitSize { files: 3, added: 40, deleted: 2, binary_files: 1 },
        );
        let (metrics, offenders) = analyze(commits, &sizes, &[], TzMode::Commit);

        assert_eq!(metrics.size.sample_size, 2, "only commits with data count");
        assert_eq!(metrics.size.large_commit_count, 1, "850 lines is oversized");
        assert_eq!(metrics.size.binary_commit_count, 1);
        assert_eq!(metrics.size.max_lines, 850);
        assert!((metrics.size.average_lines - (850 + 42) as f64 / 2.0).abs() < 1e-9);
        assert_eq!(metrics.message.lying, 1, "'minor' plus 850 lines is a lie");

        let top = &offenders[0];
        assert_eq!(top.sha, "aaaa", "lying + oversized outranks binary blobs");
        assert!(top.reasons.contains(&"lying message".to_string()));
        assert!(top.reasons.contains(&"huge commit".to_string()));
        assert_eq!(top.score, WEIGHT_LYING + WEIGHT_OVERSIZED);
    }

    #[test]
    fn test_oversized_by_file_count_alone() {
        let commits = vec![day_commit("aaaa", 1, "move things around")];
        let mut sizes = SizeMap::new();
        sizes.insert(
            "aaaa".to_string(),
            CommitSize { files: 20, added: 20, deleted: 0, binary_files: 0 },
        );
        let (metrics, _) = analyze(commits, &sizes, &[], TzMode::Commit);
        assert_eq!(metrics.size.large_commit_count, 1, "20 files is the threshold");
    }

    #[test]
    fn test_merge_ratio_and_bad_branches() {
        let commits = vec![
            day_commit("aaaa", 1, "write release notes for v2"),
            commit("bbbb", "2024-03-02T12:00:00+00:00", "merge develop into release", &["x", "y"]),
        ];
        let branches = vec![
            "main".to_string(),
            "wip".to_string(),
            "fx".to_string(),
            "feature/search-index".to_string(),
        ];
        let (metrics, _) = analyze(commits, &SizeMap::new(), &branches, TzMode::Commit);
        assert!((metrics.hygiene.merge_ratio - 0.5).abs() < 1e-9);
        assert!((metrics.hygiene.linear_ratio - 0.5).abs() < 1e-9);
        assert_eq!(metrics.hygiene.branch_count, 4);
        assert_eq!(
            metrics.hygiene.bad_branches,
            vec!["wip".to_string(), "fx".to_string()],
            "throwaway names and <=3 chars are bad"
        );
    }

    #[test]
    fn test_offender_cap_and_tie_break_by_recency() {
        let commits: Vec<Commit> = (0..7)
            .map(|i| day_commit(&format!("c{i}"), i + 1, "wip"))
            .collect();
        let (_, offenders) = analyze(commits, &SizeMap::new(), &[], TzMode::Commit);
        assert_eq!(offenders.len(), 5, "top list is capped");
        let shas: Vec<&str> = offenders.iter().map(|o| o.sha.as_str()).collect();
        assert_eq!(
            shas,
            vec!["c6", "c5", "c4", "c3", "c2"],
            "equal severity breaks ties toward the most recent"
        );
        for pair in offenders.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].date >= pair[1].date),
                "ordering violated between {} and {}",
                pair[0].sha,
                pair[1].sha
            );
        }
    }

    #[test]
    fn test_clean_history_has_no_offenders() {
        let commits = vec![
            day_commit("aaaa", 1, "add pagination to the audit log view"),
            day_commit("bbbb", 2, "handle expired tokens in the sync worker"),
        ];
        let (metrics, offenders) = analyze(commits, &SizeMap::new(), &[], TzMode::Commit);
        assert!(offenders.is_empty(), "nothing to rank in a clean history");
        assert_eq!(metrics.message.low_quality, 0);
        assert_eq!(metrics.message.average_quality, 100.0);
    }

    #[test]
    fn test_empty_input_yields_default_metrics() {
        let (metrics, offenders) = analyze(Vec::new(), &SizeMap::new(), &[], TzMode::Commit);
        assert_eq!(metrics.message.total, 0);
        assert!(offenders.is_empty());
    }

    #[test]
    fn test_panic_burst_counted_in_message_metrics() {
        let mut commits: Vec<Commit> = (0..4)
            .map(|i| {
                commit(
                    &format!("p{i}"),
                    &format!("2024-03-05T10:{:02}:00+00:00", i * 10),
                    "wip",
                    &["p"],
                )
            })
            .collect();
        commits.push(day_commit("calm", 20, "document the export pipeline"));
        let (metrics, offenders) = analyze(commits, &SizeMap::new(), &[], TzMode::Commit);
        assert_eq!(metrics.message.panic, 4, "the whole burst is flagged");
        assert!(
            offenders[0].reasons.contains(&"panic streak".to_string()),
            "panic membership feeds offender reasons"
        );
    }
}
