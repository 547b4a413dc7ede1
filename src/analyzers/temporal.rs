use std::collections::BTreeSet;
use std::ops::Range;

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, Timelike};

use crate::config::TzMode;
use crate::types::{AnalyzedCommit, TimeMetrics};

const PANIC_WINDOW_SECS: i64 = 3600;
const PANIC_MIN_COMMITS: usize = 4;
const PANIC_MIN_LOW_QUALITY: usize = 3;

const OFF_HOURS_END: u32 = 5;

/// Computes cadence metrics over the whole sequence and writes the
/// off-hours, deadline, and panic flags back into each record.
///
/// The input arrives in whatever order the log source chose (newest-first,
/// usually); an ascending-time view is built here and never assumed.
/// `low_quality` flags must already be set: the panic detector reads them.
pub fn apply_time_flags(records: &mut [AnalyzedCommit], tz: TzMode) -> TimeMetrics {
    let mut metrics = TimeMetrics::default();
    let total = records.len();
    if total == 0 {
        return metrics;
    }

    // Stable sort keeps source order for identical timestamps.
    let mut order: Vec<usize> = (0..total).collect();
    order.sort_by_key(|&i| records[i].commit.date.timestamp());

    let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut weeks: BTreeSet<(i32, u32)> = BTreeSet::new();
    let mut midnight_count = 0usize;
    let mut deadline_count = 0usize;

    for &i in &order {
        let local = localize(&records[i].commit.date, tz);
        days.insert(local.date());
        let week = local.date().iso_week();
        weeks.insert((week.year(), week.week()));
        if local.hour() < OFF_HOURS_END {
            midnight_count += 1;
            records[i].flags.off_hours = true;
        }
        if is_deadline_time(&local) {
            deadline_count += 1;
            records[i].flags.deadline = true;
        }
    }

    metrics.unique_days = days.len();
    metrics.unique_weeks = weeks.len();
    metrics.commits_per_day_avg = total as f64 / metrics.unique_days.max(1) as f64;
    metrics.commits_per_week_avg = total as f64 / metrics.unique_weeks.max(1) as f64;
    metrics.midnight_ratio = midnight_count as f64 / total as f64;
    metrics.deadline_ratio = deadline_count as f64 / total as f64;
    metrics.longest_streak_days = longest_streak(&days);

    let times: Vec<i64> = order
        .iter()
        .map(|&i| records[i].commit.date.timestamp())
        .collect();
    let low: Vec<bool> = order.iter().map(|&i| records[i].flags.low_quality).collect();
    for span in panic_spans(&times, &low) {
        for pos in span {
            records[order[pos]].flags.panic = true;
        }
    }

    metrics
}

fn localize(date: &DateTime<FixedOffset>, tz: TzMode) -> NaiveDateTime {
    match tz {
        TzMode::Commit => date.naive_local(),
        TzMode::Local => date.with_timezone(&Local).naive_local(),
    }
}

/// Monday morning standup window and Friday afternoon rush.
fn is_deadline_time(t: &NaiveDateTime) -> bool {
    match t.weekday() {
        chrono::Weekday::Mon => (8..=11).contains(&t.hour()),
        chrono::Weekday::Fri => (15..=19).contains(&t.hour()),
        _ => false,
    }
}

/// Longest run of consecutive calendar days each holding at least one commit.
fn longest_streak(days: &BTreeSet<NaiveDate>) -> usize {
    let mut longest = 0usize;
    let mut current = 0usize;
    let mut prev: Option<NaiveDate> = None;
    for &day in days {
        current = match prev {
            Some(p) if p.succ_opt() == Some(day) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        prev = Some(day);
    }
    longest
}

/// Slides a one-hour window over the ascending-time sequence and returns the
/// merged half-open index spans where a dense burst (>= 4 commits) was mostly
/// low quality (>= 3). Candidate windows arrive with non-decreasing start, so
/// overlapping or adjacent spans merge on the fly and a long spree comes back
/// as one interval, not fragments.
pub fn panic_spans(times: &[i64], low_quality: &[bool]) -> Vec<Range<usize>> {
    debug_assert_eq!(times.len(), low_quality.len());
    let n = times.len();
    let mut prefix = vec![0usize; n + 1];
    for i in 0..n {
        prefix[i + 1] = prefix[i] + usize::from(low_quality[i]);
    }

    let mut spans: Vec<Range<usize>> = Vec::new();
    let mut start = 0usize;
    for end in 0..n {
        while times[end] - times[start] > PANIC_WINDOW_SECS {
            start += 1;
        }
        let window = end - start + 1;
        let low = prefix[end + 1] - prefix[start];
        if window >= PANIC_MIN_COMMITS && low >= PANIC_MIN_LOW_QUALITY {
            match spans.last_mut() {
                // `last.end` is exclusive, so `start <= last.end` covers both
                // overlap and off-by-one adjacency.
                Some(last) if start <= last.end => last.end = last.end.max(end + 1),
                _ => spans.push(start..end + 1),
            }
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Commit, CommitFlags};

    fn commit_at(iso: &str, low_quality: bool) -> AnalyzedCommit {
        AnalyzedCommit {
            commit: Commit {
                sha: "abcd".to_string(),
                author_name: "Dev".to_string(),
                author_email: "dev@example.com".to_string(),
                date: DateTime::parse_from_rfc3339(iso).expect("test timestamp"),
                subject: "change".to_string(),
                parents: vec!["p".to_string()],
                size: None,
            },
            flags: CommitFlags {
                low_quality,
                ..CommitFlags::default()
            },
        }
    }

    #[test]
    fn test_off_hours_window_is_midnight_to_five() {
        let mut records = vec![
            commit_at("2024-03-05T00:30:00+00:00", false),
            commit_at("2024-03-05T04:59:00+00:00", false),
            commit_at("2024-03-05T05:00:00+00:00", false),
            commit_at("2024-03-05T13:00:00+00:00", false),
        ];
        let metrics = apply_time_flags(&mut records, TzMode::Commit);
        assert!(records[0].flags.off_hours);
        assert!(records[1].flags.off_hours, "04:59 is still off-hours");
        assert!(!records[2].flags.off_hours, "05:00 is the boundary, exclusive");
        assert!((metrics.midnight_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_commit_mode_uses_recorded_offset() {
        // 03:00 at +03:00 is off-hours in the author's zone even though the
        // UTC instant is midnight-adjacent elsewhere.
        let mut records = vec![commit_at("2024-03-05T03:00:00+03:00", false)];
        apply_time_flags(&mut records, TzMode::Commit);
        assert!(records[0].flags.off_hours, "commit mode honors the author's clock");
    }

    #[test]
    fn test_deadline_windows() {
        let cases = [
            ("2024-03-04T08:00:00+00:00", true),  // Monday 08
            ("2024-03-04T11:59:00+00:00", true),  // Monday 11:59
            ("2024-03-04T12:00:00+00:00", false), // Monday noon
            ("2024-03-08T15:00:00+00:00", true),  // Friday 15
            ("2024-03-08T19:59:00+00:00", true),  // Friday 19:59
            ("2024-03-08T20:00:00+00:00", false), // Friday 20
            ("2024-03-09T16:00:00+00:00", false), // Saturday
        ];
        for (iso, expected) in cases {
            let mut records = vec![commit_at(iso, false)];
            apply_time_flags(&mut records, TzMode::Commit);
            assert_eq!(records[0].flags.deadline, expected, "case {iso}");
        }
    }

    #[test]
    fn test_bucket_counts_and_averages() {
        let mut records = vec![
            commit_at("2024-03-04T10:00:00+00:00", false),
            commit_at("2024-03-04T11:00:00+00:00", false),
            commit_at("2024-03-05T10:00:00+00:00", false),
            commit_at("2024-03-12T10:00:00+00:00", false),
        ];
        let metrics = apply_time_flags(&mut records, TzMode::Commit);
        assert_eq!(metrics.unique_days, 3);
        assert_eq!(metrics.unique_weeks, 2, "ISO weeks 10 and 11");
        assert!((metrics.commits_per_day_avg - 4.0 / 3.0).abs() < 1e-9);
        assert!((metrics.commits_per_week_avg - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_longest_streak_counts_consecutive_days() {
        let mut records = vec![
            commit_at("2024-03-01T10:00:00+00:00", false),
            commit_at("2024-03-02T10:00:00+00:00", false),
            commit_at("2024-03-02T18:00:00+00:00", false),
            commit_at("2024-03-03T10:00:00+00:00", false),
            commit_at("2024-03-07T10:00:00+00:00", false),
        ];
        let metrics = apply_time_flags(&mut records, TzMode::Commit);
        assert_eq!(metrics.longest_streak_days, 3, "1st-3rd is the longest run");
    }

    #[test]
    fn test_empty_input_degrades_to_zeroes() {
        let metrics = apply_time_flags(&mut [], TzMode::Commit);
        assert_eq!(metrics.unique_days, 0);
        assert_eq!(metrics.longest_streak_days, 0);
        assert_eq!(metrics.midnight_ratio, 0.0);
    }

    #[test]
    fn test_panic_flags_survive_newest_first_input() {
        // Source order is newest-first; the dense low-quality burst must be
        // found after re-sorting, and flags must land on the right records.
        let mut records = vec![
            commit_at("2024-03-05T12:00:00+00:00", false), // newest, calm
            commit_at("2024-03-05T09:30:00+00:00", false),
            commit_at("2024-03-05T09:20:00+00:00", true),
            commit_at("2024-03-05T09:10:00+00:00", true),
            commit_at("2024-03-05T09:00:00+00:00", true),
            commit_at("2024-03-04T09:00:00+00:00", false), // day before
        ];
        apply_time_flags(&mut records, TzMode::Commit);
        for i in 1..=4 {
            assert!(records[i].flags.panic, "burst member {i} must be flagged");
        }
        assert!(!records[0].flags.panic, "noon commit is outside the window");
        assert!(!records[5].flags.panic, "previous day is outside the window");
    }

    // ── panic_spans (pure interval arithmetic) ─────────────────────────────

    #[test]
    fn test_panic_spans_requires_four_commits() {
        let times = [0, 60, 120];
        let low = [true, true, true];
        assert!(panic_spans(&times, &low).is_empty(), "3 commits never qualify");
    }

    #[test]
    fn test_panic_spans_requires_three_low_quality() {
        let times = [0, 60, 120, 180];
        let low = [true, true, false, false];
        assert!(panic_spans(&times, &low).is_empty(), "2 low-quality is not enough");
    }

    #[test]
    fn test_panic_spans_window_bounded_by_one_hour() {
        // Same counts, but spread past an hour: no window holds 4 commits.
        let times = [0, 1300, 2600, 3900];
        let low = [true, true, true, true];
        assert!(panic_spans(&times, &low).is_empty());
        // Inclusive bound: exactly one hour end-to-end still qualifies.
        let tight = [0, 1200, 2400, 3600];
        assert_eq!(panic_spans(&tight, &low), vec![0..4]);
    }

    #[test]
    fn test_panic_spans_merges_overlapping_windows() {
        // Six low-quality commits ten minutes apart: many qualifying windows,
        // one merged span.
        let times: Vec<i64> = (0..6).map(|i| i * 600).collect();
        let low = vec![true; 6];
        assert_eq!(panic_spans(&times, &low), vec![0..6], "one spree, one span");
    }

    #[test]
    fn test_back_to_back_bursts_merge_despite_time_gap() {
        // Two bursts with no calm commit between them sit one position apart
        // in index space, which is adjacency; one span comes back.
        let mut times: Vec<i64> = (0..4).map(|i| i * 300).collect();
        times.extend((0..4).map(|i| 100_000 + i * 300));
        let low = vec![true; 8];
        assert_eq!(panic_spans(&times, &low), vec![0..8]);
    }

    #[test]
    fn test_panic_spans_invariants() {
        // Two bursts separated by a calm commit: spans stay apart, each >= 4
        // wide, separated by at least 2 positions.
        let mut times: Vec<i64> = (0..4).map(|i| i * 300).collect();
        times.push(50_000);
        times.extend((0..4).map(|i| 100_000 + i * 300));
        let mut low = vec![true; 4];
        low.push(false);
        low.extend(vec![true; 4]);
        let spans = panic_spans(&times, &low);
        assert_eq!(spans, vec![0..4, 5..9]);
        for span in &spans {
            assert!(span.len() >= PANIC_MIN_COMMITS, "span narrower than 4: {span:?}");
        }
        for pair in spans.windows(2) {
            assert!(
                pair[1].start > pair[0].end,
                "adjacent spans {pair:?} should have been merged"
            );
        }
    }
}
