use std::collections::BTreeMap;

use crate::types::{Metrics, Score, ScoreBreakdown};

const MESSAGE_CEILING: i32 = 30;
const HYGIENE_CEILING: i32 = 30;
const CADENCE_CEILING: i32 = 20;
const SIZE_CEILING: i32 = 20;

/// Converts aggregate metrics into the bounded composite score. Each category
/// is a linear penalty on ratios, rounded, subtracted from its ceiling and
/// clamped there, so the overall value is an exact sum in [0, 100].
pub fn score(metrics: &Metrics) -> Score {
    let msg = score_message(metrics);
    let hygiene = score_hygiene(metrics);
    let cadence = score_cadence(metrics);
    let size = score_size(metrics);
    let overall = msg + hygiene + cadence + size;
    Score {
        overall,
        breakdown: ScoreBreakdown {
            message_quality: msg,
            hygiene,
            cadence,
            size_discipline: size,
        },
        explain: explain(msg, hygiene, cadence, size, overall),
    }
}

fn score_message(metrics: &Metrics) -> i32 {
    let m = &metrics.message;
    if m.total == 0 {
        return MESSAGE_CEILING;
    }
    let total = m.total as f64;
    let penalty = m.generic as f64 / total * 15.0
        + m.emoji_only as f64 / total * 5.0
        + m.too_short as f64 / total * 5.0
        + m.too_long as f64 / total * 3.0
        + m.lying as f64 / total * 7.0
        + m.panic as f64 / total * 5.0;
    (MESSAGE_CEILING - penalty.round() as i32).clamp(0, MESSAGE_CEILING)
}

fn score_hygiene(metrics: &Metrics) -> i32 {
    let h = &metrics.hygiene;
    let mut penalty = 0.0;
    if h.merge_ratio > 0.4 {
        penalty += (h.merge_ratio - 0.4) / 0.6 * 6.0;
    }
    if h.branch_count > 0 {
        penalty += h.bad_branch_count as f64 / h.branch_count as f64 * 10.0;
    }
    (HYGIENE_CEILING - penalty.round() as i32).clamp(0, HYGIENE_CEILING)
}

fn score_cadence(metrics: &Metrics) -> i32 {
    let t = &metrics.time;
    let mut penalty = t.midnight_ratio * 8.0 + t.deadline_ratio * 5.0;
    if t.longest_streak_days > 14 {
        let over = (t.longest_streak_days - 14) as f64;
        penalty += (over / 7.0 * 5.0).min(5.0);
    }
    (CADENCE_CEILING - penalty.round() as i32).clamp(0, CADENCE_CEILING)
}

fn score_size(metrics: &Metrics) -> i32 {
    let s = &metrics.size;
    let mut penalty = 0.0;
    if s.sample_size > 0 {
        let sample = s.sample_size as f64;
        penalty += s.large_commit_count as f64 / sample * 10.0;
        penalty += s.binary_commit_count as f64 / sample * 5.0;
        if s.average_lines > 400.0 {
            penalty += ((s.average_lines - 400.0) / 400.0 * 5.0).min(5.0);
        }
    }
    (SIZE_CEILING - penalty.round() as i32).clamp(0, SIZE_CEILING)
}

fn explain(msg: i32, hygiene: i32, cadence: i32, size: i32, overall: i32) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "message_quality".to_string(),
            format!("30 - round(generic%*15 + emoji%*5 + short%*5 + long%*3 + lying%*7 + panic%*5) = {msg}"),
        ),
        (
            "hygiene".to_string(),
            format!("30 - round(mergePenalty + badBranchPenalty) = {hygiene}"),
        ),
        (
            "cadence".to_string(),
            format!("20 - round(midnight%*8 + deadline%*5 + streakPenalty) = {cadence}"),
        ),
        (
            "size_discipline".to_string(),
            format!("20 - round(large%*10 + binary%*5 + avgLinesPenalty) = {size}"),
        ),
        (
            "overall".to_string(),
            format!("message + hygiene + cadence + size = {overall}"),
        ),
    ])
}
