use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::types::MessageInfo;

static GENERIC_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "update", "updates", "fix", "fixed", "wip", "tmp", "temp", "stuff",
        "changes", "final", "asdf", "misc", "cleanup", "work", "progress",
        "test", "testing", "oops", "save", "minor", "quick", "hack", "tweak",
    ])
});

/// Words that promise a small change. Substring match, so "minor tweaks" and
/// "a quick one" both qualify.
const MINIMIZING_WORDS: &[&str] = &["minor", "small", "tiny", "quick", "little"];

const MAX_SUBJECT_CHARS: usize = 72;
const MIN_SUBJECT_CHARS: usize = 4;
/// A generic opener only condemns the whole subject when there is no room
/// left for real detail after it.
const GENERIC_PREFIX_LIMIT: usize = 20;

const LYING_LINES_THRESHOLD: usize = 400;
const LYING_FILES_THRESHOLD: usize = 10;

/// Classifies one subject line. Rules apply independently; a subject can be
/// generic, too short, and emoji-only all at once, and the penalties stack.
pub fn classify(subject: &str) -> MessageInfo {
    let trimmed = subject.trim();
    let lower = trimmed.to_lowercase();
    let char_count = trimmed.chars().count();

    let mut info = MessageInfo {
        emoji_only: is_emoji_only(trimmed),
        too_long: char_count > MAX_SUBJECT_CHARS,
        too_short: char_count <= MIN_SUBJECT_CHARS,
        ..MessageInfo::default()
    };

    if let Some(first) = lower.split_whitespace().next() {
        if GENERIC_WORDS.contains(first) && char_count <= GENERIC_PREFIX_LIMIT {
            info.generic = true;
            info.generic_key = first.to_string();
        }
        if GENERIC_WORDS.contains(lower.as_str()) {
            info.generic = true;
            info.generic_key = lower.clone();
        }
    }

    info.score = quality_score(&info);
    info
}

fn quality_score(info: &MessageInfo) -> i32 {
    let mut score = 100;
    if info.generic {
        score -= 40;
    }
    if info.too_short {
        score -= 20;
    }
    if info.too_long {
        score -= 10;
    }
    if info.emoji_only {
        score -= 30;
    }
    score.clamp(0, 100)
}

/// True when the subject claims a small change but the measured diff says
/// otherwise. Commits with no size signal at all can never lie: there is
/// nothing to contradict the claim.
pub fn is_lying(subject: &str, lines_changed: usize, files_changed: usize) -> bool {
    if lines_changed == 0 && files_changed == 0 {
        return false;
    }
    let lower = subject.to_lowercase();
    if !MINIMIZING_WORDS.iter().any(|w| lower.contains(w)) {
        return false;
    }
    lines_changed >= LYING_LINES_THRESHOLD || files_changed >= LYING_FILES_THRESHOLD
}

/// No letter, no digit in any script, at least one char beyond 7-bit ASCII,
/// and not blank.
fn is_emoji_only(trimmed: &str) -> bool {
    if trimmed.is_empty() {
        return false;
    }
    let mut has_non_ascii = false;
    for c in trimmed.chars() {
        if c.is_alphabetic() || c.is_numeric() {
            return false;
        }
        if !c.is_ascii() {
            has_non_ascii = true;
        }
    }
    has_non_ascii
}
