use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Metrics, RoastOutput, Score};

/// Produces the headline, per-category commentary, and tips. Everything here
/// is pass-through text for the report; none of it feeds back into metrics
/// or scoring.
pub fn generate_roasts(
    metrics: &Metrics,
    score: &Score,
    intensity: u8,
    wholesome: bool,
    censor: bool,
    seed: &str,
) -> RoastOutput {
    let level = intensity.min(5);
    let mut headline = choose_headline(score.overall, level, wholesome, seed).to_string();
    let mut sections = BTreeMap::from([
        ("commit_messages".to_string(), section_messages(metrics, level, wholesome).to_string()),
        ("time_cadence".to_string(), section_time(metrics, level, wholesome).to_string()),
        ("repo_hygiene".to_string(), section_hygiene(metrics, level, wholesome).to_string()),
        ("chunkiness".to_string(), section_chunkiness(metrics, level, wholesome).to_string()),
    ]);
    let mut tips = build_tips(metrics, wholesome);

    if censor {
        headline = censor_text(&headline);
        for text in sections.values_mut() {
            *text = censor_text(text);
        }
        for tip in &mut tips {
            *tip = censor_text(tip);
        }
    }

    RoastOutput { headline, sections, tips }
}

// ─── Deterministic choice ──────────────────────────────────────────────────────

/// Stable FNV-1a so the same repo state always roasts the same way. The
/// std hasher is explicitly not stable across releases, which would break
/// run-to-run reproducibility.
fn fnv1a32(s: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for b in s.bytes() {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Picks one option by hashing the seed. Reproducible per (seed, options),
/// not random.
pub fn deterministic_choice<'a>(seed: &str, options: &[&'a str]) -> &'a str {
    if options.is_empty() {
        return "";
    }
    options[fnv1a32(seed) as usize % options.len()]
}

// ─── Headlines ─────────────────────────────────────────────────────────────────

fn tier(overall: i32) -> &'static str {
    match overall {
        90.. => "gold",
        75.. => "green",
        60.. => "yellow",
        40.. => "orange",
        _ => "red",
    }
}

fn choose_headline(overall: i32, intensity: u8, wholesome: bool, seed: &str) -> &'static str {
    let tier = tier(overall);
    let (variant, options): (&str, &[&str]) = if wholesome {
        ("wholesome", wholesome_headlines(tier))
    } else if intensity == 0 {
        ("factual", factual_headlines(tier))
    } else if intensity <= 2 {
        ("light", light_headlines(tier))
    } else if intensity <= 4 {
        ("savage", savage_headlines(tier))
    } else {
        ("nuclear", nuclear_headlines(tier))
    };
    deterministic_choice(&format!("{seed}{variant}{tier}"), options)
}

fn factual_headlines(tier: &str) -> &'static [&'static str] {
    match tier {
        "gold" => &["Exemplary git discipline across the board."],
        "green" => &["Healthy history with a handful of rough spots."],
        "yellow" => &["Mixed habits; several patterns worth fixing."],
        "orange" => &["Substantial history problems detected."],
        _ => &["Severe history problems across every category."],
    }
}

fn wholesome_headlines(tier: &str) -> &'static [&'static str] {
    match tier {
        "gold" => &["This history is a pleasure to read. Keep going."],
        "green" => &["Really solid work, a nudge or two from spotless."],
        "yellow" => &["Good bones here. A little polish goes a long way."],
        "orange" => &["Plenty to improve, and all of it very fixable."],
        _ => &["Messy start, sure, but every habit here is learnable."],
    }
}

fn light_headlines(tier: &str) -> &'static [&'static str] {
    match tier {
        "gold" => &[
            "So tidy it makes other repos self-conscious.",
            "A commit log you could bring home to your parents.",
        ],
        "green" => &[
            "Mostly spotless, with a few crumbs in the corners.",
            "Clean history, minor footnotes.",
        ],
        "yellow" => &[
            "Decent history that occasionally forgets its manners.",
            "Fine from a distance; squint and it wobbles.",
        ],
        "orange" => &[
            "This history trips over its own shoelaces a lot.",
            "Enthusiasm high, follow-through variable.",
        ],
        _ => &[
            "A commit log powered entirely by vibes.",
            "This history needs an adult in the room.",
        ],
    }
}

fn savage_headlines(tier: &str) -> &'static [&'static str] {
    match tier {
        "gold" => &[
            "Suspiciously clean. Who are you trying to impress?",
            "So pristine it probably judges other repos.",
        ],
        "green" => &[
            "Good, but the chaos is peeking through the curtains.",
            "Respectable, if you don't read too closely.",
        ],
        "yellow" => &[
            "This commit log reads like a ransom note.",
            "Half craftsmanship, half crime scene.",
        ],
        "orange" => &[
            "Held together with duct tape and optimism.",
            "Every page of this history is a cry for code review.",
        ],
        _ => &[
            "This is what linters see in their nightmares.",
            "An anthology of regret, one commit at a time.",
        ],
    }
}

fn nuclear_headlines(tier: &str) -> &'static [&'static str] {
    match tier {
        "gold" => &["Even the bots are jealous, and they don't feel things."],
        "green" => &["Nice try. The skeletons are still in the reflog."],
        "yellow" => &["A log that screams \"I ship on vibes\" in three languages."],
        "orange" => &["Somehow both over-committed and under-explained."],
        _ => &["A cursed anthology of \"fix\" and its consequences."],
    }
}

// ─── Section commentary ────────────────────────────────────────────────────────

fn ratio(a: usize, b: usize) -> f64 {
    if b == 0 {
        0.0
    } else {
        a as f64 / b as f64
    }
}

fn pick(intensity: u8, light: &'static str, savage: &'static str) -> &'static str {
    if intensity <= 2 {
        light
    } else {
        savage
    }
}

fn section_messages(metrics: &Metrics, intensity: u8, wholesome: bool) -> &'static str {
    let bad_ratio = ratio(metrics.message.low_quality, metrics.message.total);
    if wholesome {
        return if bad_ratio < 0.2 {
            "Commit messages are mostly clear and useful."
        } else {
            "Messages could say more, and that is an easy habit to build."
        };
    }
    if bad_ratio > 0.4 {
        pick(
            intensity,
            "Most of these messages are on a first-name basis with \"fix\".",
            "These messages are a fog machine aimed at future you.",
        )
    } else if bad_ratio > 0.2 {
        pick(
            intensity,
            "A few messages read like placeholder text.",
            "Some of these subjects are actively withholding information.",
        )
    } else {
        pick(
            intensity,
            "Messages are mostly fine, with minor misdemeanors.",
            "Messages are crisp enough to survive code review.",
        )
    }
}

fn section_time(metrics: &Metrics, intensity: u8, wholesome: bool) -> &'static str {
    if wholesome {
        return if metrics.time.midnight_ratio > 0.2 {
            "Quite a few late nights here. Sleep is a feature too."
        } else {
            "Cadence looks steady. Keep the rhythm."
        };
    }
    if metrics.time.midnight_ratio > 0.25 {
        pick(
            intensity,
            "Midnight commits detected. The gremlins approve.",
            "You and 2am are clearly in a committed relationship.",
        )
    } else if metrics.time.deadline_ratio > 0.2 {
        pick(
            intensity,
            "Deadline scrambles spotted.",
            "Friday-afternoon deploy commits: a bold lifestyle.",
        )
    } else {
        pick(
            intensity,
            "Cadence is reasonably sane.",
            "Your commit schedule is suspiciously normal.",
        )
    }
}

fn section_hygiene(metrics: &Metrics, intensity: u8, wholesome: bool) -> &'static str {
    let bad_branch_ratio = ratio(metrics.hygiene.bad_branch_count, metrics.hygiene.branch_count);
    if wholesome {
        return if bad_branch_ratio > 0.2 {
            "Branch names could be clearer, but the structure is there."
        } else {
            "History structure looks healthy."
        };
    }
    if bad_branch_ratio > 0.3 {
        pick(
            intensity,
            "Branch names look like misremembered passwords.",
            "These branches are named the way test files get named in a hurry.",
        )
    } else if metrics.hygiene.merge_ratio > 0.6 {
        pick(
            intensity,
            "Merge commits everywhere.",
            "This history is a bowl of spaghetti merges.",
        )
    } else {
        pick(
            intensity,
            "Hygiene is mostly clean.",
            "History is tidy enough to eat off of.",
        )
    }
}

fn section_chunkiness(metrics: &Metrics, intensity: u8, wholesome: bool) -> &'static str {
    let large_ratio = ratio(metrics.size.large_commit_count, metrics.size.sample_size);
    if wholesome {
        return if large_ratio > 0.2 {
            "Some commits are big. Splitting them up would help reviewers."
        } else {
            "Commit sizes look manageable."
        };
    }
    if large_ratio > 0.25 {
        pick(
            intensity,
            "Some of these commits have their own gravity.",
            "Several commits here need a loading screen.",
        )
    } else if metrics.size.binary_commit_count > 0 {
        pick(
            intensity,
            "Binary blobs are lurking in history.",
            "Binaries in git: bold, and permanent.",
        )
    } else {
        pick(
            intensity,
            "Chunk sizes are reasonable.",
            "Commit sizes are not horrifying. Nice.",
        )
    }
}

fn build_tips(metrics: &Metrics, wholesome: bool) -> Vec<String> {
    let mut tips: Vec<String> = Vec::new();
    if metrics.message.generic > 0 {
        tips.push("Replace generic messages with intent and impact.".to_string());
    }
    if metrics.message.too_short > 0 {
        tips.push("Add a few words of context to short commits.".to_string());
    }
    if metrics.time.midnight_ratio > 0.2 {
        tips.push("Commit earlier in the day to reduce late-night risk.".to_string());
    }
    if metrics.hygiene.bad_branch_count > 0 {
        tips.push("Use descriptive branch names so future you can find work.".to_string());
    }
    if metrics.size.large_commit_count > 0 {
        tips.push("Split large commits into focused, reviewable chunks.".to_string());
    }
    if metrics.size.binary_commit_count > 0 {
        tips.push("Keep large binaries out of git; use git-lfs or artifacts.".to_string());
    }
    if tips.len() < 3 {
        tips.push(if wholesome {
            "Keep leaning into consistency and clarity.".to_string()
        } else {
            "Consistency beats cleverness in commit history.".to_string()
        });
    }
    tips.truncate(6);
    tips
}

// ─── Censor ────────────────────────────────────────────────────────────────────

static PROFANITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(fuck|shit|damn|hell|crap|bastard|ass)\b").expect("profanity pattern")
});

/// Masks profanity to its first letter plus `***`, case-folded.
pub fn censor_text(s: &str) -> String {
    PROFANITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            let word = caps.get(0).map(|m| m.as_str()).unwrap_or("");
            match word.to_lowercase().chars().next() {
                Some(first) => format!("{first}***"),
                None => word.to_string(),
            }
        })
        .into_owned()
}
