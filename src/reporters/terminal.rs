use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, Table};

use crate::types::{Metrics, Report};

/// Rendering context resolved by the caller. The presenter never inspects the
/// environment itself; color on/off is decided in main before the pipeline
/// runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub explain: bool,
}

pub fn report_terminal(report: &Report, opts: &RenderOptions) {
    println!(
        "{} — {} ({})",
        "🔥 git-roast".red().bold(),
        report.repo.name.bold(),
        report.repo.path.bright_black(),
    );
    println!(
        "   HEAD {}  ·  {} commits analyzed",
        short_sha(&report.repo.head).yellow(),
        report.repo.commit_count.to_string().bold(),
    );
    if !report.filters.since.is_empty() || !report.filters.until.is_empty() {
        println!(
            "   Range: {} -> {}",
            empty_as_all(&report.filters.since).bright_black(),
            empty_as_all(&report.filters.until).bright_black(),
        );
    }
    if !report.filters.author.is_empty() {
        println!("   Author filter: {}", report.filters.author.bright_black());
    }

    println!();
    println!(
        "{}  {}",
        score_line(report.score.overall),
        report.roasts.headline.italic(),
    );
    if opts.explain {
        let b = &report.score.breakdown;
        println!(
            "   {} message {}/30, hygiene {}/30, cadence {}/20, size {}/20",
            "Breakdown:".bright_black(),
            b.message_quality, b.hygiene, b.cadence, b.size_discipline,
        );
        if let Some(overall) = report.score.explain.get("overall") {
            println!("   {} {}", "Explain:".bright_black(), overall.bright_black());
        }
    }

    section("Commit Message Crimes", &message_bullets(&report.metrics),
        report.roasts.sections.get("commit_messages"));
    section("Time & Cadence", &time_bullets(&report.metrics),
        report.roasts.sections.get("time_cadence"));
    section("Repo Hygiene", &hygiene_bullets(&report.metrics),
        report.roasts.sections.get("repo_hygiene"));
    section("Chunkiness", &size_bullets(&report.metrics),
        report.roasts.sections.get("chunkiness"));

    if !report.offenders.is_empty() {
        println!();
        println!("{}", "Top Offenders".cyan().bold());
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["SHA", "DATE", "SUBJECT", "REASONS"]);
        for off in &report.offenders {
            // Plain text cells so comfy-table measures real widths.
            table.add_row(vec![
                Cell::new(short_sha(&off.sha)).fg(Color::Yellow),
                Cell::new(date_only(&off.date)),
                Cell::new(truncate(&off.subject, 48)),
                Cell::new(off.reasons.join(", ")).add_attribute(Attribute::Dim),
            ]);
        }
        println!("{table}");
    }

    if !report.roasts.tips.is_empty() {
        println!();
        println!("{}", "Tips".cyan().bold());
        for tip in &report.roasts.tips {
            println!("  {} {}", "•".white(), tip);
        }
    }

    println!();
    println!(
        "{} try {} for full size analysis, {} for kinder output, or {} for machine use.",
        "Hints:".bright_black(),
        "--deep".yellow(),
        "--wholesome".yellow(),
        "--json".yellow(),
    );
}

// ─── Section rendering ─────────────────────────────────────────────────────────

fn section(title: &str, bullets: &[String], summary: Option<&String>) {
    println!();
    println!("{}", title.cyan().bold());
    for bullet in bullets {
        println!("  {} {}", "-".bright_black(), bullet);
    }
    if let Some(text) = summary {
        println!("  {}", text.italic().yellow());
    }
}

fn score_line(overall: i32) -> String {
    let text = format!("Overall Score: {overall}/100");
    match overall {
        85.. => text.green().bold().to_string(),
        70.. => text.yellow().bold().to_string(),
        50.. => text.magenta().bold().to_string(),
        _ => text.red().bold().to_string(),
    }
}

fn message_bullets(metrics: &Metrics) -> Vec<String> {
    let m = &metrics.message;
    if m.total == 0 {
        return vec!["No commits found.".to_string()];
    }
    let mut bullets = vec![
        format!("Generic messages: {} ({:.0}%)", m.generic, percent(m.generic, m.total)),
        format!(
            "Emoji-only: {}, too short: {}, too long: {}",
            m.emoji_only, m.too_short, m.too_long
        ),
    ];
    if m.lying > 0 {
        bullets.push(format!("Lying messages: {}", m.lying));
    }
    if m.panic > 0 {
        bullets.push(format!("Panic commits: {}", m.panic));
    }
    if !m.top_generic_words.is_empty() {
        bullets.push(format!("Top generic words: {}", m.top_generic_words.join(", ")));
    }
    bullets
}

fn time_bullets(metrics: &Metrics) -> Vec<String> {
    let t = &metrics.time;
    vec![
        format!("Commits/day avg: {:.2}", t.commits_per_day_avg),
        format!("Commits/week avg: {:.2}", t.commits_per_week_avg),
        format!("Midnight commits: {:.0}%", t.midnight_ratio * 100.0),
        format!("Deadline window commits: {:.0}%", t.deadline_ratio * 100.0),
        format!("Longest streak: {} days", t.longest_streak_days),
    ]
}

fn hygiene_bullets(metrics: &Metrics) -> Vec<String> {
    let h = &metrics.hygiene;
    let mut bullets = vec![
        format!("Merge ratio: {:.0}%", h.merge_ratio * 100.0),
        format!("Linear ratio: {:.0}%", h.linear_ratio * 100.0),
        format!("Branches: {} (bad: {})", h.branch_count, h.bad_branch_count),
    ];
    if !h.bad_branches.is_empty() {
        let shown: Vec<&str> = h.bad_branches.iter().take(3).map(String::as_str).collect();
        bullets.push(format!("Bad branches: {}", shown.join(", ")));
    }
    bullets
}

fn size_bullets(metrics: &Metrics) -> Vec<String> {
    let s = &metrics.size;
    if s.sample_size == 0 {
        return vec!["No size data collected.".to_string()];
    }
    let note = if s.sampled { " (sampled)" } else { "" };
    vec![
        format!("Large commits: {}/{}{}", s.large_commit_count, s.sample_size, note),
        format!("Binary commits: {}/{}{}", s.binary_commit_count, s.sample_size, note),
        format!("Average lines changed: {:.0}", s.average_lines),
        format!("Max lines changed: {}", s.max_lines),
    ]
}

// ─── Helpers ───────────────────────────────────────────────────────────────────

fn short_sha(sha: &str) -> &str {
    if sha.len() <= 7 { sha } else { &sha[..7] }
}

fn date_only(rfc3339: &str) -> &str {
    if rfc3339.len() >= 10 { &rfc3339[..10] } else { rfc3339 }
}

fn truncate(s: &str, max: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max {
        return s.to_string();
    }
    let mut out: String = chars[..max.saturating_sub(3)].iter().collect();
    out.push_str("...");
    out
}

fn percent(a: usize, b: usize) -> f64 {
    if b == 0 {
        0.0
    } else {
        (a as f64 * 1000.0 / b as f64).round() / 10.0
    }
}

fn empty_as_all(s: &str) -> &str {
    if s.is_empty() { "all time" } else { s }
}
