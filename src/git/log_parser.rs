use std::io::BufRead;

use chrono::DateTime;

use crate::error::{RoastError, RoastResult};
use crate::git::record::RecordScanner;
use crate::types::Commit;

/// ASCII record separator used by the `%x1e`-terminated pretty format.
pub const RECORD_SEP: u8 = 0x1e;
/// ASCII unit separator between fields within one record.
pub const UNIT_SEP: u8 = 0x1f;

const FIELD_COUNT: usize = 6;

/// Parses `git log` output into commits, in the order the stream delivers
/// them (newest-first by default; downstream code must not assume sorted).
///
/// Records with fewer than six fields are skipped: truncated trailing output
/// is common when git is interrupted and is not worth failing the run over.
/// A timestamp that does not parse as RFC 3339 aborts instead: every
/// temporal metric depends on it, so silently dropping the commit would skew
/// results without anyone noticing.
pub fn parse_log<R: BufRead>(input: R) -> RoastResult<Vec<Commit>> {
    let mut commits = Vec::with_capacity(256);
    for record in RecordScanner::new(input, RECORD_SEP, UNIT_SEP) {
        let fields = record?;
        if fields.len() < FIELD_COUNT {
            continue;
        }
        let date = DateTime::parse_from_rfc3339(&fields[3]).map_err(|e| {
            RoastError::BadTimestamp {
                value: fields[3].clone(),
                source: e,
            }
        })?;
        let parents: Vec<String> = fields[5]
            .split_whitespace()
            .map(str::to_string)
            .collect();
        commits.push(Commit {
            sha: fields[0].clone(),
            author_name: fields[1].clone(),
            author_email: fields[2].clone(),
            date,
            subject: fields[4].clone(),
            parents,
            size: None,
        });
    }
    Ok(commits)
}
