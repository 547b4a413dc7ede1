use std::collections::HashMap;
use std::io::BufRead;

use crate::error::RoastResult;
use crate::git::log_parser::UNIT_SEP;
use crate::types::CommitSize;

pub type SizeMap = HashMap<String, CommitSize>;

/// Parses `--numstat` output structured as repeating groups: a header line
/// holding the commit sha (terminated by the unit separator) followed by zero
/// or more `added\tdeleted\tpath` lines. `-` in either numeric column marks a
/// binary file, which counts toward `binary_files` and contributes no lines.
///
/// A sha header with no stat lines still gets a zero-valued entry so callers
/// can distinguish "empty commit" from "no size data".
pub fn parse_numstat<R: BufRead>(input: R) -> RoastResult<SizeMap> {
    let mut sizes = SizeMap::new();
    let mut current: Option<String> = None;
    for line in input.lines() {
        let line = line?;
        if let Some(pos) = line.find(UNIT_SEP as char) {
            let sha = line[..pos].trim();
            if sha.is_empty() {
                current = None;
            } else {
                sizes.entry(sha.to_string()).or_default();
                current = Some(sha.to_string());
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        let Some(sha) = current.as_deref() else {
            // stat line before any header, ignore
            continue;
        };
        let fields: Vec<&str> = line.splitn(3, '\t').collect();
        if fields.len() < 3 {
            continue;
        }
        let size = sizes.get_mut(sha).expect("current sha always has an entry");
        size.files += 1;
        if fields[0] == "-" || fields[1] == "-" {
            size.binary_files += 1;
            continue;
        }
        // A numeric column that fails to parse is zeroed for that file only;
        // the stream as a whole is untrusted text.
        size.added += fields[0].parse::<usize>().unwrap_or(0);
        size.deleted += fields[1].parse::<usize>().unwrap_or(0);
    }
    Ok(sizes)
}

/// Merges one retrieval batch into the accumulated map. Counts add up rather
/// than overwrite: a sha may appear in more than one batch when the caller
/// chunks large requests.
pub fn merge_sizes(into: &mut SizeMap, batch: SizeMap) {
    for (sha, size) in batch {
        let entry = into.entry(sha).or_default();
        entry.files += size.files;
        entry.added += size.added;
        entry.deleted += size.deleted;
        entry.binary_files += size.binary_files;
    }
}
