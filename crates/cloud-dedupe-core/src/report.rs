use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Error;
use crate::model::DuplicateSets;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MIB: f64 = 1024.0 * 1024.0;

/// Writes the plain-text duplicate report: one header per set (ascending
/// hash order), one line per member (sorted by path) with path, modified
/// time, and size in MiB. Returns the number of sets written.
pub fn write_report<W: Write>(sets: &DuplicateSets, out: &mut W) -> io::Result<usize> {
    writeln!(out, "Duplicate video file sets found (based on SHA1):")?;
    writeln!(out, "===================================================")?;
    writeln!(out)?;

    let mut set_count = 0;
    for set in sets.values() {
        if set.members.len() < 2 {
            continue;
        }
        set_count += 1;
        writeln!(
            out,
            "Set {} (SHA1: {}) - {} files",
            set_count,
            set.content_hash,
            set.members.len()
        )?;

        let mut members: Vec<_> = set.members.iter().collect();
        members.sort_by(|a, b| a.path.cmp(&b.path));
        for member in members {
            let modified = member
                .modified
                .map(|ts| ts.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| "N/A".to_string());
            writeln!(
                out,
                "  - {} (Modified: {}, Size: {:.2} MB)",
                member.path,
                modified,
                member.size as f64 / MIB
            )?;
        }
        writeln!(out)?;
    }

    Ok(set_count)
}

/// Writes the report to a file, UTF-8.
pub fn save_report(sets: &DuplicateSets, output: &Path) -> Result<usize, Error> {
    let mut writer = BufWriter::new(File::create(output)?);
    let set_count = write_report(sets, &mut writer)?;
    writer.flush()?;
    info!(file = %output.display(), sets = set_count, "report saved");
    Ok(set_count)
}
