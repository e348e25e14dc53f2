use tracing::{debug, warn};

use crate::error::Error;

/// Zero-width, BOM-like, and no-break code points that survive copy-paste
/// but break path comparison.
const KNOWN_INVISIBLE: &[u32] = &[0x200B, 0x200C, 0x200D, 0x200E, 0x200F, 0xFEFF, 0x00A0];

fn suspicious_chars(input: &str) -> Vec<String> {
    let mut found = Vec::new();
    for (position, ch) in input.chars().enumerate() {
        let code = ch as u32;
        let reason = if code <= 0x1F || code == 0x7F {
            Some("C0 control")
        } else if (0x80..=0x9F).contains(&code) {
            Some("C1 control")
        } else if KNOWN_INVISIBLE.contains(&code) {
            Some("invisible")
        } else {
            None
        };
        if let Some(reason) = reason {
            found.push(format!("U+{code:04X} ({reason}) at position {position}"));
        }
    }
    found
}

/// Backslashes to forward slashes, surrounding whitespace stripped, trailing
/// slashes stripped. `/` itself normalizes to the empty string and is handled
/// by the empty-mount case.
fn normalize_input(raw: &str) -> String {
    raw.replace('\\', "/").trim().trim_end_matches('/').to_string()
}

/// Two-character drive designator like `D:`.
fn is_drive_designator(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic()
}

/// Drive-letter path like `X:/Data` (anything with `:` in second position).
fn is_drive_path(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() > 1 && bytes[1] == b':'
}

fn rooted(rest: &str) -> String {
    format!("/{}", rest.trim_start_matches('/'))
}

/// Strips `prefix_len` bytes and re-roots the remainder; `None` when the
/// offset does not land on a character boundary (cannot be a real match).
fn strip_rooted(scan: &str, prefix_len: usize) -> Option<String> {
    scan.get(prefix_len..).map(rooted)
}

pub(crate) fn collapse_slashes(path: &str) -> String {
    let mut out = path.to_string();
    while out.contains("//") {
        out = out.replace("//", "/");
    }
    if !out.starts_with('/') {
        out = format!("/{out}");
    }
    if out.len() > 1 {
        out = out.trim_end_matches('/').to_string();
    }
    out
}

/// Maps a user-supplied scan root plus the drive's mount point to the
/// canonical absolute path on the remote filesystem.
///
/// Resolution cases, first match wins:
/// 1. mount is a drive designator (`D:`): scan must be on that drive;
/// 2. mount is empty or `/`: scan is already relative to the remote root;
/// 3. mount is an absolute path: scan must start with it;
/// 4. mount is a bare folder name: scan may carry it with or without a
///    leading slash;
/// 5. anything else is a mismatch.
///
/// A mismatch is reported as [`Error::PathMismatch`] carrying both raw
/// inputs; the calculation never falls back to `/`.
pub fn calculate_fs_path(scan_root: &str, mount_point: &str) -> Result<String, Error> {
    let mut issues = Vec::new();
    for (label, value) in [("scan path", scan_root), ("mount point", mount_point)] {
        let found = suspicious_chars(value);
        if !found.is_empty() {
            issues.push(format!("{label} '{value}': {}", found.join(", ")));
        }
    }
    if !issues.is_empty() {
        let details = issues.join("; ");
        warn!(%details, "suspicious characters detected in path inputs");
        return Err(Error::InvalidCharacters { details });
    }

    let scan_norm = normalize_input(scan_root);
    let mount_norm = normalize_input(mount_point);

    let resolved = if is_drive_designator(&mount_norm) {
        let mount_lower = mount_norm.to_lowercase();
        let scan_lower = scan_norm.to_lowercase();
        if scan_lower.starts_with(&format!("{mount_lower}/")) {
            strip_rooted(&scan_norm, mount_norm.len())
        } else if scan_lower == mount_lower {
            Some("/".to_string())
        } else {
            None
        }
    } else if mount_norm.is_empty() {
        Some(rooted(&scan_norm))
    } else if mount_norm.starts_with('/') || is_drive_path(&mount_norm) {
        // Drive-letter mounts compare case-insensitively, plain absolute
        // mounts do not.
        let (prefix_base, scan_cmp) = if is_drive_path(&mount_norm) {
            (mount_norm.to_lowercase(), scan_norm.to_lowercase())
        } else {
            (mount_norm.clone(), scan_norm.clone())
        };
        if scan_cmp.starts_with(&format!("{prefix_base}/")) {
            strip_rooted(&scan_norm, mount_norm.len())
        } else if scan_cmp == prefix_base {
            Some("/".to_string())
        } else {
            None
        }
    } else if !mount_norm.contains('/') && !mount_norm.contains(':') {
        let slash_form = format!("/{mount_norm}");
        if let Some(rest) = scan_norm.strip_prefix(&format!("{slash_form}/")) {
            Some(rooted(rest))
        } else if scan_norm == slash_form {
            Some("/".to_string())
        } else if let Some(rest) = scan_norm.strip_prefix(&format!("{mount_norm}/")) {
            Some(rooted(rest))
        } else if scan_norm == mount_norm {
            Some("/".to_string())
        } else {
            None
        }
    } else {
        None
    };

    match resolved {
        Some(path) => {
            let path = collapse_slashes(&path);
            debug!(
                fs_path = %path,
                scan = scan_root,
                mount = mount_point,
                "calculated effective scan path"
            );
            Ok(path)
        }
        None => {
            warn!(
                scan = scan_root,
                mount = mount_point,
                "scan path does not resolve under mount point"
            );
            Err(Error::PathMismatch {
                scan_root: scan_root.to_string(),
                mount_point: mount_point.to_string(),
            })
        }
    }
}
