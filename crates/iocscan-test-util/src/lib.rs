//! Shared test utilities for the iocscan workspace.
//!
//! This crate exists because the render and publish crates both need the
//! same report fixtures and the ANSI stripper, and a `#[cfg(test)]` module
//! inside `iocscan-types` would not be visible to them.

use iocscan_types::{IocMatch, ScanReport, ScanTarget};
use time::OffsetDateTime;
use time::macros::datetime;

/// Fixed timestamp used by fixtures so test output is deterministic.
pub const FIXED_SCAN_TIME: OffsetDateTime = datetime!(2024-03-01 10:30:00 UTC);

/// A fully populated image-layer match.
pub fn sample_match() -> IocMatch {
    IocMatch {
        layer_id: "sha256:9a1b".to_string(),
        rule_name: "trojan-generic-shell".to_string(),
        matched_strings: vec!["nc -e /bin/sh".to_string(), "base64 -d".to_string()],
        categories: vec!["backdoor".to_string(), "malware".to_string()],
        severity: "high".to_string(),
        severity_score: 8.2,
        file_path: "/opt/payload/run.sh".to_string(),
        meta: vec![
            "description : spawns a reverse shell".to_string(),
            "author : threat-intel".to_string(),
        ],
    }
}

/// The EICAR scenario from the end-to-end acceptance case.
pub fn eicar_match() -> IocMatch {
    IocMatch {
        categories: vec!["malware".to_string()],
        meta: vec!["description : known test signature".to_string()],
        ..IocMatch::new("eicar-test", "/scan/eicar.com.txt")
    }
}

/// Directory-scan report with a fixed timestamp and the given matches.
pub fn directory_report(matches: Vec<IocMatch>) -> ScanReport {
    let mut report = ScanReport::new(ScanTarget::directory("/scan"));
    report.timestamp = FIXED_SCAN_TIME;
    report.matches = matches;
    report
}

/// Image-scan report with a fixed timestamp and the given matches.
pub fn image_report(matches: Vec<IocMatch>) -> ScanReport {
    let mut report = ScanReport::new(ScanTarget::image("alpine:3.19", "sha256:4f2c"));
    report.timestamp = FIXED_SCAN_TIME;
    report.matches = matches;
    report
}

/// Remove ANSI SGR escape sequences (`ESC [ ... m`) from console output.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for esc in chars.by_ref() {
                if esc == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_sgr_sequences() {
        let colored = "\u{1b}[34mCategory\u{1b}[0m: \u{1b}[33mmalware\u{1b}[0m";
        assert_eq!(strip_ansi(colored), "Category: malware");
    }

    #[test]
    fn strip_ansi_leaves_plain_text_alone() {
        let plain = "{\n  \"Timestamp\": \"x\"\n}";
        assert_eq!(strip_ansi(plain), plain);
    }
}
