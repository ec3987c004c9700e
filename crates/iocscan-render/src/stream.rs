use crate::summary::{split_meta, summary_for};
use iocscan_types::names::{
    FIELD_CATEGORY, FIELD_CONTAINER_ID, FIELD_DIRECTORY_NAME, FIELD_FILE_NAME, FIELD_IMAGE_ID,
    FIELD_IMAGE_NAME, FIELD_LAYER_ID, FIELD_MATCHED_PART, FIELD_MATCHES, FIELD_RULE_NAME,
    FIELD_SUMMARY, FIELD_TIMESTAMP,
};
use iocscan_types::{IocMatch, ScanTarget};
use std::io::{self, Write};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const INDENT1: &str = "  ";
const INDENT2: &str = "    ";
const INDENT3: &str = "      ";
const INDENT4: &str = "        ";

const BLUE: &str = "\u{1b}[34m";
const YELLOW: &str = "\u{1b}[33m";
const RESET: &str = "\u{1b}[0m";

/// Header timestamp layout: `YYYY-MM-DD HH:MM:SS.nnnnnnnnn ±HH:MM`.
const CONSOLE_TIMESTAMP: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:9] \
     [offset_hour sign:mandatory]:[offset_minute]"
);

/// Incremental console sink for an in-flight scan.
///
/// Emits a JSON object literal in three phases: `write_header`, one
/// `write_match` per record in arrival order, `write_footer`. The stream
/// tracks how many matches it has emitted, so comma placement inside the
/// `IOC` array needs no bookkeeping from the caller.
///
/// Match keys and the summary value carry ANSI color inside the JSON quotes;
/// with the escapes stripped (or color disabled) the full output parses as
/// JSON. Write errors are surfaced as plain `io::Error` and are non-fatal by
/// contract: the report is still available through the other sinks.
pub struct ConsoleStream<W: Write> {
    out: W,
    emitted: usize,
    color: bool,
}

impl<W: Write> ConsoleStream<W> {
    pub fn new(out: W) -> Self {
        Self::with_color(out, true)
    }

    pub fn with_color(out: W, color: bool) -> Self {
        Self {
            out,
            emitted: 0,
            color,
        }
    }

    /// Opens the envelope: timestamp, variant identity fields, and the
    /// `IOC` array.
    pub fn write_header(
        &mut self,
        target: &ScanTarget,
        timestamp: OffsetDateTime,
    ) -> io::Result<()> {
        let stamp = timestamp
            .format(CONSOLE_TIMESTAMP)
            .map_err(io::Error::other)?;
        write!(self.out, "{{\n")?;
        write!(
            self.out,
            "{INDENT1}\"{FIELD_TIMESTAMP}\": {},\n",
            json_str(&stamp)
        )?;
        match target {
            ScanTarget::Directory { directory_name } => {
                write!(
                    self.out,
                    "{INDENT1}\"{FIELD_DIRECTORY_NAME}\": {},\n",
                    json_str(directory_name)
                )?;
            }
            ScanTarget::Image {
                image_name,
                image_id,
                container_id,
            } => {
                write!(
                    self.out,
                    "{INDENT1}\"{FIELD_IMAGE_NAME}\": {},\n",
                    json_str(image_name)
                )?;
                write!(
                    self.out,
                    "{INDENT1}\"{FIELD_IMAGE_ID}\": {},\n",
                    json_str(image_id)
                )?;
                if let Some(container_id) = container_id {
                    write!(
                        self.out,
                        "{INDENT1}\"{FIELD_CONTAINER_ID}\": {},\n",
                        json_str(container_id)
                    )?;
                }
            }
        }
        write!(self.out, "{INDENT1}\"{FIELD_MATCHES}\": [\n")?;
        Ok(())
    }

    /// Emits one match object. Records appear in the exact order this is
    /// called; field order inside the object is fixed.
    pub fn write_match(&mut self, m: &IocMatch) -> io::Result<()> {
        if self.emitted == 0 {
            write!(self.out, "{INDENT2}{{\n")?;
        } else {
            write!(self.out, ",\n{INDENT2}{{\n")?;
        }

        let mut first_field = true;

        if !m.layer_id.is_empty() {
            self.field_sep(&mut first_field)?;
            let key = self.key(FIELD_LAYER_ID);
            write!(self.out, "{INDENT3}{key}: {}", json_str(&m.layer_id))?;
        }

        self.field_sep(&mut first_field)?;
        let key = self.key(FIELD_RULE_NAME);
        write!(self.out, "{INDENT3}{key}: {}", json_str(&m.rule_name))?;

        if !m.matched_strings.is_empty() {
            self.field_sep(&mut first_field)?;
            let key = self.key(FIELD_MATCHED_PART);
            write!(self.out, "{INDENT3}{key}: [\n")?;
            let mut first_part = true;
            for part in m.matched_strings.iter().filter(|p| !p.is_empty()) {
                if !first_part {
                    write!(self.out, ",\n")?;
                }
                first_part = false;
                write!(self.out, "{INDENT4}{}", json_str(part))?;
            }
            write!(self.out, "\n{INDENT3}]")?;
        }

        if !m.categories.is_empty() {
            self.field_sep(&mut first_field)?;
            let key = self.key(FIELD_CATEGORY);
            write!(self.out, "{INDENT3}{key}: {}", json_str_array(&m.categories))?;
        }

        self.field_sep(&mut first_field)?;
        let key = self.key(FIELD_FILE_NAME);
        write!(self.out, "{INDENT3}{key}: {}", json_str(&m.file_path))?;

        for entry in &m.meta {
            let Some((meta_key, meta_value)) = split_meta(entry) else {
                continue;
            };
            self.field_sep(&mut first_field)?;
            let key = self.key(meta_key);
            write!(self.out, "{INDENT3}{key}: {}", json_str(meta_value))?;
        }

        let summary = summary_for(m);
        if !summary.is_empty() {
            self.field_sep(&mut first_field)?;
            let key = self.key(FIELD_SUMMARY);
            let value = if self.color {
                format!("\"{YELLOW}{}{RESET}\"", json_str_inner(&summary))
            } else {
                json_str(&summary)
            };
            write!(self.out, "{INDENT3}{key}: {value}")?;
        }

        write!(self.out, "\n{INDENT2}}}")?;
        self.emitted += 1;
        Ok(())
    }

    /// Closes the `IOC` array and the envelope.
    pub fn write_footer(&mut self) -> io::Result<()> {
        write!(self.out, "\n{INDENT1}]\n}}\n")
    }

    /// Number of matches emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn field_sep(&mut self, first_field: &mut bool) -> io::Result<()> {
        if *first_field {
            *first_field = false;
        } else {
            write!(self.out, ",\n")?;
        }
        Ok(())
    }

    fn key(&self, name: &str) -> String {
        if self.color {
            format!("\"{BLUE}{name}{RESET}\"")
        } else {
            format!("\"{name}\"")
        }
    }
}

/// JSON-quote a string. Infallible, unlike going through the serializer.
fn json_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// JSON-escape a string without the surrounding quotes, so color escapes can
/// be spliced inside them.
fn json_str_inner(s: &str) -> String {
    let quoted = json_str(s);
    quoted[1..quoted.len() - 1].to_string()
}

fn json_str_array(items: &[String]) -> String {
    serde_json::Value::from(items.to_vec()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use iocscan_test_util::{FIXED_SCAN_TIME, eicar_match, sample_match, strip_ansi};
    use serde_json::Value;

    fn stream_to_string(
        target: &ScanTarget,
        matches: &[IocMatch],
        color: bool,
    ) -> String {
        let mut buf = Vec::new();
        let mut stream = ConsoleStream::with_color(&mut buf, color);
        stream.write_header(target, FIXED_SCAN_TIME).unwrap();
        for m in matches {
            stream.write_match(m).unwrap();
        }
        stream.write_footer().unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn stripped_output_is_valid_json_with_all_matches() {
        let out = stream_to_string(
            &ScanTarget::directory("/scan"),
            &[sample_match(), eicar_match()],
            true,
        );
        let value: Value = serde_json::from_str(&strip_ansi(&out)).unwrap();
        assert_eq!(value["Directory Name"], "/scan");
        assert_eq!(value["IOC"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_scan_still_closes_cleanly() {
        let out = stream_to_string(&ScanTarget::directory("/scan"), &[], true);
        let value: Value = serde_json::from_str(&strip_ansi(&out)).unwrap();
        assert_eq!(value["IOC"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn header_timestamp_uses_the_console_layout() {
        let out = stream_to_string(&ScanTarget::directory("/scan"), &[], false);
        assert!(out.contains("\"Timestamp\": \"2024-03-01 10:30:00.000000000 +00:00\""));
    }

    #[test]
    fn image_header_includes_container_id_when_present() {
        let target = ScanTarget::Image {
            image_name: "nginx:latest".to_string(),
            image_id: "sha256:cc33".to_string(),
            container_id: Some("f00d".to_string()),
        };
        let out = stream_to_string(&target, &[], true);
        let value: Value = serde_json::from_str(&strip_ansi(&out)).unwrap();
        assert_eq!(value["Image Name"], "nginx:latest");
        assert_eq!(value["Container ID"], "f00d");
    }

    #[test]
    fn image_header_omits_container_id_when_absent() {
        let out = stream_to_string(&ScanTarget::image("alpine:3.19", "sha256:4f2c"), &[], true);
        let value: Value = serde_json::from_str(&strip_ansi(&out)).unwrap();
        assert!(value.get("Container ID").is_none());
    }

    #[test]
    fn matches_are_emitted_in_call_order() {
        let mut second = eicar_match();
        second.rule_name = "second-rule".to_string();
        let out = stream_to_string(
            &ScanTarget::directory("/scan"),
            &[eicar_match(), second],
            true,
        );
        let value: Value = serde_json::from_str(&strip_ansi(&out)).unwrap();
        assert_eq!(value["IOC"][0]["Matched Rule Name"], "eicar-test");
        assert_eq!(value["IOC"][1]["Matched Rule Name"], "second-rule");
    }

    #[test]
    fn meta_entries_become_their_own_fields() {
        let out = stream_to_string(&ScanTarget::directory("/scan"), &[sample_match()], true);
        let value: Value = serde_json::from_str(&strip_ansi(&out)).unwrap();
        let entry = &value["IOC"][0];
        assert_eq!(entry["description"], "spawns a reverse shell");
        assert_eq!(entry["author"], "threat-intel");
    }

    #[test]
    fn malformed_meta_entries_are_skipped_in_the_object() {
        let m = IocMatch {
            meta: vec!["not split into key and value".to_string()],
            ..IocMatch::new("r", "/f")
        };
        let out = stream_to_string(&ScanTarget::directory("/scan"), &[m], true);
        let value: Value = serde_json::from_str(&strip_ansi(&out)).unwrap();
        let keys: Vec<String> = value["IOC"][0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["Full File Name", "Matched Rule Name"]);
    }

    #[test]
    fn matched_strings_render_as_nested_lines() {
        let out = stream_to_string(&ScanTarget::directory("/scan"), &[sample_match()], false);
        assert!(out.contains("\"Matched Part\": [\n        \"nc -e /bin/sh\",\n"));
    }

    #[test]
    fn empty_matched_strings_are_filtered() {
        let m = IocMatch {
            matched_strings: vec!["keep".to_string(), String::new()],
            ..IocMatch::new("r", "/f")
        };
        let out = stream_to_string(&ScanTarget::directory("/scan"), &[m], true);
        let value: Value = serde_json::from_str(&strip_ansi(&out)).unwrap();
        assert_eq!(value["IOC"][0]["Matched Part"], serde_json::json!(["keep"]));
    }

    #[test]
    fn layer_id_leads_the_field_order_when_present() {
        let out = stream_to_string(&ScanTarget::image("a", "b"), &[sample_match()], false);
        let layer = out.find("\"Image Layer ID\"").unwrap();
        let rule = out.find("\"Matched Rule Name\"").unwrap();
        let file = out.find("\"Full File Name\"").unwrap();
        let summary = out.find("\"Summary\"").unwrap();
        assert!(layer < rule && rule < file && file < summary);
    }

    #[test]
    fn disabling_color_matches_the_stripped_colored_output() {
        let target = ScanTarget::directory("/scan");
        let colored = stream_to_string(&target, &[sample_match()], true);
        let plain = stream_to_string(&target, &[sample_match()], false);
        assert_eq!(strip_ansi(&colored), plain);
        assert!(colored.contains(BLUE));
        assert!(!plain.contains('\u{1b}'));
    }

    #[test]
    fn summary_value_is_colorized_yellow() {
        let out = stream_to_string(&ScanTarget::directory("/scan"), &[eicar_match()], true);
        assert!(out.contains(&format!(
            "\"{YELLOW}The file /scan/eicar.com.txt has a malware match.\
             The file has a rule match that known test signature.{RESET}\""
        )));
    }

    #[test]
    fn emitted_count_tracks_write_match_calls() {
        let mut buf = Vec::new();
        let mut stream = ConsoleStream::new(&mut buf);
        stream
            .write_header(&ScanTarget::directory("/scan"), FIXED_SCAN_TIME)
            .unwrap();
        assert_eq!(stream.emitted(), 0);
        stream.write_match(&eicar_match()).unwrap();
        stream.write_match(&eicar_match()).unwrap();
        assert_eq!(stream.emitted(), 2);
    }
}
