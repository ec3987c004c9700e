use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One detected IOC occurrence.
///
/// Serialization is sparse: empty optional fields are omitted entirely
/// rather than emitted as `""`/`0`. The exception is `meta`, which is always
/// present (possibly as an empty list) because downstream ingestion keys on
/// it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IocMatch {
    /// Container image layer the file was found in; empty for directory scans.
    #[serde(
        rename = "Image Layer ID",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub layer_id: String,

    #[serde(rename = "Matched Rule Name")]
    pub rule_name: String,

    /// Literal substrings that triggered the match.
    #[serde(rename = "Matched Part", default, skip_serializing_if = "Vec::is_empty")]
    pub matched_strings: Vec<String>,

    /// Classification tags of the matched rule.
    #[serde(rename = "Category", default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    #[serde(rename = "Severity", default, skip_serializing_if = "String::is_empty")]
    pub severity: String,

    #[serde(
        rename = "Severity Score",
        default,
        skip_serializing_if = "score_is_zero"
    )]
    pub severity_score: f64,

    #[serde(rename = "Full File Name")]
    pub file_path: String,

    /// Free-form rule metadata as `"key : value"` entries.
    #[serde(rename = "rule meta", default)]
    pub meta: Vec<String>,
}

fn score_is_zero(score: &f64) -> bool {
    *score == 0.0
}

impl IocMatch {
    /// A record with only the two required fields set.
    pub fn new(rule_name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            layer_id: String::new(),
            rule_name: rule_name.into(),
            matched_strings: Vec::new(),
            categories: Vec::new(),
            severity: String::new(),
            severity_score: 0.0,
            file_path: file_path.into(),
            meta: Vec::new(),
        }
    }

    /// A record is well-formed only with a rule name and a file path.
    pub fn is_valid(&self) -> bool {
        !self.rule_name.is_empty() && !self.file_path.is_empty()
    }
}

/// Identity of what was scanned.
///
/// One tagged variant consumed by a single serialization path; the two
/// shapes share everything else in the envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ScanTarget {
    Image {
        #[serde(rename = "Image Name")]
        image_name: String,
        #[serde(rename = "Image ID")]
        image_id: String,
        /// Only set when scanning a running container, not a static image.
        #[serde(
            rename = "Container ID",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        container_id: Option<String>,
    },
    Directory {
        #[serde(rename = "Directory Name")]
        directory_name: String,
    },
}

impl ScanTarget {
    pub fn directory(name: impl Into<String>) -> Self {
        ScanTarget::Directory {
            directory_name: name.into(),
        }
    }

    pub fn image(name: impl Into<String>, id: impl Into<String>) -> Self {
        ScanTarget::Image {
            image_name: name.into(),
            image_id: id.into(),
            container_id: None,
        }
    }
}

/// The per-scan envelope: identity metadata plus the ordered match list.
///
/// Constructed once per scan invocation; the timestamp is stamped at
/// creation and the identity fields are fixed before any matches are
/// appended. Sinks receive it by reference and must not mutate it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScanReport {
    #[serde(rename = "Timestamp", with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub timestamp: OffsetDateTime,

    #[serde(flatten)]
    pub target: ScanTarget,

    #[serde(rename = "IOC", default)]
    pub matches: Vec<IocMatch>,
}

impl ScanReport {
    pub fn new(target: ScanTarget) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            target,
            matches: Vec::new(),
        }
    }

    pub fn push(&mut self, m: IocMatch) {
        self.matches.push(m);
    }
}
