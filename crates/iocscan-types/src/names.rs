//! Serialized field names for the report formats.
//!
//! The file sink gets these through serde renames on the DTOs; the streaming
//! console sink writes them by hand. Keeping them in one module is what stops
//! the two formats from drifting apart.

// Match record
pub const FIELD_LAYER_ID: &str = "Image Layer ID";
pub const FIELD_RULE_NAME: &str = "Matched Rule Name";
pub const FIELD_MATCHED_PART: &str = "Matched Part";
pub const FIELD_CATEGORY: &str = "Category";
pub const FIELD_SEVERITY: &str = "Severity";
pub const FIELD_SEVERITY_SCORE: &str = "Severity Score";
pub const FIELD_FILE_NAME: &str = "Full File Name";
pub const FIELD_RULE_META: &str = "rule meta";

// Envelope
pub const FIELD_TIMESTAMP: &str = "Timestamp";
pub const FIELD_DIRECTORY_NAME: &str = "Directory Name";
pub const FIELD_IMAGE_NAME: &str = "Image Name";
pub const FIELD_IMAGE_ID: &str = "Image ID";
pub const FIELD_CONTAINER_ID: &str = "Container ID";
pub const FIELD_MATCHES: &str = "IOC";

// Console-only
pub const FIELD_SUMMARY: &str = "Summary";

/// Separator inside a `rule meta` entry (`"key : value"`).
pub const META_SEPARATOR: &str = " : ";
