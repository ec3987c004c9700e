use iocscan_types::IocMatch;
use iocscan_types::names::META_SEPARATOR;

/// Split a `"key : value"` rule-meta entry.
///
/// Entries without the separator, or with an empty key, are malformed and
/// skipped by all consumers. Anything after a second separator is dropped.
pub(crate) fn split_meta(entry: &str) -> Option<(&str, &str)> {
    let mut parts = entry.split(META_SEPARATOR);
    let key = parts.next()?;
    let value = parts.next()?;
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Synthesize the natural-language summary line for one match.
///
/// Sentence per non-empty category, where a later category overwrites an
/// earlier one (last-write-wins, kept as shipped), then one sentence per
/// well-formed rule-meta entry. Newlines in meta values are stripped.
/// Pure function of the record; re-running it yields the identical string.
pub fn summary_for(m: &IocMatch) -> String {
    let mut summary = String::new();

    for category in &m.categories {
        if !category.is_empty() {
            summary = format!("The file {} has a {} match.", m.file_path, category);
        }
    }

    for entry in &m.meta {
        let Some((key, value)) = split_meta(entry) else {
            continue;
        };
        let value = value.replace('\n', "");
        if key == "description" {
            summary.push_str(&format!("The file has a rule match that {value}."));
        } else {
            summary.push_str(&format!("The matched rule file's {key} is {value}."));
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use iocscan_test_util::eicar_match;
    use iocscan_types::IocMatch;

    #[test]
    fn eicar_summary_matches_the_acceptance_string() {
        assert_eq!(
            summary_for(&eicar_match()),
            "The file /scan/eicar.com.txt has a malware match.\
             The file has a rule match that known test signature."
        );
    }

    #[test]
    fn last_non_empty_category_wins() {
        let m = IocMatch {
            categories: vec![
                "backdoor".to_string(),
                String::new(),
                "malware".to_string(),
            ],
            ..IocMatch::new("r", "/f")
        };
        assert_eq!(summary_for(&m), "The file /f has a malware match.");
    }

    #[test]
    fn non_description_meta_uses_the_attribute_sentence() {
        let m = IocMatch {
            meta: vec!["author : threat-intel".to_string()],
            ..IocMatch::new("r", "/f")
        };
        assert_eq!(
            summary_for(&m),
            "The matched rule file's author is threat-intel."
        );
    }

    #[test]
    fn malformed_meta_entries_are_skipped() {
        let m = IocMatch {
            meta: vec![
                "no separator here".to_string(),
                " : orphan value".to_string(),
            ],
            ..IocMatch::new("r", "/f")
        };
        assert_eq!(summary_for(&m), "");
    }

    #[test]
    fn newlines_in_meta_values_are_stripped() {
        let m = IocMatch {
            meta: vec!["description : line one\nline two".to_string()],
            ..IocMatch::new("r", "/f")
        };
        assert_eq!(
            summary_for(&m),
            "The file has a rule match that line oneline two."
        );
    }

    #[test]
    fn synthesis_is_idempotent() {
        let m = eicar_match();
        assert_eq!(summary_for(&m), summary_for(&m));
    }

    #[test]
    fn empty_record_yields_empty_summary() {
        assert_eq!(summary_for(&IocMatch::new("r", "/f")), "");
    }
}
