//! Filename construction for downloaded records
//!
//! Output filenames double as manifest field values, so they must be free of
//! path separators and CSV-hostile characters. The record and parent ids are
//! embedded verbatim to keep the mapping back to the org auditable.

/// Characters stripped from titles before they become part of a filename
const BLACKLIST: &[char] = &[';', ':', '!', '*', '/', '\\', ' ', ',', '?', '>', '<'];

/// Build the output filename for a record.
///
/// Strips blacklisted characters from `title`, then composes
/// `<title>-ID-<record_id>-ParentId-<parent_id>`. Deterministic, no length
/// cap, and always returns a string even when the title sanitizes to empty.
/// Two records sharing the same sanitized title, id, and parent id text will
/// collide; callers accept that risk.
pub fn build_filename(title: &str, record_id: &str, parent_id: &str) -> String {
    let clean_title: String = title.chars().filter(|c| !BLACKLIST.contains(c)).collect();
    format!("{clean_title}-ID-{record_id}-ParentId-{parent_id}")
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_every_blacklisted_character() {
        let title = "a;b:c!d*e/f\\g h,i?j>k<l";
        let name = build_filename(title, "A1", "P1");
        for c in BLACKLIST {
            assert!(!name.contains(*c), "blacklisted char {c:?} survived in {name}");
        }
        assert_eq!(name, "abcdefghijkl-ID-A1-ParentId-P1");
    }

    #[test]
    fn ids_appear_verbatim() {
        let name = build_filename("Invoice 1", "00P5g00000abcde", "0015g00000fghij");
        assert!(name.contains("-ID-00P5g00000abcde"));
        assert!(name.ends_with("-ParentId-0015g00000fghij"));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let a = build_filename("Report, Q1", "A2", "P1");
        let b = build_filename("Report, Q1", "A2", "P1");
        assert_eq!(a, b);
        assert_eq!(a, "ReportQ1-ID-A2-ParentId-P1");
    }

    #[test]
    fn empty_title_still_yields_a_name() {
        assert_eq!(build_filename("", "A3", "P2"), "-ID-A3-ParentId-P2");
        assert_eq!(build_filename("?? ", "A3", "P2"), "-ID-A3-ParentId-P2");
    }

    #[test]
    fn unicode_titles_pass_through() {
        let name = build_filename("Ångström déjà", "A4", "P2");
        assert_eq!(name, "Ångströmdéjà-ID-A4-ParentId-P2");
    }
}
