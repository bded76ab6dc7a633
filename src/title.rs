//! Breadcrumb title handling.
//!
//! While the outline is under construction, breadcrumb components are
//! joined with the reserved `#|#` separator. The emitter's final
//! "beautify" pass splits on that separator and on newlines, drops
//! duplicates preserving first occurrence, and rejoins with newlines; the
//! operation is idempotent.

/// Reserved breadcrumb separator used in transient titles. Source headings
/// are not sanitised against it.
pub const TITLE_SEPARATOR: &str = "#|#";

/// Join breadcrumb components, dropping empty parts and duplicates while
/// preserving first occurrence.
pub fn distinct_title(parts: &[&str]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for part in parts {
        for component in part.split(TITLE_SEPARATOR) {
            if component.is_empty() {
                continue;
            }
            if !seen.contains(&component) {
                seen.push(component);
            }
        }
    }
    seen.join(TITLE_SEPARATOR)
}

/// Final title cleanup: split on the separator and on newlines, trim,
/// deduplicate preserving first occurrence, rejoin with newlines.
pub fn beautify_title(title: &str) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for part in title.split(TITLE_SEPARATOR) {
        for component in part.split('\n') {
            let component = component.trim();
            if component.is_empty() {
                continue;
            }
            if !seen.contains(&component) {
                seen.push(component);
            }
        }
    }
    seen.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_drops_duplicates_and_empties() {
        assert_eq!(
            distinct_title(&["Benefits", "Benefits#|#Leave", ""]),
            "Benefits#|#Leave"
        );
    }

    #[test]
    fn beautify_joins_components_with_newlines() {
        assert_eq!(
            beautify_title("Policies#|#Leave#|#Policies"),
            "Policies\nLeave"
        );
    }

    #[test]
    fn beautify_splits_embedded_newlines_too() {
        assert_eq!(
            beautify_title("Policies\nLeave#|#Leave\nAnnual"),
            "Policies\nLeave\nAnnual"
        );
    }

    #[test]
    fn beautify_is_idempotent() {
        let once = beautify_title("A#|#B\nC#|#A#|#C");
        let twice = beautify_title(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn beautify_trims_components() {
        assert_eq!(beautify_title("  Overview  \n Overview"), "Overview");
    }
}
