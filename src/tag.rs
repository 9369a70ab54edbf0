//! Release tag sanitization.

/// Longest tag we ever produce.
pub const MAX_TAG_LEN: usize = 100;

/// Map a package name and version to a tag safe for git refs and release URLs.
///
/// Characters outside `[A-Za-z0-9._-]` become `-`, runs of `-` collapse,
/// leading/trailing `.` and `-` are stripped, and the result is capped at
/// [`MAX_TAG_LEN`]. The function is idempotent on its own output.
///
/// Distinct inputs can map to the same tag (`@a/b` and `a-b`); callers that
/// care must detect that themselves.
pub fn sanitize(name: &str, version: &str) -> String {
    sanitize_raw(&format!("{name}-{version}"))
}

/// Sanitize an already-joined string. `sanitize(n, v) == sanitize_raw("{n}-{v}")`.
pub fn sanitize_raw(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }

    let trimmed = trim_edges(&out);
    // All remaining chars are ASCII, so byte truncation is char-safe.
    let capped = &trimmed[..trimmed.len().min(MAX_TAG_LEN)];
    trim_edges(capped).to_string()
}

fn trim_edges(s: &str) -> &str {
    s.trim_matches(|c| c == '.' || c == '-')
}

/// Whether `tag` is already in sanitized form.
pub fn is_valid(tag: &str) -> bool {
    !tag.is_empty()
        && tag.len() <= MAX_TAG_LEN
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && !tag.starts_with(['.', '-'])
        && !tag.ends_with(['.', '-'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_package() {
        assert_eq!(sanitize("cypress", "13.6.0"), "cypress-13.6.0");
    }

    #[test]
    fn test_scoped_package() {
        assert_eq!(sanitize("@types/node", "20.1.0"), "types-node-20.1.0");
    }

    #[test]
    fn test_collapses_and_strips() {
        assert_eq!(sanitize("--weird  name", "1.0.0+build"), "weird-name-1.0.0-build");
        assert_eq!(sanitize(".hidden", "1.0."), "hidden-1.0");
        assert_eq!(sanitize_raw("-.-a-.-"), "a");
    }

    #[test]
    fn test_truncates_to_limit() {
        let long = "a".repeat(150);
        let tag = sanitize(&long, "1.0.0");
        assert_eq!(tag.len(), MAX_TAG_LEN);
        assert!(is_valid(&tag));
    }

    #[test]
    fn test_truncation_does_not_leave_trailing_separator() {
        let name = format!("{}-x", "a".repeat(99));
        let tag = sanitize(&name, "1");
        assert_eq!(tag, "a".repeat(99));
        assert!(is_valid(&tag));
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(sanitize(".", "."), "");
        assert!(!is_valid(""));
    }

    #[test]
    fn test_idempotent_and_valid_over_samples() {
        let samples = [
            "cypress-13.6.0",
            "@scope/pkg-^1.2.3",
            "ñandú-1.0",
            "a//b\\\\c--d..e",
            "---",
            "...leading.dots...",
            "emoji-🚀-2.0.0",
            "tab\tand\nnewline-1",
            "UPPER_lower-0.0.1-beta.1",
            &"x-".repeat(80),
            &"é".repeat(120),
        ];
        for s in samples {
            let once = sanitize_raw(s);
            assert_eq!(sanitize_raw(&once), once, "not idempotent for {s:?}");
            if !once.is_empty() {
                assert!(is_valid(&once), "invalid output {once:?} for {s:?}");
            }
        }
    }
}
