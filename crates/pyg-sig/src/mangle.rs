//! Python identifiers to Go identifiers
//!
//! `snake_case` becomes `CamelCase` by upper-casing the first letter of each
//! `_`-separated segment; one segment may be left as-is so parameter names
//! stay unexported (`foo_bar` -> `fooBar`).

/// Go keywords; a mangled name equal to one of these gets a trailing `_`
pub const RESERVED_WORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Which segment keeps its original case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    /// Capitalize every segment (exported top-level names)
    None,
    /// Leave the segment at this index untouched
    Segment(usize),
}

pub fn mangle(name: &str, keep: Keep) -> String {
    let mut out = String::with_capacity(name.len() + 1);

    for (i, part) in name.split('_').enumerate() {
        if keep == Keep::Segment(i) {
            out.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(if first.is_ascii_lowercase() {
                first.to_ascii_uppercase()
            } else {
                first
            });
            out.push_str(chars.as_str());
        }
    }

    if out.is_empty() || RESERVED_WORDS.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::mangle::*;

    #[test]
    fn test_full_mangle() {
        assert_eq!(mangle("foo_bar", Keep::None), "FooBar");
        assert_eq!(mangle("add", Keep::None), "Add");
        assert_eq!(mangle("as_strided", Keep::None), "AsStrided");
        assert_eq!(mangle("fft2", Keep::None), "Fft2");
    }

    #[test]
    fn test_first_segment_kept() {
        assert_eq!(mangle("foo_bar", Keep::Segment(0)), "fooBar");
        assert_eq!(mangle("x", Keep::Segment(0)), "x");
        assert_eq!(mangle("axis_name_hint", Keep::Segment(0)), "axisNameHint");
    }

    #[test]
    fn test_only_lowercase_leading_letters_change() {
        assert_eq!(mangle("isNaN", Keep::None), "IsNaN");
        assert_eq!(mangle("Tensor_add", Keep::None), "TensorAdd");
        assert_eq!(mangle("f_2d", Keep::None), "F2d");
        assert_eq!(mangle("café_ü", Keep::None), "Caféü");
    }

    #[test]
    fn test_separators_are_dropped() {
        assert_eq!(mangle("a__b", Keep::None), "AB");
        assert_eq!(mangle("trailing_", Keep::None), "Trailing");
    }

    #[test]
    fn test_reserved_words() {
        assert_eq!(mangle("range", Keep::Segment(0)), "range_");
        assert_eq!(mangle("type", Keep::Segment(0)), "type_");
        assert_eq!(mangle("default", Keep::Segment(0)), "default_");
        assert_eq!(mangle("range", Keep::None), "Range");
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(mangle("", Keep::None), "_");
        assert_eq!(mangle("", Keep::Segment(0)), "_");
        assert_eq!(mangle("__", Keep::None), "_");
    }

    #[test]
    fn test_deterministic() {
        let first = mangle("log_softmax", Keep::None);
        let second = mangle("log_softmax", Keep::None);
        assert_eq!(first, second);
    }
}
