use regex::Regex;
use std::sync::LazyLock;

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid pattern"));
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid pattern"));

/// URL-safe identifier derived from a display name: lowercase ASCII letters,
/// digits and single hyphens, never starting or ending with a hyphen.
///
/// May return an empty string when `name` holds no usable characters.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = DISALLOWED.replace_all(lowered.trim(), "");
    let hyphenated = WHITESPACE.replace_all(&stripped, "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}
