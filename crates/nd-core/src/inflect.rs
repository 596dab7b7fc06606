//! Name inflection for project collections, titles, and file names.
//!
//! Collection names follow the `ActiveSupport` conventions the source database
//! was created with: `tableize("galaxy_zoo_subject") == "galaxy_zoo_subjects"`.
//! Only the pluralization rules that occur in collection-name suffixes are
//! implemented; irregular nouns are not.

/// Convert `CamelCase`/dashed input into `snake_case`.
///
/// Spaces are preserved, matching `String#underscore`.
#[must_use]
pub fn underscore(input: &str) -> String {
    let chars: Vec<char> = input.replace("::", "/").chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary {
                out.push('_');
            }
        }
        if ch == '-' {
            out.push('_');
        } else {
            out.push(ch.to_ascii_lowercase());
        }
    }

    out
}

/// Pluralize the last word of `input`.
#[must_use]
pub fn pluralize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let lower = input.to_ascii_lowercase();
    if lower.ends_with("status") || lower.ends_with("alias") {
        return format!("{input}es");
    }
    if ["ss", "sh", "ch", "x", "z"].iter().any(|s| lower.ends_with(s)) {
        return format!("{input}es");
    }
    if lower.ends_with('s') {
        return input.to_string();
    }
    if let Some(stem) = lower.strip_suffix('y') {
        let before = stem.chars().last();
        let consonant = before.is_some_and(|c| !"aeiou".contains(c));
        if consonant || stem.ends_with("qu") {
            return format!("{}ies", &input[..input.len() - 1]);
        }
    }
    format!("{input}s")
}

/// `ActiveSupport` `tableize`: underscore then pluralize.
#[must_use]
pub fn tableize(input: &str) -> String {
    pluralize(&underscore(input))
}

/// Human-readable title: `galaxy_zoo` -> `Galaxy Zoo`.
#[must_use]
pub fn titleize(input: &str) -> String {
    let underscored = underscore(input);
    let humanized = underscored
        .strip_suffix("_id")
        .unwrap_or(&underscored)
        .replace('_', " ");

    let mut out = String::with_capacity(humanized.len());
    let mut at_word_start = true;
    for ch in humanized.trim().chars() {
        if at_word_start && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace() || ch == '-';
    }
    out
}

/// Make a name safe to use as a single path segment.
///
/// Keeps ASCII alphanumerics, `.`, `-`, `_`; collapses every other run of
/// characters into a single `_`. A result made only of dots has them
/// replaced by `_`.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_underscore = false;

    for ch in input.chars() {
        let keep = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_';
        if keep {
            out.push(ch);
            prev_underscore = ch == '_';
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    let slug = out.trim_matches('_');
    if slug.is_empty() {
        return "_".to_string();
    }
    // `.` and `..` would resolve to an existing directory.
    if slug.chars().all(|c| c == '.') {
        return "_".repeat(slug.len());
    }
    slug.to_string()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("galaxy_zoo_subject", "galaxy_zoo_subjects")]
    #[case("galaxy_zoo_group", "galaxy_zoo_groups")]
    #[case("galaxy_zoo_classification", "galaxy_zoo_classifications")]
    #[case("PlanetHunter_subject", "planet_hunter_subjects")]
    #[case("cyclone-center_group", "cyclone_center_groups")]
    #[case("sea_floor_discovery", "sea_floor_discoveries")]
    #[case("sunspot_box", "sunspot_boxes")]
    #[case("project_status", "project_statuses")]
    fn tableize_matches_active_support(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(tableize(input), expected);
    }

    #[rstest]
    #[case("galaxy_zoo", "Galaxy Zoo")]
    #[case("GalaxyZoo", "Galaxy Zoo")]
    #[case("Galaxy Zoo", "Galaxy Zoo")]
    #[case("planet_four_id", "Planet Four")]
    #[case("serengeti", "Serengeti")]
    fn titleize_matches_active_support(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(titleize(input), expected);
    }

    #[test]
    fn underscore_preserves_spaces() {
        assert_eq!(underscore("Galaxy Zoo"), "galaxy zoo");
        assert_eq!(underscore("HTTPServer"), "http_server");
    }

    #[test]
    fn slugify_collapses_unsafe_runs() {
        assert_eq!(slugify("Galaxy Zoo"), "Galaxy_Zoo");
        assert_eq!(slugify("a / b"), "a_b");
        assert_eq!(slugify("  "), "_");
        assert_eq!(slugify("already_safe-1.0"), "already_safe-1.0");
    }

    #[rstest]
    #[case(".", "_")]
    #[case("..", "__")]
    #[case(" .. ", "__")]
    #[case("../etc", ".._etc")]
    #[case(".hidden", ".hidden")]
    fn slugify_never_yields_a_relative_segment(#[case] input: &str, #[case] expected: &str) {
        let slug = slugify(input);
        assert_eq!(slug, expected);
        assert_ne!(slug, ".");
        assert_ne!(slug, "..");
        assert!(!slug.contains('/'));
    }
}
