/// Lowercases, drops apostrophes and turns other punctuation into spaces.
///
/// `"Schindler's List"` and `"schindlers list"` normalize identically.
pub fn normalize_title(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\'' | '\u{2019}' | '`') {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized comparison of two titles.
///
/// Titles also match when they differ only in spacing, which covers CJK
/// names split across tokens and "Spider Man" against "Spiderman".
pub fn titles_match(left: &str, right: &str) -> bool {
    let left = normalize_title(left);
    let right = normalize_title(right);
    if left.is_empty() || right.is_empty() {
        return false;
    }
    left == right || left.replace(' ', "") == right.replace(' ', "")
}

/// True when any of `names` matches any of `candidates`.
pub fn any_title_matches<'a, 'b>(
    names: &[&'a str],
    candidates: impl IntoIterator<Item = &'b str>,
) -> bool {
    candidates
        .into_iter()
        .any(|candidate| names.iter().any(|name| titles_match(name, candidate)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_possessive_and_punctuation() {
        assert_eq!(normalize_title("Schindler's  List"), "schindlers list");
        assert_eq!(normalize_title("Mission: Impossible"), "mission impossible");
        assert_eq!(normalize_title("  Ocean’s Eleven "), "oceans eleven");
    }

    #[test]
    fn spacing_is_ignored() {
        assert!(titles_match("Spider-Man", "Spiderman"));
        assert!(titles_match("权力的 游戏", "权力的游戏"));
        assert!(!titles_match("Dune", "Dune Part Two"));
    }

    #[test]
    fn empty_titles_never_match() {
        assert!(!titles_match("", ""));
        assert!(!titles_match("!!!", "???"));
    }
}
