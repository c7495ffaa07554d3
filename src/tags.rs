//! Tag parsing and normalization

use std::collections::HashSet;

/// Parse a comma separated tag list typed by the user.
///
/// Tags are trimmed, empty entries dropped, duplicates removed keeping the
/// first occurrence.
pub fn parse_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(',').map(|tag| tag.trim().to_string()))
}

/// Drop empty and duplicate tags, keeping first-seen order.
pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_trims_and_dedups() {
        assert_eq!(parse_tags(" git, ops ,git"), vec!["git", "ops"]);
    }

    #[test]
    fn test_parse_tags_drops_empty_entries() {
        assert_eq!(parse_tags("a,, ,b,"), vec!["a", "b"]);
        assert!(parse_tags("   ").is_empty());
    }

    #[test]
    fn test_parse_tags_keeps_inner_spaces() {
        assert_eq!(parse_tags("daily backup"), vec!["daily backup"]);
    }

    #[test]
    fn test_normalize_tags_keeps_first_seen_order() {
        let tags = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(normalize_tags(tags), vec!["b", "a"]);
    }
}
