//! Anchor slugs for headings

/// Convert a heading title into a link-safe anchor
///
/// Lower-cases, collapses every run of non-alphanumeric characters into a
/// single `-`, and trims leading and trailing hyphens. Distinct titles may
/// produce the same slug; that is reported by the validator, never resolved
/// here.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("1. Eliminating Waterfalls"), "1-eliminating-waterfalls");
        assert_eq!(
            slugify("Promise.all() for Independent Operations"),
            "promise-all-for-independent-operations"
        );
        assert_eq!(slugify("  --Leading & trailing!!  "), "leading-trailing");
        assert_eq!(slugify("Use `useMemo` (Sparingly)"), "use-usememo-sparingly");
    }

    #[test]
    fn test_slugify_degenerate() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_distinct_titles_can_collide() {
        assert_eq!(slugify("Avoid Barrel Files"), slugify("avoid barrel-files?"));
    }

    #[test]
    fn test_slugify_keeps_non_ascii_letters() {
        assert_eq!(slugify("Größe ändern"), "größe-ändern");
    }
}
