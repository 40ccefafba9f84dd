//! Compound selectors: `*`, `tag`, `#id`, `.class` and combinations such as
//! `rect.bar` or `g#axis.x`.
//!
//! Combinators (descendant, child, sibling), attribute selectors and
//! pseudo-classes are not supported; such selectors fail to parse.

/// A parsed compound selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Selector {
    /// Parse a compound selector. Returns `None` for anything unsupported.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Selector::default();
        let mut rest = input;

        // Leading type selector or universal
        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if tag != "*" && !tag.is_empty() {
            if !is_ident(tag) {
                return None;
            }
            selector.tag = Some(tag.to_string());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if !is_ident(name) {
                return None;
            }
            match marker {
                '#' if selector.id.is_none() => selector.id = Some(name.to_string()),
                '.' => selector.classes.push(name.to_string()),
                _ => return None,
            }
            rest = &body[end..];
        }

        Some(selector)
    }

    /// Whether an element with `tag` and attribute lookup `attr` matches.
    pub fn matches<'n>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'n str>) -> bool {
        if self.tag.as_deref().is_some_and(|t| !t.eq_ignore_ascii_case(tag)) {
            return false;
        }
        if let Some(id) = &self.id {
            if attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if self.classes.is_empty() {
            return true;
        }
        let class_list = attr("class").unwrap_or("");
        self.classes
            .iter()
            .all(|class| class_list.split_ascii_whitespace().any(|c| c == class))
    }
}

fn is_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("svg", Some("svg"), None, &[])]
    #[case("*", None, None, &[])]
    #[case("#chart", None, Some("chart"), &[])]
    #[case(".bar", None, None, &["bar"])]
    #[case("rect.bar.active", Some("rect"), None, &["bar", "active"])]
    #[case("g#axis.x", Some("g"), Some("axis"), &["x"])]
    fn test_parse(
        #[case] input: &str,
        #[case] tag: Option<&str>,
        #[case] id: Option<&str>,
        #[case] classes: &[&str],
    ) {
        let selector = Selector::parse(input).unwrap();
        assert_eq!(selector.tag.as_deref(), tag);
        assert_eq!(selector.id.as_deref(), id);
        assert_eq!(selector.classes, classes);
    }

    #[rstest]
    #[case("")]
    #[case("g rect")]
    #[case("g > rect")]
    #[case("rect[width]")]
    #[case("#a#b")]
    #[case("rect.")]
    fn test_parse_rejects(#[case] input: &str) {
        assert!(Selector::parse(input).is_none());
    }

    #[test]
    fn test_matches_class_list() {
        let selector = Selector::parse("rect.bar").unwrap();
        let attrs = |name: &str| match name {
            "class" => Some("bar highlighted"),
            _ => None,
        };
        assert!(selector.matches("rect", attrs));
        assert!(!selector.matches("circle", attrs));
        assert!(!Selector::parse(".other").unwrap().matches("rect", attrs));
    }
}
