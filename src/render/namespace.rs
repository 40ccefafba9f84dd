//! Namespace table - which tags are created as HTML elements.
//!
//! Tags not listed here are created in the scene's default namespace
//! (SVG unless configured otherwise). `a`, `script`, `style` and `title`
//! exist in both vocabularies and stay with the default.

use crate::types::Namespace;

/// Tag names created in the XHTML namespace.
pub const HTML_TAGS: &[&str] = &[
    "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col",
    "colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt",
    "em", "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins",
    "kbd", "label", "legend", "li", "link", "main", "map", "mark", "menu", "meta", "meter",
    "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p", "param", "picture",
    "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp", "section", "select", "slot",
    "small", "source", "span", "strong", "sub", "summary", "sup", "table", "tbody", "td",
    "template", "textarea", "tfoot", "th", "thead", "time", "tr", "track", "u", "ul", "var",
    "video", "wbr",
];

/// Namespace for creating `tag`, falling back to `default` for unlisted tags.
pub fn namespace_for(tag: &str, default: Namespace) -> Namespace {
    if HTML_TAGS.contains(&tag) {
        Namespace::Xhtml
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("div", Namespace::Xhtml)]
    #[case("span", Namespace::Xhtml)]
    #[case("table", Namespace::Xhtml)]
    #[case("rect", Namespace::Svg)]
    #[case("g", Namespace::Svg)]
    #[case("title", Namespace::Svg)]
    #[case("custom-widget", Namespace::Svg)]
    fn test_namespace_for(#[case] tag: &str, #[case] expected: Namespace) {
        assert_eq!(namespace_for(tag, Namespace::Svg), expected);
    }

    #[test]
    fn test_default_applies_to_unlisted() {
        assert_eq!(namespace_for("circle", Namespace::Xhtml), Namespace::Xhtml);
    }
}
