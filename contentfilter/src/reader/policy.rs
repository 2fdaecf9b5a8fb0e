//! Allow lists for sanitized XHTML.
//!
//! Attribute rules are written as `element.attribute`; `*` matches any
//! element and an attribute of `-` strips every attribute of that element.

use std::sync::LazyLock;

use quick_xml::name::ResolveResult;
use url::Url;

/// Namespace of XHTML elements.
pub const XHTML_NAMESPACE: &[u8] = b"http://www.w3.org/1999/xhtml";

/// Elements that survive sanitization.
pub const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "address", "bdo", "big", "blockquote", "body", "br", "caption", "cite",
    "code", "colgroup", "dd", "del", "dfn", "div", "dl", "dt", "em", "h1", "h2", "h3", "h4", "h5",
    "h6", "hr", "html", "img", "ins", "kbd", "li", "ol", "p", "pre", "q", "samp", "small", "span",
    "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "tt", "ul", "var",
];

/// Presentational elements and their semantic replacements.
pub const REPLACED_TAGS: &[(&str, &str)] = &[
    ("b", "strong"),
    ("i", "em"),
    ("s", "del"),
    ("strike", "del"),
    ("u", "em"),
];

/// Attributes that survive sanitization.
pub const ALLOWED_ATTRIBUTES: &[&str] = &[
    "*.dir", "*.lang", "*.title", "a.href", "a.charset", "a.hreflang", "a.type",
    "blockquote.cite", "body.-", "colgroup.align", "colgroup.char", "colgroup.charoff",
    "colgroup.span", "colgroup.valign", "colgroup.width", "del.cite", "del.datetime", "html.-",
    "img.alt", "img.src", "img.height", "img.longdesc", "img.width", "ins.cite", "ins.datetime",
    "pre.width", "q.cite", "table.border", "table.cellpadding", "table.cellspacing",
    "table.frame", "table.rules", "table.summary", "table.width", "tbody.align", "tbody.char",
    "tbody.charoff", "tbody.valign", "td.abbr", "td.align", "td.axis", "td.char", "td.charoff",
    "td.colspan", "td.headers", "td.rowspan", "td.scope", "td.valign", "tfoot.align",
    "tfoot.char", "tfoot.charoff", "tfoot.valign", "th.abbr", "th.align", "th.axis", "th.char",
    "th.charoff", "th.colspan", "th.headers", "th.rowspan", "th.scope", "th.valign",
    "thead.align", "thead.char", "thead.charoff", "thead.valign", "tr.align", "tr.char",
    "tr.charoff", "tr.valign",
];

/// Attributes whose values are URLs and must be checked.
pub const URL_ATTRIBUTES: &[&str] = &[
    "*.href", "*.src", "*.cite", "*.xmlns", "body.background", "form.action", "frame.longdesc",
    "head.profile", "img.ismap", "img.longdesc", "img.usemap", "object.archive",
    "object.codebase", "object.data", "object.usemap",
];

/// URL schemes that may appear in sanitized links.
pub const ALLOWED_PROTOCOLS: &[&str] = &["http", "https", "ftp", "mailto"];

/// Every element of the XHTML 1.0 Transitional vocabulary.
pub const XHTML_TRANSITIONAL_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "address", "applet", "area", "b", "base", "basefont", "bdo", "big",
    "blockquote", "body", "br", "button", "caption", "center", "cite", "code", "col", "colgroup",
    "dd", "del", "dfn", "dir", "div", "dl", "dt", "em", "fieldset", "font", "form", "h1", "h2",
    "h3", "h4", "h5", "h6", "head", "hr", "html", "i", "iframe", "img", "input", "ins",
    "isindex", "kbd", "label", "legend", "li", "link", "map", "menu", "meta", "noframes",
    "noscript", "object", "ol", "optgroup", "option", "p", "param", "pre", "q", "s", "samp",
    "script", "select", "small", "span", "strike", "strong", "style", "sub", "sup", "table",
    "tbody", "td", "textarea", "tfoot", "th", "thead", "title", "tr", "tt", "u", "ul", "var",
];

/// Context relative URLs are resolved against before their scheme is checked.
static URL_CONTEXT: LazyLock<Url> = LazyLock::new(|| match Url::parse("http://localhost/") {
    Ok(url) => url,
    Err(err) => panic!("Invalid URL context: {err}"),
});

/// Canonical (lowercase, de-presentational) name of an element.
#[must_use]
pub fn canonical_element(local_name: &str) -> String {
    let lower = local_name.to_ascii_lowercase();
    REPLACED_TAGS
        .iter()
        .find(|(from, _)| *from == lower)
        .map_or(lower, |(_, to)| (*to).to_owned())
}

/// Whether the element survives sanitization.
#[must_use]
pub fn is_allowed_element(element: &str) -> bool {
    ALLOWED_TAGS.contains(&element)
}

fn rule_matches(rules: &[&str], element: &str, attribute: &str) -> bool {
    rules.iter().any(|rule| match rule.split_once('.') {
        Some(("*", att)) => att == attribute,
        Some((el, att)) => el == element && att == attribute,
        None => false,
    })
}

/// Whether `attribute` may be kept on `element`.
#[must_use]
pub fn is_allowed_attribute(element: &str, attribute: &str) -> bool {
    if rule_matches(ALLOWED_ATTRIBUTES, element, "-") {
        return false;
    }
    rule_matches(ALLOWED_ATTRIBUTES, element, attribute)
}

/// Whether the value of `attribute` on `element` is a URL.
#[must_use]
pub fn is_url_attribute(element: &str, attribute: &str) -> bool {
    rule_matches(URL_ATTRIBUTES, element, attribute)
}

/// Whether `value` resolves to a URL with an allowed scheme.
#[must_use]
pub fn is_safe_url(value: &str) -> bool {
    match URL_CONTEXT.join(value) {
        Ok(url) => {
            if ALLOWED_PROTOCOLS.contains(&url.scheme()) {
                true
            } else {
                tracing::warn!(protocol = url.scheme(), "Invalid protocol");
                false
            }
        }
        Err(err) => {
            tracing::warn!(url = value, error = %err, "Malformed URL");
            false
        }
    }
}

/// Whether `element` belongs to the XHTML 1.0 Transitional vocabulary.
#[must_use]
pub fn is_xhtml_element(element: &str) -> bool {
    XHTML_TRANSITIONAL_ELEMENTS.contains(&element)
}

/// The namespace an element or attribute name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameBinding {
    /// The XHTML namespace.
    Xhtml,
    /// Some other declared namespace.
    Foreign(String),
    /// No namespace (unprefixed, no default namespace in scope).
    Unbound,
    /// A prefix with no declaration in scope.
    UnknownPrefix(String),
}

impl NameBinding {
    /// Take ownership of a parser resolution result.
    #[must_use]
    pub fn from_resolved(result: &ResolveResult<'_>) -> Self {
        match result {
            ResolveResult::Bound(ns) if ns.as_ref() == XHTML_NAMESPACE => Self::Xhtml,
            ResolveResult::Bound(ns) => {
                Self::Foreign(String::from_utf8_lossy(ns.as_ref()).into_owned())
            }
            ResolveResult::Unbound => Self::Unbound,
            ResolveResult::Unknown(prefix) => {
                Self::UnknownPrefix(String::from_utf8_lossy(prefix).into_owned())
            }
        }
    }

    /// Message for a prefixed name whose prefix was never declared.
    #[must_use]
    pub fn unbound_prefix_message(prefix: &str, kind: &str, qname: &str) -> String {
        format!("The prefix \"{prefix}\" for {kind} \"{qname}\" is not bound")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_element() {
        assert_eq!(canonical_element("B"), "strong");
        assert_eq!(canonical_element("strike"), "del");
        assert_eq!(canonical_element("DIV"), "div");
    }

    #[test]
    fn test_global_attributes() {
        assert!(is_allowed_attribute("span", "title"));
        assert!(is_allowed_attribute("p", "lang"));
        assert!(!is_allowed_attribute("span", "onclick"));
    }

    #[test]
    fn test_element_specific_attributes() {
        assert!(is_allowed_attribute("del", "datetime"));
        assert!(!is_allowed_attribute("span", "datetime"));
    }

    #[test]
    fn test_stripped_elements_lose_all_attributes() {
        assert!(!is_allowed_attribute("body", "title"));
        assert!(!is_allowed_attribute("html", "lang"));
    }

    #[test]
    fn test_url_attributes() {
        assert!(is_url_attribute("a", "href"));
        assert!(is_url_attribute("img", "longdesc"));
        assert!(!is_url_attribute("img", "alt"));
    }

    #[test]
    fn test_safe_urls() {
        assert!(is_safe_url("http://localhost/"));
        assert!(is_safe_url("relative/page.html"));
        assert!(is_safe_url("mailto:someone@example.com"));
        assert!(!is_safe_url("gopher://localhost/"));
        assert!(!is_safe_url("badproto:test"));
        assert!(!is_safe_url("javascript:alert(1)"));
    }

    #[test]
    fn test_name_binding() {
        use quick_xml::name::Namespace;

        assert_eq!(
            NameBinding::from_resolved(&ResolveResult::Bound(Namespace(XHTML_NAMESPACE))),
            NameBinding::Xhtml
        );
        assert_eq!(
            NameBinding::from_resolved(&ResolveResult::Bound(Namespace(b"urn:other"))),
            NameBinding::Foreign("urn:other".to_owned())
        );
        assert_eq!(
            NameBinding::from_resolved(&ResolveResult::Unknown(b"x".to_vec())),
            NameBinding::UnknownPrefix("x".to_owned())
        );
    }
}
