//! Compact selector queries.
//!
//! Grammar (fragments in any order):
//!
//! ```text
//! [tag] ['#'id] ('.'class)* ('['attr('='value)?']')*
//! ```
//!
//! Parsing never fails. Fragments are extracted from a working copy of the
//! selector in a fixed order, each one removed before the next stage runs:
//!
//! 1. the first `#id`
//! 2. every `.class`
//! 3. every `[attr]` / `[attr=value]` (value quotes stripped)
//! 4. the trimmed remainder is the tag, empty meaning "any tag"
//!
//! `#` and `.` inside brackets belong to the attribute fragment, so
//! `[fill=#f00]` and `[opacity=0.5]` stay attribute constraints. Anything that
//! does not form a valid fragment is left in place and ends up in the tag.

use std::fmt;
use std::ops::Range;

use crate::utils::xml::is_name_char;

/// Structured form of a selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorQuery {
    /// Tag name; `None` matches any tag.
    pub tag: Option<String>,
    pub id: Option<String>,
    /// Every class must be present on a match.
    pub classes: Vec<String>,
    /// Attribute constraints in selector order. `None` checks existence only.
    pub attributes: Vec<(String, Option<String>)>,
}

impl SelectorQuery {
    /// Parse selector text.
    pub fn parse(selector: &str) -> Self {
        let mut text = selector.to_string();
        let mut query = Self::default();

        if let Some((range, name)) = find_prefixed(&text, '#') {
            text.replace_range(range, "");
            query.id = Some(name);
        }

        while let Some((range, name)) = find_prefixed(&text, '.') {
            text.replace_range(range, "");
            if !query.classes.contains(&name) {
                query.classes.push(name);
            }
        }

        while let Some((range, name, value)) = find_attribute(&text) {
            text.replace_range(range, "");
            match query.attributes.iter_mut().find(|(existing, _)| *existing == name) {
                Some(entry) => entry.1 = value,
                None => query.attributes.push((name, value)),
            }
        }

        let tag = text.trim();
        if !tag.is_empty() {
            query.tag = Some(tag.to_string());
        }
        query
    }

    /// True when the query has no constraints at all.
    pub fn is_wildcard(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }
}

impl fmt::Display for SelectorQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for (name, value) in &self.attributes {
            match value {
                Some(value) => write!(f, "[{name}=\"{value}\"]")?,
                None => write!(f, "[{name}]")?,
            }
        }
        if self.is_wildcard() {
            f.write_str("*")?;
        }
        Ok(())
    }
}

/// Find the first `sigil` + name fragment outside brackets.
fn find_prefixed(text: &str, sigil: char) -> Option<(Range<usize>, String)> {
    let mut in_brackets = false;
    for (start, c) in text.char_indices() {
        match c {
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            c if c == sigil && !in_brackets => {
                let rest = &text[start + c.len_utf8()..];
                let len = rest.find(|c| !is_name_char(c)).unwrap_or(rest.len());
                if len > 0 {
                    let end = start + c.len_utf8() + len;
                    return Some((start..end, rest[..len].to_string()));
                }
            }
            _ => {}
        }
    }
    None
}

/// Find the first well-formed `[name]` or `[name=value]` fragment.
fn find_attribute(text: &str) -> Option<(Range<usize>, String, Option<String>)> {
    let mut from = 0;
    while let Some(offset) = text[from..].find('[') {
        let open = from + offset;
        let close = open + text[open..].find(']')?;
        let inner = &text[open + 1..close];

        let (name, value) = match inner.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (inner, None),
        };
        let name_ok = !name.is_empty() && name.chars().all(|c| is_name_char(c) || c == ':');
        let value_ok = value.is_none_or(|value| !value.is_empty());

        if name_ok && value_ok {
            let value = value.map(|value| strip_quotes(value).to_string());
            return Some((open..close + 1, name.to_string(), value));
        }
        from = open + 1;
    }
    None
}

/// Strip one pair of matching `"` or `'` quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_parse_tag_only() {
        let query = SelectorQuery::parse("circle");
        assert_eq!(query.tag.as_deref(), Some("circle"));
        assert_eq!(query.id, None);
        assert!(query.classes.is_empty());
        assert!(query.attributes.is_empty());
    }

    #[test]
    fn test_parse_full_selector() {
        let query = SelectorQuery::parse(r#"rect#hero.big.red[fill="blue"][data-x]"#);
        assert_eq!(query.tag.as_deref(), Some("rect"));
        assert_eq!(query.id.as_deref(), Some("hero"));
        assert_eq!(query.classes, ["big", "red"]);
        assert_eq!(
            query.attributes,
            attrs(&[("fill", Some("blue")), ("data-x", None)])
        );
    }

    #[test]
    fn test_fragments_in_any_order() {
        let query = SelectorQuery::parse("[stroke='black'].a#b path");
        assert_eq!(query.tag.as_deref(), Some("path"));
        assert_eq!(query.id.as_deref(), Some("b"));
        assert_eq!(query.classes, ["a"]);
        assert_eq!(query.attributes, attrs(&[("stroke", Some("black"))]));
    }

    #[test]
    fn test_quotes_are_optional() {
        for selector in ["[fill=red]", "[fill=\"red\"]", "[fill='red']"] {
            let query = SelectorQuery::parse(selector);
            assert_eq!(query.attributes, attrs(&[("fill", Some("red"))]), "{selector}");
            assert_eq!(query.tag, None);
        }
    }

    #[test]
    fn test_sigils_inside_brackets_stay_in_value() {
        let query = SelectorQuery::parse("rect[fill=#ff0000][opacity=0.5]");
        assert_eq!(query.id, None);
        assert!(query.classes.is_empty());
        assert_eq!(
            query.attributes,
            attrs(&[("fill", Some("#ff0000")), ("opacity", Some("0.5"))])
        );
    }

    #[test]
    fn test_namespaced_attribute_name() {
        let query = SelectorQuery::parse("use[xlink:href='#icon']");
        assert_eq!(query.tag.as_deref(), Some("use"));
        assert_eq!(query.attributes, attrs(&[("xlink:href", Some("#icon"))]));
    }

    #[test]
    fn test_empty_selector_is_wildcard() {
        assert!(SelectorQuery::parse("").is_wildcard());
        assert!(SelectorQuery::parse("   ").is_wildcard());
    }

    #[test]
    fn test_malformed_fragments_degrade() {
        // Lone sigils carry no constraint and stay in the tag text.
        let query = SelectorQuery::parse("#");
        assert_eq!(query.id, None);
        assert_eq!(query.tag.as_deref(), Some("#"));

        // Unclosed bracket is not an attribute fragment.
        let query = SelectorQuery::parse("rect[fill");
        assert!(query.attributes.is_empty());
        assert_eq!(query.tag.as_deref(), Some("rect[fill"));

        // Empty value is not an attribute fragment either.
        let query = SelectorQuery::parse("[fill=]");
        assert!(query.attributes.is_empty());
    }

    #[test]
    fn test_only_first_id_is_extracted() {
        let query = SelectorQuery::parse("#a#b");
        assert_eq!(query.id.as_deref(), Some("a"));
        assert_eq!(query.tag.as_deref(), Some("#b"));
    }

    #[test]
    fn test_duplicate_fragments_collapse() {
        let query = SelectorQuery::parse(".a.a[x=1][x=2]");
        assert_eq!(query.classes, ["a"]);
        assert_eq!(query.attributes, attrs(&[("x", Some("2"))]));
    }

    #[test]
    fn test_display_is_canonical() {
        let query = SelectorQuery::parse("[fill=red].b#a rect");
        assert_eq!(query.to_string(), r#"rect#a.b[fill="red"]"#);
        assert_eq!(SelectorQuery::parse("").to_string(), "*");
    }
}
