//! XML text helpers.
//!
//! - `escape_attr()` - escape a value for a double-quoted attribute
//! - `is_name_char()` - characters allowed in selector names

use std::borrow::Cow;

/// Characters that require escaping inside a double-quoted attribute value.
const ATTR_ESCAPE_CHARS: [char; 3] = ['<', '&', '"'];

/// Get the XML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        _ => None,
    }
}

/// Escape a value for writing between double quotes.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape_attr(r#"a "b" & c"#), "a &quot;b&quot; &amp; c");
/// assert_eq!(escape_attr("red"), "red"); // No allocation
/// ```
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(ATTR_ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Check if a character may appear in an `#id` or `.class` selector name.
#[inline]
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Strip a namespace prefix (`svg:circle` -> `circle`).
#[inline]
pub fn local_name(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map_or(qualified, |(_, local)| local)
}
