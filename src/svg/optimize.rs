//! Size-reduction pipeline.
//!
//! Works on document text with regular expressions and never builds a tree,
//! so it also runs on markup the tree parser would reject. Each level is a
//! fixed sequence of [`Pass`]es:
//!
//! | level        | passes                                                              |
//! |--------------|---------------------------------------------------------------------|
//! | `light`      | comments, metadata, empty attrs, editor ns, whitespace              |
//! | `standard`   | comments, metadata, empty attrs, editor ns, groups, decimals(3), ws |
//! | `aggressive` | ... groups, styles, decimals(2), whitespace                         |

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::debug;

/// Properties that `style` declarations may be lifted into attributes for.
const PRESENTATION_PROPERTIES: [&str; 8] = [
    "fill",
    "stroke",
    "stroke-width",
    "opacity",
    "font-size",
    "font-family",
    "font-weight",
    "text-anchor",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeLevel {
    Light,
    #[default]
    #[serde(alias = "default")]
    #[value(alias = "default")]
    Standard,
    Aggressive,
}

impl OptimizeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Standard => "standard",
            Self::Aggressive => "aggressive",
        }
    }

    /// Decimal precision used when none is given; `None` for levels that
    /// leave numbers alone.
    pub fn default_precision(self) -> Option<u8> {
        match self {
            Self::Light => None,
            Self::Standard => Some(3),
            Self::Aggressive => Some(2),
        }
    }

    fn passes(self) -> &'static [Pass] {
        use Pass::*;
        match self {
            Self::Light => &[Comments, Metadata, EmptyAttributes, EditorNamespaces, Whitespace],
            Self::Standard => &[
                Comments,
                Metadata,
                EmptyAttributes,
                EditorNamespaces,
                EmptyGroups,
                Decimals,
                Whitespace,
            ],
            Self::Aggressive => &[
                Comments,
                Metadata,
                EmptyAttributes,
                EditorNamespaces,
                EmptyGroups,
                Styles,
                Decimals,
                Whitespace,
            ],
        }
    }
}

impl fmt::Display for OptimizeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeOptions {
    pub level: OptimizeLevel,
    /// Overrides the level's decimal precision. Ignored by `light`.
    pub precision: Option<u8>,
}

impl OptimizeOptions {
    pub fn new(level: OptimizeLevel) -> Self {
        Self {
            level,
            precision: None,
        }
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeStats {
    pub original_size_bytes: usize,
    pub optimized_size_bytes: usize,
    /// Negative when lifting styles made the document larger.
    pub bytes_saved: i64,
    /// Rounded to two decimals; `0` for empty input.
    pub percentage_reduction: f64,
    pub level: OptimizeLevel,
}

impl OptimizeStats {
    fn measure(original: &str, optimized: &str, level: OptimizeLevel) -> Self {
        let original_size_bytes = original.len();
        let optimized_size_bytes = optimized.len();
        let bytes_saved = original_size_bytes as i64 - optimized_size_bytes as i64;
        let percentage_reduction = if original_size_bytes == 0 {
            0.0
        } else {
            let percent = bytes_saved as f64 / original_size_bytes as f64 * 100.0;
            (percent * 100.0).round() / 100.0
        };
        Self {
            original_size_bytes,
            optimized_size_bytes,
            bytes_saved,
            percentage_reduction,
            level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeReport {
    pub document: String,
    pub stats: OptimizeStats,
}

/// Run the pipeline for `options.level` over `text`.
pub fn optimize(text: &str, options: &OptimizeOptions) -> OptimizeReport {
    let precision = options.precision.or(options.level.default_precision());

    let mut document = text.to_string();
    for pass in options.level.passes() {
        let before = document.len();
        document = pass.run(&document, precision);
        debug!("optimize"; "{:<18} {} -> {} bytes", pass.name(), before, document.len());
    }

    let stats = OptimizeStats::measure(text, &document, options.level);
    OptimizeReport { document, stats }
}

// ============================================================================
// Passes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Comments,
    Metadata,
    EmptyAttributes,
    EditorNamespaces,
    EmptyGroups,
    Styles,
    Decimals,
    Whitespace,
}

impl Pass {
    fn name(self) -> &'static str {
        match self {
            Self::Comments => "comments",
            Self::Metadata => "metadata",
            Self::EmptyAttributes => "empty-attributes",
            Self::EditorNamespaces => "editor-namespaces",
            Self::EmptyGroups => "empty-groups",
            Self::Styles => "styles",
            Self::Decimals => "decimals",
            Self::Whitespace => "whitespace",
        }
    }

    fn run(self, text: &str, precision: Option<u8>) -> String {
        match self {
            Self::Comments => remove_comments(text).into_owned(),
            Self::Metadata => remove_metadata(text).into_owned(),
            Self::EmptyAttributes => remove_empty_attributes(text).into_owned(),
            Self::EditorNamespaces => remove_editor_namespaces(text).into_owned(),
            Self::EmptyGroups => collapse_empty_groups(text),
            Self::Styles => convert_styles(text).into_owned(),
            Self::Decimals => match precision {
                Some(precision) => minimize_decimals(text, precision),
                None => text.to_string(),
            },
            Self::Whitespace => remove_whitespace(text),
        }
    }
}

fn remove_comments(text: &str) -> Cow<'_, str> {
    static RE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
    RE_COMMENT.replace_all(text, "")
}

fn remove_metadata(text: &str) -> Cow<'_, str> {
    static RE_METADATA: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)<metadata(?:\s[^>]*)?>.*?</metadata>|<metadata(?:\s[^>]*)?/>").unwrap()
    });
    RE_METADATA.replace_all(text, "")
}

fn remove_empty_attributes(text: &str) -> Cow<'_, str> {
    static RE_EMPTY_ATTR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"\s+[\w:-]+\s*=\s*(?:""|'')"#).unwrap());
    RE_EMPTY_ATTR.replace_all(text, "")
}

fn remove_editor_namespaces(text: &str) -> Cow<'_, str> {
    static RE_EDITOR_NS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"\s*xmlns:(?:inkscape|sodipodi|adobe|ai|graph|sketch)="[^"]*""#).unwrap()
    });
    RE_EDITOR_NS.replace_all(text, "")
}

/// Remove `<g>` elements with nothing but whitespace inside, until none are left.
fn collapse_empty_groups(text: &str) -> String {
    // A `/` outside quotes would make the start tag self-closing.
    static RE_EMPTY_GROUP: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"<g(?:\s(?:[^>"'/]|"[^"]*"|'[^']*')*)?(?:/>|>\s*</g>)"#).unwrap()
    });

    let mut current = text.to_string();
    loop {
        match RE_EMPTY_GROUP.replace_all(&current, "") {
            Cow::Borrowed(_) => return current,
            Cow::Owned(next) => current = next,
        }
    }
}

/// Lift presentation properties out of inline `style` attributes.
fn convert_styles(text: &str) -> Cow<'_, str> {
    static RE_STYLED_TAG: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"<([\w:-]+)([^>]*?)\s+style=["']([^"']*)["']([^>]*)>"#).unwrap()
    });
    static RE_ATTR_NAME: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([\w:-]+)\s*=").unwrap());

    RE_STYLED_TAG.replace_all(text, |caps: &Captures<'_>| {
        let whole = &caps[0];
        let (tag, before, style, after) = (&caps[1], &caps[2], &caps[3], &caps[4]);
        if style.contains("var(") || style.contains("calc(") {
            return whole.to_string();
        }

        let existing: HashSet<&str> = RE_ATTR_NAME
            .captures_iter(before)
            .chain(RE_ATTR_NAME.captures_iter(after))
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        let mut lifted = Vec::new();
        let mut kept = Vec::new();
        for declaration in style.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let (property, value) = (property.trim(), value.trim());
            if PRESENTATION_PROPERTIES.contains(&property) && !existing.contains(property) {
                lifted.push(format!("{property}=\"{value}\""));
            } else {
                kept.push(format!("{property}:{value}"));
            }
        }

        if lifted.is_empty() {
            return whole.to_string();
        }
        let mut out = format!("<{tag}{before} {}", lifted.join(" "));
        if !kept.is_empty() {
            out.push_str(&format!(" style=\"{}\"", kept.join("; ")));
        }
        out.push_str(after);
        out.push('>');
        out
    })
}

/// Round decimal literals that sit between value delimiters.
fn minimize_decimals(text: &str, precision: u8) -> String {
    static RE_DECIMAL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"-?[0-9]+\.[0-9]+").unwrap());

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for found in RE_DECIMAL.find_iter(text) {
        let before = text[..found.start()].chars().next_back();
        let after = text[found.end()..].chars().next();
        if !(before.is_some_and(is_number_delimiter) && after.is_some_and(is_number_delimiter)) {
            continue;
        }
        let Ok(value) = found.as_str().parse::<f64>() else {
            continue;
        };
        out.push_str(&text[last..found.start()]);
        out.push_str(&round_decimal(value, precision));
        last = found.end();
    }
    out.push_str(&text[last..]);
    out
}

fn is_number_delimiter(c: char) -> bool {
    matches!(c, '"' | ':' | ';' | ',') || c.is_whitespace()
}

/// Fixed-point form with trailing zeros stripped; tiny magnitudes become `0`.
fn round_decimal(value: f64, precision: u8) -> String {
    if value.abs() < 10f64.powi(-i32::from(precision)) {
        return "0".to_string();
    }
    let text = format!("{value:.prec$}", prec = usize::from(precision));
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

fn remove_whitespace(text: &str) -> String {
    static RE_BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").unwrap());
    static RE_AROUND_EQ: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"\s*=\s*(["'])"#).unwrap());
    static RE_AFTER_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\s+").unwrap());
    static RE_BEFORE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+>").unwrap());
    static RE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

    let text = RE_BETWEEN_TAGS.replace_all(text, "><");
    let text = RE_AROUND_EQ.replace_all(&text, "=${1}");
    let text = RE_AFTER_OPEN.replace_all(&text, "<");
    let text = RE_BEFORE_CLOSE.replace_all(&text, ">");
    RE_RUNS.replace_all(&text, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_comments_and_metadata() {
        let text = "<svg><!-- a\nmulti-line --><metadata><rdf:RDF/></metadata><rect/></svg>";
        let text = remove_comments(text);
        assert_eq!(remove_metadata(&text), "<svg><rect/></svg>");
    }

    #[test]
    fn test_remove_empty_attributes() {
        assert_eq!(
            remove_empty_attributes(r#"<rect class="" fill="red" data-x=''/>"#),
            r#"<rect fill="red"/>"#
        );
    }

    #[test]
    fn test_remove_editor_namespaces() {
        let text = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" xmlns:sodipodi="x">"#;
        assert_eq!(
            remove_editor_namespaces(text),
            r#"<svg xmlns="http://www.w3.org/2000/svg">"#
        );
    }

    #[test]
    fn test_collapse_nested_empty_groups() {
        let text = "<svg><g id=\"a\"><g>\n  </g><g/></g><g><rect/></g><glyph></glyph></svg>";
        assert_eq!(
            collapse_empty_groups(text),
            "<svg><g><rect/></g><glyph></glyph></svg>"
        );
    }

    #[test]
    fn test_self_closing_child_keeps_parent_group() {
        let text = r#"<svg><g><g href="a/b"/></g><g><use href="a/b"/></g></svg>"#;
        assert_eq!(
            collapse_empty_groups(text),
            r#"<svg><g><use href="a/b"/></g></svg>"#
        );
    }

    #[test]
    fn test_round_decimal() {
        assert_eq!(round_decimal(1.23456, 3), "1.235");
        assert_eq!(round_decimal(1.5, 3), "1.5");
        assert_eq!(round_decimal(2.0001, 2), "2");
        assert_eq!(round_decimal(-0.0004, 3), "0");
        assert_eq!(round_decimal(-12.3456, 2), "-12.35");
    }

    #[test]
    fn test_minimize_decimals_needs_delimiters() {
        assert_eq!(
            minimize_decimals(r#"<rect x="1.23456" y="2.5" w="0.00001"/>"#, 2),
            r#"<rect x="1.23" y="2.5" w="0"/>"#
        );
        assert_eq!(
            minimize_decimals(r#"<path d="M 1.111,2.222 L3.333 4.444"/>"#, 1),
            r#"<path d="M 1.1,2.2 L3.333 4.4"/>"#
        );
        assert_eq!(
            minimize_decimals(r#"<text style="font-size:12.345;opacity: 0.555">"#, 1),
            r#"<text style="font-size:12.3;opacity: 0.6">"#
        );
        // Units and version strings are not delimited numbers.
        assert_eq!(minimize_decimals(r#"<svg width="10.55px">"#, 1), r#"<svg width="10.55px">"#);
    }

    #[test]
    fn test_convert_styles_lifts_all_properties() {
        assert_eq!(
            convert_styles(r#"<rect x="1" style="fill: red; stroke:blue"/>"#),
            r#"<rect x="1" fill="red" stroke="blue"/>"#
        );
    }

    #[test]
    fn test_convert_styles_keeps_unknown_properties() {
        assert_eq!(
            convert_styles(r#"<rect style="fill:red;filter:blur(2px)" y="2">"#),
            r#"<rect fill="red" style="filter:blur(2px)" y="2">"#
        );
    }

    #[test]
    fn test_convert_styles_skips_variables_and_collisions() {
        let text = r#"<rect style="fill:var(--c)"/>"#;
        assert_eq!(convert_styles(text), text);
        let text = r#"<rect fill="blue" style="fill:red"/>"#;
        assert_eq!(convert_styles(text), text);
    }

    #[test]
    fn test_remove_whitespace() {
        let text = "<svg >\n  <rect  x = \"1\"   y=\"2\" />\n</svg>";
        assert_eq!(remove_whitespace(text), r#"<svg><rect x="1" y="2" /></svg>"#);
    }

    #[test]
    fn test_light_level_leaves_numbers() {
        let text = "<svg>\n  <!-- c -->\n  <rect x=\"1.23456\"/>\n</svg>";
        let report = optimize(text, &OptimizeOptions::new(OptimizeLevel::Light));
        assert_eq!(report.document, r#"<svg><rect x="1.23456"/></svg>"#);
        assert_eq!(report.stats.level, OptimizeLevel::Light);
    }

    #[test]
    fn test_levels_differ_in_precision() {
        let text = r#"<svg><rect x="1.23456"/><g></g></svg>"#;
        let standard = optimize(text, &OptimizeOptions::default());
        assert_eq!(standard.document, r#"<svg><rect x="1.235"/></svg>"#);

        let aggressive = optimize(text, &OptimizeOptions::new(OptimizeLevel::Aggressive));
        assert_eq!(aggressive.document, r#"<svg><rect x="1.23"/></svg>"#);

        let custom = optimize(text, &OptimizeOptions::default().with_precision(1));
        assert_eq!(custom.document, r#"<svg><rect x="1.2"/></svg>"#);
    }

    #[test]
    fn test_stats() {
        let text = "<svg>    <g></g>    </svg>";
        let report = optimize(text, &OptimizeOptions::default());
        assert_eq!(report.document, "<svg></svg>");
        assert_eq!(report.stats.original_size_bytes, 26);
        assert_eq!(report.stats.optimized_size_bytes, 11);
        assert_eq!(report.stats.bytes_saved, 15);
        assert_eq!(report.stats.percentage_reduction, 57.69);

        let empty = optimize("", &OptimizeOptions::default());
        assert_eq!(empty.stats.percentage_reduction, 0.0);
        assert_eq!(empty.stats.bytes_saved, 0);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let report = optimize("<svg/>", &OptimizeOptions::new(OptimizeLevel::Light));
        let json = serde_json::to_value(&report.stats).unwrap();
        assert_eq!(json["originalSizeBytes"], 6);
        assert_eq!(json["percentageReduction"], 0.0);
        assert_eq!(json["level"], "light");
    }

    #[test]
    fn test_level_names() {
        let level: OptimizeLevel = serde_json::from_str(r#""default""#).unwrap();
        assert_eq!(level, OptimizeLevel::Standard);
        assert_eq!(OptimizeLevel::Aggressive.to_string(), "aggressive");
    }
}
