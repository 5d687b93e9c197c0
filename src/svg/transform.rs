//! Transform requests and their composition into a `transform` attribute.
//!
//! A request is usually deserialized from JSON:
//!
//! ```json
//! { "rotate": { "angle": 45 }, "translate": { "x": 10, "y": 5 }, "fill": "red" }
//! ```
//!
//! Tokens are always emitted as translate, rotate, scale, skew, matrix,
//! whatever the key order of the request. New tokens are appended to an
//! existing `transform` value as text; nothing is merged numerically.
//! Allow-listed keys (see [`DIRECT_ATTRIBUTES`]) overwrite attributes directly.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::document::{Document, Element};
use crate::debug;

/// Keys that a request may use to overwrite attributes directly, in the order
/// they are applied.
pub const DIRECT_ATTRIBUTES: [&str; 14] = [
    "fill",
    "stroke",
    "stroke-width",
    "opacity",
    "x",
    "y",
    "cx",
    "cy",
    "r",
    "width",
    "height",
    "rx",
    "ry",
    "d",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Translate {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Rotate {
    #[serde(default)]
    pub angle: f64,
    pub cx: Option<f64>,
    pub cy: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Scale {
    #[serde(default = "unit_scale")]
    pub x: f64,
    /// Defaults to `x`.
    pub y: Option<f64>,
}

fn unit_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Skew {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Geometric operations plus direct attribute overrides for one element.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransformRequest {
    pub translate: Option<Translate>,
    pub rotate: Option<Rotate>,
    pub scale: Option<Scale>,
    pub skew: Option<Skew>,
    /// Emitted only with exactly six entries.
    pub matrix: Option<Vec<f64>>,
    /// Every other key. Only [`DIRECT_ATTRIBUTES`] entries are used.
    #[serde(flatten)]
    pub overrides: Map<String, Value>,
}

impl TransformRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn translate(mut self, x: f64, y: f64) -> Self {
        self.translate = Some(Translate { x, y });
        self
    }

    pub fn rotate(mut self, angle: f64) -> Self {
        self.rotate = Some(Rotate {
            angle,
            cx: None,
            cy: None,
        });
        self
    }

    pub fn rotate_around(mut self, angle: f64, cx: f64, cy: f64) -> Self {
        self.rotate = Some(Rotate {
            angle,
            cx: Some(cx),
            cy: Some(cy),
        });
        self
    }

    pub fn scale(mut self, x: f64, y: Option<f64>) -> Self {
        self.scale = Some(Scale { x, y });
        self
    }

    pub fn skew(mut self, x: f64, y: f64) -> Self {
        self.skew = Some(Skew { x, y });
        self
    }

    pub fn matrix(mut self, values: [f64; 6]) -> Self {
        self.matrix = Some(values.to_vec());
        self
    }

    /// Set a direct attribute override.
    pub fn attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.overrides.insert(name.to_string(), value.into());
        self
    }

    /// Transform tokens in canonical order.
    ///
    /// An operation with a NaN or infinite value has no markup form and is
    /// skipped.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();

        if let Some(Translate { x, y }) = self.translate
            && all_finite("translate", &[x, y])
        {
            tokens.push(format!("translate({} {})", number(x), number(y)));
        }

        if let Some(Rotate { angle, cx, cy }) = self.rotate {
            match (cx, cy) {
                (Some(cx), Some(cy)) if !all_finite("rotate", &[angle, cx, cy]) => {}
                (Some(cx), Some(cy)) => tokens.push(format!(
                    "rotate({} {} {})",
                    number(angle),
                    number(cx),
                    number(cy)
                )),
                _ if !all_finite("rotate", &[angle]) => {}
                _ => tokens.push(format!("rotate({})", number(angle))),
            }
        }

        if let Some(Scale { x, y }) = self.scale {
            let y = y.unwrap_or(x);
            if all_finite("scale", &[x, y]) {
                tokens.push(format!("scale({} {})", number(x), number(y)));
            }
        }

        if let Some(Skew { x, y }) = self.skew
            && all_finite("skew", &[x, y])
        {
            if x != 0.0 {
                tokens.push(format!("skewX({})", number(x)));
            }
            if y != 0.0 {
                tokens.push(format!("skewY({})", number(y)));
            }
        }

        if let Some(matrix) = &self.matrix {
            if matrix.len() != 6 {
                debug!("transform"; "ignoring matrix with {} values (need 6)", matrix.len());
            } else if all_finite("matrix", matrix) {
                let values: Vec<String> = matrix.iter().map(|&v| number(v)).collect();
                tokens.push(format!("matrix({})", values.join(" ")));
            }
        }

        tokens
    }

    /// New `transform` value given the current one, or `None` to leave it as is.
    pub fn compose(&self, existing: Option<&str>) -> Option<String> {
        let tokens = self.tokens();
        if tokens.is_empty() {
            return None;
        }
        let tokens = tokens.join(" ");
        Some(match existing {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {tokens}"),
            _ => tokens,
        })
    }

    /// Allow-listed attribute overrides as strings, in allow-list order.
    pub fn direct_attributes(&self) -> Vec<(&'static str, String)> {
        DIRECT_ATTRIBUTES
            .iter()
            .filter_map(|&name| {
                let value = self.overrides.get(name)?;
                match stringify(value) {
                    Some(text) => Some((name, text)),
                    None => {
                        debug!("transform"; "ignoring non-scalar value for `{}`", name);
                        None
                    }
                }
            })
            .collect()
    }

    /// Keys that are neither transform operations nor allow-listed attributes.
    pub fn ignored_keys(&self) -> impl Iterator<Item = &str> {
        self.overrides
            .keys()
            .map(String::as_str)
            .filter(|key| !DIRECT_ATTRIBUTES.contains(key))
    }

    /// Apply to one element: append transform tokens, then overwrite attributes.
    pub fn apply_to(&self, element: &mut Element) {
        if let Some(value) = self.compose(element.attr("transform")) {
            element.attributes_mut().set("transform", value);
        }
        for (name, value) in self.direct_attributes() {
            element.attributes_mut().set(name, value);
        }
    }
}

impl Document {
    /// Apply `request` to the first element (root included) whose id is
    /// `target_id`. Returns `false`, leaving the document untouched, when no
    /// such element exists.
    pub fn apply_transform(&mut self, target_id: &str, request: &TransformRequest) -> bool {
        let Some(path) = self.find_by_id(target_id) else {
            debug!("transform"; "no element with id `{}`", target_id);
            return false;
        };
        match self.element_at_mut(&path) {
            Some(element) => {
                request.apply_to(element);
                true
            }
            None => false,
        }
    }
}

/// Apply a request to the element with `target_id` in document text.
///
/// Returns the text unchanged when it does not parse or the id is missing.
pub fn apply_transform(text: &str, target_id: &str, request: &TransformRequest) -> String {
    match Document::parse(text) {
        Ok(mut document) => {
            if document.apply_transform(target_id, request) {
                document.to_xml()
            } else {
                text.to_string()
            }
        }
        Err(err) => {
            debug!("transform"; "document does not parse: {}", err);
            text.to_string()
        }
    }
}

fn all_finite(operation: &str, values: &[f64]) -> bool {
    let finite = values.iter().all(|value| value.is_finite());
    if !finite {
        debug!("transform"; "ignoring {} with a non-finite value", operation);
    }
    finite
}

/// Shortest decimal form of a number (`10`, `10.5`, never `-0`).
fn number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// String form of a scalar JSON value.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) if n.is_f64() => n.as_f64().map(number),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
