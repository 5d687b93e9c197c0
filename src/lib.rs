//! svgsel - select SVG elements with compact CSS-like queries and transform them.
//!
//! The engine lives in [`svg`]; [`cli`] and [`config`] make up the `svgsel`
//! binary around it.
//!
//! ```ignore
//! use svgsel::svg::{TransformRequest, transform_matching};
//!
//! let request = TransformRequest::new().translate(10.0, 5.0);
//! let outcome = transform_matching(r#"<svg><circle r="5"/></svg>"#, "circle", &request);
//! assert!(outcome.success);
//! ```

pub mod cli;
pub mod config;
pub mod logger;
pub mod svg;
pub mod utils;
