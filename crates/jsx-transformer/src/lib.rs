//! SVG element tree to React component transformation.
//!
//! This crate takes the tree produced by `svg-parser` and turns it into the
//! source of a JSX/TSX component. It handles:
//! - Renaming SVG presentation attributes to their JSX spelling
//! - Optional `id` stripping and void-element normalization
//! - Generating the component scaffolding (props, memo, exports, imports)
//! - The built-in indenter and minifier used after generation
//!
//! # Example
//!
//! ```
//! use jsx_transformer::{generate, transform, ConversionOptions, TransformContext};
//!
//! let mut document = svg_parser::parse(r#"<svg><path stroke-width="2" d="M0 0"/></svg>"#).unwrap();
//! let options = ConversionOptions::default();
//!
//! transform(&mut document.root, &TransformContext::new(&options, false));
//! let code = generate(&document.root, "Icon", &options).unwrap();
//! assert!(code.contains(r#"<path strokeWidth="2" d="M0 0" />"#));
//! ```

mod attributes;
mod codegen;
mod error;
mod naming;
mod options;
pub mod postprocess;
mod transform;

pub use attributes::{jsx_attribute_name, ATTRIBUTE_MAP};
pub use codegen::generate;
pub use error::GenerationError;
pub use naming::{
    component_name_from_path, is_valid_identifier, output_extension, DEFAULT_COMPONENT_NAME,
};
pub use options::{
    ArrowParens, ConversionOptions, ExportStyle, FormatterStyle, LanguageMode, OptimizerConfig,
    OptimizerPlugin, QuoteStyle, TrailingComma,
};
pub use transform::{transform, TransformContext};
