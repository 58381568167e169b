//! svg2jsx: SVG markup to React component source.
//!
//! The conversion runs in five stages:
//! 1. optional SVG optimization through an [`SvgOptimizer`]
//! 2. parsing with `svg-parser`
//! 3. JSX rewriting with `jsx-transformer`
//! 4. component generation
//! 5. minification, or formatting through a [`SourceFormatter`] with the
//!    built-in indenter as fallback
//!
//! Collaborator failures never fail a conversion. They are reported as
//! [`SoftDiagnostic`]s and the affected stage falls back.
//!
//! # Example
//!
//! ```
//! use svg2jsx::{try_convert, ConversionOptions};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let conversion = try_convert(
//!     r#"<svg viewBox="0 0 10 10"><path stroke-width="2" d="M0 0"/></svg>"#,
//!     "Icon",
//!     &ConversionOptions::default(),
//! )
//! .await
//! .unwrap();
//!
//! assert!(conversion.code.contains("export const Icon = (props: React.SVGProps<SVGSVGElement>) => {"));
//! assert!(conversion.diagnostics.is_empty());
//! # });
//! ```

mod diagnostic;
mod pipeline;

pub use bun_runner::{BunRunner, SourceFormatter, SvgOptimizer, ToolError, Unavailable};
pub use diagnostic::{SoftDiagnostic, SoftDiagnosticKind};
pub use jsx_transformer::{
    component_name_from_path, output_extension, ConversionOptions, ExportStyle, FormatterStyle,
    LanguageMode, OptimizerConfig, QuoteStyle, DEFAULT_COMPONENT_NAME,
};
pub use pipeline::{convert, error_comment, try_convert, Conversion, ConversionError, Converter};
