//! The conversion pipeline.

use crate::diagnostic::{SoftDiagnostic, SoftDiagnosticKind};
use bun_runner::{SourceFormatter, SvgOptimizer, ToolError, Unavailable, DEFAULT_TIMEOUT};
use jsx_transformer::{
    generate, postprocess, transform, ConversionOptions, GenerationError, TransformContext,
};
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use svg_parser::ParseError;
use thiserror::Error;

/// A conversion that could not produce source.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The markup has no usable `<svg>` root.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The tree could not be turned into a component.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// The result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The component source.
    pub code: String,
    /// Stages that fell back or repaired their input, in pipeline order.
    pub diagnostics: Vec<SoftDiagnostic>,
}

/// Converts SVG markup with a fixed optimizer and formatter.
///
/// The converter holds no per-conversion state; one instance can serve any
/// number of concurrent conversions.
#[derive(Debug, Clone)]
pub struct Converter<O = Unavailable, F = Unavailable> {
    optimizer: O,
    formatter: F,
    timeout: Duration,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(Unavailable, Unavailable)
    }
}

impl<O: SvgOptimizer, F: SourceFormatter> Converter<O, F> {
    /// Creates a converter over the given collaborators.
    pub fn new(optimizer: O, formatter: F) -> Self {
        Self {
            optimizer,
            formatter,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bounds every optimizer and formatter call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Converts `svg` into component source, or the error comment when
    /// the markup cannot be converted.
    pub async fn convert(
        &self,
        svg: &str,
        component_name: &str,
        options: &ConversionOptions,
    ) -> String {
        match self.try_convert(svg, component_name, options).await {
            Ok(conversion) => conversion.code,
            Err(error) => error_comment(&error),
        }
    }

    /// Converts `svg` into component source.
    ///
    /// Empty or whitespace-only input converts to an empty string.
    pub async fn try_convert(
        &self,
        svg: &str,
        component_name: &str,
        options: &ConversionOptions,
    ) -> Result<Conversion, ConversionError> {
        let mut diagnostics = Vec::new();
        if svg.trim().is_empty() {
            return Ok(Conversion {
                code: String::new(),
                diagnostics,
            });
        }

        let (source, optimized) = self.preprocess(svg, options, &mut diagnostics).await;

        let mut document = svg_parser::parse(&source)?;
        tracing::debug!(recovered = document.recovered.len(), "parsed svg");
        for error in &document.recovered {
            diagnostics.push(SoftDiagnostic::new(
                SoftDiagnosticKind::RecoveredMarkup,
                error.display_with_position(&source),
            ));
        }

        transform(&mut document.root, &TransformContext::new(options, optimized));
        let code = generate(&document.root, component_name, options)?;
        let code = self.postprocess(code, options, &mut diagnostics).await;
        Ok(Conversion { code, diagnostics })
    }

    /// Runs the optimizer when asked to. Returns the markup to parse and
    /// whether it came from a successful optimization.
    async fn preprocess<'a>(
        &self,
        svg: &'a str,
        options: &ConversionOptions,
        diagnostics: &mut Vec<SoftDiagnostic>,
    ) -> (Cow<'a, str>, bool) {
        if !options.optimize_svg {
            return (Cow::Borrowed(svg), false);
        }

        let config = options.optimizer_config();
        match self.bounded(self.optimizer.optimize(svg, &config)).await {
            Ok(optimized) => {
                tracing::debug!(before = svg.len(), after = optimized.len(), "optimized svg");
                (Cow::Owned(optimized), true)
            }
            Err(error) => {
                tracing::warn!(%error, "svg optimization failed, using the original markup");
                diagnostics.push(SoftDiagnostic::new(
                    SoftDiagnosticKind::OptimizerFailure,
                    error.to_string(),
                ));
                (Cow::Borrowed(svg), false)
            }
        }
    }

    async fn postprocess(
        &self,
        code: String,
        options: &ConversionOptions,
        diagnostics: &mut Vec<SoftDiagnostic>,
    ) -> String {
        if options.minify {
            return postprocess::minify(&code);
        }

        let style = options.formatter_style();
        if options.use_formatter {
            let formatting = self
                .formatter
                .format(&code, &style, options.language_mode());
            match self.bounded(formatting).await {
                Ok(formatted) => return formatted,
                Err(error) => {
                    tracing::warn!(%error, "formatting failed, using the built-in indenter");
                    diagnostics.push(SoftDiagnostic::new(
                        SoftDiagnosticKind::FormatterFailure,
                        error.to_string(),
                    ));
                }
            }
        }

        postprocess::indent(&code, &style)
    }

    async fn bounded(
        &self,
        call: impl Future<Output = Result<String, ToolError>>,
    ) -> Result<String, ToolError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(ToolError::Timeout(self.timeout)))
    }
}

/// Converts without an optimizer or formatter.
///
/// Requests for either fall back and are reported in the diagnostics.
pub async fn try_convert(
    svg: &str,
    component_name: &str,
    options: &ConversionOptions,
) -> Result<Conversion, ConversionError> {
    Converter::default()
        .try_convert(svg, component_name, options)
        .await
}

/// Converts without an optimizer or formatter, returning the error comment
/// on failure.
pub async fn convert(svg: &str, component_name: &str, options: &ConversionOptions) -> String {
    Converter::default()
        .convert(svg, component_name, options)
        .await
}

/// The text returned in place of a component when conversion fails.
pub fn error_comment(error: &impl fmt::Display) -> String {
    format!("// Error converting SVG: {error}\n// Please check your SVG syntax and try again.")
}
