//! The external tool seams.

use crate::error::ToolError;
use jsx_transformer::{FormatterStyle, LanguageMode, OptimizerConfig};
use std::future::Future;

/// Optimizes raw SVG text before it is parsed.
pub trait SvgOptimizer: Send + Sync {
    /// Returns the optimized SVG, or why it could not be produced.
    fn optimize(
        &self,
        svg: &str,
        config: &OptimizerConfig,
    ) -> impl Future<Output = Result<String, ToolError>> + Send;
}

/// Formats generated component source.
pub trait SourceFormatter: Send + Sync {
    /// Returns the formatted source, or why it could not be produced.
    fn format(
        &self,
        source: &str,
        style: &FormatterStyle,
        mode: LanguageMode,
    ) -> impl Future<Output = Result<String, ToolError>> + Send;
}

/// Stands in for a missing optimizer or formatter; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl SvgOptimizer for Unavailable {
    async fn optimize(&self, _svg: &str, _config: &OptimizerConfig) -> Result<String, ToolError> {
        Err(ToolError::Unavailable("svg optimizer"))
    }
}

impl SourceFormatter for Unavailable {
    async fn format(
        &self,
        _source: &str,
        _style: &FormatterStyle,
        _mode: LanguageMode,
    ) -> Result<String, ToolError> {
        Err(ToolError::Unavailable("source formatter"))
    }
}
