//! Pipeline behavior with stand-in optimizers and formatters.

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use svg2jsx::{
    convert, try_convert, ConversionOptions, Converter, ExportStyle, FormatterStyle, LanguageMode,
    OptimizerConfig, SoftDiagnosticKind, SourceFormatter, SvgOptimizer, ToolError, Unavailable,
};

const ICON: &str = r#"<svg viewBox="0 0 10 10"><path stroke-width="2" d="M0 0"/></svg>"#;

/// Replaces the input with fixed markup.
struct FixedOptimizer(&'static str);

impl SvgOptimizer for FixedOptimizer {
    async fn optimize(&self, _svg: &str, _config: &OptimizerConfig) -> Result<String, ToolError> {
        Ok(self.0.to_string())
    }
}

struct FailingOptimizer;

impl SvgOptimizer for FailingOptimizer {
    async fn optimize(&self, _svg: &str, _config: &OptimizerConfig) -> Result<String, ToolError> {
        Err(ToolError::Rejected {
            tool: "svgo",
            message: "Unexpected end of input".to_string(),
        })
    }
}

struct SlowOptimizer;

impl SvgOptimizer for SlowOptimizer {
    async fn optimize(&self, svg: &str, _config: &OptimizerConfig) -> Result<String, ToolError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(svg.to_string())
    }
}

/// Records every call and prefixes the source with a marker.
#[derive(Default)]
struct RecordingFormatter {
    calls: AtomicUsize,
    modes: Mutex<Vec<LanguageMode>>,
}

impl SourceFormatter for RecordingFormatter {
    async fn format(
        &self,
        source: &str,
        _style: &FormatterStyle,
        mode: LanguageMode,
    ) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.modes.lock().unwrap().push(mode);
        Ok(format!("// formatted\n{source}\n"))
    }
}

struct FailingFormatter;

impl SourceFormatter for FailingFormatter {
    async fn format(
        &self,
        _source: &str,
        _style: &FormatterStyle,
        _mode: LanguageMode,
    ) -> Result<String, ToolError> {
        Err(ToolError::Rejected {
            tool: "prettier",
            message: "SyntaxError".to_string(),
        })
    }
}

#[tokio::test]
async fn test_icon_scenario() {
    let output = convert(ICON, "Icon", &ConversionOptions::default()).await;
    insta::assert_snapshot!(output, @r#"
    import React from 'react';

    export const Icon = (props: React.SVGProps<SVGSVGElement>) => {
      return (
        <svg viewBox="0 0 10 10" {...props}>
          <path strokeWidth="2" d="M0 0" />
        </svg>
      );
    };
    "#);
}

#[tokio::test]
async fn test_optimizer_failure_is_not_fatal() {
    let options = ConversionOptions {
        optimize_svg: true,
        ..ConversionOptions::default()
    };
    let converter = Converter::new(FailingOptimizer, Unavailable);

    let conversion = converter.try_convert(ICON, "Icon", &options).await.unwrap();
    let plain = try_convert(ICON, "Icon", &ConversionOptions::default())
        .await
        .unwrap();

    assert_eq!(conversion.code, plain.code);
    assert_eq!(conversion.diagnostics.len(), 1);
    assert_eq!(
        conversion.diagnostics[0].kind,
        SoftDiagnosticKind::OptimizerFailure
    );
    assert_eq!(
        conversion.diagnostics[0].message,
        "svgo failed: Unexpected end of input"
    );
}

#[tokio::test]
async fn test_optimized_markup_is_converted() {
    let options = ConversionOptions {
        optimize_svg: true,
        remove_ids: true,
        omit_imports: true,
        ..ConversionOptions::default()
    };
    let converter = Converter::new(
        FixedOptimizer(r#"<svg><path id="icon-a" d="M1 1"/></svg>"#),
        Unavailable,
    );

    let conversion = converter
        .try_convert("<svg><g><path id=\"x\"/></g></svg>", "Icon", &options)
        .await
        .unwrap();

    assert!(conversion.diagnostics.is_empty());
    assert!(conversion.code.contains(r#"<path id="icon-a" d="M1 1" />"#));
    assert!(!conversion.code.contains("<g>"));
}

#[tokio::test]
async fn test_ids_removed_when_optimizer_fails() {
    let options = ConversionOptions {
        optimize_svg: true,
        remove_ids: true,
        ..ConversionOptions::default()
    };
    let output = Converter::new(FailingOptimizer, Unavailable)
        .convert(r#"<svg id="a"><rect id="b"/></svg>"#, "Icon", &options)
        .await;
    assert!(!output.contains("id="));
}

#[tokio::test]
async fn test_slow_optimizer_times_out() {
    let options = ConversionOptions {
        optimize_svg: true,
        ..ConversionOptions::default()
    };
    let converter =
        Converter::new(SlowOptimizer, Unavailable).with_timeout(Duration::from_millis(50));

    let conversion = converter.try_convert(ICON, "Icon", &options).await.unwrap();
    assert_eq!(
        conversion.diagnostics[0].kind,
        SoftDiagnosticKind::OptimizerFailure
    );
    assert_eq!(conversion.diagnostics[0].message, "timed out after 50ms");
    assert!(conversion.code.contains("strokeWidth"));
}

#[tokio::test]
async fn test_minify_never_calls_formatter() {
    let options = ConversionOptions {
        minify: true,
        use_formatter: true,
        memo: true,
        export_style: ExportStyle::Named,
        export_name: Some("MyIcon".to_string()),
        ..ConversionOptions::default()
    };
    let formatter = Arc::new(RecordingFormatter::default());
    let converter = Converter::new(Unavailable, SharedFormatter(formatter.clone()));

    let conversion = converter.try_convert(ICON, "Icon", &options).await.unwrap();

    assert_eq!(formatter.calls.load(Ordering::SeqCst), 0);
    assert!(conversion.diagnostics.is_empty());
    assert!(!conversion.code.contains('\n'));
    assert!(conversion.code.contains("export{Icon as MyIcon};"));
}

#[tokio::test]
async fn test_formatter_output_is_used() {
    let options = ConversionOptions {
        use_formatter: true,
        typescript: false,
        ..ConversionOptions::default()
    };
    let formatter = Arc::new(RecordingFormatter::default());
    let converter = Converter::new(Unavailable, SharedFormatter(formatter.clone()));

    let output = converter.convert(ICON, "Icon", &options).await;

    assert!(output.starts_with("// formatted\nexport const Icon = (props) => {"));
    assert_eq!(formatter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*formatter.modes.lock().unwrap(), vec![LanguageMode::Plain]);
}

#[tokio::test]
async fn test_formatter_failure_falls_back_to_indenter() {
    let options = ConversionOptions {
        use_formatter: true,
        ..ConversionOptions::default()
    };
    let formatted = Converter::new(Unavailable, FailingFormatter)
        .try_convert(ICON, "Icon", &options)
        .await
        .unwrap();
    let indented = try_convert(ICON, "Icon", &ConversionOptions::default())
        .await
        .unwrap();

    assert_eq!(formatted.code, indented.code);
    assert_eq!(formatted.diagnostics.len(), 1);
    assert_eq!(
        formatted.diagnostics[0].kind,
        SoftDiagnosticKind::FormatterFailure
    );
}

#[tokio::test]
async fn test_missing_collaborators_are_soft_failures() {
    let options = ConversionOptions {
        optimize_svg: true,
        use_formatter: true,
        ..ConversionOptions::default()
    };
    let conversion = try_convert(ICON, "Icon", &options).await.unwrap();
    let messages: Vec<String> = conversion
        .diagnostics
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        messages,
        vec![
            "optimizer failure: no svg optimizer available",
            "formatter failure: no source formatter available",
        ]
    );
}

#[tokio::test]
async fn test_conversions_are_independent() {
    let converter = Arc::new(Converter::default());
    let mut handles = Vec::new();
    for name in ["One", "Two", "Three"] {
        let converter = converter.clone();
        handles.push(tokio::spawn(async move {
            converter
                .convert(ICON, name, &ConversionOptions::default())
                .await
        }));
    }
    for (handle, name) in handles.into_iter().zip(["One", "Two", "Three"]) {
        let output = handle.await.unwrap();
        assert!(output.contains(&format!("export const {name} = ")));
    }
}

/// Lets a test keep a handle on a formatter the converter owns.
struct SharedFormatter(Arc<RecordingFormatter>);

impl SourceFormatter for SharedFormatter {
    async fn format(
        &self,
        source: &str,
        style: &FormatterStyle,
        mode: LanguageMode,
    ) -> Result<String, ToolError> {
        self.0.format(source, style, mode).await
    }
}
