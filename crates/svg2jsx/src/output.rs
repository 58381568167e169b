//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8PathBuf;
use serde::Serialize;
use svg2jsx::SoftDiagnostic;

/// What happened to one input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// The input path, or `<stdin>`.
    pub input: String,
    /// The component name used.
    pub component: String,
    /// Where the component was written, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Utf8PathBuf>,
    /// The generated source, when it goes to stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Non-fatal problems.
    pub diagnostics: Vec<SoftDiagnostic>,
    /// Why the conversion failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    /// Creates a report for an input that failed before conversion.
    pub fn failed(input: impl Into<String>, component: impl Into<String>, error: String) -> Self {
        Self {
            input: input.into(),
            component: component.into(),
            output: None,
            code: None,
            diagnostics: Vec::new(),
            error: Some(error),
        }
    }
}

/// Formats reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats one report as human-readable text.
    ///
    /// Returns an empty string in JSON mode; JSON is written once for the
    /// whole run by [`Formatter::format_json`].
    pub fn format(&self, report: &FileReport) -> String {
        match self.format {
            OutputFormat::Human => Self::format_human(report),
            OutputFormat::Json => String::new(),
        }
    }

    fn format_human(report: &FileReport) -> String {
        let mut output = String::new();

        if let Some(error) = &report.error {
            output.push_str(&format!("{}\nError: {}\n\n", report.input, error));
            return output;
        }

        match &report.output {
            Some(path) => output.push_str(&format!("{} -> {}\n", report.input, path)),
            None => output.push_str(&format!("{} ({})\n", report.input, report.component)),
        }
        for diag in &report.diagnostics {
            output.push_str(&format!("Warning: {}\n", diag));
        }
        if !report.diagnostics.is_empty() {
            output.push('\n');
        }

        output
    }

    /// Formats all reports as a JSON array.
    pub fn format_json(reports: &[FileReport]) -> String {
        serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Summary of a conversion run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConvertSummary {
    /// Number of inputs.
    pub file_count: usize,
    /// Number of inputs that failed.
    pub error_count: usize,
    /// Number of soft diagnostics.
    pub warning_count: usize,
    /// Whether to fail on warnings.
    pub fail_on_warnings: bool,
}

impl ConvertSummary {
    /// Tallies a batch of reports.
    pub fn from_reports(reports: &[FileReport], fail_on_warnings: bool) -> Self {
        Self {
            file_count: reports.len(),
            error_count: reports.iter().filter(|r| r.error.is_some()).count(),
            warning_count: reports.iter().map(|r| r.diagnostics.len()).sum(),
            fail_on_warnings,
        }
    }

    /// Returns true when the process should exit with an error.
    pub fn should_fail(&self) -> bool {
        self.error_count > 0 || (self.warning_count > 0 && self.fail_on_warnings)
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let plural = |count: usize, word: &str| {
            if count == 1 {
                format!("{count} {word}")
            } else {
                format!("{count} {word}s")
            }
        };

        format!(
            "====================================\nsvg2jsx converted {} with {} and {}",
            plural(self.file_count, "file"),
            plural(self.error_count, "error"),
            plural(self.warning_count, "warning"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svg2jsx::SoftDiagnosticKind;

    fn report() -> FileReport {
        FileReport {
            input: "icons/arrow-left.svg".to_string(),
            component: "ArrowLeft".to_string(),
            output: Some(Utf8PathBuf::from("icons/ArrowLeft.tsx")),
            code: None,
            diagnostics: vec![SoftDiagnostic::new(
                SoftDiagnosticKind::FormatterFailure,
                "no source formatter available",
            )],
            error: None,
        }
    }

    #[test]
    fn test_format_human() {
        let formatter = Formatter::new(OutputFormat::Human);
        assert_eq!(
            formatter.format(&report()),
            "icons/arrow-left.svg -> icons/ArrowLeft.tsx\nWarning: formatter failure: no source formatter available\n\n"
        );
    }

    #[test]
    fn test_format_human_error() {
        let formatter = Formatter::new(OutputFormat::Human);
        let report = FileReport::failed(
            "bad.svg",
            "Bad",
            "no <svg> root element found".to_string(),
        );
        assert_eq!(
            formatter.format(&report),
            "bad.svg\nError: no <svg> root element found\n\n"
        );
    }

    #[test]
    fn test_format_json() {
        let json = Formatter::format_json(&[report()]);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["input"], "icons/arrow-left.svg");
        assert_eq!(value[0]["output"], "icons/ArrowLeft.tsx");
        assert_eq!(value[0]["diagnostics"][0]["kind"], "FormatterFailure");
        assert!(value[0].get("error").is_none());
        assert_eq!(Formatter::new(OutputFormat::Json).format(&report()), "");
    }

    #[test]
    fn test_summary() {
        let reports = vec![
            report(),
            FileReport::failed("bad.svg", "Bad", "boom".to_string()),
        ];
        let summary = ConvertSummary::from_reports(&reports, false);

        assert_eq!(
            summary.format(),
            "====================================\nsvg2jsx converted 2 files with 1 error and 1 warning"
        );
        assert!(summary.should_fail());
    }

    #[test]
    fn test_fail_on_warnings() {
        let summary = ConvertSummary::from_reports(&[report()], false);
        assert!(!summary.should_fail());
        let summary = ConvertSummary::from_reports(&[report()], true);
        assert!(summary.should_fail());
    }
}
