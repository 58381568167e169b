//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use svg2jsx::{ConversionOptions, ExportStyle, QuoteStyle};

/// Convert SVG files into React JSX/TSX components.
#[derive(Debug, Parser)]
#[command(name = "svg2jsx")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// SVG files or directories to convert (`-` alone or nothing reads stdin)
    pub inputs: Vec<Utf8PathBuf>,

    /// Directory to write components into (default: next to each input)
    #[arg(long = "out-dir")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Component name (single input only; default: derived from the file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Print components to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Emit plain JSX instead of TSX
    #[arg(long)]
    pub js: bool,

    /// Wrap components in React.memo
    #[arg(long)]
    pub memo: bool,

    /// Don't spread props onto the root <svg>
    #[arg(long = "no-props")]
    pub no_props: bool,

    /// Collapse output onto a single line
    #[arg(long)]
    pub minify: bool,

    /// Strip id attributes
    #[arg(long = "remove-ids")]
    pub remove_ids: bool,

    /// Leave out the react import lines
    #[arg(long = "omit-imports")]
    pub omit_imports: bool,

    /// How the component is exported
    #[arg(long = "export-style", value_enum)]
    pub export_style: Option<ExportStyleArg>,

    /// Exported name, when it differs from the component name
    #[arg(long = "export-name")]
    pub export_name: Option<String>,

    /// Quote character for attribute values
    #[arg(long, value_enum)]
    pub quotes: Option<QuoteArg>,

    /// Optimize SVGs with svgo (run under bun) before converting
    #[arg(long)]
    pub optimize: bool,

    /// Format output with prettier (run under bun)
    #[arg(long)]
    pub format: bool,

    /// Path to the config file (default: svg2jsx.config.json in the workspace)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Working directory; also where svgo and prettier are resolved from
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Glob patterns to ignore when walking directories
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Maximum number of files converted at once (default: available cores)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Timeout for each svgo or prettier call, in milliseconds
    #[arg(long = "timeout-ms", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Watch inputs and convert again on change
    #[arg(long)]
    pub watch: bool,

    /// Print the parsed element tree as JSON to stderr (for debugging)
    #[arg(long = "emit-ast")]
    pub emit_ast: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Exit with error on warnings
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,

    /// Enable debug logging (overrides SVG2JSX_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Show bun version and installation path
    #[arg(long = "bun-version")]
    pub bun_version: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}

/// Export style flag values.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExportStyleArg {
    /// `export const Name = ...;`
    Const,
    /// `export default ...;`
    Default,
    /// `const Name = ...;` then `export { Name };`
    Named,
}

/// Quote flag values.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum QuoteArg {
    Double,
    Single,
}

impl Args {
    /// Returns true when input comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.inputs.is_empty() || (self.inputs.len() == 1 && self.inputs[0].as_str() == "-")
    }

    /// Returns true when `-` is given alongside other inputs.
    pub fn mixes_stdin(&self) -> bool {
        self.inputs.len() > 1 && self.inputs.iter().any(|input| input.as_str() == "-")
    }

    /// Applies the flags on top of options loaded from a config file.
    ///
    /// Flags only ever switch features on (or, for `--js` and `--no-props`,
    /// off); an absent flag keeps the configured value.
    pub fn apply_to(&self, options: &mut ConversionOptions) {
        if self.js {
            options.typescript = false;
        }
        if self.memo {
            options.memo = true;
        }
        if self.no_props {
            options.pass_props = false;
        }
        if self.minify {
            options.minify = true;
        }
        if self.remove_ids {
            options.remove_ids = true;
        }
        if self.omit_imports {
            options.omit_imports = true;
        }
        if let Some(style) = self.export_style {
            options.export_style = match style {
                ExportStyleArg::Const => ExportStyle::Const,
                ExportStyleArg::Default => ExportStyle::Default,
                ExportStyleArg::Named => ExportStyle::Named,
            };
        }
        if let Some(name) = &self.export_name {
            options.export_name = Some(name.clone());
        }
        if let Some(quotes) = self.quotes {
            options.quote_style = match quotes {
                QuoteArg::Double => QuoteStyle::Double,
                QuoteArg::Single => QuoteStyle::Single,
            };
        }
        if self.optimize {
            options.optimize_svg = true;
        }
        if self.format {
            options.use_formatter = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["svg2jsx"]);
        assert_eq!(args.workspace.as_str(), ".");
        assert!(matches!(args.output, OutputFormat::Human));
        assert!(args.reads_stdin());
        assert!(!args.watch);
        assert_eq!(args.timeout_ms, 10_000);
    }

    #[test]
    fn test_dash_reads_stdin() {
        assert!(Args::parse_from(["svg2jsx", "-"]).reads_stdin());
        assert!(!Args::parse_from(["svg2jsx", "icons"]).reads_stdin());
        assert!(!Args::parse_from(["svg2jsx", "-", "a.svg"]).reads_stdin());
    }

    #[test]
    fn test_mixes_stdin() {
        assert!(Args::parse_from(["svg2jsx", "a.svg", "-"]).mixes_stdin());
        assert!(!Args::parse_from(["svg2jsx", "-"]).mixes_stdin());
        assert!(!Args::parse_from(["svg2jsx", "a.svg", "b.svg"]).mixes_stdin());
    }

    #[test]
    fn test_flags_default_to_config_values() {
        let args = Args::parse_from(["svg2jsx", "icon.svg"]);
        let mut options = ConversionOptions {
            memo: true,
            export_style: ExportStyle::Default,
            ..ConversionOptions::default()
        };
        args.apply_to(&mut options);
        assert!(options.memo);
        assert!(options.typescript);
        assert_eq!(options.export_style, ExportStyle::Default);
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "svg2jsx",
            "--js",
            "--no-props",
            "--export-style",
            "named",
            "--export-name",
            "MyIcon",
            "--quotes",
            "single",
            "--optimize",
            "--format",
            "icon.svg",
        ]);
        let mut options = ConversionOptions::default();
        args.apply_to(&mut options);

        assert!(!options.typescript);
        assert!(!options.pass_props);
        assert_eq!(options.export_style, ExportStyle::Named);
        assert_eq!(options.export_name.as_deref(), Some("MyIcon"));
        assert_eq!(options.quote_style, QuoteStyle::Single);
        assert!(options.optimize_svg);
        assert!(options.use_formatter);
    }

    #[test]
    fn test_output_formats() {
        let args = Args::parse_from(["svg2jsx", "--output", "json"]);
        assert!(matches!(args.output, OutputFormat::Json));
    }

    #[test]
    fn test_jobs_and_ignore() {
        let args = Args::parse_from([
            "svg2jsx", "-j", "4", "--ignore", "**/legacy/**", "--ignore", "*.min.svg", "icons",
        ]);
        assert_eq!(args.jobs, Some(4));
        assert_eq!(args.ignore, vec!["**/legacy/**", "*.min.svg"]);
    }
}
