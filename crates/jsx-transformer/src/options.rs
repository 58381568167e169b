//! Conversion options and the typed collaborator configurations.
//!
//! Everything here deserializes from camelCase JSON and rejects unknown
//! fields, so a typo in a config file is an error instead of a silent default.

use serde::{Deserialize, Serialize};

/// Options for one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ConversionOptions {
    /// Emit TSX with a typed props parameter.
    pub typescript: bool,
    /// Wrap the component in `memo(...)`.
    pub memo: bool,
    /// Spread `{...props}` onto the root `<svg>`.
    pub pass_props: bool,
    /// Collapse the output onto one line.
    pub minify: bool,
    /// Strip every `id` attribute (unless the optimizer already ran).
    pub remove_ids: bool,
    /// Leave out the `react` import lines.
    pub omit_imports: bool,
    /// How the component is exported.
    pub export_style: ExportStyle,
    /// Exported name, when it differs from the component name.
    pub export_name: Option<String>,
    /// Run the SVG optimizer before parsing.
    pub optimize_svg: bool,
    /// Optimizer plugin configuration; `None` uses [`OptimizerConfig::default`].
    #[serde(alias = "svgoConfig")]
    pub optimizer: Option<OptimizerConfig>,
    /// Run the source formatter after generation.
    pub use_formatter: bool,
    /// Formatter style; `None` uses [`FormatterStyle::default`].
    #[serde(alias = "prettierConfig")]
    pub formatter: Option<FormatterStyle>,
    /// Quote character for attribute values.
    #[serde(alias = "quotes")]
    pub quote_style: QuoteStyle,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            typescript: true,
            memo: false,
            pass_props: true,
            minify: false,
            remove_ids: false,
            omit_imports: false,
            export_style: ExportStyle::Const,
            export_name: None,
            optimize_svg: false,
            optimizer: None,
            use_formatter: false,
            formatter: None,
            quote_style: QuoteStyle::Double,
        }
    }
}

impl ConversionOptions {
    /// The optimizer configuration in effect.
    pub fn optimizer_config(&self) -> OptimizerConfig {
        self.optimizer.clone().unwrap_or_default()
    }

    /// The formatter style in effect.
    ///
    /// Without an explicit style, the formatter follows `quote_style`.
    pub fn formatter_style(&self) -> FormatterStyle {
        self.formatter.clone().unwrap_or_else(|| FormatterStyle {
            quote_style: self.quote_style,
            ..FormatterStyle::default()
        })
    }

    /// The language the generated source is written in.
    pub fn language_mode(&self) -> LanguageMode {
        if self.typescript {
            LanguageMode::TypeScript
        } else {
            LanguageMode::Plain
        }
    }

    /// The export name, ignoring an empty string.
    pub fn export_name(&self) -> Option<&str> {
        self.export_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Export form of the generated component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStyle {
    /// `export const Name = ...;`
    #[default]
    Const,
    /// `export default ...;`
    Default,
    /// `const Name = ...;` followed by `export { Name as ExportName };`
    Named,
}

/// Quote character used for string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// `"`
    #[default]
    Double,
    /// `'`
    Single,
}

impl QuoteStyle {
    /// The quote character.
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }

    /// The other quote style.
    pub fn other(self) -> QuoteStyle {
        match self {
            QuoteStyle::Double => QuoteStyle::Single,
            QuoteStyle::Single => QuoteStyle::Double,
        }
    }
}

/// Source language handed to the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    /// TSX.
    TypeScript,
    /// Plain JSX.
    Plain,
}

/// SVG optimizer configuration: an ordered plugin list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Repeat the plugin pipeline until the output stops changing.
    #[serde(default)]
    pub multipass: bool,
    /// Plugins, applied in order.
    #[serde(default = "default_plugins")]
    pub plugins: Vec<OptimizerPlugin>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            multipass: false,
            plugins: default_plugins(),
        }
    }
}

/// Id prefixes kept by the default `preset-default` override.
pub const DEFAULT_PRESERVED_ID_PREFIXES: &[&str] = &["icon-", "gradient-", "pattern-"];

fn default_plugins() -> Vec<OptimizerPlugin> {
    vec![
        OptimizerPlugin::PresetDefault {
            keep_view_box: true,
            preserve_id_prefixes: DEFAULT_PRESERVED_ID_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        },
        OptimizerPlugin::RemoveXmlns,
        OptimizerPlugin::RemoveDimensions,
        OptimizerPlugin::ConvertPathData,
        OptimizerPlugin::MinifyStyles,
        OptimizerPlugin::RemoveUselessStrokeAndFill,
        OptimizerPlugin::RemoveUnknownsAndDefaults,
    ]
}

fn default_true() -> bool {
    true
}

/// A single optimizer plugin. Unknown plugin names fail to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "name",
    rename_all = "camelCase",
    rename_all_fields = "camelCase",
    deny_unknown_fields
)]
pub enum OptimizerPlugin {
    /// The optimizer's default preset, with overrides.
    #[serde(rename = "preset-default")]
    PresetDefault {
        /// Keep `viewBox` so the icon scales.
        #[serde(default = "default_true")]
        keep_view_box: bool,
        /// Ids with these prefixes survive id cleanup.
        #[serde(default)]
        preserve_id_prefixes: Vec<String>,
    },
    /// Drop the `xmlns` attribute.
    #[serde(rename = "removeXMLNS")]
    RemoveXmlns,
    /// Drop `width`/`height` in favour of `viewBox`.
    RemoveDimensions,
    /// Rewrite path data compactly.
    ConvertPathData,
    /// Minify `<style>` contents.
    MinifyStyles,
    /// Drop stroke and fill attributes with no effect.
    RemoveUselessStrokeAndFill,
    /// Drop unknown elements and default-valued attributes.
    RemoveUnknownsAndDefaults,
}

impl OptimizerPlugin {
    /// The plugin name as the optimizer knows it.
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerPlugin::PresetDefault { .. } => "preset-default",
            OptimizerPlugin::RemoveXmlns => "removeXMLNS",
            OptimizerPlugin::RemoveDimensions => "removeDimensions",
            OptimizerPlugin::ConvertPathData => "convertPathData",
            OptimizerPlugin::MinifyStyles => "minifyStyles",
            OptimizerPlugin::RemoveUselessStrokeAndFill => "removeUselessStrokeAndFill",
            OptimizerPlugin::RemoveUnknownsAndDefaults => "removeUnknownsAndDefaults",
        }
    }
}

/// Formatter style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FormatterStyle {
    /// Preferred maximum line width.
    pub print_width: u16,
    /// Spaces per indent level.
    pub tab_width: u8,
    /// Indent with tabs instead of spaces.
    pub use_tabs: bool,
    /// Terminate statements with semicolons.
    #[serde(alias = "semi")]
    pub semicolons: bool,
    /// Quote character for string literals.
    pub quote_style: QuoteStyle,
    /// Trailing comma policy.
    pub trailing_comma: TrailingComma,
    /// Spaces inside object braces.
    pub bracket_spacing: bool,
    /// Parentheses around a single arrow parameter.
    pub arrow_parens: ArrowParens,
}

impl Default for FormatterStyle {
    fn default() -> Self {
        Self {
            print_width: 80,
            tab_width: 2,
            use_tabs: false,
            semicolons: true,
            quote_style: QuoteStyle::Double,
            trailing_comma: TrailingComma::Minimal,
            bracket_spacing: true,
            arrow_parens: ArrowParens::Avoid,
        }
    }
}

impl FormatterStyle {
    /// One level of indentation.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(usize::from(self.tab_width))
        }
    }
}

/// Trailing comma policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    /// Where valid in ES5 (objects, arrays).
    #[default]
    #[serde(alias = "es5")]
    Minimal,
    /// Never.
    None,
    /// Wherever the syntax allows.
    All,
}

/// Arrow function parameter parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowParens {
    /// Omit when possible: `x => x`.
    #[default]
    Avoid,
    /// Always: `(x) => x`.
    Always,
}
