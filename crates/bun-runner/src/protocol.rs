//! JSON-lines messages exchanged with the bun runner script.

use jsx_transformer::{
    ArrowParens, FormatterStyle, LanguageMode, OptimizerConfig, OptimizerPlugin, QuoteStyle,
    TrailingComma,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One request line.
#[derive(Debug, Serialize)]
pub(crate) struct BunRequest<'a> {
    pub id: u64,
    #[serde(flatten)]
    pub task: BunTask<'a>,
}

/// What the runner script should do.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub(crate) enum BunTask<'a> {
    /// Run `svgo.optimize(svg, config)`.
    Optimize { svg: &'a str, config: Value },
    /// Run `prettier.format(source, options)`.
    Format { source: &'a str, options: Value },
}

impl BunTask<'_> {
    /// The tool this task runs, for error messages.
    pub fn tool(&self) -> &'static str {
        match self {
            BunTask::Optimize { .. } => "svgo",
            BunTask::Format { .. } => "prettier",
        }
    }
}

/// One response line.
#[derive(Debug, Deserialize)]
pub(crate) struct BunResponse {
    pub id: Option<u64>,
    pub output: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BunReady {
    pub ready: bool,
}

/// Builds the SVGO configuration object for an optimizer config.
pub fn svgo_config(config: &OptimizerConfig) -> Value {
    let plugins: Vec<Value> = config
        .plugins
        .iter()
        .map(|plugin| match plugin {
            OptimizerPlugin::PresetDefault {
                keep_view_box,
                preserve_id_prefixes,
            } => {
                let mut overrides = Map::new();
                if *keep_view_box {
                    overrides.insert("removeViewBox".to_string(), Value::Bool(false));
                }
                if !preserve_id_prefixes.is_empty() {
                    overrides.insert(
                        "cleanupIds".to_string(),
                        json!({ "preservePrefixes": preserve_id_prefixes }),
                    );
                }
                json!({
                    "name": plugin.name(),
                    "params": { "overrides": overrides },
                })
            }
            other => Value::String(other.name().to_string()),
        })
        .collect();

    json!({
        "multipass": config.multipass,
        "plugins": plugins,
    })
}

/// Builds the Prettier options object for a formatter style.
pub fn prettier_options(style: &FormatterStyle, mode: LanguageMode) -> Value {
    let single_quote = style.quote_style == QuoteStyle::Single;
    json!({
        "parser": match mode {
            LanguageMode::TypeScript => "typescript",
            LanguageMode::Plain => "babel",
        },
        "printWidth": style.print_width,
        "tabWidth": style.tab_width,
        "useTabs": style.use_tabs,
        "semi": style.semicolons,
        "singleQuote": single_quote,
        "jsxSingleQuote": single_quote,
        "trailingComma": match style.trailing_comma {
            TrailingComma::Minimal => "es5",
            TrailingComma::None => "none",
            TrailingComma::All => "all",
        },
        "bracketSpacing": style.bracket_spacing,
        "arrowParens": match style.arrow_parens {
            ArrowParens::Avoid => "avoid",
            ArrowParens::Always => "always",
        },
    })
}
