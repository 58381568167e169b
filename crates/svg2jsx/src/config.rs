//! Configuration loading.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use svg2jsx::ConversionOptions;
use thiserror::Error;

/// Config file looked up in the workspace when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "svg2jsx.config.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid JSON or has unknown keys.
    #[error("invalid config {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

/// Project configuration from `svg2jsx.config.json`.
///
/// ```json
/// {
///   "options": { "memo": true, "exportStyle": "named", "quotes": "single" },
///   "outDir": "src/icons",
///   "ignore": ["**/legacy/**"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Conversion options; flags given on the command line win.
    #[serde(default)]
    pub options: ConversionOptions,

    /// Output directory, relative to the config file.
    #[serde(default)]
    pub out_dir: Option<Utf8PathBuf>,

    /// Extra ignore globs.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl ProjectConfig {
    /// Loads the config named by `--config`, or the workspace default if
    /// it exists.
    ///
    /// An explicit path must exist; a missing default is not an error.
    pub fn load(
        explicit: Option<&Utf8Path>,
        workspace: &Utf8Path,
    ) -> Result<Option<(Utf8PathBuf, Self)>, ConfigError> {
        let path = match explicit {
            Some(path) => expand_path(path),
            None => {
                let path = workspace.join(CONFIG_FILE_NAME);
                if !path.exists() {
                    return Ok(None);
                }
                path
            }
        };

        let config = Self::read(&path)?;
        Ok(Some((path, config)))
    }

    /// Reads and parses one config file.
    ///
    /// A relative `outDir` is resolved against the directory holding the
    /// file, so the result never depends on where the command runs.
    pub fn read(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;

        if let (Some(out_dir), Some(base)) = (&config.out_dir, path.parent()) {
            let out_dir = expand_path(out_dir);
            config.out_dir = Some(if out_dir.is_relative() {
                absolute(base).join(out_dir)
            } else {
                out_dir
            });
        }

        Ok(config)
    }
}

/// Resolves `path` against the current directory.
pub fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .ok()
        .and_then(|cwd| Utf8PathBuf::try_from(cwd).ok())
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|| path.to_path_buf())
}

/// Expands a leading `~` to the home directory.
pub fn expand_path(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(shellexpand::tilde(path.as_str()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svg2jsx::{ExportStyle, QuoteStyle};
    use tempfile::TempDir;

    fn workspace(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_missing_default_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(ProjectConfig::load(None, &workspace(&dir)).unwrap().is_none());
    }

    #[test]
    fn test_missing_explicit_is_error() {
        let dir = TempDir::new().unwrap();
        let path = workspace(&dir).join("nope.json");
        let err = ProjectConfig::load(Some(&path), &workspace(&dir)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_default_config() {
        let dir = TempDir::new().unwrap();
        let root = workspace(&dir);
        fs::write(
            root.join(CONFIG_FILE_NAME),
            r#"{
                "options": { "memo": true, "exportStyle": "named", "quotes": "single" },
                "outDir": "src/icons",
                "ignore": ["**/legacy/**"]
            }"#,
        )
        .unwrap();

        let (path, config) = ProjectConfig::load(None, &root).unwrap().unwrap();
        assert_eq!(path, root.join(CONFIG_FILE_NAME));
        assert!(config.options.memo);
        assert!(config.options.typescript);
        assert_eq!(config.options.export_style, ExportStyle::Named);
        assert_eq!(config.options.quote_style, QuoteStyle::Single);
        assert_eq!(config.out_dir, Some(root.join("src/icons")));
        assert_eq!(config.ignore, vec!["**/legacy/**"]);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = TempDir::new().unwrap();
        let path = workspace(&dir).join("config.json");

        fs::write(&path, r#"{ "outdir": "x" }"#).unwrap();
        assert!(matches!(
            ProjectConfig::read(&path),
            Err(ConfigError::Parse { .. })
        ));

        fs::write(&path, r#"{ "options": { "memoize": true } }"#).unwrap();
        let err = ProjectConfig::read(&path).unwrap_err();
        assert!(err.to_string().contains("memoize"), "{err}");
    }

    #[test]
    fn test_absolute_out_dir_kept() {
        let dir = TempDir::new().unwrap();
        let root = workspace(&dir);
        let path = root.join("config.json");
        let out = root.join("abs");
        fs::write(&path, format!(r#"{{ "outDir": {:?} }}"#, out.as_str())).unwrap();

        assert_eq!(ProjectConfig::read(&path).unwrap().out_dir, Some(out));
    }

    #[test]
    fn test_relative_config_path_resolves_out_dir_against_its_directory() {
        let dir = TempDir::new_in(".").unwrap();
        let relative_dir = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        assert!(relative_dir.is_relative());
        let path = relative_dir.join("config.json");
        fs::write(&path, r#"{ "outDir": "out" }"#).unwrap();

        let (_, config) = ProjectConfig::load(Some(&path), Utf8Path::new("/elsewhere"))
            .unwrap()
            .unwrap();
        let out_dir = config.out_dir.unwrap();
        assert!(out_dir.is_absolute(), "{out_dir}");
        assert_eq!(out_dir, absolute(&relative_dir).join("out"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        assert_eq!(expand_path(Utf8Path::new("a/b")), Utf8PathBuf::from("a/b"));
    }
}
