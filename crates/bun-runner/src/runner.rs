//! bun process runner.

use crate::collaborator::{SourceFormatter, SvgOptimizer};
use crate::error::ToolError;
use crate::protocol::{prettier_options, svgo_config, BunReady, BunRequest, BunResponse, BunTask};
use blake3::Hasher;
use camino::{Utf8Path, Utf8PathBuf};
use jsx_transformer::{FormatterStyle, LanguageMode, OptimizerConfig};
use std::fs;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// How long one optimizer or formatter call may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const BUN_SCRIPT_FILENAME: &str = "svg2jsx-tools.mjs";
const BUN_SCRIPT_SOURCE: &str = r#"import { createInterface } from 'node:readline';
import { stdin, stdout } from 'node:process';
import { createRequire } from 'node:module';
import { pathToFileURL } from 'node:url';

const require = createRequire(pathToFileURL(process.cwd() + '/'));
const modules = new Map();

async function load(specifier, name) {
  if (!modules.has(specifier)) {
    const resolved = require.resolve(specifier);
    modules.set(specifier, await import(pathToFileURL(resolved).href));
  }
  const mod = modules.get(specifier);
  const fn = mod[name] ?? mod.default?.[name];
  if (typeof fn !== 'function') {
    throw new Error(`${specifier} does not export ${name}`);
  }
  return fn;
}

stdout.write(JSON.stringify({ ready: true }) + '\n');

const rl = createInterface({ input: stdin, crlfDelay: Infinity });

for await (const line of rl) {
  if (!line.trim()) continue;

  let req;
  try {
    req = JSON.parse(line);
  } catch (err) {
    const message = err && err.message ? err.message : String(err);
    stdout.write(JSON.stringify({ id: null, error: `invalid json: ${message}` }) + '\n');
    continue;
  }

  const id = req.id ?? null;
  try {
    let output;
    if (req.kind === 'optimize') {
      const optimize = await load('svgo', 'optimize');
      output = optimize(req.svg, req.config || {}).data;
    } else if (req.kind === 'format') {
      const format = await load('prettier', 'format');
      output = await format(req.source, req.options || {});
    } else {
      throw new Error(`unknown request kind: ${req.kind}`);
    }
    stdout.write(JSON.stringify({ id, output }) + '\n');
  } catch (err) {
    const message = err && err.message ? err.message : String(err);
    stdout.write(JSON.stringify({ id, error: message }) + '\n');
  }
}
"#;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Runs SVGO and Prettier from the workspace's `node_modules` under bun.
///
/// Every call spawns a short-lived bun process, so independent conversions
/// never share state.
#[derive(Debug, Clone)]
pub struct BunRunner {
    bun_path: Utf8PathBuf,
    workspace_root: Utf8PathBuf,
    script_path: Utf8PathBuf,
    timeout: Duration,
}

impl BunRunner {
    /// Creates a new bun runner, writing the runner script to the cache
    /// directory if it is missing or stale.
    pub fn new(bun_path: Utf8PathBuf, workspace_root: Utf8PathBuf) -> Result<Self, ToolError> {
        let script_path = ensure_script()?;
        Ok(Self {
            bun_path,
            workspace_root,
            script_path,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Finds bun and creates a runner for `workspace_root`.
    pub fn discover(workspace_root: Utf8PathBuf) -> Result<Self, ToolError> {
        let bun_path = Self::find_bun(Some(&workspace_root)).ok_or_else(|| {
            ToolError::NotFound("install bun from https://bun.sh or add it to PATH".into())
        })?;
        Self::new(bun_path, workspace_root)
    }

    /// Attempts to find bun in workspace, PATH, home directory, or cache.
    /// 1. Workspace node_modules/.bin/bun (if workspace_root provided)
    /// 2. PATH
    /// 3. ~/.bun/bin/bun (default install location)
    /// 4. Cache directory
    pub fn find_bun(workspace_root: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
        if let Some(workspace) = workspace_root {
            if let Some(path) = find_bun_in_bin(&workspace.join("node_modules/.bin")) {
                return Some(path);
            }
        }

        if let Ok(path) = which::which("bun") {
            if let Ok(utf8_path) = Utf8PathBuf::try_from(path) {
                return Some(utf8_path);
            }
        }

        if let Some(home) = dirs::home_dir().and_then(|p| Utf8PathBuf::try_from(p).ok()) {
            if let Some(path) = find_bun_in_bin(&home.join(".bun/bin")) {
                return Some(path);
            }
        }

        Self::get_cache_dir().and_then(|cache| find_bun_in_bin(&cache.join("node_modules/.bin")))
    }

    /// Gets the cache directory for svg2jsx.
    pub fn get_cache_dir() -> Option<Utf8PathBuf> {
        dirs::cache_dir()
            .and_then(|p| Utf8PathBuf::try_from(p).ok())
            .map(|p| p.join("svg2jsx"))
    }

    /// Gets the version of the installed bun binary.
    pub async fn get_bun_version(
        workspace_root: Option<&Utf8Path>,
    ) -> Result<(String, Utf8PathBuf), ToolError> {
        let bun_path = Self::find_bun(workspace_root)
            .ok_or_else(|| ToolError::NotFound("install bun from https://bun.sh".into()))?;

        let output = Command::new(&bun_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(ToolError::ProcessFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((version, bun_path))
    }

    async fn run(&self, task: BunTask<'_>) -> Result<String, ToolError> {
        let tool = task.tool();
        tracing::debug!(tool, bun = %self.bun_path, "running bun task");
        match tokio::time::timeout(self.timeout, self.exchange(task)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout(self.timeout)),
        }
    }

    /// Spawns bun, waits for it to be ready, sends one request and reads
    /// one response. The child is killed when this future is dropped.
    async fn exchange(&self, task: BunTask<'_>) -> Result<String, ToolError> {
        let tool = task.tool();
        let mut child = Command::new(&self.bun_path)
            .arg(&self.script_path)
            .current_dir(&self.workspace_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolError::ProtocolError("failed to open bun stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolError::ProtocolError("failed to open bun stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ToolError::ProtocolError("failed to open bun stderr".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut buffer = String::new();
            let _ = reader.read_to_string(&mut buffer).await;
            buffer
        });

        let mut lines = BufReader::new(stdout).lines();

        let ready_line = lines
            .next_line()
            .await
            .map_err(|e| ToolError::ProtocolError(format!("failed to read bun ready: {e}")))?;
        let Some(ready_line) = ready_line else {
            let stderr = stderr_task.await.unwrap_or_default();
            let status = child.wait().await?;
            return Err(ToolError::ProcessFailed {
                code: status.code().unwrap_or(-1),
                stderr,
            });
        };

        let ready: BunReady = serde_json::from_str(&ready_line)
            .map_err(|e| ToolError::ParseError(format!("invalid ready response: {e}")))?;
        if !ready.ready {
            return Err(ToolError::ProtocolError(format!(
                "unexpected bun ready response: {ready_line}"
            )));
        }

        let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&BunRequest { id, task })
            .map_err(|e| ToolError::ProtocolError(format!("failed to serialize request: {e}")))?;
        line.push('\n');
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ToolError::ProtocolError(format!("failed to write to bun stdin: {e}")))?;
        stdin
            .flush()
            .await
            .map_err(|e| ToolError::ProtocolError(format!("failed to flush bun stdin: {e}")))?;
        drop(stdin);

        let line = lines
            .next_line()
            .await
            .map_err(|e| ToolError::ProtocolError(format!("failed to read bun response: {e}")))?;
        let Some(line) = line else {
            let stderr = stderr_task.await.unwrap_or_default();
            let status = child.wait().await?;
            return Err(ToolError::ProcessFailed {
                code: status.code().unwrap_or(-1),
                stderr,
            });
        };

        let response: BunResponse = serde_json::from_str(&line)
            .map_err(|e| ToolError::ParseError(format!("invalid response: {e} ({line})")))?;

        if let Some(message) = response.error {
            return Err(ToolError::Rejected { tool, message });
        }
        if response.id != Some(id) {
            return Err(ToolError::ProtocolError(format!(
                "expected response id {id}, got {line}"
            )));
        }

        response
            .output
            .ok_or_else(|| ToolError::ProtocolError(format!("missing output: {line}")))
    }
}

impl SvgOptimizer for BunRunner {
    async fn optimize(&self, svg: &str, config: &OptimizerConfig) -> Result<String, ToolError> {
        self.run(BunTask::Optimize {
            svg,
            config: svgo_config(config),
        })
        .await
    }
}

impl SourceFormatter for BunRunner {
    async fn format(
        &self,
        source: &str,
        style: &FormatterStyle,
        mode: LanguageMode,
    ) -> Result<String, ToolError> {
        self.run(BunTask::Format {
            source,
            options: prettier_options(style, mode),
        })
        .await
    }
}

fn find_bun_in_bin(bin: &Utf8Path) -> Option<Utf8PathBuf> {
    let candidates: &[&str] = if cfg!(windows) {
        &["bun.exe", "bun.cmd", "bun"]
    } else {
        &["bun"]
    };

    candidates
        .iter()
        .map(|candidate| bin.join(candidate))
        .find(|path| path.exists())
}

fn ensure_script() -> Result<Utf8PathBuf, ToolError> {
    let cache_dir = BunRunner::get_cache_dir()
        .ok_or_else(|| ToolError::ScriptSetup("could not determine cache directory".into()))?;
    write_script_if_stale(&cache_dir)
}

fn write_script_if_stale(dir: &Utf8Path) -> Result<Utf8PathBuf, ToolError> {
    fs::create_dir_all(dir)
        .map_err(|e| ToolError::ScriptSetup(format!("failed to create cache dir: {e}")))?;

    let script_path = dir.join(BUN_SCRIPT_FILENAME);
    let expected_hash = blake3::hash(BUN_SCRIPT_SOURCE.as_bytes());

    if let Ok(existing) = fs::read(&script_path) {
        let mut hasher = Hasher::new();
        hasher.update(&existing);
        if hasher.finalize() == expected_hash {
            return Ok(script_path);
        }
    }

    tracing::debug!(path = %script_path, "writing bun runner script");
    fs::write(&script_path, BUN_SCRIPT_SOURCE)
        .map_err(|e| ToolError::ScriptSetup(format!("failed to write bun runner script: {e}")))?;

    Ok(script_path)
}
