//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::{absolute, expand_path, ConfigError, ProjectConfig};
use crate::output::{ConvertSummary, FileReport, Formatter};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use svg2jsx::{
    component_name_from_path, error_comment, output_extension, BunRunner, ConversionOptions,
    Converter, FormatterStyle, LanguageMode, OptimizerConfig, SourceFormatter, SvgOptimizer,
    ToolError, Unavailable, DEFAULT_COMPONENT_NAME,
};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use walkdir::WalkDir;

/// Quiet period after a change event before converting again.
const DEBOUNCE: Duration = Duration::from_millis(150);

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// An input path does not exist.
    #[error("input not found: {0}")]
    MissingInput(Utf8PathBuf),

    /// Flags that cannot be combined.
    #[error("{0}")]
    Usage(String),

    /// Failed to read stdin.
    #[error("failed to read stdin: {0}")]
    Stdin(std::io::Error),

    /// Watch error.
    #[error("watch error: {0}")]
    WatchFailed(String),
}

/// svgo and prettier under bun, when bun could be found.
#[derive(Debug, Clone)]
struct Tools(Option<BunRunner>);

impl Tools {
    fn setup(workspace: &Utf8Path, options: &ConversionOptions, timeout: Duration) -> Self {
        let wanted = options.optimize_svg || (options.use_formatter && !options.minify);
        if !wanted {
            return Self(None);
        }

        match BunRunner::discover(workspace.to_owned()) {
            Ok(runner) => Self(Some(runner.with_timeout(timeout))),
            Err(error) => {
                tracing::warn!(%error, "svgo and prettier are unavailable");
                Self(None)
            }
        }
    }
}

impl SvgOptimizer for Tools {
    async fn optimize(&self, svg: &str, config: &OptimizerConfig) -> Result<String, ToolError> {
        match &self.0 {
            Some(runner) => runner.optimize(svg, config).await,
            None => Unavailable.optimize(svg, config).await,
        }
    }
}

impl SourceFormatter for Tools {
    async fn format(
        &self,
        source: &str,
        style: &FormatterStyle,
        mode: LanguageMode,
    ) -> Result<String, ToolError> {
        match &self.0 {
            Some(runner) => runner.format(source, style, mode).await,
            None => Unavailable.format(source, style, mode).await,
        }
    }
}

/// Everything a conversion task needs, shared across tasks.
struct Job {
    converter: Converter<Tools, Tools>,
    options: ConversionOptions,
    workspace: Utf8PathBuf,
    out_dir: Option<Utf8PathBuf>,
    name: Option<String>,
    to_stdout: bool,
    emit_ast: bool,
}

/// Runs the conversion for all inputs.
pub async fn run(args: Args) -> Result<ConvertSummary, OrchestratorError> {
    let workspace = absolute(&args.workspace);

    let config = ProjectConfig::load(args.config.as_deref(), &workspace)?;
    let (mut options, config_out_dir, config_ignore) = match config {
        Some((path, config)) => {
            tracing::debug!(%path, "loaded config");
            (config.options, config.out_dir, config.ignore)
        }
        None => (ConversionOptions::default(), None, Vec::new()),
    };
    args.apply_to(&mut options);

    if args.mixes_stdin() {
        return Err(OrchestratorError::Usage(
            "`-` reads stdin and cannot be combined with other inputs".to_string(),
        ));
    }
    let stdin = args.reads_stdin();
    if stdin && args.watch {
        return Err(OrchestratorError::Usage(
            "--watch needs file or directory inputs".to_string(),
        ));
    }
    if args.name.is_some() && args.inputs.len() > 1 {
        return Err(OrchestratorError::Usage(
            "--name can only be used with a single input".to_string(),
        ));
    }

    let timeout = Duration::from_millis(args.timeout_ms);
    let tools = Tools::setup(&workspace, &options, timeout);
    let job = Arc::new(Job {
        converter: Converter::new(tools.clone(), tools).with_timeout(timeout),
        options,
        out_dir: args
            .out_dir
            .as_deref()
            .map(|dir| absolute(&expand_path(dir)))
            .or(config_out_dir),
        workspace,
        name: args.name.clone(),
        to_stdout: stdin || args.stdout,
        emit_ast: args.emit_ast,
    });

    if stdin {
        return run_stdin(&job, &args).await;
    }

    let ignore_set = build_ignore_set(args.ignore.iter().chain(&config_ignore))?;
    let roots = args
        .inputs
        .iter()
        .map(|input| absolute(&expand_path(input)))
        .collect::<Vec<_>>();
    let files = collect_files(&roots, &ignore_set)?;
    tracing::debug!(count = files.len(), "collected svg files");

    if args.watch {
        run_watch_mode(job, &args, roots, ignore_set, files).await
    } else {
        let reports = convert_files(&job, files, jobs(&args)).await;
        print_reports(&reports, &args, job.to_stdout);
        Ok(ConvertSummary::from_reports(&reports, args.fail_on_warnings))
    }
}

/// Converts markup from stdin and prints the component to stdout.
async fn run_stdin(job: &Job, args: &Args) -> Result<ConvertSummary, OrchestratorError> {
    let mut source = String::new();
    tokio::io::stdin()
        .read_to_string(&mut source)
        .await
        .map_err(OrchestratorError::Stdin)?;

    let component = job
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_COMPONENT_NAME.to_string());
    if job.emit_ast {
        emit_ast("<stdin>", &source);
    }

    let report = match job
        .converter
        .try_convert(&source, &component, &job.options)
        .await
    {
        Ok(conversion) => FileReport {
            input: "<stdin>".to_string(),
            component,
            output: None,
            code: Some(conversion.code),
            diagnostics: conversion.diagnostics,
            error: None,
        },
        Err(error) => {
            if args.output == OutputFormat::Human {
                println!("{}", error_comment(&error));
            }
            FileReport::failed("<stdin>", component, error.to_string())
        }
    };

    let reports = [report];
    match args.output {
        OutputFormat::Human => {
            let report = &reports[0];
            if let Some(code) = &report.code {
                println!("{code}");
            }
            for diag in &report.diagnostics {
                eprintln!("Warning: {diag}");
            }
            if let Some(error) = &report.error {
                eprintln!("Error: {error}");
            }
        }
        OutputFormat::Json => println!("{}", Formatter::format_json(&reports)),
    }

    Ok(ConvertSummary::from_reports(&reports, args.fail_on_warnings))
}

fn build_ignore_set<'a>(
    patterns: impl Iterator<Item = &'a String>,
) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }

    // Default ignores
    for pattern in ["**/node_modules/**", "**/.git/**"] {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }

    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Expands inputs into SVG files. Directories are walked and filtered by
/// the ignore set (matched relative to the directory); files named
/// explicitly are always kept.
fn collect_files(
    roots: &[Utf8PathBuf],
    ignore_set: &GlobSet,
) -> Result<Vec<Utf8PathBuf>, OrchestratorError> {
    let mut files = Vec::new();
    let mut seen = BTreeSet::new();

    for root in roots {
        if root.is_dir() {
            let mut found: Vec<Utf8PathBuf> = WalkDir::new(root)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
                .filter(|p| is_svg(p))
                .filter(|p| !is_ignored(p, root, ignore_set))
                .collect();
            found.sort();
            files.extend(found.into_iter().filter(|p| seen.insert(p.clone())));
        } else if root.is_file() {
            if seen.insert(root.clone()) {
                files.push(root.clone());
            }
        } else {
            return Err(OrchestratorError::MissingInput(root.clone()));
        }
    }

    Ok(files)
}

fn is_svg(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn is_ignored(path: &Utf8Path, root: &Utf8Path, ignore_set: &GlobSet) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    ignore_set.is_match(relative.as_str())
}

/// Converts files concurrently, at most `jobs` at a time. Reports come
/// back in input order.
async fn convert_files(job: &Arc<Job>, files: Vec<Utf8PathBuf>, jobs: usize) -> Vec<FileReport> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, file) in files.into_iter().enumerate() {
        let job = Arc::clone(job);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (index, convert_file(&job, &file).await)
        });
    }

    let mut reports = Vec::with_capacity(tasks.len());
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(report) => reports.push(report),
            Err(error) => tracing::error!(%error, "conversion task failed"),
        }
    }
    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}

/// Converts one file and writes the component next to it or into the
/// output directory.
async fn convert_file(job: &Job, path: &Utf8Path) -> FileReport {
    let input = display_path(&job.workspace, path);
    let component = job
        .name
        .clone()
        .unwrap_or_else(|| component_name_from_path(path));

    let source = match tokio::fs::read_to_string(path).await {
        Ok(source) => source,
        Err(e) => return FileReport::failed(input, component, format!("failed to read file: {e}")),
    };
    if job.emit_ast {
        emit_ast(&input, &source);
    }

    let conversion = match job
        .converter
        .try_convert(&source, &component, &job.options)
        .await
    {
        Ok(conversion) => conversion,
        Err(error) => return FileReport::failed(input, component, error.to_string()),
    };

    let mut report = FileReport {
        input,
        component,
        output: None,
        code: None,
        diagnostics: conversion.diagnostics,
        error: None,
    };

    if job.to_stdout {
        report.code = Some(conversion.code);
        return report;
    }

    let dir = job
        .out_dir
        .clone()
        .or_else(|| path.parent().map(Utf8Path::to_path_buf))
        .unwrap_or_default();
    let target = dir.join(format!(
        "{}.{}",
        report.component,
        output_extension(&job.options)
    ));

    match write_component(&target, &conversion.code).await {
        Ok(()) => report.output = Some(display_path(&job.workspace, &target).into()),
        Err(e) => report.error = Some(format!("failed to write {target}: {e}")),
    }
    report
}

async fn write_component(target: &Utf8Path, code: &str) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut contents = code.to_string();
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    tokio::fs::write(target, contents).await
}

/// Prints the parsed tree of `source` to stderr.
fn emit_ast(input: &str, source: &str) {
    match svg_parser::parse(source) {
        Ok(document) => {
            let json = serde_json::to_string_pretty(&document.root).unwrap_or_default();
            eprintln!("=== AST for {} ===\n{}", input, json);
        }
        Err(error) => eprintln!(
            "=== AST for {} ===\n{}",
            input,
            error.display_with_position(source)
        ),
    }
}

fn print_reports(reports: &[FileReport], args: &Args, to_stdout: bool) {
    let formatter = Formatter::new(args.output);
    let summary = ConvertSummary::from_reports(reports, args.fail_on_warnings);

    match args.output {
        OutputFormat::Json => println!("{}", Formatter::format_json(reports)),
        OutputFormat::Human if to_stdout => {
            // Components own stdout; everything else goes to stderr.
            for report in reports {
                if let Some(code) = &report.code {
                    println!("{code}");
                }
                eprint!("{}", formatter.format(report));
            }
            eprintln!("{}", summary.format());
        }
        OutputFormat::Human => {
            for report in reports {
                print!("{}", formatter.format(report));
            }
            println!("{}", summary.format());
        }
    }
}

/// Prints a single report as soon as it is ready; JSON goes out one
/// object per line.
fn print_report(report: &FileReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(report).unwrap_or_default());
        }
        OutputFormat::Human => {
            let text = Formatter::new(format).format(report);
            if let Some(code) = &report.code {
                println!("{code}");
                eprint!("{text}");
            } else {
                print!("{text}");
            }
        }
    }
}

/// Runs in watch mode.
///
/// Changes are debounced; a new conversion of a file aborts one still
/// running for the same file.
async fn run_watch_mode(
    job: Arc<Job>,
    args: &Args,
    roots: Vec<Utf8PathBuf>,
    ignore_set: GlobSet,
    initial_files: Vec<Utf8PathBuf>,
) -> Result<ConvertSummary, OrchestratorError> {
    use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

    println!("Starting watch mode...\n");

    let reports = convert_files(&job, initial_files, jobs(args)).await;
    print_reports(&reports, args, job.to_stdout);

    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )
    .map_err(|e| OrchestratorError::WatchFailed(e.to_string()))?;

    let roots: Vec<Utf8PathBuf> = roots
        .into_iter()
        .map(|root| root.canonicalize_utf8().unwrap_or(root))
        .collect();
    for root in &roots {
        let (path, mode) = if root.is_dir() {
            (root.as_path(), RecursiveMode::Recursive)
        } else {
            // Editors often replace files, so watch the directory.
            (
                root.parent().unwrap_or(root.as_path()),
                RecursiveMode::NonRecursive,
            )
        };
        watcher
            .watch(path.as_std_path(), mode)
            .map_err(|e| OrchestratorError::WatchFailed(e.to_string()))?;
    }

    println!("Watching for changes... (Ctrl+C to stop)\n");

    let mut in_flight: HashMap<Utf8PathBuf, JoinHandle<()>> = HashMap::new();

    while let Some(event) = rx.recv().await {
        let mut changed = BTreeSet::new();
        let mut collect = |event: notify::Event| {
            if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                changed.extend(
                    event
                        .paths
                        .into_iter()
                        .filter_map(|p| Utf8PathBuf::try_from(p).ok())
                        .filter(|p| is_tracked(p, &roots, &ignore_set)),
                );
            }
        };
        collect(event);

        let deadline = tokio::time::Instant::now() + DEBOUNCE;
        while let Ok(Some(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
            collect(event);
        }

        in_flight.retain(|_, handle| !handle.is_finished());
        for path in changed {
            if let Some(previous) = in_flight.remove(&path) {
                tracing::debug!(%path, "superseding running conversion");
                previous.abort();
            }

            let job = Arc::clone(&job);
            let output = args.output;
            let task_path = path.clone();
            let handle = tokio::spawn(async move {
                let report = convert_file(&job, &task_path).await;
                print_report(&report, output);
            });
            in_flight.insert(path, handle);
        }
    }

    Err(OrchestratorError::WatchFailed(
        "watch channel closed unexpectedly".to_string(),
    ))
}

fn is_tracked(path: &Utf8Path, roots: &[Utf8PathBuf], ignore_set: &GlobSet) -> bool {
    if !is_svg(path) || !path.is_file() {
        return false;
    }
    roots.iter().any(|root| {
        if root.is_dir() {
            path.starts_with(root) && !is_ignored(path, root, ignore_set)
        } else {
            path == root
        }
    })
}

fn jobs(args: &Args) -> usize {
    args.jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    })
}

/// Shows `path` relative to the workspace when it is inside it.
fn display_path(workspace: &Utf8Path, path: &Utf8Path) -> String {
    path.strip_prefix(workspace).unwrap_or(path).to_string()
}
