use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use call_expander::{
    ExpandSettings, ExpansionRequest, HeaderSearch, QueryOptions, SourceManager, TargetLocation,
    compiler::run_ast_dump,
    config::{LoggingSettings, SettingsOverrides},
    load_clang_json, resolve, trace_macros,
};

/// Resolve the call at a source position and print what is needed to inline
/// it, as JSON.
#[derive(Parser, Debug)]
#[command(name = "call-expander", version, about)]
struct Args {
    /// Source file containing the call.
    file: PathBuf,

    /// 1-based line of the call's name token.
    #[arg(long, short)]
    line: u32,

    /// 1-based byte column of the call's name token.
    #[arg(long, short)]
    column: u32,

    /// Report the call site. When none of --call, --declaration,
    /// --definition and --rewrite is given, everything is reported.
    #[arg(long)]
    call: bool,

    #[arg(long)]
    declaration: bool,

    #[arg(long)]
    definition: bool,

    #[arg(long)]
    rewrite: bool,

    /// Read a saved `-ast-dump=json` instead of running clang.
    #[arg(long)]
    ast: Option<PathBuf>,

    /// Context walk depth above the call.
    #[arg(long)]
    max_depth: Option<usize>,

    /// Settings file; by default the nearest call-expander.toml above FILE.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clang driver to run.
    #[arg(long)]
    clang: Option<String>,

    #[arg(long)]
    pretty: bool,

    #[arg(long, short)]
    verbose: bool,

    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Extra compiler arguments.
    #[arg(last = true)]
    compiler_args: Vec<String>,
}

impl Args {
    fn options(&self) -> QueryOptions {
        if !(self.call || self.declaration || self.definition || self.rewrite) {
            return QueryOptions::all();
        }
        QueryOptions {
            wants_call: self.call,
            wants_declaration: self.declaration,
            wants_definition: self.definition,
            wants_rewritten: self.rewrite,
        }
    }

    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            max_walk_depth: self.max_depth,
            clang: self.clang.clone(),
            extra_flags: self.compiler_args.clone(),
            log_level: None,
            pretty: self.pretty.then_some(true),
        }
    }
}

fn init_logging(
    args: &Args,
    settings: &LoggingSettings,
) {
    let directive =
        if args.verbose { "call_expander=debug".to_string() } else { format!("call_expander={}", settings.level.as_directive()) };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let stderr_layer =
        fmt::layer().with_writer(std::io::stderr).with_ansi(false).with_target(false).with_filter(filter());

    let file_layer = args.log_file.as_ref().map(|path| {
        let file_appender = tracing_appender::rolling::never(
            path.parent().unwrap_or(std::path::Path::new(".")),
            path.file_name().unwrap_or(std::ffi::OsStr::new("call-expander.log")),
        );
        fmt::layer().with_writer(file_appender).with_ansi(false).with_target(false).with_filter(filter())
    });

    tracing_subscriber::registry().with(stderr_layer).with(file_layer).init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut settings = match &args.config {
        Some(path) => ExpandSettings::load(path)?,
        None => ExpandSettings::discover(&args.file)?,
    };
    settings.apply_overrides(args.overrides());
    init_logging(&args, &settings.logging);

    let file = args.file.display().to_string();
    let sources = SourceManager::with_disk_access();
    let text = sources.load(&args.file).with_context(|| format!("cannot expand in {file}"))?;

    let json = match &args.ast {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read AST dump {}", path.display()))?,
        None => run_ast_dump(&args.file, &settings.compiler).await?,
    };
    let tree = load_clang_json(&json).context("failed to load the AST")?;
    let headers = HeaderSearch::new(&sources, &settings.compiler.include_paths);
    let macros = trace_macros(&file, &text, &headers);
    debug!("tree has {} nodes, {} macro definitions", tree.len(), macros.definitions().len());

    let target = sources.resolve_target(&TargetLocation {
        file: file.clone(),
        line: args.line,
        column: args.column,
    })?;

    let request = ExpansionRequest {
        tree: &tree,
        sources: &sources,
        macros: &macros,
        target,
        options: args.options(),
        search: settings.search.clone(),
    };
    let query = resolve(&request)?;

    if query.is_empty() {
        warn!("no callable found at {file}:{}:{}", args.line, args.column);
        eprintln!("no callable found at {file}:{}:{}", args.line, args.column);
    } else {
        info!("resolved call at {file}:{}:{}", args.line, args.column);
    }

    let output = if settings.output.pretty { serde_json::to_string_pretty(&query)? } else { serde_json::to_string(&query)? };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        },
    }
}
