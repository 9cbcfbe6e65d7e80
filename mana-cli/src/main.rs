//! Thin driver binary over `mana-loader`: load a file or module path, print
//! diagnostics, and dump either its export table or a Markdown doc tree.
//!
//! Deliberately thin (SPEC_FULL.md §2) — argument parsing and process
//! plumbing only. All of the actual work (resolution, caching, cycle
//! detection, export registration) lives in `mana-loader`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mana_diagnostics::DiagnosticEngine;
use mana_loader::{DocWalker, LoadError, Loader, LoaderConfig};

#[derive(Parser)]
#[command(name = "mana")]
#[command(version)]
#[command(about = "Mana language front-end: module loading and symbol resolution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Additional directory to search for modules, may be repeated.
    #[arg(long = "search-path", global = true, value_name = "DIR")]
    search_paths: Vec<PathBuf>,

    /// Project root; `<root>/src/<module>` and `<root>/<module>` are probed.
    #[arg(long = "project-root", global = true, value_name = "DIR")]
    project_root: Option<PathBuf>,

    /// Overrides the `MANA_LIB`-derived standard-library root for this run.
    #[arg(long = "lib-root", global = true, value_name = "DIR")]
    lib_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a file or module path and report any diagnostics.
    Check {
        /// A `.mana` file path or a `::`-separated module path.
        path: String,
    },
    /// Load a file or module path and print its sorted export table.
    Exports {
        /// A `.mana` file path or a `::`-separated module path.
        path: String,
    },
    /// Load a file or module path and print a Markdown doc tree.
    Doc {
        /// A `.mana` file path or a `::`-separated module path.
        path: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = build_config(&cli);
    let mut loader = Loader::new(config);

    let result = match &cli.command {
        Commands::Check { path } => run_check(&mut loader, path),
        Commands::Exports { path } => run_exports(&mut loader, path),
        Commands::Doc { path } => run_doc(&mut loader, path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> LoaderConfig {
    let mut config = match &cli.lib_root {
        Some(root) => LoaderConfig::new(root.clone()),
        None => LoaderConfig::from_env(),
    };
    if let Some(root) = &cli.project_root {
        config = config.with_project_root(root.clone());
    }
    for search_path in &cli.search_paths {
        config = config.with_search_path(search_path.clone());
    }
    config
}

/// A bare module path (`a::b::c`) is loaded via `load_module`; anything
/// else (a `.mana` file, a relative/absolute path) is loaded via
/// `load_file`, matching spec.md §4.4's two entry points.
fn looks_like_module_path(path: &str) -> bool {
    mana_loader::is_valid_module_path(path) && !path.contains(['/', '\\'])
}

fn load<'a>(loader: &'a mut Loader, path: &str) -> Result<&'a mana_loader::LoadedModule, anyhow::Error> {
    let result = if looks_like_module_path(path) {
        log::info!("loading module path {path}");
        loader.load_module(path)
    } else {
        log::info!("loading file {path}");
        loader.load_file(&PathBuf::from(path))
    };
    result.map_err(|err| report_and_convert(path, err))
}

fn report_and_convert(path: &str, err: LoadError) -> anyhow::Error {
    let mut engine = DiagnosticEngine::new();
    match &err {
        LoadError::Resolution(p) => engine.module_not_found(p),
        LoadError::Io(f) => engine.cannot_open_file(f),
        LoadError::Syntax(f, underlying) => engine.failed_to_parse(f, underlying),
        LoadError::Cycle(p) => engine.circular_module_dependency(p),
    }
    engine.print_all("");
    anyhow::anyhow!("failed to load `{path}`: {err}")
}

fn run_check(loader: &mut Loader, path: &str) -> Result<()> {
    let module = load(loader, path)?;
    println!("ok: {} ({} export(s))", module.file_path.display(), module.exports.len());
    Ok(())
}

fn run_exports(loader: &mut Loader, path: &str) -> Result<()> {
    let module = load(loader, path)?;
    let mut names: Vec<&String> = module.exports.keys().collect();
    names.sort();
    for name in names {
        let symbol = &module.exports[name];
        println!("{:<24} {:?}", symbol.name, symbol.kind);
    }
    Ok(())
}

fn run_doc(loader: &mut Loader, path: &str) -> Result<()> {
    let module = load(loader, path)?;
    let doc = DocWalker::collect(&module.ast);
    print!("{}", doc.to_markdown(&module.ast.name));
    Ok(())
}
