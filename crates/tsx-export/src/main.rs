//! tsx-export - export TSX components as a React app, a Next.js app, or a
//! component library

use anyhow::Result;
use clap::{Parser, Subcommand};
use export_core::options::{
    Bundler, RawFrameworkAppOptions, RawLibraryOptions, RawOptions, RawReactAppOptions,
    RouterMode, UiLibrary, Variant,
};
use export_core::tui::ExportArgs;
use export_core::JobStatus;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tsx-export")]
#[command(about = "Export TSX components as a React app, a Next.js app, or a component library")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export a single-page React app with a component picker
    React(ReactArgs),
    /// Export a Next.js app with one route per component
    Next(NextArgs),
    /// Export a publishable component library
    Library(LibraryArgs),
}

#[derive(clap::Args, Debug)]
pub struct CommonArgs {
    /// Component files (.tsx / .jsx)
    pub files: Vec<PathBuf>,

    /// Directory to search recursively for components (repeatable)
    #[arg(long = "components-dir")]
    pub components_dir: Vec<PathBuf>,

    /// Project directory to create
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// YAML config file with toolchain settings and option defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Install dependencies after export
    #[arg(long)]
    pub install: bool,

    /// Install dependencies and start the dev server
    #[arg(long)]
    pub run: bool,

    /// Open the dev server URL in a browser
    #[arg(long)]
    pub open: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ReactArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// package.json name of the app
    #[arg(long)]
    pub app_name: Option<String>,

    /// Skip Tailwind CSS setup
    #[arg(long)]
    pub no_tailwind: bool,

    /// UI kit to pre-install (none, mui, chakra)
    #[arg(long)]
    pub ui_library: Option<UiLibrary>,
}

#[derive(clap::Args, Debug)]
pub struct NextArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// package.json name of the app
    #[arg(long)]
    pub app_name: Option<String>,

    /// Next.js version to pin
    #[arg(long = "next-version")]
    pub next_version: Option<String>,

    /// Routing convention (app, pages)
    #[arg(long)]
    pub router: Option<RouterMode>,

    /// Generate JavaScript instead of TypeScript
    #[arg(long)]
    pub javascript: bool,

    /// Skip ESLint setup
    #[arg(long)]
    pub no_lint: bool,

    /// Skip Tailwind CSS setup
    #[arg(long)]
    pub no_tailwind: bool,
}

#[derive(clap::Args, Debug)]
pub struct LibraryArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// npm package name
    #[arg(long = "name")]
    pub package_name: Option<String>,

    /// Initial package version
    #[arg(long)]
    pub package_version: Option<String>,

    /// Generate JavaScript instead of TypeScript
    #[arg(long)]
    pub javascript: bool,

    /// Bundler (rollup, webpack)
    #[arg(long)]
    pub bundler: Option<Bundler>,

    /// Skip Storybook setup
    #[arg(long)]
    pub no_storybook: bool,
}

/// A `--no-x` / `--javascript` switch only overrides when given
fn switched_off(flag: bool) -> Option<bool> {
    flag.then_some(false)
}

fn export_args(common: CommonArgs, variant: Variant, overrides: RawOptions) -> ExportArgs {
    ExportArgs {
        variant: Some(variant),
        files: common.files,
        components_dirs: common.components_dir,
        directory: common.directory,
        config: common.config,
        overrides: Some(overrides),
        install: common.install,
        run: common.run,
        open: common.open,
        yes: common.yes,
    }
}

impl From<Command> for ExportArgs {
    fn from(command: Command) -> Self {
        match command {
            Command::React(a) => {
                let raw = RawReactAppOptions {
                    run_after_export: None,
                    app_name: a.app_name,
                    tailwind: switched_off(a.no_tailwind),
                    ui_library: a.ui_library,
                };
                export_args(a.common, Variant::ReactApp, RawOptions::ReactApp(raw))
            }
            Command::Next(a) => {
                let raw = RawFrameworkAppOptions {
                    app_name: a.app_name,
                    framework_version: a.next_version,
                    router_mode: a.router,
                    use_typescript: switched_off(a.javascript),
                    include_linter: switched_off(a.no_lint),
                    include_styling: switched_off(a.no_tailwind),
                };
                export_args(a.common, Variant::FrameworkApp, RawOptions::FrameworkApp(raw))
            }
            Command::Library(a) => {
                let raw = RawLibraryOptions {
                    package_name: a.package_name,
                    package_version: a.package_version,
                    use_typescript: switched_off(a.javascript),
                    bundler: a.bundler,
                    include_storybook: switched_off(a.no_storybook),
                };
                export_args(a.common, Variant::Library, RawOptions::Library(raw))
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("export_core=debug,tsx_export=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    let args = Args::parse();
    init_tracing(args.verbose);

    // First Ctrl+C cancels the running job; a second one exits
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        if handler_token.is_cancelled() {
            std::process::exit(130);
        }
        handler_token.cancel();
    })
    .ok();

    let export_args = match args.command {
        Some(command) => command.into(),
        // No subcommand provided, ask for everything (interactive mode)
        None => ExportArgs::default(),
    };

    let result = export_core::run(export_args, cancel).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    let report = result?;
    if report.open_browser {
        if let Some(url) = &report.outcome.url {
            if let Err(e) = open::that(url) {
                tracing::warn!("failed to open {}: {}", url, e);
                eprintln!("Could not open a browser; visit {} manually", url);
            }
        }
    }

    Ok(match report.outcome.status {
        JobStatus::Succeeded => ExitCode::SUCCESS,
        JobStatus::Cancelled => ExitCode::from(130),
        _ => ExitCode::FAILURE,
    })
}
