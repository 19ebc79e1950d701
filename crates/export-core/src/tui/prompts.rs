//! Charm-style export flow using cliclack

use crate::component::{load_components, Component};
use crate::config::{ExportConfig, ToolchainConfig};
use crate::export::{spawn_export_with_cancel, ExportJob, JobOutcome, JobStatus, JobSteps, ProgressEvent};
use crate::options::{
    Bundler, ExportOptions, RawFrameworkAppOptions, RawLibraryOptions, RawOptions,
    RawReactAppOptions, RouterMode, UiLibrary, Variant, DEFAULT_FRAMEWORK_APP_NAME,
    DEFAULT_FRAMEWORK_VERSION, DEFAULT_PACKAGE_VERSION, DEFAULT_REACT_APP_NAME,
};
use crate::runtime::check;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Arguments for one export run
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    /// Variant to export; prompted for when absent
    pub variant: Option<Variant>,
    pub files: Vec<PathBuf>,
    pub components_dirs: Vec<PathBuf>,
    /// Project directory to create
    pub directory: Option<PathBuf>,
    /// YAML config file with toolchain and option defaults
    pub config: Option<PathBuf>,
    /// Options from command-line flags; merged over the config file
    pub overrides: Option<RawOptions>,
    pub install: bool,
    pub run: bool,
    pub open: bool,
    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// What the caller needs after the job ends
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub outcome: JobOutcome,
    pub target_dir: PathBuf,
    /// The user asked for the dev-server URL to be opened
    pub open_browser: bool,
}

/// Run the export with interactive prompts for anything not given in
/// `args`. `cancel` stops the job (wire it to Ctrl+C).
pub async fn run(args: ExportArgs, cancel: CancellationToken) -> Result<ExportReport> {
    cliclack::intro("tsx-export")?;

    let config = ExportConfig::load_or_default(args.config.as_deref()).await?;
    if let Some(path) = &args.config {
        cliclack::log::info(format!("Using config {}", path.display()))?;
    }
    let toolchain = config.toolchain.clone().with_env_overrides();

    // Step 1: Variant
    let variant = match args.variant {
        Some(v) => v,
        None => select_variant()?,
    };

    // Step 2: Components
    let components = select_components(&args).await?;

    // Step 3: Options (config file < flags < prompts)
    let options = select_options(variant, &config, &args)?;

    // Step 4: Toolchain steps
    let steps = select_steps(&options, &args)?;

    // Step 5: Directory
    let target_dir = select_directory(&args, options.project_name())?;

    // Step 6: Advisory runtime check
    if steps.install {
        check_runtimes(&toolchain).await?;
    }

    // Step 7: Export
    let job = ExportJob::new(components, options, target_dir.clone(), steps)?;
    let outcome = export(job, toolchain, cancel).await?;

    let open_browser = match &outcome.url {
        Some(url) if !args.open && !args.yes => cliclack::confirm(format!("Open {} in your browser?", url))
            .initial_value(true)
            .interact()?,
        Some(_) => args.open,
        None => false,
    };

    print_outcome(&outcome, &target_dir, steps.install)?;

    Ok(ExportReport {
        outcome,
        target_dir,
        open_browser,
    })
}

fn select_variant() -> Result<Variant> {
    let variant = cliclack::select("What would you like to export?")
        .item(Variant::ReactApp, "React app", "single page with a component picker")
        .item(Variant::FrameworkApp, "Next.js app", "one route per component")
        .item(Variant::Library, "Component library", "publishable npm package")
        .interact()?;
    Ok(variant)
}

async fn select_components(args: &ExportArgs) -> Result<Vec<Component>> {
    let mut dirs = args.components_dirs.clone();
    if args.files.is_empty() && dirs.is_empty() {
        if args.yes {
            anyhow::bail!("No components given. Pass component files or --components-dir.");
        }
        let input: String = cliclack::input("Components directory")
            .placeholder(".")
            .default_input(".")
            .interact()?;
        dirs.push(PathBuf::from(input));
    }

    let spinner = cliclack::spinner();
    spinner.start("Loading components...");
    let components = match load_components(&args.files, &dirs).await {
        Ok(c) => c,
        Err(e) => {
            spinner.error("Failed to load components");
            return Err(e);
        }
    };

    if components.is_empty() {
        spinner.error("No components found");
        anyhow::bail!("No .tsx or .jsx files found.");
    }

    let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
    spinner.stop(format!("Components: {}", names.join(", ")));
    Ok(components)
}

fn select_options(variant: Variant, config: &ExportConfig, args: &ExportArgs) -> Result<ExportOptions> {
    let raw = match variant {
        Variant::ReactApp => {
            let mut raw = config.react_app.clone();
            if let Some(RawOptions::ReactApp(o)) = &args.overrides {
                raw.merge(o.clone());
            }
            if !args.yes {
                prompt_react(&mut raw)?;
            }
            RawOptions::ReactApp(raw)
        }
        Variant::FrameworkApp => {
            let mut raw = config.framework_app.clone();
            if let Some(RawOptions::FrameworkApp(o)) = &args.overrides {
                raw.merge(o.clone());
            }
            if !args.yes {
                prompt_framework(&mut raw)?;
            }
            RawOptions::FrameworkApp(raw)
        }
        Variant::Library => {
            let mut raw = config.library.clone();
            if let Some(RawOptions::Library(o)) = &args.overrides {
                raw.merge(o.clone());
            }
            if !args.yes {
                prompt_library(&mut raw)?;
            }
            RawOptions::Library(raw)
        }
    };

    let options = raw.validate()?;
    cliclack::log::success(format!(
        "Exporting {} as a {}",
        options.project_name(),
        options.variant()
    ))?;
    Ok(options)
}

fn prompt_text(prompt: &str, default: &str) -> Result<String> {
    let value: String = cliclack::input(prompt)
        .placeholder(default)
        .default_input(default)
        .interact()?;
    Ok(value)
}

fn prompt_bool(slot: &mut Option<bool>, prompt: &str, default: bool) -> Result<()> {
    if slot.is_none() {
        *slot = Some(cliclack::confirm(prompt).initial_value(default).interact()?);
    }
    Ok(())
}

fn prompt_react(raw: &mut RawReactAppOptions) -> Result<()> {
    if raw.app_name.is_none() {
        raw.app_name = Some(prompt_text("App name", DEFAULT_REACT_APP_NAME)?);
    }
    prompt_bool(&mut raw.tailwind, "Use Tailwind CSS?", true)?;
    if raw.ui_library.is_none() {
        raw.ui_library = Some(
            cliclack::select("UI library")
                .item(UiLibrary::None, "None", "")
                .item(UiLibrary::Mui, "Material UI", "@mui/material")
                .item(UiLibrary::Chakra, "Chakra UI", "@chakra-ui/react")
                .interact()?,
        );
    }
    Ok(())
}

fn prompt_framework(raw: &mut RawFrameworkAppOptions) -> Result<()> {
    if raw.app_name.is_none() {
        raw.app_name = Some(prompt_text("App name", DEFAULT_FRAMEWORK_APP_NAME)?);
    }
    if raw.framework_version.is_none() {
        raw.framework_version = Some(prompt_text("Next.js version", DEFAULT_FRAMEWORK_VERSION)?);
    }
    if raw.router_mode.is_none() {
        raw.router_mode = Some(
            cliclack::select("Router")
                .item(RouterMode::App, "App router", "app/")
                .item(RouterMode::Pages, "Pages router", "pages/")
                .interact()?,
        );
    }
    prompt_bool(&mut raw.use_typescript, "Use TypeScript?", true)?;
    prompt_bool(&mut raw.include_linter, "Include ESLint?", true)?;
    prompt_bool(&mut raw.include_styling, "Use Tailwind CSS?", true)?;
    Ok(())
}

fn prompt_library(raw: &mut RawLibraryOptions) -> Result<()> {
    if raw.package_name.is_none() {
        let name: String = cliclack::input("Package name")
            .placeholder("my-components")
            .interact()?;
        raw.package_name = Some(name);
    }
    if raw.package_version.is_none() {
        raw.package_version = Some(prompt_text("Package version", DEFAULT_PACKAGE_VERSION)?);
    }
    prompt_bool(&mut raw.use_typescript, "Use TypeScript?", true)?;
    if raw.bundler.is_none() {
        raw.bundler = Some(
            cliclack::select("Bundler")
                .item(Bundler::Rollup, "Rollup", "")
                .item(Bundler::Webpack, "Webpack", "")
                .interact()?,
        );
    }
    prompt_bool(&mut raw.include_storybook, "Include Storybook?", true)?;
    Ok(())
}

fn select_steps(options: &ExportOptions, args: &ExportArgs) -> Result<JobSteps> {
    let runnable = !matches!(options, ExportOptions::Library(o) if !o.include_storybook);
    let mut run = args.run || options.requests_run();
    let mut install = args.install;

    if !args.yes && !run && runnable {
        run = cliclack::confirm("Start the dev server after export?")
            .initial_value(false)
            .interact()?;
    }
    if !args.yes && !install && !run {
        install = cliclack::confirm("Install dependencies?")
            .initial_value(false)
            .interact()?;
    }

    Ok(JobSteps::new(install, run))
}

fn default_directory(project_name: &str) -> String {
    // "@scope/name" -> "name"
    project_name
        .rsplit('/')
        .next()
        .unwrap_or(project_name)
        .to_string()
}

fn select_directory(args: &ExportArgs, project_name: &str) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let default = default_directory(project_name);

    // Use --directory flag if provided
    let path = if let Some(dir) = &args.directory {
        let p = absolute(&current_dir, dir);
        cliclack::log::info(format!("Using directory: {}", p.display()))?;
        p
    } else if args.yes {
        current_dir.join(&default)
    } else {
        let input: String = cliclack::input("Project directory")
            .placeholder(&default)
            .default_input(&default)
            .interact()?;
        absolute(&current_dir, Path::new(&input))
    };

    // Validate parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.exists() && parent != Path::new("") {
            anyhow::bail!("Parent directory does not exist: {}", parent.display());
        }
    }

    // Warn if directory exists and has files
    if path.is_dir() {
        if let Ok(entries) = std::fs::read_dir(&path) {
            let count = entries.count();
            if count > 0 {
                cliclack::log::warning(format!(
                    "Directory has {} existing items; generated files will overwrite matching ones",
                    count
                ))?;

                // Auto-confirm with --yes flag
                let confirm = if args.yes {
                    true
                } else {
                    cliclack::confirm("Continue anyway?")
                        .initial_value(true)
                        .interact()?
                };

                if !confirm {
                    anyhow::bail!("Export cancelled.");
                }
            }
        }
    }

    Ok(path)
}

fn absolute(current_dir: &Path, dir: &Path) -> PathBuf {
    if dir.as_os_str().is_empty() || dir == Path::new(".") {
        current_dir.to_path_buf()
    } else if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        current_dir.join(dir)
    }
}

async fn check_runtimes(toolchain: &ToolchainConfig) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Checking toolchain...");

    let runtimes = check::check_toolchain(toolchain).await;
    let runtime_info: Vec<String> = runtimes
        .iter()
        .map(|r| {
            if r.available {
                format!("{} ({})", r.name, r.version.as_deref().unwrap_or("unknown"))
            } else {
                format!("{} (not installed)", r.name)
            }
        })
        .collect();
    spinner.stop(format!("Toolchain: {}", runtime_info.join(", ")));

    if let Some(missing) = check::missing_summary(&runtimes) {
        cliclack::log::warning(missing)?;
    }
    Ok(())
}

/// Spawn the job and render its progress until it finishes
async fn export(job: ExportJob, toolchain: ToolchainConfig, cancel: CancellationToken) -> Result<JobOutcome> {
    let mut handle = spawn_export_with_cancel(job, toolchain, cancel.child_token());
    let mut outcome = None;

    while let Some(event) = handle.progress.recv().await {
        match event {
            ProgressEvent::Status(status) => match status {
                JobStatus::Generating => cliclack::log::step("Generating project")?,
                JobStatus::Installing => cliclack::log::step("Installing dependencies")?,
                JobStatus::Running => cliclack::log::step("Starting dev server")?,
                _ => {}
            },
            ProgressEvent::Message(message) => {
                cliclack::log::remark(message.dimmed())?;
            }
            ProgressEvent::Finished(finished) => outcome = Some(finished),
        }
    }

    let job = handle.join.await.context("Export task failed")?;
    tracing::debug!(job = job.id, status = %job.status(), lines = job.progress_log().len(), "export finished");

    outcome
        .or_else(|| job.outcome().cloned())
        .context("Export ended without a final status")
}

fn print_outcome(outcome: &JobOutcome, target_dir: &Path, installed: bool) -> Result<()> {
    match outcome.status {
        JobStatus::Succeeded => {
            if let Some(url) = &outcome.url {
                cliclack::log::success(format!("Running at {}", url.cyan()))?;
            }

            println!();
            println!("  Next steps");
            println!();
            println!("  1.  cd {}", target_dir.display());
            if !installed {
                println!("  2.  npm install");
            }

            cliclack::outro(format!("Exported to {}", target_dir.display()))?;
        }
        JobStatus::Cancelled => cliclack::outro_cancel("Export cancelled")?,
        _ => {
            let detail = outcome.detail.as_deref().unwrap_or("unknown error");
            cliclack::log::error(detail)?;
            cliclack::outro_cancel("Export failed")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directory_strips_scope() {
        assert_eq!(default_directory("@acme/ui-kit"), "ui-kit");
        assert_eq!(default_directory("tsx-components-app"), "tsx-components-app");
    }

    #[test]
    fn test_absolute() {
        let cwd = Path::new("/work");
        assert_eq!(absolute(cwd, Path::new(".")), PathBuf::from("/work"));
        assert_eq!(absolute(cwd, Path::new("out")), PathBuf::from("/work/out"));
        assert_eq!(absolute(cwd, Path::new("/abs")), PathBuf::from("/abs"));
    }
}
