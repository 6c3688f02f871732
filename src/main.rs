use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use outliner::commands::{benchmark_command, test_command};
use outliner::config::load_config;
use outliner::error::OutlineError;
use outliner::logging;
use outliner::projector::{Node, ViewKind, ViewRules};
use outliner::provider::TreeProvider;
use outliner::reload::{ReloadController, ReloadOutcome};
use outliner::store::SymbolStore;
use outliner::tool::{GoOutliner, ToolLocator, VersionStatus};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "go-outliner-views")]
#[command(version)]
#[command(about = "Outline, test and benchmark views of a Go package directory")]
struct Cli {
    /// File or directory to outline (a file selects its directory). Defaults to the current directory.
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Which view to print
    #[arg(long, value_enum, default_value_t = ViewArg::Main)]
    view: ViewArg,

    /// Print the fully expanded tree as JSON instead of indented text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ViewArg {
    Main,
    Tests,
    Benchmarks,
}

impl From<ViewArg> for ViewKind {
    fn from(v: ViewArg) -> Self {
        match v {
            ViewArg::Main => ViewKind::Main,
            ViewArg::Tests => ViewKind::Tests,
            ViewArg::Benchmarks => ViewKind::Benchmarks,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Locate the extraction tool and compare its version with the configured minimum
    CheckTool {
        /// Install (or update) the tool when it is missing or outdated
        #[arg(long)]
        install: bool,
    },
    /// Print the command that runs one test, or all tests
    Test { name: Option<String> },
    /// Print the command that runs one benchmark, or all benchmarks
    Bench { name: Option<String> },
}

#[derive(Serialize)]
struct TreeOut {
    #[serde(flatten)]
    node: Node,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<TreeOut>,
}

fn expand_tree(provider: &TreeProvider, parent: Option<&Node>) -> Vec<TreeOut> {
    provider
        .children(parent)
        .into_iter()
        .map(|node| {
            let children = expand_tree(provider, Some(&node));
            TreeOut { node, children }
        })
        .collect()
}

fn render_text(out: &mut String, items: &[TreeOut], depth: usize) {
    for item in items {
        let indent = "  ".repeat(depth);
        match item.node.command() {
            Some(target) => out.push_str(&format!(
                "{indent}{}  ({}:{})\n",
                item.node.label(),
                target.file.display(),
                target.line + 1
            )),
            None => out.push_str(&format!("{indent}{}\n", item.node.label())),
        }
        render_text(out, &item.children, depth + 1);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init();
    let cwd = std::env::current_dir().context("Failed to get current dir")?;
    let cfg = load_config(&cwd);
    logging::set_debug_channel(cfg.enable_debug_channel);

    match cli.cmd {
        Some(Command::Test { name }) => {
            println!("{}", test_command(name.as_deref()).join(" "));
            return Ok(());
        }
        Some(Command::Bench { name }) => {
            println!("{}", benchmark_command(name.as_deref()).join(" "));
            return Ok(());
        }
        Some(Command::CheckTool { install }) => {
            let rt = tokio::runtime::Runtime::new()?;
            let locator = ToolLocator::from_env();
            let needs_install = match GoOutliner::locate(&cfg.tool, &locator) {
                Ok(tool) => match rt.block_on(tool.check_version())? {
                    VersionStatus::Current { have } => {
                        println!("{} {} ({})", cfg.tool.name, have.trim(), tool.bin().display());
                        false
                    }
                    VersionStatus::Outdated { have, want } => {
                        println!("{} is outdated: have {}, want at least {want}", cfg.tool.name, have.trim());
                        true
                    }
                },
                Err(OutlineError::ToolMissing { tool }) => {
                    println!("Missing: {tool}");
                    true
                }
                Err(e) => return Err(e.into()),
            };
            if needs_install && install {
                rt.block_on(GoOutliner::install(&cfg.tool, &locator))?;
                println!("Installed {}", cfg.tool.install_package);
            }
            return Ok(());
        }
        None => {}
    }

    let target = cli.path.clone().unwrap_or_else(|| cwd.clone());
    let target = if target.is_absolute() { target } else { cwd.join(target) };

    let tool = GoOutliner::locate(&cfg.tool, &ToolLocator::from_env())
        .with_context(|| format!("Run `go-outliner-views check-tool --install` to install {}", cfg.tool.name))?;

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(tool.check_version()) {
        Ok(VersionStatus::Outdated { have, want }) => tracing::warn!(
            "{} is outdated: have {}, want at least {want}; run `go-outliner-views check-tool --install`",
            cfg.tool.name,
            have.trim()
        ),
        Ok(VersionStatus::Current { .. }) => {}
        Err(e) => tracing::debug!("Skipping version check: {e}"),
    }

    let store = Arc::new(SymbolStore::new(ViewRules::from_config(&cfg)));
    let provider = TreeProvider::new(cli.view.into(), &store);
    let controller = ReloadController::new(tool, store.clone(), &cfg.files);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")?.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(format!("extracting symbols from {}", target.display()));

    let outcome = rt.block_on(controller.reload(Some(&target)));
    spinner.finish_and_clear();

    match outcome {
        ReloadOutcome::DirectoryReadFailed(e) | ReloadOutcome::ExtractionFailed(e) => bail!(e),
        other => tracing::debug!("Reload outcome: {other:?}"),
    }

    let tree = expand_tree(&provider, None);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        let mut out = String::new();
        render_text(&mut out, &tree, 0);
        print!("{out}");
    }

    Ok(())
}
