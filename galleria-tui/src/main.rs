use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use galleria_core::artic::ArticSource;
use galleria_core::{MemPageSource, PageSource, PaginatedSelectionController, Record, Resolution};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

mod browser;
mod config;
mod logging;
mod theme;

use config::{Overrides, ResolvedSource, Settings};
use logging::LogTarget;

#[derive(Parser)]
#[command(name = "galleria", version, about = "Browse and select artworks from a paginated catalog")]
struct Cli {
    /// Serve pages from a JSON array of records instead of the remote API
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,
    /// Catalog API base URL (overrides settings)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Rows per page (overrides settings)
    #[arg(long, global = true)]
    page_size: Option<usize>,
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive table (default)
    Browse,
    /// Fetch one page and print it
    Page {
        /// 0-based page index
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[arg(long)]
        json: bool,
    },
    /// Load a page and select its first N rows
    Select {
        /// Number of rows; anything but a positive integer selects nothing
        #[arg(long, allow_hyphen_values = true)]
        count: String,
        /// 0-based page index
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show effective settings
    Config {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Browse);

    let settings_path = config::settings_path();
    let (settings, settings_err) = match config::read_settings(&settings_path) {
        Ok(s) => (s.unwrap_or_default(), None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let level = logging::level_for(cli.verbose, settings.log_level.as_deref());
    let target = match command {
        Commands::Browse => LogTarget::File(config::log_path()),
        _ => LogTarget::Stderr,
    };
    logging::init_logging(&level, target)?;
    if let Some(e) = settings_err {
        warn!(error = %format!("{:#}", e), "ignoring unreadable settings file");
    }

    let resolved = settings.resolve_source(&Overrides {
        base_url: cli.base_url.clone(),
        page_size: cli.page_size,
    });

    if let Commands::Config { json } = command {
        return print_config(&settings_path, &settings, &resolved, json);
    }

    let source = build_source(cli.fixture.as_deref(), &resolved)?;
    let mut controller = PaginatedSelectionController::new(source);
    let rt = tokio::runtime::Runtime::new()?;

    match command {
        Commands::Browse => {
            info!(page_size = resolved.page_size, "starting browser");
            let picked =
                browser::run_browser_default(controller, rt.handle(), settings.alt_screen())?;
            for r in picked {
                println!("{}", r.id);
            }
        }
        Commands::Page { index, json } => {
            load(&rt, &mut controller, index)?;
            let view = controller.view();
            if json {
                let out = serde_json::json!({
                    "page_index": view.page_index,
                    "total": view.total,
                    "first": view.first,
                    "last": view.last,
                    "report": view.report,
                    "records": controller.records(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for row in &view.rows {
                    println!("{}", row_line(&row.record, row.selected));
                }
                println!("{}", view.report);
            }
        }
        Commands::Select { count, index, json } => {
            load(&rt, &mut controller, index)?;
            if !controller.request_bulk_select_input(&count) {
                info!(count = %count, "ignoring invalid row count");
            }
            if json {
                let selected = controller.selection().to_ordered_vec();
                println!("{}", serde_json::to_string_pretty(&selected)?);
            } else {
                for r in controller.selection().iter() {
                    println!("{}", r.id);
                }
            }
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn build_source(
    fixture: Option<&std::path::Path>,
    resolved: &ResolvedSource,
) -> Result<Arc<dyn PageSource>> {
    match fixture {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let src = MemPageSource::from_json_slice(&bytes, resolved.page_size)
                .with_context(|| format!("parsing fixture {}", path.display()))?;
            info!(records = src.len(), "serving pages from fixture");
            Ok(Arc::new(src))
        }
        None => {
            let src = ArticSource::new(resolved.artic_config())?;
            Ok(Arc::new(src))
        }
    }
}

fn load(
    rt: &tokio::runtime::Runtime,
    controller: &mut PaginatedSelectionController,
    index: usize,
) -> Result<()> {
    match rt.block_on(controller.load_page(index)) {
        Resolution::Applied => Ok(()),
        Resolution::Failed(e) => Err(e).with_context(|| format!("failed to load page {}", index)),
        Resolution::Stale => anyhow::bail!("page {} was superseded", index),
    }
}

fn print_config(
    path: &std::path::Path,
    settings: &Settings,
    resolved: &ResolvedSource,
    json: bool,
) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "settings_path": path,
            "log_level": settings.log_level,
            "alt_screen": settings.alt_screen(),
            "source": resolved,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("settings: {}", path.display());
        println!("base_url: {}", resolved.base_url);
        println!("page_size: {}", resolved.page_size);
        println!("timeout_ms: {}", resolved.timeout_ms);
        println!("user_agent: {}", resolved.user_agent);
        println!("alt_screen: {}", settings.alt_screen());
    }
    Ok(())
}

fn row_line(r: &Record, selected: bool) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        if selected { "*" } else { " " },
        r.id,
        preview(r.title.as_deref().unwrap_or("")),
        preview(r.artist_display.as_deref().unwrap_or(""))
    )
}

fn preview(s: &str) -> String {
    let s = s.replace('\n', " ");
    const MAX: usize = 60;
    if s.chars().count() > MAX {
        format!("{}…", s.chars().take(MAX).collect::<String>())
    } else {
        s
    }
}
