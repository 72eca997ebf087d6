#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use schemascope::explorer::{ExplorerController, TabLog};
use schemascope::provider::SnapshotProvider;
use schemascope::state::{ConfigManager, ExplorerEvent, ExplorerSettings};
use schemascope::tree::GroupingMode;
use schemascope::widget::TextTreeWidget;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Grouping {
    Flat,
    Namespace,
    BaseType,
    Hierarchy,
}

impl From<Grouping> for GroupingMode {
    fn from(value: Grouping) -> Self {
        match value {
            Grouping::Flat => GroupingMode::Flat,
            Grouping::Namespace => GroupingMode::ByNamespace,
            Grouping::BaseType => GroupingMode::ByBaseType,
            Grouping::Hierarchy => GroupingMode::ByHierarchy,
        }
    }
}

/// Print the explorer tree for one or more metadata snapshots.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Metadata JSON documents, one server each
    #[arg(long = "metadata", required = true)]
    metadata: Vec<PathBuf>,

    /// Fuzzy filter applied to the tree
    #[arg(long)]
    filter: Option<String>,

    /// Entity grouping; defaults to the saved setting
    #[arg(long, value_enum)]
    grouping: Option<Grouping>,

    /// Print collapsed rows too
    #[arg(long)]
    all: bool,

    /// Seconds to wait for servers to load
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match ConfigManager::new().and_then(|config| config.load_settings()) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("Using default settings: {err:#}");
            ExplorerSettings::default()
        }
    };
    if let Some(grouping) = args.grouping {
        settings.grouping_mode = grouping.into();
    }

    let mut explorer = ExplorerController::new(TextTreeWidget::new(), TabLog::new(), &settings)
        .context("Failed to start explorer")?;
    for path in &args.metadata {
        let provider = SnapshotProvider::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        explorer.add_server(Arc::new(provider))?;
    }

    if !explorer.wait_for_refresh(Duration::from_secs(args.timeout)) {
        bail!("Timed out waiting for metadata after {}s", args.timeout);
    }
    for event in explorer.take_events() {
        if let ExplorerEvent::RefreshFailed { error, .. } = event {
            eprintln!("{error}");
        }
    }
    if let Some(status) = explorer.status() {
        log::info!("{status}");
    }
    if let Some(filter) = args.filter.as_deref() {
        explorer.set_filter(filter);
    }

    let widget = explorer.widget();
    print!("{}", if args.all { widget.render_all() } else { widget.render() });
    Ok(())
}
