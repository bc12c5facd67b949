mod app;
mod config;
mod explore;
mod layout;
mod network;
mod refine;
mod session;
mod util;
mod view;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, anyhow};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::SessionConfig;
use explore::Direction;
use layout::OffsetPolicy;
use network::{IntegrityPolicy, load_network};
use session::Session;
use view::NodeColoring;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Network file (.nur gzip or plain .json). Without it the viewer asks for one.
    #[arg(long, env = "NETWORK_FILE")]
    network: Option<PathBuf>,

    /// JSON session config; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    depth: Option<u32>,

    #[arg(long, value_enum)]
    direction: Option<Direction>,

    /// Drop synapses that name missing cells instead of refusing the file.
    #[arg(long)]
    prune_dangling: bool,

    #[arg(long, value_enum)]
    layout_policy: Option<OffsetPolicy>,

    #[arg(long, value_enum)]
    node_coloring: Option<NodeColoring>,

    /// Cell to focus right after loading.
    #[arg(long)]
    focus: Option<String>,

    /// Write the visual graph as JSON to this path and exit without a window.
    #[arg(long, requires = "network")]
    export: Option<PathBuf>,
}

impl Args {
    fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };

        if let Some(depth) = self.depth {
            config.explorer.max_depth = depth;
        }
        if let Some(direction) = self.direction {
            config.explorer.direction = direction;
        }
        if self.prune_dangling {
            config.load.integrity = IntegrityPolicy::Prune;
        }
        if let Some(policy) = self.layout_policy {
            config.layout.offset_policy = policy;
        }
        if let Some(coloring) = self.node_coloring {
            config.style.node_coloring = coloring;
        }
        Ok(config)
    }
}

fn export(
    network_path: &Path,
    output: &Path,
    config: &SessionConfig,
    focus: Option<&str>,
) -> anyhow::Result<()> {
    let network = load_network(network_path, &config.load)
        .with_context(|| format!("could not load {}", network_path.display()))?;
    let mut session = Session::new(network, config)?;
    if let Some(focus) = focus {
        session.select_focus(focus)?;
    }

    let json = session.graph().to_json()?;
    fs::write(output, json).with_context(|| format!("could not write {}", output.display()))?;
    tracing::info!(
        output = %output.display(),
        visible = session.graph().visible_count(),
        "exported visual graph"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nurviz=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.session_config()?;

    if let Some(output) = &args.export {
        let network_path = args
            .network
            .as_deref()
            .ok_or_else(|| anyhow!("--export needs a network file"))?;
        return export(network_path, output, &config, args.focus.as_deref());
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "nurviz",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::NurvizApp::new(
                cc,
                config,
                args.network,
                args.focus,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}
