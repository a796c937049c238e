// ABOUTME: Main application entry point.
// ABOUTME: Bootstraps the partition tree and feeds it commands from a script or stdin.

mod command;
mod render;

use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tiler_core::Config;
use tiler_layout::{drag_size, ChangeSet, PartitionId, PartitionTree};
use tracing_subscriber::EnvFilter;

use command::{parse_line, Command};
use render::Canvas;

#[derive(Debug, Parser)]
#[command(name = "tiler", about = "Drive a tiling partition tree from line commands")]
struct Args {
    /// Config file (defaults to ~/.config/tiler/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Fixed seed for partition colors
    #[arg(long)]
    seed: Option<u64>,

    /// Canvas width in cells
    #[arg(long)]
    width: Option<u16>,

    /// Canvas height in cells
    #[arg(long)]
    height: Option<u16>,

    /// Draw with letters instead of truecolor blocks
    #[arg(long)]
    plain: bool,
}

/// Whether the command loop should keep reading
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App {
    tree: PartitionTree,
    config: Config,
    /// Changes since the last draw
    pending: ChangeSet,
    plain: bool,
}

impl App {
    fn new(config: Config, plain: bool) -> Self {
        let mut tree = PartitionTree::empty(&config);
        if tree.root().is_none() {
            if let Err(e) = tree.create_partition(None, false) {
                tracing::error!("Failed to create root partition: {}", e);
            }
        }
        Self {
            tree,
            config,
            pending: ChangeSet::default(),
            plain,
        }
    }

    fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Split(id, direction) => {
                if !self.tree.can_split(id) {
                    tracing::warn!("No split controls on partition {}", id);
                    writeln!(out, "cannot split {}: not a leaf", id)?;
                    return Ok(Flow::Continue);
                }
                let result = self.tree.split_partition(id, direction);
                self.record(result, out)?;
            }
            Command::Remove(id) => {
                if self.tree.is_root(id) {
                    writeln!(out, "cannot remove {}: root partition", id)?;
                    return Ok(Flow::Continue);
                }
                let result = self.tree.remove_partition(id);
                self.record(result, out)?;
            }
            Command::Resize(id, size) => {
                if !self.tree.is_resizable(id) {
                    writeln!(out, "cannot resize {}: no resize handle", id)?;
                    return Ok(Flow::Continue);
                }
                let size = self.config.resize.clamp(size);
                let result = self.tree.resize_partitions(id, size);
                self.record(result, out)?;
            }
            Command::Drag { id, col, row } => self.drag(id, col, row, out)?,
            Command::Show => {
                let canvas = Canvas::paint(
                    &self.tree,
                    self.config.canvas_width,
                    self.config.canvas_height,
                );
                if self.plain {
                    canvas.write_plain(&self.tree, out)?;
                } else {
                    canvas.write_ansi(&self.tree, out)?;
                }
                tracing::debug!(
                    "Redrew after {} created, {} removed, {} updated",
                    self.pending.created.len(),
                    self.pending.removed.len(),
                    self.pending.updated.len()
                );
                self.pending = ChangeSet::default();
            }
            Command::Tree => {
                if let Some(root) = self.tree.root() {
                    self.write_outline(root, 0, out)?;
                }
            }
            Command::Dump => {
                let json = serde_json::to_string_pretty(&self.tree.snapshot())?;
                writeln!(out, "{}", json)?;
            }
            Command::Check => match self.tree.check_invariants() {
                Ok(()) => writeln!(out, "ok: {} partitions", self.tree.len())?,
                Err(violation) => {
                    tracing::error!("Invariant violated: {}", violation);
                    writeln!(out, "violation: {}", violation)?;
                }
            },
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Translate a pointer release at a canvas cell into a resize of `id`
    fn drag(&mut self, id: PartitionId, col: u16, row: u16, out: &mut impl Write) -> Result<()> {
        let Some(parent_id) = self.tree.get(id).and_then(|p| p.parent) else {
            writeln!(out, "cannot drag {}: no resize handle", id)?;
            return Ok(());
        };
        let (Some(direction), Some(parent_rect)) = (
            self.tree.get(parent_id).and_then(|p| p.split),
            self.tree.rects().get(&parent_id).copied(),
        ) else {
            writeln!(out, "cannot drag {}: parent is not laid out", id)?;
            return Ok(());
        };

        let canvas = Canvas::paint(&self.tree, self.config.canvas_width, self.config.canvas_height);
        let (x, y) = canvas.cell_center(col, row);
        let size = drag_size(parent_rect, direction, x, y, &self.config.resize);
        tracing::debug!("Drag of {} to ({}, {}) maps to {:.2}%", id, col, row, size);

        let result = self.tree.resize_partitions(id, size);
        self.record(result, out)
    }

    fn record(
        &mut self,
        result: Result<ChangeSet, tiler_layout::LayoutError>,
        out: &mut impl Write,
    ) -> Result<()> {
        match result {
            Ok(changes) => {
                if !changes.created.is_empty() {
                    writeln!(out, "created {}", join(&changes.created))?;
                }
                if !changes.removed.is_empty() {
                    writeln!(out, "removed {}", join(&changes.removed))?;
                }
                if changes.root_changed {
                    if let Some(root) = self.tree.root() {
                        writeln!(out, "root is now {}", root)?;
                    }
                }
                tracing::info!("Applied change, {} partitions", self.tree.len());
                self.pending.merge(changes);
            }
            Err(e) => {
                tracing::warn!("Operation rejected: {}", e);
                writeln!(out, "rejected: {}", e)?;
            }
        }
        Ok(())
    }

    fn write_outline(&self, id: PartitionId, depth: usize, out: &mut impl Write) -> Result<()> {
        let Some(node) = self.tree.get(id) else {
            return Ok(());
        };
        let kind = match node.split {
            None => "leaf".to_string(),
            Some(direction) => format!("{:?}", direction).to_lowercase(),
        };
        writeln!(
            out,
            "{:indent$}{} {} {:.1}% {}",
            "",
            id,
            kind,
            node.size,
            node.color,
            indent = depth * 2
        )?;
        for child in &node.children {
            self.write_outline(*child, depth + 1, out)?;
        }
        Ok(())
    }

    fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        for (number, line) in input.lines().enumerate() {
            let line = line.context("Failed to read command")?;
            let command = match parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Line {}: {:#}", number + 1, e);
                    writeln!(out, "error on line {}: {:#}", number + 1, e)?;
                    continue;
                }
            };
            if self.execute(command, out)? == Flow::Quit {
                break;
            }
        }
        out.flush()?;
        Ok(())
    }
}

fn join(ids: &[PartitionId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(width) = args.width {
        config.canvas_width = width;
    }
    if let Some(height) = args.height {
        config.canvas_height = height;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    tracing::info!("Starting tiler with a {}x{} canvas", config.canvas_width, config.canvas_height);

    let mut app = App::new(config, args.plain);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.script {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            app.run(BufReader::new(file), &mut out)
        }
        None => app.run(io::stdin().lock(), &mut out),
    }
}
