//! GeoBrowse CLI - Command-line interface
//!
//! This binary provides a command-line interface to the geobrowse library.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use geobrowse::backend::{BackendRegistry, LayerKind};
use geobrowse::config::{load_config, ScanConfig};
use geobrowse::filter::{PatternSyntax, SublayerFilter};
use geobrowse::select::{materialize_layers, plan_selection, SelectionPlan};
use geobrowse::source::resolve;
use geobrowse::tree::{BrowseTree, ItemKind, NodeId};

#[derive(Debug, Clone, ValueEnum)]
enum KindArg {
    /// Only accept vector sources
    Vector,
    /// Only accept raster sources
    Raster,
}

impl From<KindArg> for LayerKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Vector => LayerKind::Vector,
            KindArg::Raster => LayerKind::Raster,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum SyntaxArg {
    /// Shell-style wildcards, `|` separates alternatives
    Wildcard,
    /// Regular expression matched anywhere in the name
    Regex,
}

impl From<SyntaxArg> for PatternSyntax {
    fn from(syntax: SyntaxArg) -> Self {
        match syntax {
            SyntaxArg::Wildcard => PatternSyntax::Wildcard,
            SyntaxArg::Regex => PatternSyntax::Regex,
        }
    }
}

#[derive(Parser)]
#[command(name = "geobrowse")]
#[command(about = "Probe and browse geospatial data sources", long_about = None)]
#[command(version = geobrowse::VERSION)]
struct Args {
    /// Path to an INI configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a location and list the layers it would load
    Probe {
        /// Location to resolve (file path, archive, or virtual path)
        location: String,

        /// Restrict resolution to one layer kind
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Backend ids to try, in order (default: all registered)
        #[arg(long, value_delimiter = ',')]
        backends: Vec<String>,
    },

    /// List the recognized entries of an archive
    Entries {
        /// Path to a zip, tar, tar.gz, or gz file
        archive: String,
    },

    /// Recursively print the browse tree rooted at a directory
    Browse {
        /// Directory to browse
        dir: String,

        /// Only show layers whose name matches this pattern
        #[arg(long)]
        filter: Option<String>,

        /// How to interpret the filter pattern
        #[arg(long, value_enum, default_value = "wildcard")]
        syntax: SyntaxArg,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                process::exit(1);
            }
        },
        None => ScanConfig::default(),
    };

    let registry = BackendRegistry::with_defaults();
    debug!(backends = ?registry.backend_ids(), "backend registry initialized");

    match args.command {
        Command::Probe {
            location,
            kind,
            backends,
        } => run_probe(&location, kind, &backends, &registry, &config),
        Command::Entries { archive } => run_entries(&archive, &registry, &config),
        Command::Browse { dir, filter, syntax } => {
            run_browse(&dir, filter.as_deref(), syntax, &registry, config)
        }
    }
}

fn run_probe(
    location: &str,
    kind: Option<KindArg>,
    backends: &[String],
    registry: &BackendRegistry,
    config: &ScanConfig,
) {
    let desired = kind.map(LayerKind::from);
    let Some(source) = resolve(location, desired, backends, registry, config) else {
        eprintln!("Error: no backend could open '{}'", location);
        process::exit(1);
    };

    println!("Resolved by backend: {}", source.backend_id());
    println!("Source kind: {}", source.kind());
    println!("Layers: {}", source.len());
    for info in source.layer_info() {
        println!("  {}", info);
    }

    match plan_selection(&source, config.prompt_mode) {
        SelectionPlan::Nothing => {}
        SelectionPlan::Auto(names) => {
            println!();
            println!("Would load without prompting:");
            for layer in materialize_layers(&source, &names) {
                println!("  [{}] {} <- {}", layer.kind, layer.name, layer.uri);
            }
        }
        SelectionPlan::Choose(rows) => {
            println!();
            println!("Selection required ({} sublayers):", rows.len());
            for row in rows {
                println!("  {}: {} ({})", row.id, row.name, row.kind);
            }
        }
        SelectionPlan::Declined => {
            println!();
            println!("Multiple sublayers and prompting is disabled; nothing loaded.");
            process::exit(1);
        }
    }
}

fn run_entries(archive: &str, registry: &BackendRegistry, config: &ScanConfig) {
    let entries = geobrowse::archive::enumerate_entries(archive, registry, config);
    if entries.is_empty() {
        eprintln!("Error: no recognized entries in '{}'", archive);
        process::exit(1);
    }
    for entry in entries {
        println!("[{}] {} -> {}", entry.kind, entry.name, entry.open_string);
    }
}

fn run_browse(
    dir: &str,
    pattern: Option<&str>,
    syntax: SyntaxArg,
    registry: &BackendRegistry,
    config: ScanConfig,
) {
    let filter = match SublayerFilter::new(pattern.unwrap_or(""), syntax.into()) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Error: invalid filter pattern: {}", e);
            process::exit(1);
        }
    };

    let mut tree = BrowseTree::new(dir, registry, config);
    let root = tree.root();
    print_subtree(&mut tree, root, &filter, 0);
}

fn print_subtree(tree: &mut BrowseTree<'_>, id: NodeId, filter: &SublayerFilter, depth: usize) {
    tree.populate(id);
    let Some(node) = tree.item(id) else { return };
    if !filter.accepts(tree, id) {
        return;
    }

    let tag = match node.kind() {
        ItemKind::Directory => "dir",
        ItemKind::Collection => "collection",
        ItemKind::ArchiveContainer => "archive",
        ItemKind::Layer => match node.layer() {
            Some(layer) if layer.kind == LayerKind::Raster => "raster",
            Some(_) => "vector",
            None => "layer",
        },
    };
    println!("{}{} ({})", "  ".repeat(depth), node.name(), tag);

    for child in tree.children(id) {
        print_subtree(tree, child, filter, depth + 1);
    }
}
