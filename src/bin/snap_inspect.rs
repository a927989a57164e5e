//! Snap Inspect - Piece Catalog Authoring Tool
//!
//! Offline companion to the runtime: validates a piece catalog, shows how
//! the anchors of two pieces pair up, and appends anchors to a piece.
//!
//! Run with: `cargo run --bin snap_inspect -- <command>`
//!
//! Commands:
//! - `check pieces.json` - validate and summarise
//! - `pairs pieces.json --piece Foundation --piece Wall` - anchor pair table
//! - `add-anchor pieces.json --piece Wall --snap-type WallTop --direction up
//!   --connection opposite --offset 2.0` - append an anchor and save
//!
//! Set `RUST_LOG=debug` for more detail.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use snapforge_engine::game::building::PieceCatalog;
use snapforge_engine::game::snap::{
    Anchor, ConnectionType, SnapDirection, SnapType, angle_between, can_connect, determine_optimal_connection_type,
    optimal_shared_connection, resolve_connection,
};
use snapforge_engine::physics::Pose;

#[derive(Parser)]
#[command(name = "snap_inspect", version, about = "Inspect and edit snap anchors in a piece catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a catalog and list its pieces
    Check { catalog: PathBuf },
    /// Show how every anchor of one piece pairs with every anchor of another
    Pairs {
        catalog: PathBuf,
        /// Exactly two piece names: source then target
        #[arg(long = "piece", num_args = 1, required = true)]
        pieces: Vec<String>,
    },
    /// Append an anchor to a piece and write the catalog back
    AddAnchor {
        catalog: PathBuf,
        #[arg(long)]
        piece: String,
        #[arg(long)]
        snap_type: SnapType,
        #[arg(long)]
        direction: SnapDirection,
        /// Fixed connection type (ignored with --auto)
        #[arg(long, default_value = "Opposite")]
        connection: ConnectionType,
        /// Auto-adjust among the --allow types (none = all)
        #[arg(long)]
        auto: bool,
        #[arg(long)]
        allow: Vec<ConnectionType>,
        /// Snap types this anchor accepts
        #[arg(long)]
        accepts: Vec<SnapType>,
        /// Distance from the piece origin along the anchor direction
        #[arg(long, default_value_t = 1.0)]
        offset: f32,
        /// Anchor does not carry weight
        #[arg(long)]
        no_support: bool,
        /// Quantize yaw to this step (degrees) when snapping
        #[arg(long)]
        lock_step: Option<f32>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check { catalog } => check(&catalog),
        Commands::Pairs { catalog, pieces } => pairs(&catalog, &pieces),
        Commands::AddAnchor {
            catalog,
            piece,
            snap_type,
            direction,
            connection,
            auto,
            allow,
            accepts,
            offset,
            no_support,
            lock_step,
        } => {
            let mut anchor = Anchor::new(snap_type, direction)
                .at(direction.local_axis() * offset)
                .accepting(accepts)
                .with_support(!no_support);
            anchor = if auto {
                anchor.auto_adjusting(allow)
            } else {
                anchor.with_fixed_connection(connection)
            };
            if let Some(step) = lock_step {
                anchor = anchor.locking_rotation(step);
            }
            add_anchor(&catalog, &piece, anchor)
        }
    }
}

fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = PieceCatalog::load(path)?;
    println!("{} pieces in {}", catalog.len(), path.display());
    for (index, piece) in catalog.iter().enumerate() {
        let cost: Vec<String> = piece
            .requirements
            .iter()
            .map(|r| format!("{} {}", r.amount, r.resource.name()))
            .collect();
        println!(
            "  [{}] {:<20} {:?}  anchors: {}  cost: {}",
            index,
            piece.name,
            piece.category,
            piece.anchors.len(),
            if cost.is_empty() { "free".to_string() } else { cost.join(", ") },
        );
        for anchor in &piece.anchors {
            let connection = if anchor.auto_adjust_connection {
                format!("auto {:?}", anchor.effective_allowed())
            } else {
                anchor.connection_type.to_string()
            };
            println!(
                "        {:<18} {:<8} at ({:.2}, {:.2}, {:.2})  {}{}",
                anchor.point_type.to_string(),
                anchor.direction.to_string(),
                anchor.local_position.x,
                anchor.local_position.y,
                anchor.local_position.z,
                connection,
                if anchor.provides_support { "" } else { "  (no support)" },
            );
        }
    }
    Ok(())
}

fn pairs(path: &Path, names: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let [source_name, target_name] = names else {
        return Err("pass --piece exactly twice: source then target".into());
    };
    let catalog = PieceCatalog::load(path)?;
    let missing = |name: &str| format!("no piece named '{name}'");
    let source = catalog.find(source_name).ok_or_else(|| missing(source_name.as_str()))?;
    let target = catalog.find(target_name).ok_or_else(|| missing(target_name.as_str()))?;

    println!("{} -> {} (both at the origin)", source.name, target.name);
    println!(
        "  {:<22} {:<22} {:>7} {:>6} {:>6} {:>14} {:>14} {:>7}",
        "source", "target", "angle", "a->b", "b->a", "resolved", "optimal", "near"
    );
    for (i, a) in source.anchors.iter().enumerate() {
        for (j, b) in target.anchors.iter().enumerate() {
            let wa = a.in_world(Pose::IDENTITY);
            let wb = b.in_world(Pose::IDENTITY);

            let angle = angle_between(wa.direction(), wb.direction())
                .map_or_else(|| "n/a".to_string(), |deg| format!("{deg:.1}"));
            let resolved = resolve_connection(&wa, &wb).map_or_else(|| "-".to_string(), |c| c.to_string());
            let optimal = optimal_shared_connection(&wa, &wb).unwrap_or_else(|| determine_optimal_connection_type(&wa, &wb));
            let near = wa.position().distance(wb.position()) <= a.connection_test_radius.max(b.connection_test_radius);

            println!(
                "  {:<22} {:<22} {:>7} {:>6} {:>6} {:>14} {:>14} {:>7}",
                format!("#{i} {}", a.point_type),
                format!("#{j} {}", b.point_type),
                angle,
                yes_no(can_connect(&wa, &wb)),
                yes_no(can_connect(&wb, &wa)),
                resolved,
                optimal.to_string(),
                yes_no(near),
            );
        }
    }
    Ok(())
}

fn add_anchor(path: &Path, piece: &str, anchor: Anchor) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = PieceCatalog::load(path)?;
    let summary = format!("{} {} at {:?}", anchor.point_type, anchor.direction, anchor.local_position);
    catalog.update(piece, |definition| definition.anchors.push(anchor))?;
    catalog.save(path)?;
    println!("Added {summary} to {piece}");
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
