//! Tileworld - headless runner
//!
//! Loads a model catalog and a level, composites it into a recording sink,
//! optionally searches a path and prints what happened.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;

use tileworld::compositing::{RecordingSink, SinkOp};
use tileworld::core::error::Result;
use tileworld::core::{Cell, EngineConfig};
use tileworld::engine::World;
use tileworld::quest::QuestBook;
use tileworld::world::loader::{load_catalog, load_level, missing_models, require_models};

/// Headless tile world runner
#[derive(Parser, Debug)]
#[command(name = "tileworld")]
#[command(about = "Load a level, composite it headlessly and optionally find a path")]
struct Args {
    /// Model catalog JSON
    #[arg(long, default_value = "data/models.json")]
    models: PathBuf,

    /// Level JSON
    #[arg(long, default_value = "data/level1.json")]
    level: PathBuf,

    /// Directory prefixed to every model image
    #[arg(long)]
    assets: Option<String>,

    /// Engine config TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path start as x,y
    #[arg(long, requires = "to")]
    from: Option<Cell>,

    /// Path goal as x,y
    #[arg(long, requires = "from")]
    to: Option<Cell>,

    /// Refuse levels that refer to unknown models
    #[arg(long)]
    strict: bool,

    /// Milliseconds of animation to simulate
    #[arg(long, default_value_t = 0)]
    ticks: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load_from_toml(path)?,
        None => EngineConfig::default(),
    };
    let mut catalog = load_catalog(&args.models)?;
    if let Some(base) = &args.assets {
        catalog.rebase_images(base);
    }
    let level = load_level(&args.level)?;

    if args.strict {
        require_models(&level, &catalog)?;
    }
    let missing = missing_models(&level, &catalog);
    if !missing.is_empty() {
        tracing::warn!("Level refers to unknown models: {}", missing.join(", "));
    }

    let mut world = World::new(config, catalog, RecordingSink::new())?;
    let quests = Rc::new(RefCell::new(QuestBook::new()));
    QuestBook::attach(&quests, &mut world);

    let summary = world.load_level(&level);
    {
        let mut book = quests.borrow_mut();
        book.load(&level.quests);
        book.activate_first(world.messages_mut());
    }

    if args.ticks > 0 {
        let changed = world.tick(args.ticks);
        tracing::info!("Advanced animations by {}ms, {} frames changed", args.ticks, changed);
    }

    println!("=== {} ===", world.level_name().unwrap_or("unnamed level"));
    println!(
        "World {}x{}, {} pathfinding",
        world.world_size().x,
        world.world_size().y,
        world.pathfinder_name()
    );
    println!(
        "Loaded {} characters, {} objects, {} terrain ({} skipped)",
        summary.characters, summary.objects, summary.terrain, summary.skipped
    );
    println!("Blocked cells: {}", world.occupancy().len());
    println!(
        "Sink calls: {} create, {} update, {} remove",
        world.sink().calls_of(SinkOp::Create).count(),
        world.sink().calls_of(SinkOp::Update).count(),
        world.sink().calls_of(SinkOp::Remove).count()
    );
    println!("Active quests: {}", quests.borrow().active().len());

    if let (Some(from), Some(to)) = (args.from, args.to) {
        let path = world.find_path(from, to);
        if path.is_empty() {
            println!("No path from {} to {}", from, to);
        } else {
            let steps: Vec<String> = path.iter().map(|c| c.to_string()).collect();
            println!("Path ({} cells): {}", path.len(), steps.join(" -> "));
        }
    }

    for message in world.messages().iter() {
        println!("[{}] {}", message.sender, message.text);
    }

    Ok(())
}
