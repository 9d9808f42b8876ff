//! Armory Example
//!
//! Equips a few items with precious materials inside an in-memory host with
//! two connected sessions, and prints the rules and actions that result.
//!
//! Usage: `armory [DEFINITIONS_DIR]`. Without a directory the built-in
//! definitions are used. `AURUM_CONFIG` may point at a RON config file and
//! `RUST_LOG` controls logging.

use aurum_core::{Cmd, DocId, Grade, Value};
use aurum_script::Loader;
use aurum_sync::{HostItem, ItemChange, MemoryHost, SessionId, SyncConfig, Synchronizer};
use tracing_subscriber::EnvFilter;

const GM: SessionId = SessionId(0);
const PLAYER: SessionId = SessionId(1);

fn main() -> Result<(), aurum_sync::Error> {
    init_logging();
    println!("=== Aurum Armory Example ===\n");

    let config = match std::env::var("AURUM_CONFIG") {
        Ok(path) => {
            let content = std::fs::read_to_string(&path).map_err(aurum_script::Error::from)?;
            SyncConfig::from_ron_str(&content)?
        }
        Err(_) => SyncConfig::default(),
    };

    let sync = match std::env::args().nth(1) {
        Some(dir) => {
            let mut loader = Loader::new();
            loader.load_directory(&dir)?;
            Synchronizer::new(loader.finish(), config)
        }
        None => Synchronizer::with_builtin(config)?,
    };
    let mut host = MemoryHost::new(sync, 2);

    // Shield: sovereign steel grants a reaction
    let shield = host.create_item(
        PLAYER,
        HostItem::new("", "Steel Shield", "shield").with_actor("valeros"),
    )?;
    host.update_item(PLAYER, &shield, ItemChange::set_material("sovereign-steel", Grade::Standard))?;
    show(&host, &shield);

    host.update_item(PLAYER, &shield, ItemChange::new().with_grade(Grade::High))?;
    show(&host, &shield);

    // Armor: dragonhide asks for an element
    let hide = host.create_item(
        PLAYER,
        HostItem::new("", "Hide Armor", "armor").with_actor("valeros"),
    )?;
    host.update_item(PLAYER, &hide, ItemChange::set_material("dragonhide", Grade::Standard))?;
    show(&host, &hide);
    drain(&mut host, PLAYER);

    host.answer_prompt(PLAYER, &hide, Some("cold"))?;
    show(&host, &hide);

    // Weapon: a warning does not stop the material from applying
    let sword = host.create_item(
        GM,
        HostItem::new("", "Longsword", "weapon")
            .with_actor("valeros")
            .with_base_item("longsword"),
    )?;
    host.update_item(GM, &sword, ItemChange::set_material("duskwood", Grade::Standard))?;
    show(&host, &sword);
    drain(&mut host, GM);

    // Clearing and deleting
    host.update_item(PLAYER, &shield, ItemChange::clear_material())?;
    show(&host, &shield);
    host.delete_item(PLAYER, &hide)?;

    println!("Sub-entities left on the actor:");
    for record in host.store().records() {
        println!("  {} ({})", record.name, record.id);
    }
    println!("\nDone.");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn show(host: &MemoryHost, id: &DocId) {
    let Some(item) = host.item(id) else {
        return;
    };
    let material = item
        .material_key()
        .map(|k| k.to_string())
        .unwrap_or_else(|| "none".to_string());
    let grade = item
        .grade
        .map(|g| g.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{} [{} {}]", item.name, material, grade);

    for rule in &item.rules {
        let label = rule
            .get("label")
            .or_else(|| rule.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let key = rule.get("key").and_then(Value::as_str).unwrap_or_default();
        println!("  rule   {:<22} {}", key, label);
    }
    for record in host.linked_actions(id) {
        println!("  action {}", record.name);
    }
    println!();
}

fn drain(host: &mut MemoryHost, session: SessionId) {
    for cmd in host.take_outbox(session) {
        match cmd {
            Cmd::RequestParameter {
                parameter,
                choices,
                default,
                ..
            } => println!("  > choose {} from {:?} (default {})\n", parameter, choices, default),
            Cmd::Warn { message, .. } => println!("  > warning: {}\n", message),
            _ => {}
        }
    }
}
