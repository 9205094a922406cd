use std::fs;
use std::path::Path;

use content_forge::host::memory::MemoryHost;
use content_forge::host::{ActionKind, ActionNotification, ContentTable, StatKind, StringTable};
use content_forge::package::DirectoryPackageSource;
use content_forge::quest::NodeKind;
use content_forge::Framework;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn swamp_package(root: &Path) {
    let dir = root.join("swamp");
    write(
        &dir.join("mod.json"),
        r#"{ "id": "swamp", "name": "Swamp Pack", "author": "Ogre" }"#,
    );
    write(
        &dir.join("localization/en.json"),
        r#"{ "onion.name": "Layered Onion", "quest.collect": "Bring three onions" }"#,
    );
    write(
        &dir.join("items/onion.json"),
        r#"{
            "id": "onion",
            "name": "@onion.name",
            "price": 5,
            "effects": [{ "stat": "food", "value": "+15" }, { "type": "morale", "value": "max" }]
        }"#,
    );
    write(
        &dir.join("items/sack.toml"),
        r#"
            id = "sack"
            type = "bag"
            baseItem = 4
            bagCapacity = 25.0
        "#,
    );
    write(
        &dir.join("recipes/soup.toml"),
        r#"
            id = "soup"
            result = "onion"
            bench = "kitchen"
            ingredients = [{ item = "onion", count = 2 }]
        "#,
    );
    write(
        &dir.join("quests/harvest.json"),
        r#"{
            "id": "harvest",
            "title": "Harvest",
            "stages": [
                { "id": "collect", "type": "wait", "description": "@quest.collect",
                  "wait": { "type": "item", "item_id": "onion", "count": 3 },
                  "nextStages": ["thanks"] },
                { "id": "thanks", "type": "dialogue", "dialogue": { "text": "Thanks!" } }
            ]
        }"#,
    );
    write(&dir.join("items/broken.json"), "{ not json");
}

#[test]
fn directory_packages_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    swamp_package(temp_dir.path());
    fs::create_dir_all(temp_dir.path().join("no_manifest")).unwrap();

    let mut framework = Framework::default();
    let report = framework.discover(&DirectoryPackageSource::new(temp_dir.path(), "en"));
    assert_eq!(report.packages, 1);
    assert_eq!(report.registered, 4);
    assert!(framework.is_package_loaded("SWAMP"));

    // Files load in name order: onion.json before sack.toml
    let onion = framework.item_id("swamp:onion").unwrap();
    let sack = framework.item_id("swamp:sack").unwrap();
    assert_eq!((onion, sack), (60000, 60001));

    let mut host = MemoryHost::seeded();
    let injected = framework.inject_content(&mut host.tables());
    assert_eq!(injected.injected, 3);
    assert_eq!(injected.failed, 0);

    assert_eq!(host.strings.get_string(990000), Some("Layered Onion"));
    assert_eq!(host.items.get(onion).unwrap().price, 5);
    assert_eq!(host.items.get(sack).unwrap().capacity, 25.0);
    assert!(framework.is_custom_bag(sack));

    let recipe = host.recipes.get(51000).unwrap();
    assert_eq!(recipe.result_item, onion);
    assert_eq!(recipe.bench, "kitchen");

    assert!(framework.on_item_used(onion, &mut host.stats));
    assert_eq!(host.stats.current(StatKind::Food), Some(65.0));
    assert_eq!(host.stats.current(StatKind::Morale), Some(100.0));

    assert_eq!(
        framework.stage_text("swamp:harvest", "collect").as_deref(),
        Some("Bring three onions")
    );
    let graph = framework.quest_graph("swamp:harvest").unwrap();
    let NodeKind::Wait(wait) = &graph.nodes[0].kind else {
        panic!("expected wait node");
    };
    assert_eq!(wait.note, "Bring three onions");
    assert_eq!(wait.condition.as_ref().unwrap().expression, "item_60000>=3");

    host.quests.start_quest("swamp:harvest", "collect");
    host.quests.set_inventory(onion, 3);
    let (mut tables, quests) = host.tables_and_quests();
    let action = framework.on_action(
        &ActionNotification::new(ActionKind::Item, onion, 1),
        &mut tables,
        quests,
    );
    assert_eq!(action.evaluation.completed, 1);
}

#[test]
fn missing_packages_directory_yields_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut framework = Framework::default();
    let report = framework.discover(&DirectoryPackageSource::new(
        temp_dir.path().join("absent"),
        "en",
    ));
    assert_eq!(report.packages, 0);

    let mut host = MemoryHost::seeded();
    let writes = host.total_writes();
    framework.inject_content(&mut host.tables());
    assert_eq!(host.total_writes(), writes);
}
