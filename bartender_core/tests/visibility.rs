use bartender_config::{Catalog, IngredientOption, PumpChannel, PumpConfigStore, PumpMap, Recipe};
use bartender_core::mocks::{NullDisplay, RecordingActuator};
use bartender_core::{
    Appliance, ApplianceConfig, DispenseController, FlowRate, MenuDelegate, MenuEntry, MenuId,
    MenuItem, MenuTree,
};
use bartender_traits::MonotonicClock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn pump_map(assignments: &[(&str, u8, &str)]) -> PumpMap {
    assignments
        .iter()
        .enumerate()
        .map(|(i, (name, pin, value))| {
            (
                format!("pump_{}", i + 1),
                PumpChannel {
                    name: name.to_string(),
                    pin: *pin,
                    value: value.to_string(),
                },
            )
        })
        .collect()
}

fn appliance(dir: &TempDir, catalog: Catalog, assignments: &[(&str, u8, &str)]) -> Appliance {
    let store = PumpConfigStore::with_map(
        dir.path().join("pump_config.json"),
        pump_map(assignments),
    );
    store.save().expect("seed pump config");
    let dispenser = DispenseController::new(
        Arc::new(RecordingActuator::new()),
        Arc::new(MonotonicClock::new()),
        Duration::ZERO,
    );
    Appliance::new(
        store,
        catalog,
        Box::new(NullDisplay),
        dispenser,
        ApplianceConfig {
            flow: FlowRate::new(0.001),
            clean_duration: Duration::from_millis(5),
            wrap_width: 13,
        },
        Box::new(|| {}),
    )
}

fn recipe(name: &str, parts: &[(&str, f32)]) -> Recipe {
    Recipe {
        name: name.to_string(),
        ingredients: parts
            .iter()
            .map(|(ing, vol)| (ing.to_string(), *vol))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn find_item<'t>(tree: &'t MenuTree, menu: MenuId, label: &str) -> &'t MenuItem {
    tree.node(menu)
        .items
        .iter()
        .find(|i| i.label == label)
        .unwrap_or_else(|| panic!("no item labelled {label:?}"))
}

fn find_submenu(tree: &MenuTree, parent: MenuId, label: &str) -> MenuId {
    tree.node(parent)
        .items
        .iter()
        .find_map(|i| match &i.entry {
            MenuEntry::Submenu(id) if i.label == label => Some(*id),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no submenu labelled {label:?}"))
}

#[test]
fn drink_is_visible_iff_every_ingredient_has_a_pump() {
    let dir = TempDir::new().unwrap();
    let mut app = appliance(
        &dir,
        Catalog::builtin(),
        &[("Pump 1", 17, "gin"), ("Pump 2", 27, "tonic")],
    );

    let mut tree = app.build_menu();
    app.prepare_for_render(&mut tree);

    let root = tree.root();
    assert!(find_item(&tree, root, "Gin & Tonic").visible);
    // rum and coke have no pumps
    assert!(!find_item(&tree, root, "Rum & Coke").visible);
    // long island needs five ingredients, only gin is pourable
    assert!(!find_item(&tree, root, "Long Island").visible);
}

#[test]
fn drink_requiring_an_unassigned_ingredient_is_filtered_out() {
    // No pump carries lime, so a lime drink must be hidden from the
    // rendered tree.
    let catalog = Catalog {
        drinks: vec![
            recipe("Gin & Tonic", &[("gin", 50.0), ("tonic", 150.0)]),
            recipe("Gimlet", &[("gin", 60.0), ("lime", 15.0)]),
        ],
        options: vec![IngredientOption {
            name: "Gin".to_string(),
            value: "gin".to_string(),
        }],
    };
    let dir = TempDir::new().unwrap();
    let mut app = appliance(
        &dir,
        catalog,
        &[("Pump 1", 17, "gin"), ("Pump 2", 27, "tonic")],
    );

    let mut tree = app.build_menu();
    app.prepare_for_render(&mut tree);

    let root = tree.root();
    assert!(find_item(&tree, root, "Gin & Tonic").visible);
    assert!(!find_item(&tree, root, "Gimlet").visible);
}

#[test]
fn assignment_changes_are_picked_up_on_the_next_render() {
    let dir = TempDir::new().unwrap();
    let mut app = appliance(
        &dir,
        Catalog::builtin(),
        &[("Pump 1", 17, "gin"), ("Pump 2", 27, "tonic")],
    );
    let mut tree = app.build_menu();

    app.prepare_for_render(&mut tree);
    assert!(find_item(&tree, tree.root(), "Gin & Tonic").visible);

    // Reassign pump 2 through the menu path: tonic is gone.
    let unassign = MenuItem::pump_option(
        "pump_2",
        &IngredientOption {
            name: "Nothing".to_string(),
            value: String::new(),
        },
    );
    assert!(app.item_activated(&unassign));

    app.prepare_for_render(&mut tree);
    assert!(!find_item(&tree, tree.root(), "Gin & Tonic").visible);
}

#[test]
fn active_pump_option_is_starred_and_others_are_not() {
    let dir = TempDir::new().unwrap();
    let mut app = appliance(
        &dir,
        Catalog::builtin(),
        &[("Pump 1", 17, "gin"), ("Pump 2", 27, "tonic")],
    );
    let mut tree = app.build_menu();
    app.prepare_for_render(&mut tree);

    let configure = find_submenu(&tree, tree.root(), "Configure");
    let pump_menu = find_submenu(&tree, configure, "Pump 1");

    let labels: Vec<&str> = tree
        .node(pump_menu)
        .items
        .iter()
        .map(|i| i.label.as_str())
        .collect();
    assert!(labels.contains(&"Gin *"), "assigned option is starred: {labels:?}");
    assert!(labels.contains(&"Rum"), "unassigned options keep base labels");
    assert!(
        !labels.contains(&"Gin"),
        "the starred option replaces the base label"
    );
}

#[test]
fn star_follows_a_reassignment() {
    let dir = TempDir::new().unwrap();
    let mut app = appliance(&dir, Catalog::builtin(), &[("Pump 1", 17, "gin")]);
    let mut tree = app.build_menu();

    let reassign = MenuItem::pump_option(
        "pump_1",
        &IngredientOption {
            name: "Rum".to_string(),
            value: "rum".to_string(),
        },
    );
    assert!(app.item_activated(&reassign));
    app.prepare_for_render(&mut tree);

    let configure = find_submenu(&tree, tree.root(), "Configure");
    let pump_menu = find_submenu(&tree, configure, "Pump 1");
    let labels: Vec<&str> = tree
        .node(pump_menu)
        .items
        .iter()
        .map(|i| i.label.as_str())
        .collect();
    assert!(labels.contains(&"Rum *"));
    assert!(labels.contains(&"Gin"));
}
