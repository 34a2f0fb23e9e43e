//! The appliance controller: the one `MenuDelegate` implementation.
//!
//! Owns the pump configuration store, the drink catalog, the display and
//! the dispense controller; builds the menu tree at startup and re-derives
//! visibility/annotations on it before every render.

use crate::context::MenuDelegate;
use crate::dispense::{DispenseController, DispenseJob, DispenseOutcome, FlowRate};
use crate::error::{ApplianceError, Report, Result};
use crate::menu::{MenuAction, MenuEntry, MenuItem, MenuTree};
use bartender_config::{Catalog, PumpConfigStore};
use bartender_traits::Display;
use std::time::Duration;

/// Tuning knobs the controller needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct ApplianceConfig {
    pub flow: FlowRate,
    /// Per-pump runtime of the clean cycle.
    pub clean_duration: Duration,
    /// Word-wrap width for menu text.
    pub wrap_width: usize,
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        Self {
            flow: FlowRate::default(),
            clean_duration: Duration::from_secs(20),
            wrap_width: 13,
        }
    }
}

pub struct Appliance {
    store: PumpConfigStore,
    catalog: Catalog,
    display: Box<dyn Display>,
    dispenser: DispenseController,
    config: ApplianceConfig,
    on_shutdown: Box<dyn FnMut()>,
}

impl Appliance {
    pub fn new(
        store: PumpConfigStore,
        catalog: Catalog,
        display: Box<dyn Display>,
        dispenser: DispenseController,
        config: ApplianceConfig,
        on_shutdown: Box<dyn FnMut()>,
    ) -> Self {
        Self {
            store,
            catalog,
            display,
            dispenser,
            config,
            on_shutdown,
        }
    }

    /// Build the full menu tree from the catalog and the current pump
    /// configuration snapshot: drinks first, then a configuration submenu
    /// with one nested menu per pump (sorted by pump id), then the
    /// maintenance actions. Built once; renders mutate annotations only.
    pub fn build_menu(&self) -> MenuTree {
        let mut tree = MenuTree::new("Main Menu");
        let root = tree.root();

        for drink in &self.catalog.drinks {
            tree.push(root, MenuItem::drink(drink.clone()));
        }

        let configure = tree.add_submenu(root, "Configure");
        for (id, pump) in self.store.pumps() {
            let pump_menu = tree.add_submenu(configure, &pump.name);
            for option in &self.catalog.options {
                tree.push(pump_menu, MenuItem::pump_option(id, option));
            }
            tree.push(pump_menu, MenuItem::back());
        }
        tree.push(configure, MenuItem::back());
        tree.push(configure, MenuItem::action("Clean", MenuAction::CleanPumps));
        tree.push(configure, MenuItem::action("Shutdown", MenuAction::Shutdown));

        tree
    }

    pub fn busy(&self) -> bool {
        self.dispenser.is_busy()
    }

    /// Shared busy flag for input producers.
    pub fn busy_flag(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        self.dispenser.busy_flag()
    }

    pub fn store(&self) -> &PumpConfigStore {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Pour one drink by name, bypassing the menu (headless CLI path).
    pub fn dispense_drink(&mut self, name: &str) -> Result<DispenseOutcome> {
        let recipe = self
            .catalog
            .drinks
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| Report::new(ApplianceError::UnknownDrink(name.to_string())))?;
        for ingredient in recipe.ingredients.keys() {
            if !self.store.is_assigned(ingredient) {
                return Err(Report::new(ApplianceError::Unpourable(ingredient.clone())));
            }
        }
        tracing::info!(drink = %recipe.name, "dispense requested");
        let job = DispenseJob::for_recipe(&recipe, self.store.pumps(), self.config.flow);
        Ok(self.dispenser.dispense(&job, self.display.as_mut()))
    }

    /// Run every configured pump for the fixed clean duration.
    pub fn clean(&mut self) -> DispenseOutcome {
        tracing::info!(
            secs = self.config.clean_duration.as_secs(),
            "clean cycle start"
        );
        let job = DispenseJob::clean_all(self.store.pumps(), self.config.clean_duration);
        self.dispenser.dispense(&job, self.display.as_mut())
    }

    /// Show a free-form message, wrapped for the small display.
    pub fn show_message(&mut self, text: &str) {
        let lines = bartender_ui::wrap_text(text, self.config.wrap_width);
        self.display.clear();
        self.display.render_text(&lines);
        self.display.present();
    }

    fn recipe_available(&self, recipe: &bartender_config::Recipe) -> bool {
        recipe
            .ingredients
            .keys()
            .all(|ingredient| self.store.is_assigned(ingredient))
    }
}

impl MenuDelegate for Appliance {
    fn prepare_for_render(&mut self, tree: &mut MenuTree) {
        // Assignments can change between renders; recompute visibility and
        // annotations across the whole tree every pass.
        for id in tree.ids() {
            for item in &mut tree.node_mut(id).items {
                match &item.entry {
                    MenuEntry::Drink { recipe } => {
                        item.visible = recipe
                            .ingredients
                            .keys()
                            .all(|ingredient| self.store.is_assigned(ingredient));
                    }
                    MenuEntry::PumpOption {
                        pump,
                        ingredient,
                        base_label,
                    } => {
                        let selected =
                            self.store.assigned_ingredient(pump) == Some(ingredient.as_str());
                        item.label = if selected {
                            format!("{base_label} *")
                        } else {
                            base_label.clone()
                        };
                    }
                    MenuEntry::Submenu(_) | MenuEntry::Back | MenuEntry::Action(_) => {}
                }
            }
        }
    }

    fn item_activated(&mut self, item: &MenuItem) -> bool {
        match &item.entry {
            MenuEntry::Drink { recipe } => {
                if !self.recipe_available(recipe) {
                    // Unreachable through the menu: filtering hides such
                    // drinks before they can be selected.
                    tracing::warn!(drink = %recipe.name, "selected drink is not pourable");
                    return true;
                }
                tracing::info!(drink = %recipe.name, "drink selected");
                let job = DispenseJob::for_recipe(recipe, self.store.pumps(), self.config.flow);
                let outcome = self.dispenser.dispense(&job, self.display.as_mut());
                tracing::info!(drink = %recipe.name, ?outcome, "dispense finished");
                true
            }
            MenuEntry::PumpOption {
                pump, ingredient, ..
            } => {
                if let Err(e) = self.store.set_ingredient(pump, ingredient) {
                    // Keep running on the in-memory assignment; the next
                    // successful save wins the file.
                    tracing::error!(error = %e, pump = %pump, "failed to persist assignment");
                } else {
                    tracing::info!(pump = %pump, ingredient = %ingredient, "pump reassigned");
                }
                true
            }
            MenuEntry::Action(MenuAction::CleanPumps) => {
                self.clean();
                true
            }
            MenuEntry::Action(MenuAction::Shutdown) => {
                tracing::info!("shutdown requested");
                self.show_message("Shutting down. Bye!");
                (self.on_shutdown)();
                true
            }
            MenuEntry::Submenu(_) | MenuEntry::Back => false,
        }
    }

    fn show_item(&mut self, item: &MenuItem) {
        let lines = bartender_ui::wrap_text(&item.label, self.config.wrap_width);
        self.display.clear();
        self.display.render_text(&lines);
        self.display.present();
    }
}
