//! Menu data model: an arena-backed tree of menus whose items carry a
//! closed set of entry kinds.
//!
//! The tree is owned top-down from the root; parent links are non-owning
//! arena indices set exactly once when a submenu is registered, so the
//! structure is acyclic and finite-depth by construction. After building,
//! only item `label`/`visible` fields change (per render pass); topology
//! never does.

use bartender_config::{IngredientOption, Recipe};

/// Index of a menu node inside its `MenuTree`. Only minted by the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuId(usize);

/// Maintenance actions reachable from the configuration menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Run every configured pump for the fixed clean duration.
    CleanPumps,
    /// Hand control to the host environment's shutdown hook.
    Shutdown,
}

/// What a menu item does when selected. Exhaustively matched at activation
/// time; adding a kind is a compile-checked change.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    /// Pour this recipe.
    Drink { recipe: Recipe },
    /// Assign `ingredient` to `pump`. `base_label` is the unannotated
    /// display name the render pass derives the starred label from.
    PumpOption {
        pump: String,
        ingredient: String,
        base_label: String,
    },
    /// Enter a nested menu.
    Submenu(MenuId),
    /// Pop to the parent menu. Carries no payload.
    Back,
    Action(MenuAction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub label: String,
    /// Recomputed by the delegate before every render; never persisted.
    pub visible: bool,
    pub entry: MenuEntry,
}

impl MenuItem {
    pub fn drink(recipe: Recipe) -> Self {
        Self {
            label: recipe.name.clone(),
            visible: true,
            entry: MenuEntry::Drink { recipe },
        }
    }

    pub fn pump_option(pump: &str, option: &IngredientOption) -> Self {
        Self {
            label: option.name.clone(),
            visible: true,
            entry: MenuEntry::PumpOption {
                pump: pump.to_string(),
                ingredient: option.value.clone(),
                base_label: option.name.clone(),
            },
        }
    }

    pub fn back() -> Self {
        Self {
            label: "Back".to_string(),
            visible: true,
            entry: MenuEntry::Back,
        }
    }

    pub fn action(label: &str, action: MenuAction) -> Self {
        Self {
            label: label.to_string(),
            visible: true,
            entry: MenuEntry::Action(action),
        }
    }
}

#[derive(Debug)]
pub struct MenuNode {
    pub title: String,
    pub items: Vec<MenuItem>,
    parent: Option<MenuId>,
}

#[derive(Debug)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
}

impl MenuTree {
    pub fn new(root_title: &str) -> Self {
        Self {
            nodes: vec![MenuNode {
                title: root_title.to_string(),
                items: Vec::new(),
                parent: None,
            }],
        }
    }

    pub fn root(&self) -> MenuId {
        MenuId(0)
    }

    /// Register a submenu under `parent`: allocates the node with its
    /// parent link and appends the corresponding `Submenu` item to the
    /// parent in one step, so the link is set exactly once.
    pub fn add_submenu(&mut self, parent: MenuId, title: &str) -> MenuId {
        let id = MenuId(self.nodes.len());
        self.nodes.push(MenuNode {
            title: title.to_string(),
            items: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent.0].items.push(MenuItem {
            label: title.to_string(),
            visible: true,
            entry: MenuEntry::Submenu(id),
        });
        id
    }

    /// Append a leaf item while building the tree.
    pub fn push(&mut self, menu: MenuId, item: MenuItem) {
        self.nodes[menu.0].items.push(item);
    }

    pub fn node(&self, id: MenuId) -> &MenuNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: MenuId) -> &mut MenuNode {
        &mut self.nodes[id.0]
    }

    pub fn parent(&self, id: MenuId) -> Option<MenuId> {
        self.nodes[id.0].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root always exists.
        false
    }

    /// Every node id, root first. Snapshot so callers may mutate nodes
    /// while iterating.
    pub fn ids(&self) -> Vec<MenuId> {
        (0..self.nodes.len()).map(MenuId).collect()
    }
}
