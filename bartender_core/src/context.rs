//! The two-button cursor machine over a `MenuTree`.
//!
//! `advance` and `select` are the only externally driven transitions. The
//! delegate — implemented by exactly one controller type — is handed in by
//! reference on every transition, which keeps ownership acyclic: the
//! context owns the tree, the caller owns both.

use crate::menu::{MenuEntry, MenuId, MenuItem, MenuTree};

/// Capability interface the appliance controller implements.
pub trait MenuDelegate {
    /// Recompute `visible` flags and display annotations across the tree.
    /// Runs before every render pass; assignments can change between
    /// renders.
    fn prepare_for_render(&mut self, tree: &mut MenuTree);

    /// Handle a terminal item (drink, pump option, maintenance action).
    /// Returns true when the item was handled. Navigation is unaffected
    /// either way.
    fn item_activated(&mut self, item: &MenuItem) -> bool;

    /// Render one item as the current selection.
    fn show_item(&mut self, item: &MenuItem);
}

pub struct MenuContext {
    tree: MenuTree,
    current: MenuId,
    cursor: usize,
}

impl MenuContext {
    /// Start at the root menu with the cursor on the first visible item.
    pub fn new(tree: MenuTree, delegate: &mut dyn MenuDelegate) -> Self {
        let current = tree.root();
        let mut ctx = Self {
            tree,
            current,
            cursor: 0,
        };
        delegate.prepare_for_render(&mut ctx.tree);
        ctx.cursor = ctx.first_visible(current);
        ctx
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn current_menu(&self) -> MenuId {
        self.current
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to the next visible item, wrapping past the end.
    /// When nothing is visible the cursor stays put.
    pub fn advance(&mut self, delegate: &mut dyn MenuDelegate) {
        delegate.prepare_for_render(&mut self.tree);
        let items = &self.tree.node(self.current).items;
        let n = items.len();
        if n > 0 {
            for offset in 1..=n {
                let idx = (self.cursor + offset) % n;
                if items[idx].visible {
                    self.cursor = idx;
                    break;
                }
            }
        }
        self.show_current(delegate);
    }

    /// Activate the item under the cursor, dispatching on its entry kind.
    pub fn select(&mut self, delegate: &mut dyn MenuDelegate) {
        delegate.prepare_for_render(&mut self.tree);
        let Some(item) = self.tree.node(self.current).items.get(self.cursor).cloned() else {
            return;
        };
        match item.entry {
            MenuEntry::Submenu(id) => {
                self.current = id;
                self.cursor = self.first_visible(id);
                self.show_current(delegate);
            }
            MenuEntry::Back => {
                if let Some(parent) = self.tree.parent(self.current) {
                    self.current = parent;
                }
                self.cursor = self.first_visible(self.current);
                self.show_current(delegate);
            }
            MenuEntry::Drink { .. } | MenuEntry::PumpOption { .. } | MenuEntry::Action(_) => {
                let handled = delegate.item_activated(&item);
                if handled {
                    // A long-running activation (dispense) returns here
                    // after its barrier; refresh annotations and reset the
                    // display to the menu.
                    delegate.prepare_for_render(&mut self.tree);
                    self.show_current(delegate);
                }
            }
        }
    }

    /// Re-render the current selection without moving the cursor.
    pub fn show_menu(&mut self, delegate: &mut dyn MenuDelegate) {
        delegate.prepare_for_render(&mut self.tree);
        self.show_current(delegate);
    }

    fn first_visible(&self, menu: MenuId) -> usize {
        self.tree
            .node(menu)
            .items
            .iter()
            .position(|item| item.visible)
            .unwrap_or(0)
    }

    fn show_current(&self, delegate: &mut dyn MenuDelegate) {
        if let Some(item) = self.tree.node(self.current).items.get(self.cursor) {
            delegate.show_item(item);
        }
    }
}
