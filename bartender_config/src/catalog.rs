//! Drink catalog: recipes plus the ingredient options offered when
//! configuring a pump. Read-only to the rest of the system.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Named mapping from ingredient id to required volume in millilitres.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub ingredients: BTreeMap<String, f32>,
}

/// One selectable assignment choice in a pump configuration submenu.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub drinks: Vec<Recipe>,
    #[serde(default)]
    pub options: Vec<IngredientOption>,
}

impl Catalog {
    /// The stock drink list the appliance ships with.
    pub fn builtin() -> Self {
        Self {
            drinks: vec![
                recipe("Gin & Tonic", &[("gin", 50.0), ("tonic", 150.0)]),
                recipe("Rum & Coke", &[("rum", 50.0), ("coke", 150.0)]),
                recipe("Screwdriver", &[("vodka", 50.0), ("oj", 150.0)]),
                recipe("Gin & Juice", &[("gin", 50.0), ("oj", 150.0)]),
                recipe("Margarita", &[("tequila", 50.0), ("mmix", 150.0)]),
                recipe("Tequila Sunrise", &[("tequila", 50.0), ("oj", 150.0)]),
                recipe(
                    "Long Island",
                    &[
                        ("gin", 15.0),
                        ("rum", 15.0),
                        ("vodka", 15.0),
                        ("tequila", 15.0),
                        ("coke", 100.0),
                    ],
                ),
            ],
            options: vec![
                option("Gin", "gin"),
                option("Rum", "rum"),
                option("Vodka", "vodka"),
                option("Tequila", "tequila"),
                option("Tonic Water", "tonic"),
                option("Coke", "coke"),
                option("Orange Juice", "oj"),
                option("Margarita Mix", "mmix"),
                option("Nothing", ""),
            ],
        }
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.drinks.is_empty() {
            eyre::bail!("catalog must contain at least one drink");
        }
        for drink in &self.drinks {
            if drink.name.is_empty() {
                eyre::bail!("drink with empty name in catalog");
            }
            if drink.ingredients.is_empty() {
                eyre::bail!("drink '{}' has no ingredients", drink.name);
            }
            for (ing, volume) in &drink.ingredients {
                if ing.is_empty() {
                    eyre::bail!("drink '{}' names an empty ingredient id", drink.name);
                }
                if !volume.is_finite() {
                    eyre::bail!("drink '{}' has a non-finite volume for '{ing}'", drink.name);
                }
            }
        }
        for opt in &self.options {
            if opt.name.is_empty() {
                eyre::bail!("ingredient option with empty display name");
            }
        }
        Ok(())
    }
}

/// Parse a catalog from TOML text (`[[drinks]]` / `[[options]]` tables)
/// and validate it.
pub fn load_catalog_toml(s: &str) -> eyre::Result<Catalog> {
    let catalog: Catalog =
        toml::from_str(s).map_err(|e| eyre::eyre!("malformed drink catalog: {e}"))?;
    catalog.validate()?;
    Ok(catalog)
}

fn recipe(name: &str, parts: &[(&str, f32)]) -> Recipe {
    Recipe {
        name: name.to_string(),
        ingredients: parts
            .iter()
            .map(|(ing, volume)| (ing.to_string(), *volume))
            .collect(),
    }
}

fn option(name: &str, value: &str) -> IngredientOption {
    IngredientOption {
        name: name.to_string(),
        value: value.to_string(),
    }
}
