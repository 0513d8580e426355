use super::{Resource, deserialize_id, deserialize_optional_id, impl_record};
use crate::core::{AdminError, Result};
use crate::quantity::{Quantity, Unit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(default, deserialize_with = "deserialize_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl FoodItem {
    pub fn new(name: &str, price: f64) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            category: None,
            description: None,
            price,
            is_available: true,
        }
    }
}

/// One line of a recipe, drawn from an inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(deserialize_with = "deserialize_id")]
    pub inventory_item_id: String,
    #[serde(default)]
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

impl Ingredient {
    pub fn quantity(&self) -> Result<Quantity> {
        Quantity::new(self.quantity, self.unit).map_err(|err| match err {
            AdminError::Validation(msg) if !self.name.is_empty() => {
                AdminError::Validation(format!("{}: {}", self.name, msg))
            }
            other => other,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, deserialize_with = "deserialize_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub food_item_id: Option<String>,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_servings() -> u32 {
    1
}

impl_record!(FoodItem, Recipe);

impl Resource for FoodItem {
    const PATH: &'static str = "/food-items";
    const NAME: &'static str = "food item";

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AdminError::Validation("Food item name is required".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AdminError::Validation(
                "Price must be zero or a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

impl Resource for Recipe {
    const PATH: &'static str = "/recipes";
    const NAME: &'static str = "recipe";

    /// Checks the name, servings and every ingredient quantity.
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AdminError::Validation("Recipe name is required".to_string()));
        }
        if self.servings == 0 {
            return Err(AdminError::Validation(
                "Servings must be at least 1".to_string(),
            ));
        }
        if self.ingredients.is_empty() {
            return Err(AdminError::Validation(
                "A recipe needs at least one ingredient".to_string(),
            ));
        }
        for ingredient in &self.ingredients {
            ingredient.quantity()?;
        }
        Ok(())
    }
}
