//! Type definitions for `dinner_core`.
//!
//! The persisted aggregate, its child records, and the tunable constants.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

pub type RecipeId = u32;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(IngredientKey);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngredientStatus {
    #[serde(rename = "got_it")]
    Have,
    #[serde(rename = "need_it")]
    Need,
}

impl IngredientStatus {
    pub fn from_have(have: bool) -> Self {
        if have {
            Self::Have
        } else {
            Self::Need
        }
    }
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    /// Keys into `AppState::ingredients`, in display order.
    pub ingredients: Vec<IngredientKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Free text, e.g. "1 box" or "2 cups cooked".
    pub quantity: String,
    pub status: IngredientStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    pub recipe_id: RecipeId,
    /// Calendar date only, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

/// The root aggregate. One instance per household, owned by the `Store`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Fixed catalog; never mutated at runtime.
    pub recipes: Vec<Recipe>,
    pub ingredients: BTreeMap<IngredientKey, Ingredient>,
    /// Append-only; cleared only by `Store::reset_history`.
    pub meal_history: Vec<MealRecord>,
    pub family_members: Vec<String>,
    /// Keys consumed by the most recent meal. Drives the "running low" hint.
    pub last_meal_ingredients: Vec<IngredientKey>,
}

impl AppState {
    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constants {
    /// A recipe eaten within this many days (inclusive) is on cooldown.
    pub cooldown_days: u32,
    pub spin_duration_ms: u64,
    /// Full turns added on top of the winner's offset. Must be at least 1.
    pub spin_extra_rotations: u32,
    /// Pause between the wheel stopping and the meal being recorded.
    pub spin_completion_delay_ms: u64,
    /// Name of the persistence slot holding the serialized `AppState`.
    pub storage_key: String,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            cooldown_days: 3,
            spin_duration_ms: 4000,
            spin_extra_rotations: 5,
            spin_completion_delay_ms: 500,
            storage_key: "dinnerAppData".to_string(),
        }
    }
}
