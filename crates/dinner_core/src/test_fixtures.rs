//! Shared test fixtures for `dinner_core` and downstream crates.
//!
//! `base_state()` is a small three-recipe household with everything stocked.
//! `scenario_state()` is the single `{id: 1, [X, Y]}` recipe with X missing.

use crate::{
    AppState, Ingredient, IngredientKey, IngredientStatus, ManualClock, MemorySlot, Recipe,
    RecipeId, SlotError, StateSlot, Store,
};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn key(k: &str) -> IngredientKey {
    IngredientKey::from(k)
}

pub fn ingredient(name: &str, status: IngredientStatus) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        quantity: "1".to_string(),
        status,
    }
}

pub fn recipe(id: RecipeId, name: &str, keys: &[&str]) -> Recipe {
    Recipe {
        id,
        name: name.to_string(),
        ingredients: keys.iter().map(|k| key(k)).collect(),
    }
}

/// Three recipes sharing butter:
/// 1. Pancakes: flour, butter, milk
/// 2. Omelette: eggs, butter
/// 3. Toast: bread, butter
pub fn base_state() -> AppState {
    AppState {
        recipes: vec![
            recipe(1, "Pancakes", &["flour", "butter", "milk"]),
            recipe(2, "Omelette", &["eggs", "butter"]),
            recipe(3, "Toast", &["bread", "butter"]),
        ],
        ingredients: BTreeMap::from([
            (key("flour"), ingredient("Flour", IngredientStatus::Have)),
            (key("butter"), ingredient("Butter", IngredientStatus::Have)),
            (key("milk"), ingredient("Milk", IngredientStatus::Have)),
            (key("eggs"), ingredient("Eggs", IngredientStatus::Have)),
            (key("bread"), ingredient("Bread", IngredientStatus::Have)),
        ]),
        meal_history: vec![],
        family_members: vec!["Parent 1".to_string(), "Kid 1".to_string()],
        last_meal_ingredients: vec![],
    }
}

pub fn scenario_state() -> AppState {
    AppState {
        recipes: vec![recipe(1, "Scenario", &["X", "Y"])],
        ingredients: BTreeMap::from([
            (key("X"), ingredient("X", IngredientStatus::Need)),
            (key("Y"), ingredient("Y", IngredientStatus::Have)),
        ]),
        meal_history: vec![],
        family_members: vec!["Solo".to_string()],
        last_meal_ingredients: vec![],
    }
}

/// A store over an empty `MemorySlot`, plus a handle to its clock.
pub fn base_store(state: AppState, today: NaiveDate) -> (Store, ManualClock) {
    let clock = ManualClock::new(today);
    let store = Store::new(state, Box::new(MemorySlot::new()), Box::new(clock.clone()));
    (store, clock)
}

/// A `MemorySlot` that a test can keep reading after handing a clone to a `Store`.
#[derive(Debug, Clone, Default)]
pub struct SharedSlot(Arc<Mutex<MemorySlot>>);

impl SharedSlot {
    pub fn new(slot: MemorySlot) -> Self {
        Self(Arc::new(Mutex::new(slot)))
    }

    pub fn blob(&self) -> Option<String> {
        self.0.lock().unwrap().blob().map(str::to_string)
    }
}

impl StateSlot for SharedSlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        self.0.lock().unwrap().read()
    }

    fn write(&mut self, blob: &str) -> Result<(), SlotError> {
        self.0.lock().unwrap().write(blob)
    }
}
