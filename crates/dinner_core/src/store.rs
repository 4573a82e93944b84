//! The State Store: sole owner of `AppState`.
//!
//! Every applied mutation is written to the slot before observers are told
//! about it, so the persisted copy never lags what observers can see.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    AppState, Clock, Ingredient, IngredientKey, IngredientStatus, MealRecord, Recipe, RecipeId,
    Refusal, StateSlot,
};

type Observer = Box<dyn FnMut() + Send>;

/// Shape of a persisted blob before structural validation. Every field is
/// optional so that a partial blob still parses.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    recipes: Option<Vec<Recipe>>,
    ingredients: Option<BTreeMap<IngredientKey, Ingredient>>,
    family_members: Option<Vec<String>>,
    meal_history: Option<Vec<MealRecord>>,
    last_meal_ingredients: Option<Vec<IngredientKey>>,
}

impl PersistedState {
    fn into_state(self) -> Option<AppState> {
        let recipes = self.recipes.filter(|recipes| !recipes.is_empty())?;
        let ingredients = self.ingredients.filter(|ingredients| !ingredients.is_empty())?;
        let family_members = self.family_members?;
        Some(AppState {
            recipes,
            ingredients,
            meal_history: self.meal_history.unwrap_or_default(),
            family_members,
            last_meal_ingredients: self.last_meal_ingredients.unwrap_or_default(),
        })
    }
}

/// Reads the slot and returns the persisted state if it is structurally
/// valid, otherwise `seed`. Never fails.
pub fn load(slot: &dyn StateSlot, seed: AppState) -> AppState {
    let blob = match slot.read() {
        Ok(Some(blob)) => blob,
        Ok(None) => return seed,
        Err(err) => {
            tracing::warn!("reading persisted state failed, using defaults: {err}");
            return seed;
        }
    };
    match serde_json::from_str::<PersistedState>(&blob) {
        Ok(persisted) => persisted.into_state().unwrap_or_else(|| {
            tracing::warn!("invalid persisted data structure, resetting to defaults");
            seed
        }),
        Err(err) => {
            tracing::warn!("parsing persisted state failed, using defaults: {err}");
            seed
        }
    }
}

pub struct Store {
    state: AppState,
    slot: Box<dyn StateSlot>,
    clock: Box<dyn Clock>,
    observers: Vec<Observer>,
}

impl Store {
    /// Loads from `slot`, falling back to `seed`.
    pub fn open(slot: Box<dyn StateSlot>, clock: Box<dyn Clock>, seed: AppState) -> Self {
        let state = load(slot.as_ref(), seed);
        Self::new(state, slot, clock)
    }

    /// Wraps an already-loaded state. Nothing is written until the first mutation.
    pub fn new(state: AppState, slot: Box<dyn StateSlot>, clock: Box<dyn Clock>) -> Self {
        Self {
            state,
            slot,
            clock,
            observers: Vec::new(),
        }
    }

    // --- Queries ----------------------------------------------------------

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.state.recipe(id)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // --- Observers --------------------------------------------------------

    pub fn subscribe(&mut self, observer: impl FnMut() + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self) {
        for observer in &mut self.observers {
            observer();
        }
    }

    // --- Persistence ------------------------------------------------------

    /// Serializes the full state into the slot. Failures are logged and
    /// dropped; the in-memory state stays authoritative for the session.
    pub fn persist(&mut self) {
        let blob = match serde_json::to_string(&self.state) {
            Ok(blob) => blob,
            Err(err) => {
                tracing::error!("serializing state failed: {err}");
                return;
            }
        };
        if let Err(err) = self.slot.write(&blob) {
            tracing::error!("saving state failed: {err}");
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.notify();
    }

    // --- Mutations --------------------------------------------------------

    /// Setting an ingredient also acknowledges a restock of it, clearing its
    /// "running low" hint.
    pub fn set_ingredient_status(
        &mut self,
        key: &IngredientKey,
        status: IngredientStatus,
    ) -> Result<(), Refusal> {
        let Some(ingredient) = self.state.ingredients.get_mut(key) else {
            return Err(Refusal::UnknownIngredient(key.clone()));
        };
        ingredient.status = status;
        self.state.last_meal_ingredients.retain(|k| k != key);
        tracing::debug!(%key, ?status, "ingredient status set");
        self.commit();
        Ok(())
    }

    /// Replaces the roster verbatim.
    pub fn set_family_roster(&mut self, names: Vec<String>) {
        self.state.family_members = names;
        self.commit();
    }

    pub fn record_meal(&mut self, recipe_id: RecipeId) -> Result<(), Refusal> {
        let Some(recipe) = self.state.recipe(recipe_id) else {
            return Err(Refusal::UnknownRecipe(recipe_id));
        };
        let ingredients = recipe.ingredients.clone();
        let date = self.clock.today();
        self.state.meal_history.push(MealRecord { recipe_id, date });
        self.state.last_meal_ingredients = ingredients;
        tracing::info!(recipe_id, %date, "meal recorded");
        self.commit();
        Ok(())
    }

    pub fn reset_history(&mut self) {
        self.state.meal_history.clear();
        self.state.last_meal_ingredients.clear();
        tracing::info!("meal history reset");
        self.commit();
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
