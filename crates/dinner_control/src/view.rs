//! Derived, render-ready projections of `AppState`. No mutation, no IO.

use dinner_core::{
    availability, AppState, Constants, IngredientKey, IngredientStatus, NaiveDate, RecipeId,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeCard {
    pub id: RecipeId,
    pub name: String,
    pub eligible: bool,
    pub block_reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRow {
    pub key: IngredientKey,
    pub name: String,
    pub quantity: String,
    pub have: bool,
    /// Used by the last recorded meal and not restocked since.
    pub low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    pub key: IngredientKey,
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub recipes: Vec<RecipeCard>,
    /// Sorted by display name, case-insensitively.
    pub inventory: Vec<InventoryRow>,
    pub shopping_list: Vec<ShoppingItem>,
    /// Roster joined with newlines, ready for a multi-line text field.
    pub roster_text: String,
    pub can_vote: bool,
    pub can_spin: bool,
    pub can_quick_pick: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOption {
    pub recipe_id: RecipeId,
    pub name: String,
}

/// One ballot line per roster member, each choosing among `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteSheet {
    pub voters: Vec<String>,
    pub options: Vec<VoteOption>,
}

fn sort_key(name: &str) -> (String, &str) {
    (name.to_lowercase(), name)
}

pub fn build_view(state: &AppState, today: NaiveDate, constants: &Constants) -> ViewModel {
    let recipes: Vec<RecipeCard> = state
        .recipes
        .iter()
        .map(|recipe| {
            let status = availability(state, recipe, today, constants);
            RecipeCard {
                id: recipe.id,
                name: recipe.name.clone(),
                eligible: status.eligible,
                block_reason: status.block_reason,
            }
        })
        .collect();
    let available = recipes.iter().filter(|card| card.eligible).count();

    let mut inventory: Vec<InventoryRow> = state
        .ingredients
        .iter()
        .map(|(key, ingredient)| InventoryRow {
            key: key.clone(),
            name: ingredient.name.clone(),
            quantity: ingredient.quantity.clone(),
            have: ingredient.status == IngredientStatus::Have,
            low_stock: state.last_meal_ingredients.contains(key),
        })
        .collect();
    inventory.sort_by(|a, b| sort_key(&a.name).cmp(&sort_key(&b.name)));

    let shopping_list = inventory
        .iter()
        .filter(|row| !row.have)
        .map(|row| ShoppingItem {
            key: row.key.clone(),
            name: row.name.clone(),
            quantity: row.quantity.clone(),
        })
        .collect();

    ViewModel {
        recipes,
        inventory,
        shopping_list,
        roster_text: state.family_members.join("\n"),
        can_vote: available >= dinner_core::engine::MIN_VOTE_OPTIONS,
        can_spin: available >= 1,
        can_quick_pick: available >= 1,
    }
}

/// Splits a newline-delimited roster, trimming names and dropping blank lines.
pub fn parse_roster(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dinner_core::test_fixtures::{base_state, date, key};

    #[test]
    fn test_inventory_sorted_by_name_and_flags_low_stock() {
        let mut state = base_state();
        state.last_meal_ingredients = vec![key("eggs")];
        let view = build_view(&state, date(2025, 1, 1), &Constants::default());

        let names: Vec<&str> = view.inventory.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bread", "Butter", "Eggs", "Flour", "Milk"]);
        let low: Vec<&str> = view
            .inventory
            .iter()
            .filter(|r| r.low_stock)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(low, vec!["Eggs"]);
    }

    #[test]
    fn test_shopping_list_is_every_needed_ingredient() {
        let mut state = base_state();
        state.ingredients.get_mut(&key("milk")).unwrap().status = IngredientStatus::Need;
        state.ingredients.get_mut(&key("bread")).unwrap().status = IngredientStatus::Need;
        let view = build_view(&state, date(2025, 1, 1), &Constants::default());

        let names: Vec<&str> = view.shopping_list.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Bread", "Milk"]);
        assert!(!view.recipes[0].eligible);
        assert_eq!(view.recipes[0].block_reason, "Need: Milk");
    }

    #[test]
    fn test_buttons_follow_available_count() {
        let mut state = base_state();
        let view = build_view(&state, date(2025, 1, 1), &Constants::default());
        assert!(view.can_vote && view.can_spin && view.can_quick_pick);

        state.ingredients.get_mut(&key("butter")).unwrap().status = IngredientStatus::Need;
        let view = build_view(&state, date(2025, 1, 1), &Constants::default());
        assert!(!view.can_vote && !view.can_spin && !view.can_quick_pick);
    }

    #[test]
    fn test_roster_text_round_trips_through_parse() {
        let state = base_state();
        let view = build_view(&state, date(2025, 1, 1), &Constants::default());
        assert_eq!(parse_roster(&view.roster_text), state.family_members);
    }

    #[test]
    fn test_parse_roster_trims_and_drops_blanks() {
        assert_eq!(
            parse_roster("  Mom \n\n Dad\r\n   \nKid"),
            vec!["Mom".to_string(), "Dad".to_string(), "Kid".to_string()]
        );
        assert!(parse_roster(" \n \n").is_empty());
    }
}
