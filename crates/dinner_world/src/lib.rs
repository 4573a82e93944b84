//! Seed catalog, constants and storage shared between dinner_cli and dinner_daemon.

mod file_slot;
mod overrides;

use anyhow::{bail, Context, Result};
use dinner_core::{AppState, Constants};
use std::collections::HashSet;
use std::path::Path;

pub use file_slot::FileSlot;
pub use overrides::{apply_overrides, parse_override};

const DEFAULT_SEED_JSON: &str = include_str!("../../../content/default_seed.json");
const DEFAULT_CONSTANTS_JSON: &str = include_str!("../../../content/constants.json");

/// Validates cross-references in a seed catalog, panicking on any authoring error.
///
/// Catches mistakes like: a recipe naming an ingredient that isn't stocked,
/// two recipes sharing an id, or an empty catalog.
pub fn validate_seed(seed: &AppState) {
    assert!(!seed.recipes.is_empty(), "seed catalog has no recipes");
    assert!(!seed.ingredients.is_empty(), "seed catalog has no ingredients");

    let mut ids = HashSet::new();
    for recipe in &seed.recipes {
        assert!(
            ids.insert(recipe.id),
            "recipe id {} is used more than once",
            recipe.id,
        );
        assert!(
            !recipe.ingredients.is_empty(),
            "recipe '{}' lists no ingredients",
            recipe.name,
        );
        for key in &recipe.ingredients {
            assert!(
                seed.ingredients.contains_key(key),
                "recipe '{}' ingredient '{}' is not a known ingredient",
                recipe.name,
                key,
            );
        }
    }
}

pub fn parse_seed(json: &str) -> Result<AppState> {
    let seed: AppState = serde_json::from_str(json).context("parsing seed catalog")?;
    validate_seed(&seed);
    Ok(seed)
}

/// The built-in household: six recipes, everything in stock, four family members.
pub fn default_seed() -> Result<AppState> {
    parse_seed(DEFAULT_SEED_JSON)
}

pub fn load_seed(path: &Path) -> Result<AppState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed catalog: {}", path.display()))?;
    parse_seed(&json).with_context(|| format!("loading seed catalog: {}", path.display()))
}

pub fn check_constants(constants: &Constants) -> Result<()> {
    if constants.spin_extra_rotations == 0 {
        bail!("'spin_extra_rotations' must be >= 1");
    }
    if constants.spin_duration_ms == 0 {
        bail!("'spin_duration_ms' must be > 0");
    }
    if constants.storage_key.trim().is_empty() {
        bail!("'storage_key' must not be empty");
    }
    Ok(())
}

/// Loads constants from `path`, or the built-in defaults when `None`.
/// Fields missing from the file keep their default values.
pub fn load_constants(path: Option<&Path>) -> Result<Constants> {
    let constants: Constants = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading constants: {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("parsing constants: {}", path.display()))?
        }
        None => serde_json::from_str(DEFAULT_CONSTANTS_JSON).context("parsing constants.json")?,
    };
    check_constants(&constants)?;
    Ok(constants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dinner_core::test_fixtures::{base_state, key, recipe};
    use std::io::Write;

    #[test]
    fn test_default_seed_is_valid() {
        let seed = default_seed().unwrap();
        assert_eq!(seed.recipes.len(), 6);
        assert_eq!(seed.family_members.len(), 4);
        assert!(seed.meal_history.is_empty());
    }

    #[test]
    fn test_default_constants_match_built_in_defaults() {
        assert_eq!(load_constants(None).unwrap(), Constants::default());
    }

    #[test]
    fn test_partial_constants_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"cooldown_days": 5}"#).unwrap();
        let constants = load_constants(Some(file.path())).unwrap();
        assert_eq!(constants.cooldown_days, 5);
        assert_eq!(constants.spin_extra_rotations, 5);
    }

    #[test]
    fn test_zero_extra_rotations_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"spin_extra_rotations": 0}"#).unwrap();
        let err = load_constants(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("spin_extra_rotations"));
    }

    #[test]
    fn test_valid_seed_passes_validation() {
        validate_seed(&base_state()); // should not panic
    }

    #[test]
    #[should_panic(expected = "is not a known ingredient")]
    fn test_unknown_ingredient_panics() {
        let mut seed = base_state();
        seed.recipes[0].ingredients.push(key("saffron"));
        validate_seed(&seed);
    }

    #[test]
    #[should_panic(expected = "used more than once")]
    fn test_duplicate_recipe_id_panics() {
        let mut seed = base_state();
        seed.recipes.push(recipe(1, "Copycat", &["butter"]));
        validate_seed(&seed);
    }

    #[test]
    fn test_load_seed_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_seed(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("reading seed catalog"));
    }
}
