use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{AppState, Constants, IngredientStatus, Recipe, RecipeId, Refusal};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub eligible: bool,
    /// Empty when eligible.
    pub block_reason: String,
}

impl Availability {
    fn eligible() -> Self {
        Self {
            eligible: true,
            block_reason: String::new(),
        }
    }

    fn blocked(reason: String) -> Self {
        Self {
            eligible: false,
            block_reason: reason,
        }
    }
}

/// Whether `recipe` can be chosen today.
///
/// Order of checks:
/// 1. Every ingredient must be known and marked `Have`.
/// 2. No history entry for the recipe may fall within `cooldown_days` of
///    `today` (inclusive, day granularity).
pub fn availability(
    state: &AppState,
    recipe: &Recipe,
    today: NaiveDate,
    constants: &Constants,
) -> Availability {
    let missing: Vec<String> = recipe
        .ingredients
        .iter()
        .filter_map(|key| match state.ingredients.get(key) {
            Some(ingredient) if ingredient.status == IngredientStatus::Have => None,
            Some(ingredient) => Some(ingredient.name.clone()),
            None => Some(key.0.clone()),
        })
        .collect();
    if !missing.is_empty() {
        return Availability::blocked(format!("Need: {}", missing.join(", ")));
    }

    let cutoff = cooldown_cutoff(today, constants.cooldown_days);
    let recently_eaten = state
        .meal_history
        .iter()
        .any(|record| record.recipe_id == recipe.id && record.date >= cutoff);
    if recently_eaten {
        return Availability::blocked("Eaten recently".to_string());
    }

    Availability::eligible()
}

fn cooldown_cutoff(today: NaiveDate, cooldown_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(cooldown_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Eligible recipes in catalog order.
pub fn eligible_recipes<'a>(
    state: &'a AppState,
    today: NaiveDate,
    constants: &Constants,
) -> Vec<&'a Recipe> {
    state
        .recipes
        .iter()
        .filter(|recipe| availability(state, recipe, today, constants).eligible)
        .collect()
}

// ---------------------------------------------------------------------------
// Selection strategies
// ---------------------------------------------------------------------------
//
// Each strategy only decides. Recording the meal is the caller's job, so a
// refusal can never leave a half-applied mutation behind.

/// Direct pick: the recipe must currently be eligible.
pub fn direct_pick(
    state: &AppState,
    recipe_id: RecipeId,
    today: NaiveDate,
    constants: &Constants,
) -> Result<RecipeId, Refusal> {
    let Some(recipe) = state.recipe(recipe_id) else {
        return Err(Refusal::UnknownRecipe(recipe_id));
    };
    let status = availability(state, recipe, today, constants);
    if !status.eligible {
        return Err(Refusal::RecipeUnavailable {
            id: recipe.id,
            name: recipe.name.clone(),
            reason: status.block_reason,
        });
    }
    Ok(recipe.id)
}

/// Quick pick: uniform draw over the eligible set.
pub fn quick_pick(
    state: &AppState,
    today: NaiveDate,
    constants: &Constants,
    rng: &mut impl Rng,
) -> Result<RecipeId, Refusal> {
    let eligible = eligible_recipes(state, today, constants);
    if eligible.is_empty() {
        return Err(Refusal::NoEligibleRecipes);
    }
    Ok(eligible[rng.gen_range(0..eligible.len())].id)
}

/// One family member's ballot. `None` is an abstention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: String,
    pub choice: Option<RecipeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    pub winner: RecipeId,
    /// Votes per recipe, abstentions excluded.
    pub tally: BTreeMap<RecipeId, u32>,
    /// True when the winner was drawn among several tied recipes.
    pub tie_broken: bool,
}

/// Minimum eligible recipes for a vote to be worth holding.
pub const MIN_VOTE_OPTIONS: usize = 2;

/// Each roster entry may cast at most one ballot. Names can repeat on the
/// roster, so a name may vote as many times as it appears there.
pub fn check_ballots(roster: &[String], ballots: &[Ballot]) -> Result<(), Refusal> {
    let mut seats: BTreeMap<&str, usize> = BTreeMap::new();
    for member in roster {
        *seats.entry(member.as_str()).or_insert(0) += 1;
    }
    for ballot in ballots {
        match seats.get_mut(ballot.voter.as_str()) {
            None => return Err(Refusal::UnknownVoter(ballot.voter.clone())),
            Some(0) => return Err(Refusal::DuplicateBallot(ballot.voter.clone())),
            Some(left) => *left -= 1,
        }
    }
    Ok(())
}

/// Tallies `ballots` against the eligible set.
///
/// The rng is consulted only when more than one recipe shares the top count.
pub fn tally_votes(
    eligible: &[&Recipe],
    ballots: &[Ballot],
    rng: &mut impl Rng,
) -> Result<VoteOutcome, Refusal> {
    if eligible.len() < MIN_VOTE_OPTIONS {
        return Err(Refusal::NotEnoughToVote {
            available: eligible.len(),
        });
    }

    let mut tally: BTreeMap<RecipeId, u32> = BTreeMap::new();
    for ballot in ballots {
        let Some(choice) = ballot.choice else {
            continue;
        };
        if !eligible.iter().any(|recipe| recipe.id == choice) {
            return Err(Refusal::IneligibleVote {
                voter: ballot.voter.clone(),
                recipe_id: choice,
            });
        }
        *tally.entry(choice).or_insert(0) += 1;
    }

    let Some(max_votes) = tally.values().copied().max() else {
        return Err(Refusal::NoVotesCast);
    };
    // BTreeMap iteration keeps the tied ids in ascending order.
    let leaders: Vec<RecipeId> = tally
        .iter()
        .filter(|&(_, &votes)| votes == max_votes)
        .map(|(&id, _)| id)
        .collect();

    let (winner, tie_broken) = if let [only] = leaders.as_slice() {
        (*only, false)
    } else {
        (leaders[rng.gen_range(0..leaders.len())], true)
    };

    Ok(VoteOutcome {
        winner,
        tally,
        tie_broken,
    })
}

/// Index into `eligible` of the wheel's winner. Drawn before any animation
/// starts so the visual spin cannot disagree with the recorded outcome.
pub fn draw_spin_winner(eligible: &[&Recipe], rng: &mut impl Rng) -> Result<usize, Refusal> {
    if eligible.is_empty() {
        return Err(Refusal::NoEligibleRecipes);
    }
    Ok(rng.gen_range(0..eligible.len()))
}
