use super::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

fn today() -> chrono::NaiveDate {
    date(2025, 3, 1)
}

// --- Direct pick ----------------------------------------------------------

#[test]
fn test_direct_pick_eligible_recipe() {
    let state = base_state();
    assert_eq!(direct_pick(&state, 2, today(), &test_constants()), Ok(2));
}

#[test]
fn test_direct_pick_refuses_blocked_recipe() {
    let mut state = base_state();
    state.ingredients.get_mut(&key("bread")).unwrap().status = IngredientStatus::Need;

    let refusal = direct_pick(&state, 3, today(), &test_constants()).unwrap_err();
    assert_eq!(
        refusal,
        Refusal::RecipeUnavailable {
            id: 3,
            name: "Toast".to_string(),
            reason: "Need: Bread".to_string(),
        }
    );
}

#[test]
fn test_direct_pick_refuses_unknown_recipe() {
    let state = base_state();
    assert_eq!(
        direct_pick(&state, 99, today(), &test_constants()),
        Err(Refusal::UnknownRecipe(99))
    );
}

// --- Quick pick -----------------------------------------------------------

#[test]
fn test_quick_pick_stays_inside_eligible_set() {
    let mut state = base_state();
    state.meal_history.push(MealRecord {
        recipe_id: 2,
        date: today(),
    });
    let mut rng = make_rng();
    let mut seen = HashSet::new();

    for _ in 0..200 {
        let id = quick_pick(&state, today(), &test_constants(), &mut rng).unwrap();
        assert_ne!(id, 2, "recipe on cooldown must never be drawn");
        seen.insert(id);
    }
    assert_eq!(seen, HashSet::from([1, 3]), "every eligible recipe should come up");
}

#[test]
fn test_quick_pick_refuses_when_nothing_eligible() {
    let mut state = base_state();
    state.ingredients.get_mut(&key("butter")).unwrap().status = IngredientStatus::Need;

    let result = quick_pick(&state, today(), &test_constants(), &mut PanicRng);
    assert_eq!(result, Err(Refusal::NoEligibleRecipes));
}

// --- Vote -----------------------------------------------------------------

#[test]
fn test_vote_tie_draws_among_leaders_only() {
    let state = base_state();
    let eligible = eligible_recipes(&state, today(), &test_constants());
    let ballots = vec![
        ballot("a", Some(1)),
        ballot("b", Some(1)),
        ballot("c", Some(2)),
        ballot("d", Some(2)),
        ballot("e", Some(3)),
    ];
    let mut winners = HashSet::new();

    for seed in 0..64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let outcome = tally_votes(&eligible, &ballots, &mut rng).unwrap();
        assert!(outcome.tie_broken);
        assert_eq!(outcome.tally[&1], 2);
        assert_eq!(outcome.tally[&3], 1);
        winners.insert(outcome.winner);
    }
    assert_eq!(winners, HashSet::from([1, 2]));
}

#[test]
fn test_vote_clear_winner_uses_no_randomness() {
    let state = base_state();
    let eligible = eligible_recipes(&state, today(), &test_constants());
    let ballots = vec![
        ballot("a", Some(3)),
        ballot("b", Some(3)),
        ballot("c", Some(3)),
    ];

    let outcome = tally_votes(&eligible, &ballots, &mut PanicRng).unwrap();
    assert_eq!(outcome.winner, 3);
    assert!(!outcome.tie_broken);
}

#[test]
fn test_vote_abstentions_are_not_counted() {
    let state = base_state();
    let eligible = eligible_recipes(&state, today(), &test_constants());
    let ballots = vec![
        ballot("a", None),
        ballot("b", Some(2)),
        ballot("c", None),
    ];

    let outcome = tally_votes(&eligible, &ballots, &mut PanicRng).unwrap();
    assert_eq!(outcome.winner, 2);
    assert_eq!(outcome.tally.len(), 1);
}

#[test]
fn test_vote_with_no_ballots_cast_is_refused() {
    let state = base_state();
    let eligible = eligible_recipes(&state, today(), &test_constants());

    let all_abstain = vec![ballot("a", None), ballot("b", None)];
    assert_eq!(
        tally_votes(&eligible, &all_abstain, &mut PanicRng),
        Err(Refusal::NoVotesCast)
    );
    assert_eq!(
        tally_votes(&eligible, &[], &mut PanicRng),
        Err(Refusal::NoVotesCast)
    );
}

#[test]
fn test_vote_needs_two_eligible_recipes() {
    let mut state = base_state();
    state.ingredients.get_mut(&key("butter")).unwrap().status = IngredientStatus::Need;
    state.recipes.push(test_fixtures::recipe(4, "Plain Bread", &["bread"]));
    let eligible = eligible_recipes(&state, today(), &test_constants());
    assert_eq!(eligible.len(), 1);

    let result = tally_votes(&eligible, &[ballot("a", Some(4))], &mut PanicRng);
    assert_eq!(result, Err(Refusal::NotEnoughToVote { available: 1 }));
}

#[test]
fn test_vote_for_ineligible_recipe_is_refused() {
    let mut state = base_state();
    state.meal_history.push(MealRecord {
        recipe_id: 1,
        date: today(),
    });
    let eligible = eligible_recipes(&state, today(), &test_constants());

    let result = tally_votes(&eligible, &[ballot("kid", Some(1))], &mut PanicRng);
    assert_eq!(
        result,
        Err(Refusal::IneligibleVote {
            voter: "kid".to_string(),
            recipe_id: 1,
        })
    );
}

#[test]
fn test_ballots_must_come_from_the_roster() {
    let roster = vec!["Parent 1".to_string(), "Kid 1".to_string()];
    let ballots = [ballot("Kid 1", Some(1)), ballot("Stranger", Some(2))];
    assert_eq!(
        check_ballots(&roster, &ballots),
        Err(Refusal::UnknownVoter("Stranger".to_string()))
    );
}

#[test]
fn test_each_roster_entry_votes_once() {
    let roster = vec!["Sam".to_string(), "Sam".to_string(), "Kid 1".to_string()];
    let twice = [ballot("Sam", Some(1)), ballot("Sam", None), ballot("Kid 1", Some(2))];
    assert_eq!(check_ballots(&roster, &twice), Ok(()));

    let thrice = [ballot("Sam", Some(1)), ballot("Sam", Some(1)), ballot("Sam", Some(1))];
    assert_eq!(
        check_ballots(&roster, &thrice),
        Err(Refusal::DuplicateBallot("Sam".to_string()))
    );
}

// --- Spin -----------------------------------------------------------------

#[test]
fn test_spin_winner_is_an_eligible_index() {
    let state = base_state();
    let eligible = eligible_recipes(&state, today(), &test_constants());
    let mut rng = make_rng();
    for _ in 0..100 {
        let index = draw_spin_winner(&eligible, &mut rng).unwrap();
        assert!(index < eligible.len());
    }
}

#[test]
fn test_spin_refuses_empty_wheel() {
    assert_eq!(
        draw_spin_winner(&[], &mut PanicRng),
        Err(Refusal::NoEligibleRecipes)
    );
}
