use thiserror::Error;

use crate::{IngredientKey, RecipeId};

/// A precondition that was not met. Never fatal: the operation that produced
/// it left state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Refusal {
    #[error("Unknown ingredient '{0}'.")]
    UnknownIngredient(IngredientKey),

    #[error("There is no recipe {0}.")]
    UnknownRecipe(RecipeId),

    #[error("{name} isn't available right now. {reason}.")]
    RecipeUnavailable {
        id: RecipeId,
        name: String,
        reason: String,
    },

    #[error("No meals are available! Check your ingredients.")]
    NoEligibleRecipes,

    #[error("You need at least two available options to vote (have {available}).")]
    NotEnoughToVote { available: usize },

    #[error("No votes were cast!")]
    NoVotesCast,

    #[error("{voter} voted for recipe {recipe_id}, which isn't on the ballot.")]
    IneligibleVote { voter: String, recipe_id: RecipeId },

    #[error("{0} isn't on the family roster.")]
    UnknownVoter(String),

    #[error("{0} has already voted.")]
    DuplicateBallot(String),

    #[error("Please enter at least one family member.")]
    EmptyRoster,

    #[error("The wheel is already spinning!")]
    AlreadySpinning,

    #[error("Open the wheel before spinning it.")]
    WheelNotOpen,

    #[error("Close the wheel before doing anything else.")]
    WheelOpen,
}

/// Failure reported by a persistence slot.
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("slot io: {0}")]
    Io(#[from] std::io::Error),

    #[error("slot rejected write of {size} bytes (quota {quota})")]
    QuotaExceeded { size: usize, quota: usize },
}
