//! `dinner_core`: household meal state and the dinner decision engine.
//!
//! No IO besides the injected `StateSlot`. All randomness via the passed-in Rng,
//! all dates via the injected `Clock`.

mod clock;
pub mod engine;
mod error;
mod slot;
mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
mod types;
pub mod wheel;

pub use chrono::NaiveDate;
pub use clock::{Clock, LocalClock, ManualClock};
pub use engine::{
    availability, check_ballots, direct_pick, draw_spin_winner, eligible_recipes, quick_pick,
    tally_votes, Availability, Ballot, VoteOutcome,
};
pub use error::{Refusal, SlotError};
pub use slot::{MemorySlot, StateSlot};
pub use store::{load, Store};
pub use types::*;

#[cfg(test)]
mod tests;
