use super::*;
use crate::test_fixtures::{base_state, base_store, date, key, make_rng, scenario_state};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod selection;

// --- Shared test helpers ------------------------------------------------

fn test_constants() -> Constants {
    Constants::default()
}

/// Fails the test if any randomness is requested.
struct PanicRng;

impl rand::RngCore for PanicRng {
    fn next_u32(&mut self) -> u32 {
        panic!("rng must not be consulted")
    }

    fn next_u64(&mut self) -> u64 {
        panic!("rng must not be consulted")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        panic!("rng must not be consulted")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        panic!("rng must not be consulted")
    }
}

/// Registers an observer on `store` and returns its call counter.
fn count_notifications(store: &mut Store) -> Arc<AtomicUsize> {
    let counter = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&counter);
    store.subscribe(move || {
        handle.fetch_add(1, Ordering::SeqCst);
    });
    counter
}

fn ballot(voter: &str, choice: Option<RecipeId>) -> Ballot {
    Ballot {
        voter: voter.to_string(),
        choice,
    }
}
