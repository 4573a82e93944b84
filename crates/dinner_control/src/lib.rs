//! `dinner_control`: turns user intents into store mutations and pushes
//! the resulting view to a render surface.

mod intent;
mod spin;
mod view;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dinner_core::engine::MIN_VOTE_OPTIONS;
use dinner_core::wheel::WheelLayout;
use dinner_core::{
    check_ballots, direct_pick, eligible_recipes, quick_pick, tally_votes, Constants,
    IngredientStatus, RecipeId, Refusal, Store,
};
use rand::Rng;

pub use intent::{DebugReport, Intent, Notice, Strategy};
pub use spin::{SpinSession, SpinStep};
pub use view::{
    build_view, parse_roster, InventoryRow, RecipeCard, ShoppingItem, ViewModel, VoteOption,
    VoteSheet,
};

/// Wherever the decider is being drawn: a terminal, an SSE stream, a test recorder.
pub trait RenderSurface {
    fn render(&mut self, view: &ViewModel);

    fn notice(&mut self, notice: &Notice);

    fn show_vote(&mut self, _sheet: &VoteSheet) {}

    fn show_wheel(&mut self, _layout: &WheelLayout) {}

    /// Wheel rotation in degrees, clockwise.
    fn spin_frame(&mut self, _rotation_deg: f64) {}

    fn close_modal(&mut self) {}
}

pub struct Controller<S, R> {
    store: Store,
    constants: Constants,
    rng: R,
    surface: S,
    spin: SpinSession,
    vote_open: bool,
    /// Set by the store observer, cleared when the surface is re-rendered.
    dirty: Arc<AtomicBool>,
}

impl<S: RenderSurface, R: Rng> Controller<S, R> {
    /// Wires the store's change notifications to `surface` and draws the first view.
    pub fn new(mut store: Store, constants: Constants, rng: R, surface: S) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dirty);
        store.subscribe(move || flag.store(true, Ordering::Release));

        let mut controller = Self {
            spin: SpinSession::new(&constants),
            store,
            constants,
            rng,
            surface,
            vote_open: false,
            dirty,
        };
        controller.render();
        controller
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn view(&self) -> ViewModel {
        build_view(self.store.state(), self.store.today(), &self.constants)
    }

    /// True while the wheel is turning or settling; frames must keep coming.
    pub fn is_spinning(&self) -> bool {
        self.spin.is_busy()
    }

    pub fn is_vote_open(&self) -> bool {
        self.vote_open
    }

    /// Ballot for the current roster over the currently eligible recipes.
    pub fn vote_sheet(&self) -> VoteSheet {
        let eligible = eligible_recipes(self.store.state(), self.store.today(), &self.constants);
        VoteSheet {
            voters: self.store.state().family_members.clone(),
            options: eligible
                .iter()
                .map(|recipe| VoteOption {
                    recipe_id: recipe.id,
                    name: recipe.name.clone(),
                })
                .collect(),
        }
    }

    pub fn debug_report(&self) -> DebugReport {
        let state = self.store.state();
        let today = self.store.today();
        DebugReport {
            meal_history: state.meal_history.clone(),
            last_meal_ingredients: state.last_meal_ingredients.clone(),
            today,
            cooldown_days: self.constants.cooldown_days,
            available: eligible_recipes(state, today, &self.constants).len(),
            total: state.recipes.len(),
        }
    }

    pub fn render(&mut self) {
        self.dirty.store(false, Ordering::Release);
        let view = self.view();
        self.surface.render(&view);
    }

    fn flush(&mut self) {
        if self.dirty.swap(false, Ordering::AcqRel) {
            let view = self.view();
            self.surface.render(&view);
        }
    }

    /// Applies one intent. A refusal is reported to the surface as a notice
    /// and returned; state is left exactly as it was.
    pub fn handle(&mut self, intent: Intent) -> Result<(), Refusal> {
        tracing::debug!(?intent, "handling intent");
        let result = self.dispatch(intent);
        if let Err(refusal) = &result {
            tracing::info!(%refusal, "intent refused");
            self.surface.notice(&Notice::refused(refusal));
        }
        self.flush();
        result
    }

    fn dispatch(&mut self, intent: Intent) -> Result<(), Refusal> {
        // The wheel's winner is drawn when it opens, so nothing that could
        // change the eligible set may run until it is closed or has landed.
        if self.spin.is_open() && !intent.allowed_while_wheel_open() {
            return Err(Refusal::WheelOpen);
        }
        match intent {
            Intent::ToggleIngredient { key, have } => self
                .store
                .set_ingredient_status(&key, IngredientStatus::from_have(have)),
            Intent::SaveRoster { text } => {
                let members = parse_roster(&text);
                if members.is_empty() {
                    return Err(Refusal::EmptyRoster);
                }
                self.store.set_family_roster(members.clone());
                self.flush();
                self.surface.notice(&Notice::RosterSaved { members });
                Ok(())
            }
            Intent::PickRecipe { id } => {
                let id = direct_pick(
                    self.store.state(),
                    id,
                    self.store.today(),
                    &self.constants,
                )?;
                self.decide(Strategy::Direct, id, false)
            }
            Intent::QuickPick => {
                let id = quick_pick(
                    self.store.state(),
                    self.store.today(),
                    &self.constants,
                    &mut self.rng,
                )?;
                self.decide(Strategy::QuickPick, id, false)
            }
            Intent::OpenVote => {
                let sheet = self.vote_sheet();
                if sheet.options.len() < MIN_VOTE_OPTIONS {
                    return Err(Refusal::NotEnoughToVote {
                        available: sheet.options.len(),
                    });
                }
                self.vote_open = true;
                self.surface.show_vote(&sheet);
                Ok(())
            }
            Intent::SubmitVote { ballots } => {
                let eligible =
                    eligible_recipes(self.store.state(), self.store.today(), &self.constants);
                // A refused ballot leaves the vote open for another try.
                check_ballots(&self.store.state().family_members, &ballots)?;
                let outcome = tally_votes(&eligible, &ballots, &mut self.rng)?;
                tracing::debug!(tally = ?outcome.tally, "votes counted");
                self.close_vote();
                self.decide(Strategy::Vote, outcome.winner, outcome.tie_broken)
            }
            Intent::CloseVote => {
                self.close_vote();
                Ok(())
            }
            Intent::OpenSpin => {
                let eligible =
                    eligible_recipes(self.store.state(), self.store.today(), &self.constants);
                self.spin.open(&eligible, &self.constants, &mut self.rng)?;
                if let Some(layout) = self.spin.layout() {
                    self.surface.show_wheel(layout);
                }
                Ok(())
            }
            Intent::Spin => self.spin.start(),
            Intent::CloseSpin => {
                if self.spin.close() {
                    self.surface.spin_frame(0.0);
                    self.surface.close_modal();
                }
                Ok(())
            }
            Intent::ResetHistory => {
                self.store.reset_history();
                self.flush();
                self.surface.notice(&Notice::HistoryReset);
                Ok(())
            }
            Intent::ShowDebug => {
                let report = self.debug_report();
                tracing::info!("\n{report}");
                self.surface.notice(&Notice::Debug(report));
                Ok(())
            }
        }
    }

    /// Drives the wheel animation to monotonic time `now`.
    pub fn on_frame(&mut self, now: Duration) -> SpinStep {
        let step = self.spin.advance(now);
        match step {
            SpinStep::Rotate(rotation) => self.surface.spin_frame(rotation),
            SpinStep::Finished(recipe_id) => {
                if let Err(refusal) = self.decide(Strategy::Wheel, recipe_id, false) {
                    tracing::warn!(%refusal, recipe_id, "wheel winner could not be recorded");
                    self.surface.notice(&Notice::refused(&refusal));
                }
                self.surface.close_modal();
                self.surface.spin_frame(0.0);
            }
            SpinStep::Inactive | SpinStep::Holding => {}
        }
        self.flush();
        step
    }

    fn close_vote(&mut self) {
        if std::mem::take(&mut self.vote_open) {
            self.surface.close_modal();
        }
    }

    /// Records the decided meal, re-renders, then announces it.
    fn decide(
        &mut self,
        strategy: Strategy,
        recipe_id: RecipeId,
        tie_broken: bool,
    ) -> Result<(), Refusal> {
        self.store.record_meal(recipe_id)?;
        let recipe_name = self
            .store
            .recipe(recipe_id)
            .map_or_else(String::new, |recipe| recipe.name.clone());
        tracing::info!(?strategy, recipe_id, %recipe_name, tie_broken, "dinner decided");
        self.flush();
        self.surface.notice(&Notice::Decided {
            strategy,
            recipe_id,
            recipe_name,
            tie_broken,
        });
        Ok(())
    }
}
