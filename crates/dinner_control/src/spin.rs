//! Wheel-spin interaction state machine.
//!
//! `Idle → open → Ready → start → Spinning → Settling → Idle`
//!
//! The winner is drawn in `open`, before anything moves. Frames only ever
//! read it, so cancelling or interrupting the animation can never change
//! which recipe gets recorded.

use std::time::Duration;

use dinner_core::wheel::{SpinAnimation, WheelLayout};
use dinner_core::{draw_spin_winner, Constants, Recipe, RecipeId, Refusal};
use rand::Rng;

#[derive(Debug, Clone)]
struct Wheel {
    layout: WheelLayout,
    winner: RecipeId,
    animation: SpinAnimation,
}

#[derive(Debug, Clone, Default)]
enum Phase {
    #[default]
    Idle,
    Ready(Wheel),
    /// `started` is latched by the first frame after `start`.
    Spinning {
        wheel: Wheel,
        started: Option<Duration>,
    },
    Settling {
        wheel: Wheel,
        until: Duration,
    },
}

/// What a frame callback should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinStep {
    /// No spin in flight.
    Inactive,
    /// Draw the wheel at this rotation.
    Rotate(f64),
    /// Stopped; waiting out the completion delay.
    Holding,
    /// Delay elapsed. Record this recipe; the session is back to idle.
    Finished(RecipeId),
}

#[derive(Debug, Clone, Default)]
pub struct SpinSession {
    phase: Phase,
    completion_delay: Duration,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl SpinSession {
    pub fn new(constants: &Constants) -> Self {
        Self {
            phase: Phase::Idle,
            completion_delay: Duration::from_millis(constants.spin_completion_delay_ms),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Spinning or settling; controls stay disabled.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Spinning { .. } | Phase::Settling { .. })
    }

    /// Layout of the open wheel, if any.
    pub fn layout(&self) -> Option<&WheelLayout> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Ready(wheel)
            | Phase::Spinning { wheel, .. }
            | Phase::Settling { wheel, .. } => Some(&wheel.layout),
        }
    }

    /// Lays out a fresh wheel over `eligible` and draws the winner.
    /// Reopening an idle or ready wheel discards the previous draw.
    pub fn open(
        &mut self,
        eligible: &[&Recipe],
        constants: &Constants,
        rng: &mut impl Rng,
    ) -> Result<(), Refusal> {
        if self.is_busy() {
            return Err(Refusal::AlreadySpinning);
        }
        let winner_index = draw_spin_winner(eligible, rng)?;
        let layout = WheelLayout::new(eligible);
        let wheel = Wheel {
            winner: layout.segments[winner_index].recipe_id,
            animation: SpinAnimation::new(
                winner_index,
                layout.len(),
                constants.spin_extra_rotations,
                constants.spin_duration_ms,
            ),
            layout,
        };
        self.completion_delay = Duration::from_millis(constants.spin_completion_delay_ms);
        self.phase = Phase::Ready(wheel);
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), Refusal> {
        match std::mem::take(&mut self.phase) {
            Phase::Ready(wheel) => {
                self.phase = Phase::Spinning {
                    wheel,
                    started: None,
                };
                Ok(())
            }
            Phase::Idle => Err(Refusal::WheelNotOpen),
            busy => {
                self.phase = busy;
                Err(Refusal::AlreadySpinning)
            }
        }
    }

    /// Abandons the wheel. Returns true if one was open; its outcome is dropped.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        self.phase = Phase::Idle;
        was_open
    }

    /// Advances the animation to monotonic time `now`.
    pub fn advance(&mut self, now: Duration) -> SpinStep {
        match std::mem::take(&mut self.phase) {
            Phase::Idle => SpinStep::Inactive,
            ready @ Phase::Ready(_) => {
                self.phase = ready;
                SpinStep::Inactive
            }
            Phase::Spinning { wheel, started } => {
                let started = started.unwrap_or(now);
                let elapsed = millis(now.saturating_sub(started));
                let rotation = wheel.animation.rotation_at(elapsed);
                self.phase = if wheel.animation.is_finished(elapsed) {
                    Phase::Settling {
                        wheel,
                        until: now + self.completion_delay,
                    }
                } else {
                    Phase::Spinning {
                        wheel,
                        started: Some(started),
                    }
                };
                SpinStep::Rotate(rotation)
            }
            Phase::Settling { wheel, until } => {
                if now >= until {
                    SpinStep::Finished(wheel.winner)
                } else {
                    self.phase = Phase::Settling { wheel, until };
                    SpinStep::Holding
                }
            }
        }
    }
}
