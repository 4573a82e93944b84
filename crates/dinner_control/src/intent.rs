use std::fmt;

use dinner_core::{Ballot, IngredientKey, MealRecord, NaiveDate, RecipeId, Refusal};
use serde::{Deserialize, Serialize};

/// Everything a surface can ask the controller to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    ToggleIngredient { key: IngredientKey, have: bool },
    SaveRoster { text: String },
    PickRecipe { id: RecipeId },
    QuickPick,
    OpenVote,
    SubmitVote { ballots: Vec<Ballot> },
    CloseVote,
    OpenSpin,
    Spin,
    CloseSpin,
    ResetHistory,
    ShowDebug,
}

impl Intent {
    /// Wheel controls and read-only requests. Everything else waits for the
    /// wheel to close.
    pub fn allowed_while_wheel_open(&self) -> bool {
        matches!(
            self,
            Intent::OpenSpin
                | Intent::Spin
                | Intent::CloseSpin
                | Intent::CloseVote
                | Intent::ShowDebug
        )
    }
}

/// How a dinner was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Direct,
    QuickPick,
    Vote,
    Wheel,
}

/// Snapshot shown by the debug intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugReport {
    pub meal_history: Vec<MealRecord>,
    pub last_meal_ingredients: Vec<IngredientKey>,
    pub today: NaiveDate,
    pub cooldown_days: u32,
    pub available: usize,
    pub total: usize,
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let history = serde_json::to_string_pretty(&self.meal_history).map_err(|_| fmt::Error)?;
        let last_meal =
            serde_json::to_string_pretty(&self.last_meal_ingredients).map_err(|_| fmt::Error)?;
        writeln!(f, "=== DEBUG INFO ===")?;
        writeln!(f)?;
        writeln!(f, "Meal History ({} entries):", self.meal_history.len())?;
        writeln!(f, "{history}")?;
        writeln!(f)?;
        writeln!(f, "Last Meal Ingredients:")?;
        writeln!(f, "{last_meal}")?;
        writeln!(f)?;
        writeln!(f, "Today's Date: {}", self.today.format("%Y-%m-%d"))?;
        writeln!(f, "Cooldown Days: {}", self.cooldown_days)?;
        writeln!(f)?;
        write!(f, "Available Recipes: {} / {}", self.available, self.total)
    }
}

/// One-shot message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Decided {
        strategy: Strategy,
        recipe_id: RecipeId,
        recipe_name: String,
        tie_broken: bool,
    },
    RosterSaved {
        members: Vec<String>,
    },
    HistoryReset,
    Refused {
        message: String,
    },
    Debug(DebugReport),
}

impl Notice {
    pub fn refused(refusal: &Refusal) -> Self {
        Notice::Refused {
            message: refusal.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Decided {
                strategy,
                recipe_name,
                tie_broken,
                ..
            } => match strategy {
                Strategy::Direct => {
                    write!(f, "🎉 Dinner is decided! Tonight we're having {recipe_name}.")
                }
                Strategy::QuickPick => write!(f, "🎲 Quick Pick chose: {recipe_name}!"),
                Strategy::Vote => {
                    if *tie_broken {
                        writeln!(f, "🤝 It was a tie! A random winner was chosen.")?;
                    }
                    write!(f, "🗳️ The votes are in! Tonight we're having {recipe_name}.")
                }
                Strategy::Wheel => {
                    write!(f, "🎉 The wheel has spoken! Tonight we're having {recipe_name}!")
                }
            },
            Notice::RosterSaved { .. } => write!(f, "✅ Settings saved!"),
            Notice::HistoryReset => write!(f, "Meal history cleared. Every recipe is back on the menu."),
            Notice::Refused { message } => write!(f, "{message}"),
            Notice::Debug(report) => write!(f, "{report}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dinner_core::test_fixtures::date;

    #[test]
    fn test_intent_wire_format() {
        let intent: Intent =
            serde_json::from_str(r#"{"type":"toggle_ingredient","key":"eggs","have":false}"#)
                .unwrap();
        assert_eq!(
            intent,
            Intent::ToggleIngredient {
                key: IngredientKey::from("eggs"),
                have: false
            }
        );

        let vote: Intent = serde_json::from_str(
            r#"{"type":"submit_vote","ballots":[{"voter":"Kid 1","choice":2},{"voter":"Kid 2","choice":null}]}"#,
        )
        .unwrap();
        assert!(matches!(vote, Intent::SubmitVote { ballots } if ballots.len() == 2));

        let spin = serde_json::to_value(Intent::OpenSpin).unwrap();
        assert_eq!(spin, serde_json::json!({"type": "open_spin"}));
    }

    #[test]
    fn test_vote_notice_mentions_tie() {
        let notice = Notice::Decided {
            strategy: Strategy::Vote,
            recipe_id: 2,
            recipe_name: "Tacos".to_string(),
            tie_broken: true,
        };
        let text = notice.to_string();
        assert!(text.starts_with("🤝 It was a tie!"));
        assert!(text.ends_with("Tonight we're having Tacos."));
    }

    #[test]
    fn test_debug_report_layout() {
        let report = DebugReport {
            meal_history: vec![MealRecord {
                recipe_id: 1,
                date: date(2025, 3, 9),
            }],
            last_meal_ingredients: vec![IngredientKey::from("eggs")],
            today: date(2025, 3, 10),
            cooldown_days: 3,
            available: 4,
            total: 6,
        };
        let text = report.to_string();
        assert!(text.starts_with("=== DEBUG INFO ==="));
        assert!(text.contains("Meal History (1 entries):"));
        assert!(text.contains("\"recipeId\": 1"));
        assert!(text.contains("Today's Date: 2025-03-10"));
        assert!(text.ends_with("Available Recipes: 4 / 6"));
    }
}
