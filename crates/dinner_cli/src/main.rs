use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dinner_control::{Controller, Intent, Notice, RenderSurface, ViewModel, VoteSheet};
use dinner_core::wheel::WheelLayout;
use dinner_core::{
    Ballot, Clock, IngredientKey, IngredientStatus, LocalClock, ManualClock, NaiveDate, RecipeId,
    Store,
};
use dinner_world::{
    apply_overrides, default_seed, load_constants, load_seed, parse_override, FileSlot,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "dinner", about = "Decide what's for dinner from what's in the pantry")]
struct Cli {
    /// Directory holding the saved household state.
    #[arg(long, global = true, default_value = "./dinner_data")]
    data_dir: PathBuf,
    /// Constants file to use instead of the built-in defaults.
    #[arg(long, global = true)]
    constants: Option<PathBuf>,
    /// Household catalog used when no saved state exists yet.
    #[arg(long, global = true)]
    seed_file: Option<PathBuf>,
    /// Override a constant, e.g. `--set cooldown_days=5`. Repeatable.
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    overrides: Vec<String>,
    /// Seed the random source for reproducible picks.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Treat this date (YYYY-MM-DD) as today.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show tonight's options, the shopping list and the roster.
    Status,
    /// List every recipe with its ingredients.
    Recipes,
    /// Mark an ingredient as in stock.
    Have { key: String },
    /// Mark an ingredient as needed.
    Need { key: String },
    /// Replace the family roster, one name per argument.
    Roster {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Choose a specific recipe for tonight.
    Pick { id: RecipeId },
    /// Let chance pick among the available recipes.
    QuickPick,
    /// Show the ballot, or count votes given as `--ballot voter=id`.
    /// Leave the id empty to abstain.
    Vote {
        #[arg(long = "ballot", value_name = "VOTER=ID")]
        ballots: Vec<String>,
    },
    /// Spin the wheel of available recipes.
    Spin {
        /// Skip the animation and print the result straight away.
        #[arg(long)]
        no_animate: bool,
    },
    /// Forget every recorded meal.
    Reset,
    /// Print the debug report.
    Debug,
}

// ---------------------------------------------------------------------------
// Terminal surface
// ---------------------------------------------------------------------------

struct TerminalSurface {
    animate: bool,
    view: Option<ViewModel>,
}

impl TerminalSurface {
    fn new(animate: bool) -> Self {
        Self {
            animate,
            view: None,
        }
    }
}

impl RenderSurface for TerminalSurface {
    fn render(&mut self, view: &ViewModel) {
        self.view = Some(view.clone());
    }

    fn notice(&mut self, notice: &Notice) {
        // Refusals come back from `handle` and end the process with an error.
        if !matches!(notice, Notice::Refused { .. }) {
            println!("{notice}");
        }
    }

    fn show_vote(&mut self, sheet: &VoteSheet) {
        println!("Voters: {}", sheet.voters.join(", "));
        println!("Options:");
        for option in &sheet.options {
            println!("  [{}] {}", option.recipe_id, option.name);
        }
        println!("Cast with: dinner vote --ballot \"<voter>=<id>\" ...");
    }

    fn show_wheel(&mut self, layout: &WheelLayout) {
        let labels: Vec<&str> = layout.segments.iter().map(|s| s.label.as_str()).collect();
        println!("🎡 {}", labels.join(" | "));
    }

    fn spin_frame(&mut self, rotation_deg: f64) {
        if self.animate && rotation_deg > 0.0 {
            print!("\r   {:>8.1}°", rotation_deg.rem_euclid(360.0));
            let _ = std::io::stdout().flush();
        }
    }

    fn close_modal(&mut self) {
        if self.animate {
            println!();
        }
    }
}

type TerminalController = Controller<TerminalSurface, ChaCha8Rng>;

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_controller(cli: &Cli, animate: bool) -> Result<TerminalController> {
    let mut constants = load_constants(cli.constants.as_deref())?;
    let overrides = cli
        .overrides
        .iter()
        .map(|arg| parse_override(arg))
        .collect::<Result<HashMap<_, _>>>()?;
    apply_overrides(&mut constants, &overrides)?;

    let clock: Box<dyn Clock> = match cli.today {
        Some(today) => Box::new(ManualClock::new(today)),
        None => Box::new(LocalClock),
    };
    let slot = FileSlot::new(&cli.data_dir, &constants.storage_key);
    tracing::debug!(path = %slot.path().display(), "opening household state");
    let seed_state = match &cli.seed_file {
        Some(path) => load_seed(path)?,
        None => default_seed()?,
    };
    let store = Store::open(Box::new(slot), clock, seed_state);

    let seed = cli.seed.unwrap_or_else(rand::random);
    let rng = ChaCha8Rng::seed_from_u64(seed);
    Ok(Controller::new(
        store,
        constants,
        rng,
        TerminalSurface::new(animate),
    ))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Parses `voter=id`. The last `=` splits, so names may contain one.
fn parse_ballot(arg: &str) -> Result<Ballot> {
    let Some((voter, choice)) = arg.rsplit_once('=') else {
        bail!("ballot '{arg}' must look like voter=id");
    };
    let voter = voter.trim();
    if voter.is_empty() {
        bail!("ballot '{arg}' has no voter");
    }
    let choice = match choice.trim() {
        "" | "-" => None,
        id => Some(
            id.parse::<RecipeId>()
                .with_context(|| format!("ballot '{arg}': recipe id must be a number"))?,
        ),
    };
    Ok(Ballot {
        voter: voter.to_string(),
        choice,
    })
}

fn set_status(
    controller: &mut TerminalController,
    key: String,
    status: IngredientStatus,
) -> Result<()> {
    controller.handle(Intent::ToggleIngredient {
        key: IngredientKey(key),
        have: status == IngredientStatus::Have,
    })?;
    print_summary(controller);
    Ok(())
}

const FRAME: Duration = Duration::from_millis(16);

fn spin(controller: &mut TerminalController, animate: bool) -> Result<()> {
    controller.handle(Intent::OpenSpin)?;
    controller.handle(Intent::Spin)?;
    let started = Instant::now();
    let mut simulated = Duration::ZERO;
    while controller.is_spinning() {
        let now = if animate {
            std::thread::sleep(FRAME);
            started.elapsed()
        } else {
            simulated += FRAME;
            simulated
        };
        controller.on_frame(now);
    }
    Ok(())
}

fn print_summary(controller: &TerminalController) {
    if let Some(view) = &controller.surface().view {
        let available = view.recipes.iter().filter(|card| card.eligible).count();
        println!("{available} of {} recipes available tonight.", view.recipes.len());
    }
}

fn print_status(view: &ViewModel) {
    println!("Tonight's options:");
    for card in &view.recipes {
        if card.eligible {
            println!("  ✅ [{}] {}", card.id, card.name);
        } else {
            println!("  ⛔ [{}] {}  ({})", card.id, card.name, card.block_reason);
        }
    }

    println!();
    if view.shopping_list.is_empty() {
        println!("Shopping list: nothing needed");
    } else {
        println!("Shopping list:");
        for item in &view.shopping_list {
            println!("  - {} ({})", item.name, item.quantity);
        }
    }

    let low: Vec<&str> = view
        .inventory
        .iter()
        .filter(|row| row.have && row.low_stock)
        .map(|row| row.name.as_str())
        .collect();
    if !low.is_empty() {
        println!("Used in the last meal, check stock: {}", low.join(", "));
    }

    println!();
    println!("Family: {}", view.roster_text.replace('\n', ", "));
}

fn print_recipes(controller: &TerminalController) {
    let state = controller.store().state();
    for recipe in &state.recipes {
        let ingredients: Vec<String> = recipe
            .ingredients
            .iter()
            .map(|key| match state.ingredients.get(key) {
                Some(ingredient) if ingredient.status == IngredientStatus::Have => {
                    format!("{} ✓", ingredient.name)
                }
                Some(ingredient) => format!("{} ✗", ingredient.name),
                None => format!("{key} ?"),
            })
            .collect();
        println!("[{}] {}: {}", recipe.id, recipe.name, ingredients.join(", "));
    }
    println!();
    println!("Ingredient keys:");
    for (key, ingredient) in &state.ingredients {
        println!("  {key:<16} {}", ingredient.name);
    }
}

fn run(cli: Cli) -> Result<()> {
    let animate = !matches!(cli.command, Commands::Spin { no_animate: true });
    let mut controller = open_controller(&cli, animate)?;

    match cli.command {
        Commands::Status => {
            if let Some(view) = &controller.surface().view {
                print_status(view);
            }
        }
        Commands::Recipes => print_recipes(&controller),
        Commands::Have { key } => set_status(&mut controller, key, IngredientStatus::Have)?,
        Commands::Need { key } => set_status(&mut controller, key, IngredientStatus::Need)?,
        Commands::Roster { names } => controller.handle(Intent::SaveRoster {
            text: names.join("\n"),
        })?,
        Commands::Pick { id } => controller.handle(Intent::PickRecipe { id })?,
        Commands::QuickPick => controller.handle(Intent::QuickPick)?,
        Commands::Vote { ballots } => {
            if ballots.is_empty() {
                controller.handle(Intent::OpenVote)?;
            } else {
                let ballots = ballots
                    .iter()
                    .map(|arg| parse_ballot(arg))
                    .collect::<Result<Vec<_>>>()?;
                controller.handle(Intent::SubmitVote { ballots })?;
            }
        }
        Commands::Spin { .. } => spin(&mut controller, animate)?,
        Commands::Reset => controller.handle(Intent::ResetHistory)?,
        Commands::Debug => controller.handle(Intent::ShowDebug)?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    run(Cli::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ballot_with_choice() {
        let ballot = parse_ballot("Kid 1=4").unwrap();
        assert_eq!(ballot.voter, "Kid 1");
        assert_eq!(ballot.choice, Some(4));
    }

    #[test]
    fn test_parse_ballot_abstention() {
        assert_eq!(parse_ballot("Parent 2=").unwrap().choice, None);
        assert_eq!(parse_ballot("Parent 2=-").unwrap().choice, None);
    }

    #[test]
    fn test_parse_ballot_rejects_garbage() {
        assert!(parse_ballot("nobody").is_err());
        assert!(parse_ballot("=3").is_err());
        assert!(parse_ballot("Kid 1=pizza").is_err());
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dinner",
            "vote",
            "--ballot",
            "A=1",
            "--ballot",
            "B=2",
            "--today",
            "2025-03-10",
            "--set",
            "cooldown_days=1",
        ])
        .unwrap();
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2025, 3, 10));
        assert_eq!(cli.overrides, vec!["cooldown_days=1"]);
        assert!(matches!(cli.command, Commands::Vote { ref ballots } if ballots.len() == 2));
    }

    #[test]
    fn test_spin_without_animation_records_a_meal() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "dinner",
            "spin",
            "--no-animate",
            "--seed",
            "7",
            "--data-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let mut controller = open_controller(&cli, false).unwrap();
        spin(&mut controller, false).unwrap();

        assert_eq!(controller.store().state().meal_history.len(), 1);
        assert!(dir.path().join("dinnerAppData.json").exists());
    }

    #[test]
    fn test_seed_file_supplies_the_first_run_household() {
        let dir = tempfile::tempdir().unwrap();
        let seed_path = dir.path().join("household.json");
        let mut household = default_seed().unwrap();
        household.family_members = vec!["Robin".to_string()];
        std::fs::write(&seed_path, serde_json::to_string(&household).unwrap()).unwrap();

        let data_dir = dir.path().join("data");
        let cli = Cli::try_parse_from([
            "dinner",
            "status",
            "--data-dir",
            data_dir.to_str().unwrap(),
            "--seed-file",
            seed_path.to_str().unwrap(),
        ])
        .unwrap();
        let controller = open_controller(&cli, false).unwrap();
        assert_eq!(controller.store().state().family_members, vec!["Robin"]);
    }

    #[test]
    fn test_missing_seed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "dinner",
            "status",
            "--data-dir",
            dir.path().to_str().unwrap(),
            "--seed-file",
            dir.path().join("nope.json").to_str().unwrap(),
        ])
        .unwrap();
        assert!(open_controller(&cli, false).is_err());
    }
}
