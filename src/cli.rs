//! Command line front end
//!
//! Every invocation performs one action against the store and exits, so an
//! in-progress workout lives only in its persisted snapshot between calls.

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};

use crate::analysis::MonthCalendar;
use crate::commands::history::HistoryEntry;
use crate::commands::{analysis, history, plan, profile, workout};
use crate::db::AppState;
use crate::models::{ActiveSession, Plan};
use crate::plans::{ExerciseDraft, PlanDraft};

#[derive(Parser, Debug)]
#[command(name = "lift-log")]
#[command(about = "Plan strength workouts, log sets and track your streak")]
pub struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage user profiles
  #[command(subcommand)]
  Profile(ProfileCommand),
  /// Manage workout plans
  #[command(subcommand)]
  Plan(PlanCommand),
  /// Run the active workout
  #[command(subcommand)]
  Workout(WorkoutCommand),
  /// Browse completed workouts
  #[command(subcommand)]
  History(HistoryCommand),
  /// Streak and calendar
  #[command(subcommand)]
  Stats(StatsCommand),
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
  List,
  Create {
    name: String,
    /// Switch to the new profile
    #[arg(long)]
    select: bool,
  },
  Select {
    id: String,
  },
  Delete {
    id: String,
  },
  /// Delete all plans and history of the selected profile
  Clear,
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
  List,
  Show {
    id: String,
  },
  Create {
    name: String,
    /// Exercise as `NAME` or `NAME:SETS`, repeatable
    #[arg(short, long = "exercise", value_name = "NAME[:SETS]")]
    exercises: Vec<ExerciseDraft>,
  },
  Update {
    id: String,
    name: String,
    #[arg(short, long = "exercise", value_name = "NAME[:SETS]")]
    exercises: Vec<ExerciseDraft>,
  },
  Delete {
    id: String,
  },
}

#[derive(Subcommand, Debug)]
pub enum WorkoutCommand {
  /// Start a workout from a plan, replacing any pending one
  Start { plan_id: String },
  /// Start a workout pre-filled from a history record
  Redo { record_id: String },
  /// Show the active workout
  Status,
  /// Append an empty set. EXERCISE is a position, id or name.
  AddSet { exercise: String },
  RemoveSet { exercise: String, set: usize },
  /// Mark a set done or not done
  Toggle { exercise: String, set: usize },
  /// Enter weight and reps for a set (empty text clears a field)
  Set {
    exercise: String,
    set: usize,
    weight: String,
    reps: String,
  },
  /// Log the workout to history
  Finish,
  /// Throw the workout away
  Discard,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
  List {
    #[arg(short, long)]
    limit: Option<usize>,
  },
  Delete {
    id: String,
  },
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
  Streak,
  /// Month grid, defaults to the current month
  Calendar {
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    month: Option<u32>,
  },
}

/// Run one command, writing its result to stdout
pub async fn execute(state: &AppState, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Profile(cmd) => execute_profile(state, cmd).await,
    Command::Plan(cmd) => execute_plan(state, cmd).await,
    Command::Workout(cmd) => execute_workout(state, cmd).await,
    Command::History(cmd) => execute_history(state, cmd).await,
    Command::Stats(cmd) => execute_stats(state, cmd).await,
  }
}

async fn execute_profile(state: &AppState, cmd: ProfileCommand) -> anyhow::Result<()> {
  match cmd {
    ProfileCommand::List => {
      let list = profile::list_profiles(state).await?;
      if list.profiles.is_empty() {
        println!("No profiles yet. Create one with `lift-log profile create <NAME>`.");
      }
      for p in &list.profiles {
        let marker = if list.current_profile_id.as_deref() == Some(p.id.as_str()) {
          "*"
        } else {
          " "
        };
        println!("{} {}  {}", marker, p.id, p.name);
      }
    }
    ProfileCommand::Create { name, select } => {
      let created = profile::create_profile(state, &name, select).await?;
      println!("Created profile {} ({})", created.name, created.id);
    }
    ProfileCommand::Select { id } => {
      let selected = profile::select_profile(state, &id).await?;
      println!("Switched to {}", selected.name);
    }
    ProfileCommand::Delete { id } => {
      if profile::delete_profile(state, &id).await? {
        println!("Deleted profile {}", id);
      } else {
        println!("No profile with id {}", id);
      }
    }
    ProfileCommand::Clear => {
      profile::clear_profile_data(state).await?;
      println!("Cleared all plans and history");
    }
  }
  Ok(())
}

async fn execute_plan(state: &AppState, cmd: PlanCommand) -> anyhow::Result<()> {
  match cmd {
    PlanCommand::List => {
      let plans = plan::get_plans(state).await?;
      if plans.is_empty() {
        println!("No plans yet.");
      }
      for p in &plans {
        println!("{}  {}  [{}]", p.id, p.name, p.preview());
      }
    }
    PlanCommand::Show { id } => print_plan(&plan::get_plan(state, &id).await?),
    PlanCommand::Create { name, exercises } => {
      let created = plan::create_plan(state, PlanDraft::new(name, exercises)).await?;
      print_plan(&created);
    }
    PlanCommand::Update {
      id,
      name,
      exercises,
    } => {
      let updated = plan::update_plan(state, &id, PlanDraft::new(name, exercises)).await?;
      print_plan(&updated);
    }
    PlanCommand::Delete { id } => {
      if plan::delete_plan(state, &id).await? {
        println!("Deleted plan {}", id);
      } else {
        println!("No plan with id {}", id);
      }
    }
  }
  Ok(())
}

async fn execute_workout(state: &AppState, cmd: WorkoutCommand) -> anyhow::Result<()> {
  let session = match cmd {
    WorkoutCommand::Start { plan_id } => workout::start_workout(state, &plan_id).await?,
    WorkoutCommand::Redo { record_id } => workout::redo_workout(state, &record_id).await?,
    WorkoutCommand::Status => match workout::get_active_workout(state).await? {
      Some(session) => session,
      None => {
        println!("No active workout.");
        return Ok(());
      }
    },
    WorkoutCommand::AddSet { exercise } => workout::add_set(state, &exercise).await?,
    WorkoutCommand::RemoveSet { exercise, set } => {
      workout::remove_set(state, &exercise, set).await?
    }
    WorkoutCommand::Toggle { exercise, set } => workout::toggle_set(state, &exercise, set).await?,
    WorkoutCommand::Set {
      exercise,
      set,
      weight,
      reps,
    } => workout::update_set(state, &exercise, set, &weight, &reps).await?,
    WorkoutCommand::Finish => {
      match workout::finish_workout(state).await? {
        Some(record) => print_history_entry(&HistoryEntry::from(record)),
        None => println!("Nothing to log."),
      }
      return Ok(());
    }
    WorkoutCommand::Discard => {
      if workout::discard_workout(state).await? {
        println!("Workout discarded.");
      } else {
        println!("No active workout.");
      }
      return Ok(());
    }
  };
  print_session(&session);
  Ok(())
}

async fn execute_history(state: &AppState, cmd: HistoryCommand) -> anyhow::Result<()> {
  match cmd {
    HistoryCommand::List { limit } => {
      let entries = history::list_history(state, limit).await?;
      if entries.is_empty() {
        println!("No workouts logged yet.");
      }
      for entry in &entries {
        print_history_entry(entry);
      }
    }
    HistoryCommand::Delete { id } => {
      if history::delete_history(state, &id).await? {
        println!("Deleted workout {}", id);
      } else {
        println!("No workout with id {}", id);
      }
    }
  }
  Ok(())
}

async fn execute_stats(state: &AppState, cmd: StatsCommand) -> anyhow::Result<()> {
  let today = analysis::today();
  match cmd {
    StatsCommand::Streak => {
      let summary = analysis::get_home_summary(state, today).await?;
      println!("Current streak: {} day(s)", summary.streak);
      println!("Total workouts: {}", summary.total_workouts);
    }
    StatsCommand::Calendar { year, month } => {
      let calendar = analysis::get_calendar(
        state,
        year.unwrap_or(today.year()),
        month.unwrap_or(today.month()),
        today,
      )
      .await?;
      print_calendar(&calendar);
    }
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Output
/// ---------------------------------------------------------------------------

fn print_plan(plan: &Plan) {
  println!("{}  ({})", plan.name, plan.id);
  for (i, exercise) in plan.exercises.iter().enumerate() {
    println!("  {}. {} x {} sets", i + 1, exercise.name, exercise.default_sets);
  }
}

fn format_field(value: Option<f64>) -> String {
  value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn print_session(session: &ActiveSession) {
  println!(
    "{}  (started {})",
    session.plan_name,
    session.start_time.with_timezone(&Local).format("%Y-%m-%d %H:%M")
  );
  for (i, exercise) in session.exercises.iter().enumerate() {
    println!("  {}. {}", i + 1, exercise.name);
    for (n, set) in exercise.effective_sets().iter().enumerate() {
      println!(
        "     set {} [{}] {} kg x {}",
        n + 1,
        if set.completed { "x" } else { " " },
        format_field(set.weight),
        format_field(set.reps)
      );
    }
  }
}

fn print_history_entry(entry: &HistoryEntry) {
  let record = &entry.record;
  println!(
    "{}  {}  {} min  ({})",
    record.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
    record.plan_name,
    record.duration,
    record.id
  );
  for exercise in &record.exercises {
    let sets: Vec<String> = exercise.sets.iter().map(|s| s.to_string()).collect();
    println!("  {}: {}", exercise.name, sets.join(", "));
  }
  for rec in &entry.recommendations {
    println!("  -> {}", rec);
  }
}

fn print_calendar(calendar: &MonthCalendar) {
  println!("{}", calendar.title());
  println!(" Mo  Tu  We  Th  Fr  Sa  Su");
  for week in calendar.cells.chunks(7) {
    let line: String = week
      .iter()
      .map(|cell| match cell.day {
        Some(day) if cell.is_today => format!("[{:>2}]", day),
        Some(day) if cell.has_workout => format!(" {:>2}*", day),
        Some(day) => format!(" {:>2} ", day),
        None => "    ".to_string(),
      })
      .collect();
    println!("{}", line.trim_end());
  }
  println!("{} workout day(s)", calendar.workout_days());
}
