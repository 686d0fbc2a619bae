use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trainlog_core::exam::{self, EffortRow};
use trainlog_core::load::strength_session_load;
use trainlog_core::numeric::parse_numeric;
use trainlog_core::readiness::{next_day, readiness};
use trainlog_core::schema::{self, daily, exam_max, lifestyle, strength, Severity};
use trainlog_core::snapshot::lifestyle_entries;
use trainlog_core::store::raw_row;
use trainlog_core::*;

#[derive(Parser)]
#[command(name = "trainlog")]
#[command(about = "Training journal with readiness, strain and session recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug output (-v)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Log today's lifestyle ratings (0-10 each)
    Lifestyle {
        #[arg(long)]
        sleep: f64,
        #[arg(long)]
        hydration: f64,
        #[arg(long)]
        nutrition: f64,
        /// Higher is worse
        #[arg(long)]
        stress: f64,
        #[arg(long)]
        concentration: f64,
        #[arg(long)]
        energy: f64,
        #[arg(long)]
        mood: f64,

        /// Day number to overwrite (defaults to the next unused day)
        #[arg(long)]
        day: Option<u32>,
    },

    /// Log loaded lifts for a session
    Strength {
        #[arg(long)]
        session: u32,

        /// LIFT=LOADxREPS, LIFT=LOAD or LIFT=xREPS (e.g. squat=100x5)
        #[arg(long = "set", required = true)]
        sets: Vec<String>,

        /// Average RPE for the session
        #[arg(long)]
        rpe: Option<f64>,
    },

    /// Log bodyweight-skill metrics for a session
    Skill {
        #[arg(long)]
        session: u32,

        /// METRIC=VALUE (e.g. hspu=6, planche=12)
        #[arg(long = "metric", required = true)]
        metrics: Vec<String>,
    },

    /// Record exam maxima and rebuild the effort table
    Exam {
        /// EXERCISE=MAX (e.g. "Handstand Push-up=8")
        #[arg(long = "set")]
        sets: Vec<String>,

        /// Show the effort table without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Log the day's working set for one exam exercise
    Daily {
        /// Exercise name or alias (e.g. "Back Squat", hspu)
        #[arg(long)]
        exercise: String,

        /// Load in kg (0 for bodyweight)
        #[arg(long, default_value_t = 0.0)]
        load: f64,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        reps: u32,
    },

    /// Show derived metrics
    Dashboard {
        #[arg(long)]
        json: bool,
    },

    /// Recommend today's session
    Recommend {
        /// Block focus (max_strength, hypertrophy, skill, power, deload)
        #[arg(long)]
        focus: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Check stored tables against the expected columns
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    logging::init_with(logging::Verbosity::from_flags(cli.quiet, cli.verbose));

    let config = Config::load()?;
    let problems = config.validate();
    if !problems.is_empty() {
        eprintln!("Configuration errors:");
        for problem in &problems {
            eprintln!("  - {}", problem);
        }
        return Err(Error::Config("Invalid configuration".into()));
    }

    // Determine data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let mut store = CsvStore::new(data_dir);

    if !matches!(cli.command, Commands::Check) {
        log_schema_issues(&store);
    }

    match cli.command {
        Commands::Lifestyle {
            sleep,
            hydration,
            nutrition,
            stress,
            concentration,
            energy,
            mood,
            day,
        } => {
            let ratings = LifestyleRatings {
                sleep,
                hydration,
                nutrition,
                stress,
                concentration,
                energy,
                mood,
            };
            cmd_lifestyle(&mut store, ratings, day)
        }
        Commands::Strength { session, sets, rpe } => cmd_strength(&mut store, session, &sets, rpe),
        Commands::Skill { session, metrics } => cmd_skill(&mut store, session, &metrics),
        Commands::Exam { sets, dry_run } => cmd_exam(&mut store, &sets, dry_run),
        Commands::Daily {
            exercise,
            load,
            reps,
        } => cmd_daily(&mut store, &exercise, load, reps),
        Commands::Dashboard { json } => cmd_dashboard(&store, &config, json),
        Commands::Recommend { focus, json } => cmd_recommend(&store, &config, focus, json),
        Commands::Check => cmd_check(&store),
    }
}

fn log_schema_issues(store: &CsvStore) {
    for table in Table::ALL {
        match store.read_header(table) {
            Ok(Some(header)) => {
                for issue in schema::check(table, &header) {
                    tracing::warn!("{}", issue);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not read header of '{}': {}", table, e),
        }
    }
}

fn cmd_lifestyle(store: &mut CsvStore, ratings: LifestyleRatings, day: Option<u32>) -> Result<()> {
    let day = match day {
        Some(day) => day,
        None => {
            let rows = store.read_table(Table::Lifestyle)?.unwrap_or_default();
            next_day(&lifestyle_entries(&rows))
        }
    };
    let score = readiness(&ratings);

    let updates = raw_row([
        (lifestyle::DATE, chrono::Local::now().format(lifestyle::DATE_FORMAT).to_string()),
        (lifestyle::SLEEP, ratings.sleep.to_string()),
        (lifestyle::HYDRATION, ratings.hydration.to_string()),
        (lifestyle::NUTRITION, ratings.nutrition.to_string()),
        (lifestyle::STRESS, ratings.stress.to_string()),
        (lifestyle::CONCENTRATION, ratings.concentration.to_string()),
        (lifestyle::ENERGY, ratings.energy.to_string()),
        (lifestyle::MOOD, ratings.mood.to_string()),
        (lifestyle::READINESS, score.to_string()),
    ]);

    let outcome = store.upsert_row(Table::Lifestyle, &day.to_string(), &updates)?;

    println!("✓ Day {} {}", day, outcome_label(outcome));
    println!("  Readiness: {}/100", score);
    Ok(())
}

/// Parse `LIFT=LOADxREPS`, `LIFT=LOAD` or `LIFT=xREPS`
fn parse_set(item: &str) -> Result<(Lift, LiftEntry)> {
    let (name, value) = item
        .split_once('=')
        .ok_or_else(|| Error::Input(format!("expected LIFT=LOADxREPS, got '{}'", item)))?;
    let lift: Lift = name.parse()?;

    let number = |raw: &str| -> Result<Option<f64>> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        parse_numeric(raw)
            .map(Some)
            .ok_or_else(|| Error::Input(format!("invalid number '{}' in '{}'", raw, item)))
    };

    let value = value.trim().to_lowercase();
    let entry = match value.split_once(['x', '×']) {
        Some((load, reps)) => LiftEntry {
            load: number(load)?,
            reps: number(reps)?,
        },
        None => LiftEntry {
            load: number(&value)?,
            reps: None,
        },
    };

    if entry.is_empty() {
        return Err(Error::Input(format!("no load or reps in '{}'", item)));
    }
    Ok((lift, entry))
}

fn cmd_strength(store: &mut CsvStore, session: u32, sets: &[String], rpe: Option<f64>) -> Result<()> {
    let mut logged = StrengthSession {
        session,
        lifts: Default::default(),
        rpe,
    };
    for item in sets {
        let (lift, entry) = parse_set(item)?;
        logged.lifts.insert(lift, entry);
    }

    let mut updates = RawRow::new();
    for (lift, entry) in &logged.lifts {
        if let Some(load) = entry.load {
            updates.insert(lift.load_column().to_string(), load.to_string());
        }
        if let Some(reps) = entry.reps {
            updates.insert(lift.reps_column().to_string(), reps.to_string());
        }
    }
    if let Some(rpe) = rpe {
        updates.insert(strength::RPE.to_string(), rpe.to_string());
    }

    let outcome = store.upsert_row(Table::Strength, &session.to_string(), &updates)?;

    println!("✓ Strength session {} {}", session, outcome_label(outcome));
    println!("  Load from these sets: {:.0}", strength_session_load(&logged));
    Ok(())
}

fn cmd_skill(store: &mut CsvStore, session: u32, metrics: &[String]) -> Result<()> {
    let mut updates = RawRow::new();
    for item in metrics {
        let (name, value) = item
            .split_once('=')
            .ok_or_else(|| Error::Input(format!("expected METRIC=VALUE, got '{}'", item)))?;
        let metric: SkillMetric = name.parse()?;
        let value = parse_numeric(value)
            .ok_or_else(|| Error::Input(format!("invalid number in '{}'", item)))?;
        updates.insert(metric.column().to_string(), value.to_string());
    }

    let outcome = store.upsert_row(Table::Skill, &session.to_string(), &updates)?;

    println!("✓ Skill session {} {}", session, outcome_label(outcome));
    Ok(())
}

fn cmd_exam(store: &mut CsvStore, sets: &[String], dry_run: bool) -> Result<()> {
    let existing = store.read_table(Table::ExamMax)?.unwrap_or_default();
    let mut scratch = MemoryStore::new().with_rows(Table::ExamMax, existing);

    for item in sets {
        let (name, value) = item
            .rsplit_once('=')
            .ok_or_else(|| Error::Input(format!("expected EXERCISE=MAX, got '{}'", item)))?;
        let exercise = exam::find_exercise(name)
            .ok_or_else(|| Error::Input(format!("unknown exam exercise '{}'", name.trim())))?;
        let max = parse_numeric(value)
            .filter(|m| *m > 0.0)
            .ok_or_else(|| Error::Input(format!("invalid max in '{}'", item)))?;

        let updates = raw_row([(exam_max::MAX, max.to_string())]);
        scratch.upsert_row(Table::ExamMax, exercise.name, &updates)?;
        if !dry_run {
            store.upsert_row(Table::ExamMax, exercise.name, &updates)?;
        }
    }

    let rows = scratch.read_table(Table::ExamMax)?.unwrap_or_default();
    let table = exam::effort_table(&rows);

    if table.is_empty() {
        println!("No exam maxima recorded yet.");
        return Ok(());
    }

    display_effort_table(&table);

    if dry_run {
        println!("\n[Dry run - effort table not saved]");
        return Ok(());
    }

    for row in &table {
        store.upsert_row(Table::EffortTable, row.exercise, &row.to_raw_row())?;
    }
    println!("\n✓ Effort table saved ({} exercises)", table.len());
    Ok(())
}

fn cmd_daily(store: &mut CsvStore, name: &str, load: f64, reps: u32) -> Result<()> {
    let exercise = exam::find_exercise(name)
        .ok_or_else(|| Error::Input(format!("unknown exam exercise '{}'", name.trim())))?;
    if !load.is_finite() || load < 0.0 {
        return Err(Error::Input(format!("invalid load {}", load)));
    }

    let rows = store.read_table(Table::Daily)?.unwrap_or_default();
    let entry = exam::daily_entry(&rows, exercise.name);

    let updates = raw_row([
        (daily::DATE, chrono::Local::now().format(lifestyle::DATE_FORMAT).to_string()),
        (daily::EXERCISE, exercise.name.to_string()),
        (daily::LOAD, load.to_string()),
        (daily::REPS, reps.to_string()),
    ]);
    let outcome = store.upsert_row(Table::Daily, &entry.to_string(), &updates)?;

    println!("✓ Daily entry {} {}", entry, outcome_label(outcome));
    println!("  {}: {} kg x {}", exercise.name, load, reps);
    Ok(())
}

fn cmd_dashboard(store: &CsvStore, config: &Config, json: bool) -> Result<()> {
    let snapshot = Snapshot::load(store);
    let dashboard = Dashboard::build(&snapshot, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        display_dashboard(&dashboard, config.fatigue.window);
    }
    Ok(())
}

fn cmd_recommend(store: &CsvStore, config: &Config, focus: Option<String>, json: bool) -> Result<()> {
    let focus = match focus {
        Some(focus) => focus.parse()?,
        None => config.training.focus,
    };

    let snapshot = Snapshot::load(store);
    let dashboard = Dashboard::build(&snapshot, config);
    let prescription = recommend(&dashboard.recommendation_input(focus), &config.zones);

    if json {
        println!("{}", serde_json::to_string_pretty(&prescription)?);
    } else {
        display_prescription(&prescription);
    }
    Ok(())
}

fn cmd_check(store: &CsvStore) -> Result<()> {
    let mut errors = 0;

    for table in Table::ALL {
        let Some(header) = store.read_header(table)? else {
            println!("{}: not created yet", table);
            continue;
        };

        let issues = schema::check(table, &header);
        if issues.is_empty() {
            println!("{}: ok ({} columns)", table, header.len());
        }
        for issue in issues {
            if issue.severity == Severity::Error {
                errors += 1;
            }
            println!("{}", issue);
        }
    }

    if errors > 0 {
        return Err(Error::Schema(format!("{} schema error(s) found", errors)));
    }
    Ok(())
}

fn outcome_label(outcome: Upsert) -> &'static str {
    match outcome {
        Upsert::Created => "logged",
        Upsert::Updated => "updated",
    }
}

fn display_effort_table(table: &[EffortRow]) {
    println!(
        "{:<28} {:<5} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "Exercise", "Unit", "RPE 5", "RPE 6", "RPE 7", "RPE 8", "RPE 9", "RPE 10"
    );
    for row in table {
        let name = if row.inferred {
            format!("{} (inferred)", row.exercise)
        } else {
            row.exercise.to_string()
        };
        print!("{:<28} {:<5}", name, row.unit.label());
        for target in row.targets {
            print!(" {:>7}", target);
        }
        println!();
    }
}

fn display_dashboard(dashboard: &Dashboard, window: usize) {
    println!("\nTraining dashboard");
    println!("──────────────────");
    println!("  Sessions with load: {}", dashboard.loads.len());

    match (dashboard.latest_readiness, dashboard.average_readiness) {
        (Some(latest), Some(average)) => {
            println!("  Readiness: {}/100 (average {:.1})", latest, average);
            if let Some(date) = dashboard.last_logged {
                println!("  Last lifestyle entry: {}", date);
            }
        }
        _ => println!("  Readiness: no lifestyle data"),
    }

    match &dashboard.fatigue {
        Some(f) => {
            println!(
                "  Fatigue (last {} of window {}): mean load {:.0}, monotony {:.2}, strain {:.0}",
                f.sessions, window, f.mean_load, f.monotony, f.strain
            );
            if let Some(average) = dashboard.average_strain {
                println!("  Average rolling strain: {:.0}", average);
            }
        }
        None => println!("  Fatigue: no session data"),
    }

    match &dashboard.hybrid {
        Some(h) => {
            println!(
                "  Hybrid score: {:.1} (strength {:.1}, skill {:.1}, power {:.1})",
                h.score, h.strength, h.skill, h.power
            );
            if h.skill_data_present {
                println!("  Skill level: {}", h.skill_tier());
            } else {
                println!("  No bodyweight-skill data: skill and power count as 0");
            }
        }
        None => println!("  Hybrid score: unavailable (no strength data)"),
    }

    if let Some(last) = dashboard.last_session {
        println!(
            "  Last session: #{} {}-dominant (load {:.0})",
            last.session,
            last.domain.label(),
            last.load
        );
    }

    if let Some(latest) = dashboard.estimates.last() {
        let estimates: Vec<String> = latest
            .estimates
            .iter()
            .map(|(lift, e1rm)| format!("{:?} {:.1}", lift, e1rm).to_lowercase())
            .collect();
        println!("  Estimated 1RM (session {}): {}", latest.session, estimates.join(", "));
    }
    println!();
}

fn display_prescription(p: &Prescription) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", p.session_type.label().to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Focus: {}", p.focus);
    println!("  Intensity: {}", p.intensity);
    println!("  Volume: {}% of a normal session", p.volume_pct);
    println!("  Target RPE: {}", p.target_rpe);
    println!(
        "  Readiness {:.0} ({}), strain {:.0} ({})",
        p.readiness,
        p.readiness_zone.label(),
        p.strain,
        p.strain_zone.label()
    );
    println!();

    for (i, block) in p.blocks.iter().enumerate() {
        println!("  {}. {}", i + 1, block);
    }

    if !p.notes.is_empty() {
        println!();
        for note in &p.notes {
            println!("  ℹ {}", note);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_forms() {
        let (lift, entry) = parse_set("squat=100x5").unwrap();
        assert_eq!(lift, Lift::Squat);
        assert_eq!(entry, LiftEntry { load: Some(100.0), reps: Some(5.0) });

        let (_, entry) = parse_set("bench=82,5").unwrap();
        assert_eq!(entry, LiftEntry { load: Some(82.5), reps: None });

        let (lift, entry) = parse_set("weighted_pullup=x12").unwrap();
        assert_eq!(lift, Lift::WeightedPullup);
        assert_eq!(entry, LiftEntry { load: None, reps: Some(12.0) });
    }

    #[test]
    fn test_parse_set_rejects_garbage() {
        assert!(parse_set("squat").is_err());
        assert!(parse_set("curl=20x10").is_err());
        assert!(parse_set("squat=heavy").is_err());
        assert!(parse_set("squat=x").is_err());
    }
}
