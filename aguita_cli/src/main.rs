use aguita_core::units::{format_amount, format_value, to_canonical};
use aguita_core::*;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Geometry of the virtual dial driven by `aguita dial`
const DIAL_CENTER: Point = Point { x: 0.0, y: 0.0 };
const DIAL_RADIUS: f64 = 100.0;

#[derive(Parser)]
#[command(name = "aguita")]
#[command(about = "Daily water intake tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the shared container directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's intake against the goal (default)
    Status,

    /// Add water to today's intake
    Add {
        /// Amount in the chosen unit (defaults to the configured quick amount)
        amount: Option<f64>,

        /// Unit of AMOUNT (defaults to the preferred unit)
        #[arg(long)]
        unit: Option<UnitMode>,
    },

    /// Remove water from today's intake
    Remove {
        /// Amount in the chosen unit (defaults to the configured quick amount)
        amount: Option<f64>,

        /// Unit of AMOUNT (defaults to the preferred unit)
        #[arg(long)]
        unit: Option<UnitMode>,
    },

    /// Set today's intake back to zero
    Reset,

    /// Change the daily goal
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Switch the display unit (cups, oz, ml)
    Unit { unit: UnitMode },

    /// Pick the color scheme (cyan, purple, green, orange)
    Scheme { scheme: ColorScheme },

    /// List recent days, newest first
    History {
        /// How many days back to look (defaults to the configured window)
        #[arg(long)]
        days: Option<i64>,

        /// Also append the listed records to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Drag the dial through the given angles, then release it
    Dial {
        /// Clockwise degrees from 12 o'clock, comma separated (360 wraps to 0)
        #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
        angles: Vec<f64>,

        /// Abandon the drag instead of committing it
        #[arg(long)]
        cancel: bool,
    },

    /// Nudge today's intake by one dial step
    DialStep { direction: Direction },

    /// Print what the home-screen widget would show
    Widget {
        /// Emit the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalAction {
    /// Set the goal in the current unit
    Set { value: f64 },
    /// Raise the goal by one step
    Up,
    /// Lower the goal by one step
    Down,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

/// Haptic sink for a terminal: events only show up in the logs
struct LoggedHaptics;

impl HapticSink for LoggedHaptics {
    fn prepare(&mut self) {
        tracing::debug!("Haptics prepared");
    }

    fn emit(&mut self, haptic: Haptic) {
        tracing::debug!("Haptic: {:?}", haptic);
    }
}

type Controller = IntakeController<JsonRecordStore>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    aguita_core::logging::init_with_verbosity(cli.verbose);

    let config = Config::load()?;

    // Opening the container is the one fatal step
    let container = match &cli.data_dir {
        Some(dir) => SharedContainer::open(dir)?,
        None => config.open_container()?,
    };
    let mut controller = IntakeController::open(&container, Box::new(LoggedHaptics))?;

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => print_status(&controller),
        Commands::Add { amount, unit } => {
            let cups = amount_in_cups(&controller, amount, unit, config.intake.add_amount);
            controller.add(cups);
            print_status(&controller);
        }
        Commands::Remove { amount, unit } => {
            let cups = amount_in_cups(&controller, amount, unit, config.intake.remove_amount);
            controller.remove(cups);
            print_status(&controller);
        }
        Commands::Reset => {
            controller.reset();
            print_status(&controller);
        }
        Commands::Goal { action } => cmd_goal(&mut controller, action)?,
        Commands::Unit { unit } => {
            controller.preferences_mut().set_unit(unit);
            print_goal(&controller);
        }
        Commands::Scheme { scheme } => {
            controller.preferences_mut().set_color_scheme(scheme);
            println!("Color scheme: {}", controller.preferences().color_scheme());
        }
        Commands::History { days, csv } => {
            cmd_history(&controller, days.unwrap_or(config.history.days), csv)?
        }
        Commands::Dial { angles, cancel } => cmd_dial(&mut controller, &angles, cancel),
        Commands::DialStep { direction } => {
            let dial = DialInputController::new(DIAL_CENTER);
            match direction {
                Direction::Up => dial.increment(&mut controller),
                Direction::Down => dial.decrement(&mut controller),
            }
            print_status(&controller);
        }
        Commands::Widget { json } => cmd_widget(&container, json)?,
    }

    Ok(())
}

/// Resolve a command-line amount to cups.
///
/// Explicit amounts are in `unit` or the preferred unit; the configured
/// fallback is already in cups.
fn amount_in_cups(
    controller: &Controller,
    amount: Option<f64>,
    unit: Option<UnitMode>,
    fallback_cups: f64,
) -> f64 {
    match amount {
        Some(value) => to_canonical(value, unit.unwrap_or_else(|| controller.unit())),
        None => fallback_cups,
    }
}

fn cmd_goal(controller: &mut Controller, action: GoalAction) -> Result<()> {
    match action {
        GoalAction::Set { value } => {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Other(format!(
                    "Daily goal must be a positive number, got {}",
                    value
                )));
            }
            controller.preferences_mut().set_daily_goal(value);
        }
        GoalAction::Up => controller.preferences_mut().step_goal_up(),
        GoalAction::Down => controller.preferences_mut().step_goal_down(),
    }
    print_goal(controller);
    Ok(())
}

fn cmd_history(controller: &Controller, days: i64, csv: Option<PathBuf>) -> Result<()> {
    let unit = controller.unit();
    let records = controller.history(days);

    if records.is_empty() {
        println!("No intake recorded in the last {} days.", days);
    }
    for record in &records {
        println!(
            "{}  {} {}",
            record.normalized_date(),
            format_amount(record.amount_cups(), unit),
            unit.label()
        );
    }

    if let Some(path) = csv {
        let count = write_history_csv(&records, unit, &path)?;
        println!("✓ Exported {} records to {}", count, path.display());
    }
    Ok(())
}

fn cmd_dial(controller: &mut Controller, angles: &[f64], cancel: bool) {
    let mut dial = DialInputController::new(DIAL_CENTER);
    let mut samples = angles.iter().map(|&degrees| {
        Point::on_circle(DIAL_CENTER, DIAL_RADIUS, degrees.rem_euclid(360.0))
    });

    let Some(first) = samples.next() else {
        return;
    };

    let mut events = dial.pointer_down(controller, first);
    for point in samples {
        events.extend(dial.pointer_moved(point));
    }
    for event in &events {
        tracing::debug!("Dial event: {:?}", event);
        if let Some(haptic) = event.haptic() {
            controller.signal(haptic);
        }
    }

    if cancel {
        dial.cancel();
        println!("Dial cancelled.");
    } else if let Some(event) = dial.pointer_up(controller) {
        tracing::debug!("Dial event: {:?}", event);
        if let Some(haptic) = event.haptic() {
            controller.signal(haptic);
        }
    }
    print_status(controller);
}

fn cmd_widget(container: &SharedContainer, json: bool) -> Result<()> {
    let entry = read_snapshot(container, Local::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let unit = entry.unit;
    println!("Date: {}", entry.date.date_naive());
    println!(
        "Consumed: {} {}",
        format_amount(entry.cups_consumed, unit),
        unit.label()
    );
    println!("Goal: {} {}", format_value(entry.daily_goal), unit.label());
    println!("Progress: {:.0}%", entry.progress() * 100.0);
    Ok(())
}

fn print_status(controller: &Controller) {
    let unit = controller.unit();
    println!(
        "{}: {} / {} {} ({:.0}%)",
        controller.today().normalized_date(),
        format_amount(controller.amount_cups(), unit),
        format_value(controller.preferences().daily_goal()),
        unit.label(),
        controller.progress() * 100.0
    );
}

fn print_goal(controller: &Controller) {
    let unit = controller.unit();
    println!(
        "Daily goal: {} {}",
        format_value(controller.preferences().daily_goal()),
        unit.label()
    );
}
