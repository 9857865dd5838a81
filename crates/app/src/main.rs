use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lms_core::model::CourseId;
use services::{AppServices, Clock};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod repl;

use config::{AppConfig, CliOverrides, prepare_sqlite_file};

#[derive(Debug, Parser)]
#[command(name = "lms-player", version, about = "Aarong LMS course player")]
struct Cli {
    /// Progress store: `memory`, `dir:<path>` or `sqlite:<url>` [env: LMS_STORE]
    #[arg(long, global = true)]
    store: Option<String>,

    /// JSON course file to use instead of the built-in catalogue [env: LMS_COURSES_FILE]
    #[arg(long, global = true, value_name = "FILE")]
    courses: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List available courses
    Courses,
    /// Show saved progress for a course
    Status {
        #[arg(long)]
        course: CourseId,
    },
    /// Open the interactive player
    Play {
        #[arg(long)]
        course: CourseId,
    },
    /// Overwrite a course's progress with defaults
    Reset {
        #[arg(long)]
        course: CourseId,
    },
    /// Write the demo catalogue into the course store
    Seed,
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = AppConfig::load(
        cli.config.as_deref(),
        CliOverrides {
            store: cli.store,
            courses_file: cli.courses,
        },
    )?;
    prepare_sqlite_file(&cfg.store)?;

    let app = AppServices::new(
        &cfg.store,
        cfg.courses_file.as_deref(),
        cfg.settings,
        Clock::system(),
    )
    .await?;

    match cli.command {
        Command::Courses => {
            let courses = app.catalog().list().await?;
            print!("{}", render::course_list(&courses));
        }
        Command::Status { course } => {
            let player = app.open_player(&course).await?;
            print!("{}", render::status(player.state()));
        }
        Command::Play { course } => {
            let mut player = app.open_player(&course).await?;
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            repl::run(&mut player, stdin, &mut stdout).await?;
        }
        Command::Reset { course } => {
            app.reset_progress(&course).await?;
            println!("Progress for {course} reset.");
        }
        Command::Seed => {
            let written = app.seed_demo().await?;
            println!("Seeded {written} courses into {}.", cfg.store);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
