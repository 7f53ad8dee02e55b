use std::path::PathBuf;

use chrono::NaiveDate;
use evalforge_lib::config::load_config;
use evalforge_lib::gauntlet::PracticeCandidate;
use evalforge_lib::{init_tracing, ArcadeApp};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Progress,
    Quests { world: Option<String> },
    Gauntlet(GauntletSource),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GauntletSource {
    /// Ask the backend for today's plan.
    Remote,
    /// Build a plan locally from a JSON array of candidates.
    Local {
        candidates: PathBuf,
        profile: String,
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("evalforge failed: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut config_path: Option<PathBuf> = None;
    let mut command_name: Option<String> = None;
    let mut world: Option<String> = None;
    let mut candidates: Option<PathBuf> = None;
    let mut profile: Option<String> = None;
    let mut date: Option<NaiveDate> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            print_help();
            return Ok(());
        }

        if let Some(value) = arg.strip_prefix("--config=") {
            config_path = Some(PathBuf::from(value));
            continue;
        }
        if arg == "--config" {
            let value = args
                .next()
                .ok_or_else(|| "--config requires a path".to_string())?;
            config_path = Some(PathBuf::from(value));
            continue;
        }

        if let Some(value) = arg.strip_prefix("--world=") {
            world = Some(value.to_string());
            continue;
        }
        if arg == "--world" {
            world = Some(
                args.next()
                    .ok_or_else(|| "--world requires a world id".to_string())?,
            );
            continue;
        }

        if let Some(value) = arg.strip_prefix("--candidates=") {
            candidates = Some(PathBuf::from(value));
            continue;
        }
        if arg == "--candidates" {
            let value = args
                .next()
                .ok_or_else(|| "--candidates requires a path".to_string())?;
            candidates = Some(PathBuf::from(value));
            continue;
        }

        if let Some(value) = arg.strip_prefix("--profile=") {
            profile = Some(value.to_string());
            continue;
        }
        if arg == "--profile" {
            profile = Some(
                args.next()
                    .ok_or_else(|| "--profile requires a profile id".to_string())?,
            );
            continue;
        }

        if let Some(value) = arg.strip_prefix("--date=") {
            date = Some(parse_date(value)?);
            continue;
        }
        if arg == "--date" {
            let value = args
                .next()
                .ok_or_else(|| "--date requires YYYY-MM-DD".to_string())?;
            date = Some(parse_date(&value)?);
            continue;
        }

        if arg.starts_with('-') {
            return Err(format!("unknown option '{arg}'. Use --help for usage"));
        }
        if command_name.is_some() {
            return Err(format!("unexpected argument '{arg}'"));
        }
        command_name = Some(arg);
    }

    let command = match command_name.as_deref() {
        Some("progress") => Command::Progress,
        Some("quests") => Command::Quests { world },
        Some("gauntlet") => match candidates {
            Some(candidates) => Command::Gauntlet(GauntletSource::Local {
                candidates,
                profile: profile
                    .ok_or_else(|| "--candidates requires --profile".to_string())?,
                date,
            }),
            None => Command::Gauntlet(GauntletSource::Remote),
        },
        Some(other) => {
            return Err(format!(
                "unsupported command '{other}'. Use progress, quests, or gauntlet"
            ))
        }
        None => {
            print_help();
            return Ok(());
        }
    };

    let config = load_config(config_path.as_deref()).map_err(|error| error.to_string())?;
    let app = ArcadeApp::new(config).map_err(|error| error.to_string())?;

    match command {
        Command::Progress => {
            app.bootstrap().await.map_err(|error| error.to_string())?;
            print_json(&app.progress().cache().snapshot())
        }
        Command::Quests { world } => {
            let quests = app
                .quests(world.as_deref())
                .await
                .map_err(|error| error.to_string())?;
            print_json(&quests)
        }
        Command::Gauntlet(GauntletSource::Remote) => {
            let plan = app.practice_today().await.map_err(|error| error.to_string())?;
            print_json(&plan)
        }
        Command::Gauntlet(GauntletSource::Local {
            candidates,
            profile,
            date,
        }) => {
            let raw = std::fs::read_to_string(&candidates)
                .map_err(|error| format!("failed to read {}: {error}", candidates.display()))?;
            let pool: Vec<PracticeCandidate> = serde_json::from_str(&raw).map_err(|error| {
                format!("invalid candidates in {}: {error}", candidates.display())
            })?;
            let date = date.unwrap_or_else(|| chrono::Utc::now().date_naive());
            print_json(&app.build_practice_plan(&profile, date, &pool))
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|error| format!("invalid date '{value}': {error}"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|error| error.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn print_help() {
    println!("EvalForge arcade client");
    println!();
    println!("Usage:");
    println!("  evalforge [--config PATH] <command> [options]");
    println!();
    println!("Commands:");
    println!("  progress                          Fetch world progress and print per-track percentages");
    println!("  quests [--world ID]               List quests, optionally for one world");
    println!("  gauntlet                          Fetch today's practice plan from the backend");
    println!("  gauntlet --candidates PATH --profile ID [--date YYYY-MM-DD]");
    println!("                                    Build a practice plan locally from candidates");
    println!();
    println!("Environment:");
    println!("  EVALFORGE_API_BASE_URL            Overrides api.baseUrl");
    println!("  EVALFORGE_API_TIMEOUT_MS          Overrides api.timeoutMs");
    println!("  RUST_LOG                          Log filter (default: evalforge=debug,info)");
}
