mod args;

use std::path::Path;

use drill_core::model::{Item, KeypadKey};
use drill_core::session::Phase;
use services::{AppServices, Clock, DrillHandle, DrillView, ExerciseSelection};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, ArgsError, print_usage};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn load_extra_items(path: Option<&Path>) -> Result<Vec<Item>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let items = storage::dataset::load_items(path)
        .map_err(|err| format!("cannot read items from {}: {err}", path.display()))?;
    Ok(items)
}

//
// ─── TERMINAL ──────────────────────────────────────────────────────────────────
//

/// What the last printed frame showed, so only changes get printed.
#[derive(Default)]
struct Printed {
    question: Option<String>,
    marked_wrong: bool,
    history_len: usize,
    complete: bool,
}

fn render(view: &DrillView, printed: &mut Printed) {
    if view.history.len() != printed.history_len {
        if let Some(newest) = view.history.first() {
            let mark = if newest.correct_first_try { '✓' } else { '✗' };
            println!("  {mark} {}", newest.text);
        }
        printed.history_len = view.history.len();
    }

    if view.marked_wrong && !printed.marked_wrong {
        println!("  wrong, try again");
    }
    printed.marked_wrong = view.marked_wrong;

    if view.question != printed.question {
        match (view.phase, view.question.as_deref()) {
            (Phase::RevealDelayed, _) => println!("\n…"),
            (Phase::Presenting, Some(text)) => {
                let progress = &view.progress;
                println!(
                    "\n[pass {} · {} left] {text} = ?",
                    progress.pass, progress.remaining_in_pass
                );
            }
            _ => {}
        }
        printed.question.clone_from(&view.question);
    }

    if view.is_complete() && !printed.complete {
        if let Some(summary) = &view.summary {
            println!(
                "\nDone: {} items, {} right first time, {} missed, {} passes, {}s.",
                summary.total_items(),
                summary.first_try_correct(),
                summary.missed(),
                summary.passes(),
                summary.elapsed().num_seconds()
            );
        }
        println!(":r to go again, :q to quit");
    }
    printed.complete = view.is_complete();
}

/// Map one stdin line onto the drill. Returns false when the user quits.
async fn dispatch_line(handle: &DrillHandle, line: &str) -> Result<bool, services::SessionError> {
    match line.trim() {
        ":q" => return Ok(false),
        ":r" => {
            if let Err(err) = handle.restart().await {
                println!("  {err}");
            }
        }
        cmd if cmd.starts_with(":k ") => {
            for label in cmd[3..].split_whitespace() {
                match KeypadKey::from_label(label) {
                    Some(key) => handle.key(key).await?,
                    None => println!("  unknown key: {label}"),
                }
            }
        }
        value => handle.input(value).await?,
    }
    Ok(true)
}

async fn drive(handle: DrillHandle) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshots = handle.subscribe();
    let mut printed = Printed::default();
    render(&snapshots.borrow_and_update(), &mut printed);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = snapshots.borrow_and_update().clone();
                render(&view, &mut printed);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !dispatch_line(&handle, &line).await? {
                    break;
                }
            }
        }
    }

    handle.exit().await;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.help {
        print_usage();
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::system(), parsed.pot_odds_file.as_deref()).await?;

    tracing::debug!(db = %parsed.db_url, "storage ready");

    if let Some(speed) = parsed.speed {
        app.settings().remember_speed(speed).await?;
    }

    if parsed.range.forces_random() {
        tracing::info!(chain = parsed.range.chain(), "long chain: Random on, Surges off");
    }

    let selection = ExerciseSelection {
        numbers: parsed.numbers,
        range: parsed.range,
        levels: parsed.levels,
        ops: parsed.ops,
        pot_odds: parsed.pot_odds,
        extra_items: load_extra_items(parsed.items_file.as_deref())?,
    };
    let plan = app.catalog().build(&selection)?;
    println!("{}", plan.stats_line());

    let handle = app.drills().start(parsed.modes, plan.items).await;
    drive(handle).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
