//! Subcommand implementations. Each one maps onto a single tracker call
//! and renders plain rows; anything that fails propagates up for a
//! non-zero exit.

use snaptrack_core::catalog;
use snaptrack_core::locate::resolve_profile_dir;
use snaptrack_core::watch::{DirectoryWatcher, WatchEvent};
use snaptrack_core::{Tracker, TrackerConfig, TrackerError};
use snaptrack_types::formatting::{format_thousands, format_win_rate};

use crate::table;

const NO_DATA_HINT: &str = "No snapshots yet. Run `snaptrack ingest` (or `snaptrack watch`) first.";

pub fn open_tracker(config: TrackerConfig) -> Result<Tracker, TrackerError> {
    Tracker::new(config)
}

pub fn stats(tracker: &Tracker) -> Result<(), TrackerError> {
    if !tracker.has_data()? {
        println!("{NO_DATA_HINT}");
        return Ok(());
    }

    let ranking = tracker.performance_ranking()?;
    if ranking.is_empty() {
        println!("The latest snapshot holds no owned cards.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = ranking
        .iter()
        .map(|r| {
            vec![
                r.rank.to_string(),
                r.card.clone(),
                format_win_rate(r.win_rate),
                r.games_played.to_string(),
                r.wins.to_string(),
                r.splits.to_string(),
            ]
        })
        .collect();

    println!("Your best performing cards\n");
    print!(
        "{}",
        table::render(&["Rank", "Card", "Win rate", "Games", "Wins", "Splits"], &rows)
    );
    Ok(())
}

pub fn upgrades(tracker: &Tracker) -> Result<(), TrackerError> {
    if !tracker.has_data()? {
        println!("{NO_DATA_HINT}");
        return Ok(());
    }

    let wallet = tracker.latest_currencies()?.unwrap_or_default();
    println!(
        "You have {} credits and {} boosters available for upgrades.\n",
        format_thousands(wallet.credits),
        format_thousands(wallet.boosters)
    );

    let candidates = tracker.upgrade_candidates()?;
    if candidates.is_empty() {
        println!("No affordable upgrades right now.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = candidates
        .iter()
        .map(|r| {
            vec![
                r.card.clone(),
                r.level.to_string(),
                r.target.clone(),
                format_thousands(r.credits_cost),
                format_thousands(r.boosters_cost),
            ]
        })
        .collect();

    print!(
        "{}",
        table::render(&["Card", "Level", "Target", "Credits", "Boosters"], &rows)
    );
    Ok(())
}

pub fn prices() -> Result<(), TrackerError> {
    let rows: Vec<Vec<String>> = catalog::price_ladder()
        .iter()
        .map(|p| {
            vec![
                p.from.clone(),
                p.to.clone(),
                format_thousands(p.credits),
                format_thousands(p.boosters),
            ]
        })
        .collect();

    println!("Upgrade prices per step\n");
    print!("{}", table::render(&["From", "To", "Credits", "Boosters"], &rows));

    let total = catalog::cost_to_infinity(0);
    println!(
        "\nFull ladder to Infinity: {} credits, {} boosters.",
        format_thousands(total.credits),
        format_thousands(total.boosters)
    );
    Ok(())
}

pub fn ingest(tracker: &Tracker) -> Result<(), TrackerError> {
    let report = tracker.ingest()?;
    if !report.account_name.is_empty() {
        println!("Hi {}!", report.account_name);
    }
    println!(
        "Ingested {} ({} snapshots written, {} unchanged).",
        report.state_file.display(),
        report.written,
        report.deduplicated
    );
    Ok(())
}

pub async fn watch(tracker: Tracker) -> Result<(), TrackerError> {
    // Catch up before waiting: the file on disk is already newer than
    // whatever the store holds.
    match tracker.ingest() {
        Ok(report) => println!(
            "Initial ingest: {} written, {} unchanged.",
            report.written, report.deduplicated
        ),
        Err(err) => tracing::warn!("initial ingest failed: {err}"),
    }

    let profile_dir = resolve_profile_dir(tracker.config())?;
    let mut watcher = DirectoryWatcher::new(&profile_dir)?;
    println!("Watching {} (ctrl-c to stop)", profile_dir.display());

    while let Some(event) = watcher.next_event().await {
        match event {
            WatchEvent::StateChanged(path) => {
                let superseded = watcher.drain_pending();
                if superseded > 0 {
                    tracing::debug!(superseded, "coalesced change events");
                }
                tracing::info!(path = %path.display(), "account state changed");

                match tracker.ingest() {
                    Ok(report) if report.written > 0 => {
                        println!("State updated: {} snapshots written.", report.written);
                    }
                    Ok(_) => tracing::debug!("no change in account state"),
                    // A half-written file shows up as malformed; the next
                    // event re-ingests it, so the cycle just ends here.
                    Err(err) => tracing::warn!("ingestion cycle failed: {err}"),
                }
            }
            WatchEvent::Error(err) => tracing::warn!("watcher error: {err}"),
        }
    }

    Ok(())
}

pub fn show_config(config: &TrackerConfig) -> Result<(), TrackerError> {
    println!("profile_root  = {}", config.profile_root.display());
    println!(
        "profile       = {}",
        config.profile.as_deref().unwrap_or("(auto)")
    );
    println!("database_path = {}", config.database_path.display());
    Ok(())
}
