//! Derived report computation over the latest snapshots.
//!
//! Both computations are pure: the same snapshot inputs always produce the
//! same rows in the same order, which is what makes the reports testable.

use hashbrown::HashMap;
use snaptrack_types::{RankingRow, UpgradeRow};

use crate::catalog::{self, CardCatalog};
use crate::model::{CardStat, CollectionEntry, Currencies, Rarity};

/// Collection performance ranking: owned cards joined to their statistics,
/// best win rate first, names breaking ties. Cards that were never played
/// sort after every played card regardless of any nominal rate.
pub fn performance_ranking(
    catalog: &CardCatalog,
    stats: &[CardStat],
    entries: &[CollectionEntry],
) -> Vec<RankingRow> {
    let stats_by_code: HashMap<&str, &CardStat> =
        stats.iter().map(|s| (s.card_code.as_str(), s)).collect();

    let mut joined: Vec<(String, Option<f64>, u32, u32, u32)> = entries
        .iter()
        .filter(|e| e.owned)
        .map(|entry| {
            let name = display_name(catalog, &entry.card_code);
            let stat = stats_by_code.get(entry.card_code.as_str());
            let win_rate = stat.and_then(|s| s.win_rate());
            let games = stat.map_or(0, |s| s.games_played);
            let wins = stat.map_or(0, |s| s.wins);
            (name, win_rate, games, wins, entry.splits)
        })
        .collect();

    joined.sort_by(|a, b| match (a.1, b.1) {
        (Some(ra), Some(rb)) => rb.total_cmp(&ra).then_with(|| a.0.cmp(&b.0)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    joined
        .into_iter()
        .enumerate()
        .map(|(i, (card, win_rate, games_played, wins, splits))| RankingRow {
            rank: i + 1,
            card,
            win_rate,
            games_played,
            wins,
            splits,
        })
        .collect()
}

/// Upgrades the player can afford right now: the entry's level cost must be
/// covered by the credits balance and the boosters balance simultaneously.
/// Cheapest total cost first, so the most actionable rows lead the table.
pub fn upgrade_candidates(
    catalog: &CardCatalog,
    entries: &[CollectionEntry],
    currencies: &Currencies,
) -> Vec<UpgradeRow> {
    let mut rows: Vec<UpgradeRow> = entries
        .iter()
        .filter(|e| e.owned)
        .filter_map(|entry| {
            let cost = catalog::upgrade_cost(entry.level)?;
            let affordable =
                currencies.credits >= cost.credits && currencies.boosters >= cost.boosters;
            if !affordable {
                return None;
            }

            let target = Rarity::from_level(entry.level + 1)?;
            Some(UpgradeRow {
                card: display_name(catalog, &entry.card_code),
                level: entry.level,
                target: target.display_name().to_string(),
                credits_cost: cost.credits,
                boosters_cost: cost.boosters,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        let total_a = a.credits_cost + a.boosters_cost;
        let total_b = b.credits_cost + b.boosters_cost;
        total_a.cmp(&total_b).then_with(|| a.card.cmp(&b.card))
    });
    rows
}

/// Display name from the reference table. The normalizer guarantees entries
/// resolve, so a miss can only mean a stale snapshot from an older catalog;
/// fall back to the code rather than inventing data.
fn display_name(catalog: &CardCatalog, code: &str) -> String {
    catalog
        .get(code)
        .map_or_else(|| code.to_string(), |card| card.name.clone())
}
