//! Report rows handed to the presentation layer.
//!
//! These are deliberately plain: strings and numbers only, so any renderer
//! (terminal table, JSON dump) can consume them without knowing anything
//! about the entity model behind them.

use serde::{Deserialize, Serialize};

/// One line of the collection performance ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Card display name.
    pub card: String,
    /// Wins over games played; `None` when the card has never been played.
    pub win_rate: Option<f64>,
    pub games_played: u32,
    pub wins: u32,
    /// Infinity splits already applied to this card.
    pub splits: u32,
}

/// One affordable upgrade, cheapest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRow {
    /// Card display name.
    pub card: String,
    /// Current upgrade level (0 = Common).
    pub level: u8,
    /// Display name of the level the upgrade leads to.
    pub target: String,
    pub credits_cost: u64,
    pub boosters_cost: u64,
}

/// One rung of the static upgrade price ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub from: String,
    pub to: String,
    pub credits: u64,
    pub boosters: u64,
}
