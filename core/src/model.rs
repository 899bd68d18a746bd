//! Normalized entity model extracted from the game's account state.
//!
//! Everything here is a full-replace projection of what the game client
//! wrote to disk: the tracker's own counters never accumulate, the game's
//! counters are the source of truth.

use serde::{Deserialize, Serialize};

/// Upgrade ladder position, Common at the bottom and Infinity at the top.
///
/// The ladder index doubles as the collection upgrade level (0..=6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    UltraLegendary,
    Infinity,
}

impl Rarity {
    pub const LADDER: [Rarity; 7] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::UltraLegendary,
        Rarity::Infinity,
    ];

    /// Parse the `RarityDefId` string the game writes.
    pub fn from_def_id(def_id: &str) -> Option<Self> {
        match def_id {
            "Common" => Some(Rarity::Common),
            "Uncommon" => Some(Rarity::Uncommon),
            "Rare" => Some(Rarity::Rare),
            "Epic" => Some(Rarity::Epic),
            "Legendary" => Some(Rarity::Legendary),
            "UltraLegendary" => Some(Rarity::UltraLegendary),
            "Infinity" => Some(Rarity::Infinity),
            _ => None,
        }
    }

    /// Ladder position: 0 for Common through 6 for Infinity.
    pub fn level(self) -> u8 {
        match self {
            Rarity::Common => 0,
            Rarity::Uncommon => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legendary => 4,
            Rarity::UltraLegendary => 5,
            Rarity::Infinity => 6,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Self::LADDER.get(level as usize).copied()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::UltraLegendary => "Ultra Legendary",
            Rarity::Infinity => "Infinity",
        }
    }
}

/// Per-card performance counters, replaced wholesale on every ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStat {
    pub card_code: String,
    pub games_played: u32,
    pub wins: u32,
}

impl CardStat {
    /// Wins over games played. `None` when the card has never been played;
    /// an undefined rate is not a 0% rate.
    pub fn win_rate(&self) -> Option<f64> {
        (self.games_played > 0).then(|| f64::from(self.wins) / f64::from(self.games_played))
    }
}

/// Ownership record for a single card in the player's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub card_code: String,
    pub owned: bool,
    /// Current upgrade level, 0 (Common) through 6 (Infinity).
    pub level: u8,
    /// Infinity splits already applied to this card.
    pub splits: u32,
}

/// Wallet balances, one document per snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currencies {
    pub credits: u64,
    pub boosters: u64,
    pub gold: u64,
}

/// Account identity block, surfaced in the ingestion summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: String,
    pub name: String,
}
