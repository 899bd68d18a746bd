//! Static reference data: the card catalog and the upgrade cost ladder.
//!
//! Cards are reference data shipped with the tracker as a builtin TOML
//! table, parsed once at startup. The pipeline reads this data, it never
//! writes it.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::model::Rarity;

const BUILTIN_CARDS: &str = include_str!("../data/cards.toml");

/// Immutable identity and base stats for a single card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    /// Stable card code (`CardDefId`), independent of display name.
    pub code: String,
    pub name: String,
    /// Release pool the card belongs to.
    pub series: u8,
    pub cost: u8,
    pub power: i16,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(rename = "card", default)]
    cards: Vec<CardInfo>,
}

/// The card reference table, keyed by card code.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: HashMap<String, CardInfo>,
}

impl CardCatalog {
    /// The catalog shipped with the tracker. The builtin table is validated
    /// by tests, so a parse failure here is a build defect, not user input.
    pub fn builtin() -> Self {
        Self::from_toml(BUILTIN_CARDS).expect("builtin cards.toml is valid")
    }

    pub fn from_toml(contents: &str) -> Result<Self, TrackerError> {
        let file: CatalogFile = toml::from_str(contents).map_err(|e| TrackerError::Config {
            reason: format!("card catalog: {e}"),
        })?;

        let mut cards = HashMap::with_capacity(file.cards.len());
        for card in file.cards {
            cards.insert(card.code.clone(), card);
        }
        Ok(Self { cards })
    }

    pub fn get(&self, code: &str) -> Option<&CardInfo> {
        self.cards.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.cards.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardInfo> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Cost to advance one upgrade level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCost {
    pub credits: u64,
    pub boosters: u64,
}

/// Highest upgrade level; Infinity cards cannot be upgraded further.
pub const MAX_LEVEL: u8 = 6;

/// Per-level upgrade cost, indexed by the current level. The deltas follow
/// the game client's cumulative ladder (25/5 total at Uncommon up to
/// 1525/155 at Infinity).
pub const UPGRADE_COSTS: [UpgradeCost; MAX_LEVEL as usize] = [
    UpgradeCost { credits: 25, boosters: 5 },    // Common -> Uncommon
    UpgradeCost { credits: 100, boosters: 10 },  // Uncommon -> Rare
    UpgradeCost { credits: 200, boosters: 20 },  // Rare -> Epic
    UpgradeCost { credits: 300, boosters: 30 },  // Epic -> Legendary
    UpgradeCost { credits: 400, boosters: 40 },  // Legendary -> Ultra
    UpgradeCost { credits: 500, boosters: 50 },  // Ultra -> Infinity
];

/// Cost of the next upgrade from `level`, or `None` at the top of the ladder.
pub fn upgrade_cost(level: u8) -> Option<UpgradeCost> {
    UPGRADE_COSTS.get(level as usize).copied()
}

/// Remaining cumulative cost from `level` all the way to Infinity.
pub fn cost_to_infinity(level: u8) -> UpgradeCost {
    UPGRADE_COSTS
        .iter()
        .skip(level as usize)
        .fold(UpgradeCost { credits: 0, boosters: 0 }, |acc, c| UpgradeCost {
            credits: acc.credits + c.credits,
            boosters: acc.boosters + c.boosters,
        })
}

/// The static price ladder as renderable rows, one per upgrade step.
pub fn price_ladder() -> Vec<snaptrack_types::PriceRow> {
    UPGRADE_COSTS
        .iter()
        .enumerate()
        .map(|(level, cost)| snaptrack_types::PriceRow {
            from: Rarity::LADDER[level].display_name().to_string(),
            to: Rarity::LADDER[level + 1].display_name().to_string(),
            credits: cost.credits,
            boosters: cost.boosters,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads_and_is_keyed_by_code() {
        let catalog = CardCatalog::builtin();
        assert!(!catalog.is_empty());

        let medusa = catalog.get("Medusa").expect("builtin catalog has Medusa");
        assert_eq!(medusa.name, "Medusa");
        assert!(catalog.contains("Hawkeye"));
        assert!(!catalog.contains("NotACard"));
    }

    #[test]
    fn parse_card_toml() {
        let toml = r#"
[[card]]
code = "MistyKnight"
name = "Misty Knight"
series = 1
cost = 1
power = 2
"#;

        let catalog = CardCatalog::from_toml(toml).expect("catalog parses");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("MistyKnight").map(|c| c.power), Some(2));
    }

    #[test]
    fn ladder_totals_match_the_cumulative_costs() {
        // Full Common -> Infinity run.
        let total = cost_to_infinity(0);
        assert_eq!(total, UpgradeCost { credits: 1525, boosters: 155 });

        // Nothing left at the top.
        assert_eq!(cost_to_infinity(MAX_LEVEL), UpgradeCost { credits: 0, boosters: 0 });
        assert_eq!(upgrade_cost(MAX_LEVEL), None);
        assert_eq!(upgrade_cost(0), Some(UpgradeCost { credits: 25, boosters: 5 }));
    }
}
