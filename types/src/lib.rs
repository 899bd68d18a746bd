pub mod formatting;
pub mod rows;

pub use rows::{PriceRow, RankingRow, UpgradeRow};
