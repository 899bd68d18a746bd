//! Projection of the parsed state tree into typed entities.
//!
//! Policy: unknown fields are ignored (the game adds fields freely between
//! patches), missing counters default to zero, and a missing or mistyped
//! identity field is an error carried with its dotted path. Pure
//! computation, no side effects.

use hashbrown::HashMap;
use serde_json::Value;

use crate::catalog::CardCatalog;
use crate::error::TrackerError;
use crate::model::{AccountInfo, CardStat, CollectionEntry, Currencies, Rarity};

type JsonMap = serde_json::Map<String, Value>;

/// Everything a single ingestion cycle extracts from the account state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedState {
    pub account: AccountInfo,
    pub stats: Vec<CardStat>,
    pub entries: Vec<CollectionEntry>,
    pub currencies: Currencies,
}

/// Extract and type-check the cards-owned, card-statistics and currency
/// subtrees, enforcing referential integrity against the card catalog.
pub fn normalize(tree: &Value, catalog: &CardCatalog) -> Result<NormalizedState, TrackerError> {
    let root = tree
        .as_object()
        .ok_or_else(|| TrackerError::schema("$", "root is not an object"))?;

    let server = match optional_object(root, "ServerState", "$")? {
        Some(map) => map,
        None => return Err(TrackerError::schema("ServerState", "missing required subtree")),
    };

    let account = normalize_account(server)?;
    let (stats, splits_by_code) = normalize_stats(server, catalog)?;
    let entries = normalize_entries(server, catalog, &splits_by_code)?;
    let currencies = normalize_currencies(server)?;

    Ok(NormalizedState {
        account,
        stats,
        entries,
        currencies,
    })
}

fn normalize_account(server: &JsonMap) -> Result<AccountInfo, TrackerError> {
    let Some(account) = optional_object(server, "Account", "ServerState")? else {
        return Ok(AccountInfo::default());
    };
    let path = "ServerState.Account";
    Ok(AccountInfo {
        id: str_field(account, "Id", path)?.unwrap_or_default().to_string(),
        name: str_field(account, "Name", path)?.unwrap_or_default().to_string(),
    })
}

/// Card statistics plus the per-card split counts the collection entries
/// pick up. Stats for codes outside the catalog are skipped: the game ships
/// new cards faster than the reference table, and statistics are not
/// identity data.
fn normalize_stats(
    server: &JsonMap,
    catalog: &CardCatalog,
) -> Result<(Vec<CardStat>, HashMap<String, u32>), TrackerError> {
    let mut stats = Vec::new();
    let mut splits_by_code = HashMap::new();

    let table = match optional_object(server, "CardDefStats", "ServerState")? {
        Some(def_stats) => optional_object(def_stats, "Stats", "ServerState.CardDefStats")?,
        None => None,
    };
    let Some(table) = table else {
        return Ok((stats, splits_by_code));
    };

    for (code, entry) in table {
        // The Stats table mixes per-card objects with aggregate scalars.
        let Value::Object(entry) = entry else {
            continue;
        };
        let path = format!("ServerState.CardDefStats.Stats.{code}");

        let games_played = u32_field(entry, "GamesPlayed", &path)?;
        let mut wins = u32_field(entry, "GamesWon", &path)?;
        let splits = u32_field(entry, "InfinitySplitCount", &path)?;

        if wins > games_played {
            tracing::warn!(card = %code, wins, games_played, "clamping wins to games played");
            wins = games_played;
        }

        if !catalog.contains(code) {
            tracing::debug!(card = %code, "ignoring statistics for unknown card code");
            continue;
        }

        splits_by_code.insert(code.clone(), splits);
        stats.push(CardStat {
            card_code: code.clone(),
            games_played,
            wins,
        });
    }

    stats.sort_by(|a, b| a.card_code.cmp(&b.card_code));
    Ok((stats, splits_by_code))
}

/// Collection ownership from the `Cards` array. One entry per card code;
/// a card owned in several variants keeps its highest upgrade level.
fn normalize_entries(
    server: &JsonMap,
    catalog: &CardCatalog,
    splits_by_code: &HashMap<String, u32>,
) -> Result<Vec<CollectionEntry>, TrackerError> {
    let mut by_code: HashMap<String, CollectionEntry> = HashMap::new();

    let Some(cards) = optional_array(server, "Cards", "ServerState")? else {
        return Ok(Vec::new());
    };

    for (i, card) in cards.iter().enumerate() {
        let path = format!("ServerState.Cards[{i}]");
        let Value::Object(card) = card else {
            return Err(TrackerError::schema(path, "expected an object"));
        };

        // Custom variants carry no collection identity of their own.
        if bool_field(card, "Custom", &path)? {
            continue;
        }

        let code = str_field(card, "CardDefId", &path)?.ok_or_else(|| {
            TrackerError::schema(format!("{path}.CardDefId"), "missing identity field")
        })?;
        if !catalog.contains(code) {
            return Err(TrackerError::schema(
                format!("{path}.CardDefId"),
                format!("card code `{code}` has no entry in the card table"),
            ));
        }

        let rarity_id = str_field(card, "RarityDefId", &path)?.unwrap_or("Common");
        let rarity = Rarity::from_def_id(rarity_id).ok_or_else(|| {
            TrackerError::schema(
                format!("{path}.RarityDefId"),
                format!("unknown rarity `{rarity_id}`"),
            )
        })?;

        let level = rarity.level();
        by_code
            .entry(code.to_string())
            .and_modify(|e| e.level = e.level.max(level))
            .or_insert_with(|| CollectionEntry {
                card_code: code.to_string(),
                owned: true,
                level,
                splits: splits_by_code.get(code).copied().unwrap_or(0),
            });
    }

    let mut entries: Vec<CollectionEntry> = by_code.into_values().collect();
    entries.sort_by(|a, b| a.card_code.cmp(&b.card_code));
    Ok(entries)
}

fn normalize_currencies(server: &JsonMap) -> Result<Currencies, TrackerError> {
    let table = match optional_object(server, "Wallet", "ServerState")? {
        Some(wallet) => optional_object(wallet, "_currencies", "ServerState.Wallet")?,
        None => None,
    };
    let Some(table) = table else {
        return Ok(Currencies::default());
    };

    let path = "ServerState.Wallet._currencies";
    Ok(Currencies {
        credits: currency_amount(table, "Credits", path)?,
        boosters: currency_amount(table, "Boosters", path)?,
        gold: currency_amount(table, "Gold", path)?,
    })
}

fn currency_amount(table: &JsonMap, name: &str, path: &str) -> Result<u64, TrackerError> {
    match optional_object(table, name, path)? {
        Some(balance) => u64_field(balance, "TotalAmount", &format!("{path}.{name}")),
        None => Ok(0),
    }
}

// ─── Typed field access ──────────────────────────────────────────────────────

fn optional_object<'a>(
    map: &'a JsonMap,
    key: &str,
    path: &str,
) -> Result<Option<&'a JsonMap>, TrackerError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj)),
        Some(_) => Err(TrackerError::schema(
            format!("{path}.{key}"),
            "expected an object",
        )),
    }
}

fn optional_array<'a>(
    map: &'a JsonMap,
    key: &str,
    path: &str,
) -> Result<Option<&'a Vec<Value>>, TrackerError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(TrackerError::schema(
            format!("{path}.{key}"),
            "expected an array",
        )),
    }
}

fn str_field<'a>(map: &'a JsonMap, key: &str, path: &str) -> Result<Option<&'a str>, TrackerError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(TrackerError::schema(
            format!("{path}.{key}"),
            "expected a string",
        )),
    }
}

fn bool_field(map: &JsonMap, key: &str, path: &str) -> Result<bool, TrackerError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(TrackerError::schema(
            format!("{path}.{key}"),
            "expected a boolean",
        )),
    }
}

fn u64_field(map: &JsonMap, key: &str, path: &str) -> Result<u64, TrackerError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
            TrackerError::schema(
                format!("{path}.{key}"),
                "expected a non-negative integer",
            )
        }),
        Some(_) => Err(TrackerError::schema(
            format!("{path}.{key}"),
            "expected a number",
        )),
    }
}

fn u32_field(map: &JsonMap, key: &str, path: &str) -> Result<u32, TrackerError> {
    let value = u64_field(map, key, path)?;
    u32::try_from(value).map_err(|_| {
        TrackerError::schema(format!("{path}.{key}"), "counter out of range")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Value {
        json!({
            "ServerState": {
                "Account": { "Id": "a1b2", "Name": "Kim" },
                "CardDefStats": {
                    "Stats": {
                        "Medusa": { "GamesPlayed": 10, "GamesWon": 5, "Boosters": 25, "InfinitySplitCount": 1 },
                        "Sentinel": { "GamesPlayed": 4, "GamesWon": 4 },
                        "Hawkeye": { "GamesPlayed": 0, "GamesWon": 0 },
                        "CardsTotal": 3
                    }
                },
                "Cards": [
                    { "CardDefId": "Medusa", "RarityDefId": "Uncommon" },
                    { "CardDefId": "Sentinel", "RarityDefId": "Common", "Split": false },
                    { "CardDefId": "Hawkeye", "RarityDefId": "Rare" },
                    { "CardDefId": "Medusa", "RarityDefId": "Common", "ArtVariantDefId": "MedusaModern" },
                    { "CardDefId": "Whatever", "Custom": true }
                ],
                "Wallet": {
                    "_currencies": {
                        "Credits": { "TotalAmount": 650 },
                        "Boosters": { "TotalAmount": 40 },
                        "Gold": { "TotalAmount": 1200 }
                    }
                },
                "SomeFutureField": { "Ignored": true }
            }
        })
    }

    #[test]
    fn extracts_the_full_entity_set() {
        let state = normalize(&fixture(), &CardCatalog::builtin()).expect("fixture normalizes");

        assert_eq!(state.account.name, "Kim");
        assert_eq!(state.stats.len(), 3);

        let medusa = state.stats.iter().find(|s| s.card_code == "Medusa").expect("medusa stat");
        assert_eq!((medusa.games_played, medusa.wins), (10, 5));

        let entries: Vec<&str> = state.entries.iter().map(|e| e.card_code.as_str()).collect();
        assert_eq!(entries, vec!["Hawkeye", "Medusa", "Sentinel"]);

        // Highest variant level wins; splits joined from the stats table.
        let medusa_entry = &state.entries[1];
        assert_eq!(medusa_entry.level, Rarity::Uncommon.level());
        assert_eq!(medusa_entry.splits, 1);
        assert!(medusa_entry.owned);

        assert_eq!(state.currencies, Currencies { credits: 650, boosters: 40, gold: 1200 });
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let state = normalize(&fixture(), &CardCatalog::builtin()).expect("fixture normalizes");
        let sentinel = state.stats.iter().find(|s| s.card_code == "Sentinel").expect("stat");
        assert_eq!(sentinel.games_played, 4);

        let hawkeye = state.stats.iter().find(|s| s.card_code == "Hawkeye").expect("stat");
        assert_eq!(hawkeye.win_rate(), None);
    }

    #[test]
    fn missing_wallet_means_empty_balances_not_an_error() {
        let tree = json!({ "ServerState": { "Cards": [] } });
        let state = normalize(&tree, &CardCatalog::builtin()).expect("normalizes");
        assert_eq!(state.currencies, Currencies::default());
        assert!(state.entries.is_empty());
    }

    #[test]
    fn missing_card_code_is_a_schema_violation() {
        let tree = json!({
            "ServerState": { "Cards": [ { "RarityDefId": "Common" } ] }
        });
        let err = normalize(&tree, &CardCatalog::builtin()).unwrap_err();
        match err {
            TrackerError::SchemaViolation { path, .. } => {
                assert_eq!(path, "ServerState.Cards[0].CardDefId");
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn dangling_card_code_is_reported_not_dropped() {
        let tree = json!({
            "ServerState": { "Cards": [ { "CardDefId": "NotInTheTable" } ] }
        });
        let err = normalize(&tree, &CardCatalog::builtin()).unwrap_err();
        assert!(matches!(err, TrackerError::SchemaViolation { .. }));
    }

    #[test]
    fn mistyped_counter_carries_its_path() {
        let tree = json!({
            "ServerState": {
                "CardDefStats": {
                    "Stats": { "Medusa": { "GamesPlayed": "ten" } }
                }
            }
        });
        let err = normalize(&tree, &CardCatalog::builtin()).unwrap_err();
        match err {
            TrackerError::SchemaViolation { path, .. } => {
                assert_eq!(path, "ServerState.CardDefStats.Stats.Medusa.GamesPlayed");
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn unknown_stat_codes_are_skipped() {
        let tree = json!({
            "ServerState": {
                "CardDefStats": {
                    "Stats": { "BrandNewCard": { "GamesPlayed": 2, "GamesWon": 1 } }
                }
            }
        });
        let state = normalize(&tree, &CardCatalog::builtin()).expect("normalizes");
        assert!(state.stats.is_empty());
    }

    #[test]
    fn missing_server_state_is_a_schema_violation() {
        let err = normalize(&json!({ "Unrelated": 1 }), &CardCatalog::builtin()).unwrap_err();
        assert!(matches!(err, TrackerError::SchemaViolation { .. }));
    }

    #[test]
    fn wins_never_exceed_games_played() {
        let tree = json!({
            "ServerState": {
                "CardDefStats": {
                    "Stats": { "Medusa": { "GamesPlayed": 3, "GamesWon": 7 } }
                }
            }
        });
        let state = normalize(&tree, &CardCatalog::builtin()).expect("normalizes");
        let medusa = &state.stats[0];
        assert_eq!(medusa.wins, 3);
        assert_eq!(medusa.win_rate(), Some(1.0));
    }
}
