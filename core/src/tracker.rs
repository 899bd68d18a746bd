//! The tracker context: configuration, reference data and the snapshot
//! store wired into one explicitly constructed object. Created at process
//! start, handed to whatever triggers ingestion, torn down on shutdown —
//! there is no implicit global state.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde_json::Value;
use snaptrack_types::{RankingRow, UpgradeRow};

use crate::catalog::CardCatalog;
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::locate::locate_state_file;
use crate::model::{CardStat, CollectionEntry, Currencies};
use crate::normalize::normalize;
use crate::report;
use crate::state::parse_state;
use crate::store::{EntityKind, SnapshotStore};

/// Outcome of one ingestion cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub state_file: PathBuf,
    pub account_name: String,
    /// Snapshot documents appended this cycle.
    pub written: usize,
    /// Documents skipped because the latest snapshot was already identical.
    pub deduplicated: usize,
}

pub struct Tracker {
    config: TrackerConfig,
    catalog: CardCatalog,
    store: SnapshotStore,
}

impl Tracker {
    /// Open (or create) the snapshot store at the configured path and seed
    /// the static card collection.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        let store = SnapshotStore::open(&config.database_path)?;
        Self::with_store(config, store)
    }

    /// Build a tracker over an existing store (tests use the in-memory one).
    pub fn with_store(config: TrackerConfig, store: SnapshotStore) -> Result<Self, TrackerError> {
        let catalog = CardCatalog::builtin();
        store.seed_catalog(&catalog)?;
        Ok(Self {
            config,
            catalog,
            store,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// Run one ingestion cycle: locate, parse, normalize, snapshot. Any
    /// failure aborts this cycle only; nothing partial reaches the store.
    pub fn ingest(&self) -> Result<IngestReport, TrackerError> {
        let state_file = locate_state_file(&self.config)?;
        tracing::info!(path = %state_file.display(), "ingesting account state");

        let bytes = fs::read(&state_file)?;
        let tree = parse_state(&bytes)?;
        let state = normalize(&tree, &self.catalog)?;

        let mut docs: Vec<(EntityKind, String, Value)> = Vec::new();
        for stat in &state.stats {
            docs.push((
                EntityKind::CardStats,
                stat.card_code.clone(),
                serde_json::to_value(stat)?,
            ));
        }
        for entry in &state.entries {
            docs.push((
                EntityKind::CollectionEntries,
                entry.card_code.clone(),
                serde_json::to_value(entry)?,
            ));
        }
        docs.push((
            EntityKind::Currencies,
            "wallet".to_string(),
            serde_json::to_value(state.currencies)?,
        ));

        let timestamp = Utc::now().timestamp_millis();
        let outcome = self.store.put_batch(timestamp, &docs)?;
        tracing::info!(
            written = outcome.written,
            deduplicated = outcome.deduplicated,
            "ingestion cycle complete"
        );

        Ok(IngestReport {
            state_file,
            account_name: state.account.name,
            written: outcome.written,
            deduplicated: outcome.deduplicated,
        })
    }

    /// True once at least one ingestion cycle has landed, so callers can
    /// render "no data yet" instead of an empty report.
    pub fn has_data(&self) -> Result<bool, TrackerError> {
        self.store.has_ingested_data()
    }

    /// Collection performance ranking over the latest snapshots.
    pub fn performance_ranking(&self) -> Result<Vec<RankingRow>, TrackerError> {
        let stats = self.load_all::<CardStat>(EntityKind::CardStats)?;
        let entries = self.load_all::<CollectionEntry>(EntityKind::CollectionEntries)?;
        Ok(report::performance_ranking(&self.catalog, &stats, &entries))
    }

    /// Affordable upgrades over the latest snapshots.
    pub fn upgrade_candidates(&self) -> Result<Vec<UpgradeRow>, TrackerError> {
        let entries = self.load_all::<CollectionEntry>(EntityKind::CollectionEntries)?;
        let currencies = self.latest_currencies()?.unwrap_or_default();
        Ok(report::upgrade_candidates(&self.catalog, &entries, &currencies))
    }

    /// Latest wallet balances, if any cycle has recorded them.
    pub fn latest_currencies(&self) -> Result<Option<Currencies>, TrackerError> {
        self.store
            .latest(EntityKind::Currencies, "wallet")?
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    fn load_all<T: serde::de::DeserializeOwned>(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<T>, TrackerError> {
        let mut items = Vec::new();
        for (_key, payload) in self.store.all_latest(kind)? {
            items.push(serde_json::from_value(payload)?);
        }
        Ok(items)
    }
}
