//! Snapshot aggregation and arbitrage ranking.
//!
//! The [`Aggregator`] keeps the latest full list emitted by each adapter.
//! Each emission replaces that adapter's previous list wholesale. Ranked
//! rows are recomputed from scratch by [`rank`] on every pass.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{AdapterId, ArbitrageRow, FundingDatum, RankingPolicy};

#[derive(Debug)]
struct Snapshot {
    seq: u64,
    data: Vec<FundingDatum>,
}

/// Latest snapshot per adapter.
#[derive(Debug, Default)]
pub struct Aggregator {
    snapshots: HashMap<AdapterId, Snapshot>,
    next_seq: u64,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot of `id` with `data`.
    pub fn replace(&mut self, id: AdapterId, data: Vec<FundingDatum>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.snapshots.insert(id, Snapshot { seq, data });
    }

    /// Discard the snapshot of `id`. Returns `true` if one existed.
    pub fn remove(&mut self, id: &AdapterId) -> bool {
        self.snapshots.remove(id).is_some()
    }

    #[must_use]
    pub fn snapshot(&self, id: &AdapterId) -> Option<&[FundingDatum]> {
        self.snapshots.get(id).map(|s| s.data.as_slice())
    }

    /// Number of adapters with a snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// All snapshots flattened, oldest emission first.
    #[must_use]
    pub fn combined(&self) -> Vec<FundingDatum> {
        let mut snapshots: Vec<&Snapshot> = self.snapshots.values().collect();
        snapshots.sort_by_key(|s| s.seq);
        snapshots
            .into_iter()
            .flat_map(|s| s.data.iter().cloned())
            .collect()
    }

    /// Rank the current union of snapshots.
    #[must_use]
    pub fn rank(&self, policy: RankingPolicy) -> Vec<ArbitrageRow> {
        rank(&self.combined(), policy)
    }
}

/// Rank long/short pairings across `data`.
///
/// Readings are grouped by symbol. Within a symbol a later reading from the
/// same exchange replaces an earlier one. Symbols quoted by fewer than two
/// exchanges produce nothing. Every ordered pair of distinct exchanges is a
/// candidate; `policy` selects which survive. Output is sorted by
/// `diff_per_hour`, highest first.
#[must_use]
pub fn rank(data: &[FundingDatum], policy: RankingPolicy) -> Vec<ArbitrageRow> {
    let mut by_symbol: BTreeMap<&str, Vec<&FundingDatum>> = BTreeMap::new();
    for datum in data {
        let legs = by_symbol.entry(datum.symbol()).or_default();
        match legs.iter_mut().find(|d| d.exchange() == datum.exchange()) {
            Some(slot) => *slot = datum,
            None => legs.push(datum),
        }
    }

    let mut rows = Vec::new();
    for legs in by_symbol.values().filter(|legs| legs.len() >= 2) {
        let candidates = legs.iter().flat_map(move |long| {
            legs.iter()
                .filter(move |short| short.exchange() != long.exchange())
                .map(move |short| ArbitrageRow::from_legs(long, short))
        });

        match policy {
            RankingPolicy::AllProfitable => {
                rows.extend(candidates.filter(ArbitrageRow::is_profitable));
            }
            RankingPolicy::BestPerSymbol => {
                if let Some(best) =
                    candidates.max_by(|a, b| a.diff_per_hour.total_cmp(&b.diff_per_hour))
                {
                    rows.push(best);
                }
            }
        }
    }

    rows.sort_by(|a, b| b.diff_per_hour.total_cmp(&a.diff_per_hour));
    rows
}
